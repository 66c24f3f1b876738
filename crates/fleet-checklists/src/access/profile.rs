use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub String);

impl ProfileId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The independent permission flags of a profile, one per gated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionFlag {
    ApplyChecklists,
    ApproveChecklists,
    ViewOthersIncomplete,
    ReopenCompleted,
    DeleteChecklists,
    CommentEvaluations,
    ViewHistory,
}

impl PermissionFlag {
    pub const fn field_name(self) -> &'static str {
        match self {
            PermissionFlag::ApplyChecklists => "can_apply_checklists",
            PermissionFlag::ApproveChecklists => "can_approve_checklists",
            PermissionFlag::ViewOthersIncomplete => "can_view_others_incomplete",
            PermissionFlag::ReopenCompleted => "can_reopen_completed",
            PermissionFlag::DeleteChecklists => "can_delete_checklists",
            PermissionFlag::CommentEvaluations => "can_comment_evaluations",
            PermissionFlag::ViewHistory => "can_view_history",
        }
    }
}

/// Named bundle of permissions referenced by user accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessProfile {
    pub id: ProfileId,
    pub name: String,
    /// Grants every action and short-circuits the flags below.
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub can_apply_checklists: bool,
    #[serde(default)]
    pub can_approve_checklists: bool,
    #[serde(default)]
    pub can_view_others_incomplete: bool,
    #[serde(default)]
    pub can_reopen_completed: bool,
    #[serde(default)]
    pub can_delete_checklists: bool,
    #[serde(default)]
    pub can_comment_evaluations: bool,
    #[serde(default)]
    pub can_view_history: bool,
}

impl AccessProfile {
    /// A profile with every flag cleared.
    pub fn restricted(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ProfileId::new(id),
            name: name.into(),
            is_admin: false,
            can_apply_checklists: false,
            can_approve_checklists: false,
            can_view_others_incomplete: false,
            can_reopen_completed: false,
            can_delete_checklists: false,
            can_comment_evaluations: false,
            can_view_history: false,
        }
    }

    pub fn administrator(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            is_admin: true,
            ..Self::restricted(id, name)
        }
    }

    pub fn flag(&self, flag: PermissionFlag) -> bool {
        match flag {
            PermissionFlag::ApplyChecklists => self.can_apply_checklists,
            PermissionFlag::ApproveChecklists => self.can_approve_checklists,
            PermissionFlag::ViewOthersIncomplete => self.can_view_others_incomplete,
            PermissionFlag::ReopenCompleted => self.can_reopen_completed,
            PermissionFlag::DeleteChecklists => self.can_delete_checklists,
            PermissionFlag::CommentEvaluations => self.can_comment_evaluations,
            PermissionFlag::ViewHistory => self.can_view_history,
        }
    }

    pub fn with_flag(mut self, flag: PermissionFlag, enabled: bool) -> Self {
        let slot = match flag {
            PermissionFlag::ApplyChecklists => &mut self.can_apply_checklists,
            PermissionFlag::ApproveChecklists => &mut self.can_approve_checklists,
            PermissionFlag::ViewOthersIncomplete => &mut self.can_view_others_incomplete,
            PermissionFlag::ReopenCompleted => &mut self.can_reopen_completed,
            PermissionFlag::DeleteChecklists => &mut self.can_delete_checklists,
            PermissionFlag::CommentEvaluations => &mut self.can_comment_evaluations,
            PermissionFlag::ViewHistory => &mut self.can_view_history,
        };
        *slot = enabled;
        self
    }
}
