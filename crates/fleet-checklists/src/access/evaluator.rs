use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::profile::{AccessProfile, PermissionFlag};

/// Closed set of gated checklist actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ApplyChecklist,
    ApproveOrReject,
    ViewOthersIncomplete,
    ReopenCompleted,
    DeleteChecklist,
    CommentOnEvaluation,
    ViewHistory,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::ApplyChecklist,
        Action::ApproveOrReject,
        Action::ViewOthersIncomplete,
        Action::ReopenCompleted,
        Action::DeleteChecklist,
        Action::CommentOnEvaluation,
        Action::ViewHistory,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Action::ApplyChecklist => "apply_checklist",
            Action::ApproveOrReject => "approve_or_reject",
            Action::ViewOthersIncomplete => "view_others_incomplete",
            Action::ReopenCompleted => "reopen_completed",
            Action::DeleteChecklist => "delete_checklist",
            Action::CommentOnEvaluation => "comment_on_evaluation",
            Action::ViewHistory => "view_history",
        }
    }

    pub const fn permission_flag(self) -> PermissionFlag {
        match self {
            Action::ApplyChecklist => PermissionFlag::ApplyChecklists,
            Action::ApproveOrReject => PermissionFlag::ApproveChecklists,
            Action::ViewOthersIncomplete => PermissionFlag::ViewOthersIncomplete,
            Action::ReopenCompleted => PermissionFlag::ReopenCompleted,
            Action::DeleteChecklist => PermissionFlag::DeleteChecklists,
            Action::CommentOnEvaluation => PermissionFlag::CommentEvaluations,
            Action::ViewHistory => PermissionFlag::ViewHistory,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action `{0}`")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim();
        Action::ALL
            .into_iter()
            .find(|action| action.label() == normalized)
            .ok_or_else(|| UnknownAction(raw.to_string()))
    }
}

/// How the acting user relates to the record an action targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Owner,
    #[default]
    ThirdParty,
}

/// Call-site context. The evaluator accepts it but never consults it: ownership only
/// decides which records a caller shows, never whether the action is permitted at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessContext {
    pub relationship: Relationship,
}

impl AccessContext {
    pub fn owner() -> Self {
        Self {
            relationship: Relationship::Owner,
        }
    }

    pub fn third_party() -> Self {
        Self {
            relationship: Relationship::ThirdParty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny { reason: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self, action: Action) -> Result<(), PermissionDenied> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny { reason } => Err(PermissionDenied {
                operation: action.label().to_string(),
                reason,
            }),
        }
    }
}

/// Authorization failure; always fatal to the attempted action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("permission denied for {operation}: {reason}")]
pub struct PermissionDenied {
    pub operation: String,
    pub reason: String,
}

/// Decide whether the profile may ever perform `action`.
pub fn authorize(profile: &AccessProfile, action: Action, _context: &AccessContext) -> Decision {
    if profile.is_admin {
        return Decision::Allow;
    }

    let flag = action.permission_flag();
    let decision = if profile.flag(flag) {
        Decision::Allow
    } else {
        Decision::Deny {
            reason: format!("missing permission: {}", flag.field_name()),
        }
    };

    debug!(profile = %profile.id, %action, allowed = decision.is_allowed(), "evaluated access");
    decision
}

/// Template authoring and profile management are reserved to administrators.
pub fn require_admin(profile: &AccessProfile, operation: &str) -> Result<(), PermissionDenied> {
    if profile.is_admin {
        Ok(())
    } else {
        Err(PermissionDenied {
            operation: operation.to_string(),
            reason: format!("profile `{}` is not an administrator", profile.id),
        })
    }
}
