//! Record filtering performed by callers after consulting the evaluator.

use serde::{Deserialize, Serialize};

use super::evaluator::{authorize, AccessContext, Action};
use super::profile::AccessProfile;
use crate::checklists::domain::{TemplateId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InspectionId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatus {
    Incomplete,
    Completed,
}

/// Minimal view of an inspection record needed to scope it by ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionSummary {
    pub id: InspectionId,
    pub template_id: TemplateId,
    pub owner: UserId,
    pub status: InspectionStatus,
}

/// The actor's own incomplete inspections, plus everyone else's when the profile allows it.
pub fn visible_incomplete<'a>(
    profile: &AccessProfile,
    actor: &UserId,
    records: &'a [InspectionSummary],
) -> Vec<&'a InspectionSummary> {
    let others_visible = authorize(
        profile,
        Action::ViewOthersIncomplete,
        &AccessContext::third_party(),
    )
    .is_allowed();

    records
        .iter()
        .filter(|record| record.status == InspectionStatus::Incomplete)
        .filter(|record| others_visible || &record.owner == actor)
        .collect()
}

/// Completed inspections the profile may reopen; none without the permission.
pub fn reopenable<'a>(
    profile: &AccessProfile,
    records: &'a [InspectionSummary],
) -> Vec<&'a InspectionSummary> {
    if !authorize(profile, Action::ReopenCompleted, &AccessContext::default()).is_allowed() {
        return Vec::new();
    }

    records
        .iter()
        .filter(|record| record.status == InspectionStatus::Completed)
        .collect()
}
