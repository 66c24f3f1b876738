//! Access profiles and the permission evaluator gating checklist actions.
//!
//! Profiles are flat: one administrator switch plus one flag per gated action. The
//! evaluator answers whether an action may ever be performed; which records a caller
//! then shows is decided by the scoping helpers in [`scope`].

pub mod evaluator;
pub mod profile;
pub mod repository;
pub mod router;
pub mod scope;
pub mod service;

#[cfg(test)]
mod tests;

pub use evaluator::{
    authorize, require_admin, AccessContext, Action, Decision, PermissionDenied, Relationship,
    UnknownAction,
};
pub use profile::{AccessProfile, PermissionFlag, ProfileId};
pub use repository::{ProfileRepository, UserDirectory};
pub use router::{access_router, ACTOR_HEADER};
pub use scope::{reopenable, visible_incomplete, InspectionId, InspectionStatus, InspectionSummary};
pub use service::{load_actor, AccessProfileService, ActorError, ProfileServiceError};
