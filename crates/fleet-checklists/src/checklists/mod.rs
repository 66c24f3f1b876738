//! Inspection templates: schema validation, item configuration, fleet targeting.
//!
//! Authored documents enter through [`document::TemplateDocument`], are checked by
//! [`schema::TemplateValidator`] (which delegates per-item configuration to
//! [`items::ConfigResolver`]) and leave as a normalized [`domain::ChecklistTemplate`].
//! [`targeting::TargetingResolver`] then decides where a stored template applies.

pub mod document;
pub mod domain;
pub mod items;
pub mod repository;
pub mod router;
pub mod schema;
pub mod service;
pub mod targeting;

#[cfg(test)]
mod tests;

pub use document::{MalformedInput, TemplateDocument};
pub use domain::{
    Area, AreaId, AreaKind, ChecklistTemplate, Item, ItemConfig, ItemId, ItemType, Settings,
    TemplateId, TemplateRecord, UserId, VehicleId, VehicleTypeRef,
};
pub use items::{resolve_config, ConfigError, ConfigResolver};
pub use repository::{AssignmentStore, FleetDirectory, TemplateRepository};
pub use router::{checklist_router, invalid_template_payload, TemplateView};
pub use schema::{validate, SchemaError, TemplateValidator, ValidationFailure, ValidationLimits};
pub use service::{ChecklistService, ChecklistServiceError};
pub use targeting::{
    resolve_assignments, Assignment, AssignmentTarget, DanglingReferenceWarning, DeploymentMode,
    FleetSnapshot, FleetUser, SideEffectToggles, TargetingOverrides, TargetingResolution,
    TargetingResolver, Vehicle,
};
