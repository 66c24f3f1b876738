use super::domain::{TemplateId, TemplateRecord};
use super::targeting::{
    Assignment, AssignmentTarget, FleetSnapshot, SideEffectToggles, TargetingOverrides,
};
use crate::store::RepositoryError;

/// Storage abstraction for validated templates.
pub trait TemplateRepository: Send + Sync {
    fn insert(&self, record: TemplateRecord) -> Result<TemplateRecord, RepositoryError>;
    /// Full replacement of an existing record.
    fn replace(&self, record: TemplateRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &TemplateId) -> Result<Option<TemplateRecord>, RepositoryError>;
    fn list(&self) -> Result<Vec<TemplateRecord>, RepositoryError>;
    fn remove(&self, id: &TemplateId) -> Result<TemplateRecord, RepositoryError>;
}

/// Read access to the external fleet/user directory.
pub trait FleetDirectory: Send + Sync {
    fn snapshot(&self) -> Result<FleetSnapshot, RepositoryError>;
}

/// Resolved assignments and the toggle-matrix overrides they are derived with.
pub trait AssignmentStore: Send + Sync {
    /// Replaces every stored assignment of the template; re-applying is idempotent.
    fn replace_assignments(
        &self,
        template_id: &TemplateId,
        assignments: Vec<Assignment>,
    ) -> Result<(), RepositoryError>;
    fn assignments(&self, template_id: &TemplateId) -> Result<Vec<Assignment>, RepositoryError>;
    fn overrides(&self, template_id: &TemplateId) -> Result<TargetingOverrides, RepositoryError>;
    fn set_override(
        &self,
        template_id: &TemplateId,
        target: AssignmentTarget,
        toggles: SideEffectToggles,
    ) -> Result<(), RepositoryError>;
    /// Drops assignments and overrides of a deleted template, returning the assignment count.
    fn remove_template(&self, template_id: &TemplateId) -> Result<usize, RepositoryError>;
}
