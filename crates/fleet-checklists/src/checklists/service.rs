use std::sync::Arc;

use tracing::info;

use super::document::TemplateDocument;
use super::domain::{ChecklistTemplate, TemplateId, TemplateRecord};
use super::repository::{AssignmentStore, FleetDirectory, TemplateRepository};
use super::schema::{SchemaError, TemplateValidator, ValidationLimits};
use super::targeting::{
    Assignment, AssignmentTarget, DeploymentMode, SideEffectToggles, TargetingResolution,
    TargetingResolver,
};
use crate::access::{
    load_actor, require_admin, ActorError, PermissionDenied, ProfileId, ProfileRepository,
};
use crate::store::RepositoryError;

/// Service composing the validator, the targeting resolver and their repositories.
pub struct ChecklistService<R, F, A, P> {
    templates: Arc<R>,
    fleet: Arc<F>,
    assignments: Arc<A>,
    profiles: Arc<P>,
    validator: TemplateValidator,
    resolver: TargetingResolver,
}

impl<R, F, A, P> ChecklistService<R, F, A, P>
where
    R: TemplateRepository + 'static,
    F: FleetDirectory + 'static,
    A: AssignmentStore + 'static,
    P: ProfileRepository + 'static,
{
    pub fn new(
        templates: Arc<R>,
        fleet: Arc<F>,
        assignments: Arc<A>,
        profiles: Arc<P>,
        limits: ValidationLimits,
        mode: DeploymentMode,
    ) -> Self {
        Self {
            templates,
            fleet,
            assignments,
            profiles,
            validator: TemplateValidator::new(limits),
            resolver: TargetingResolver::new(mode),
        }
    }

    pub fn deployment_mode(&self) -> DeploymentMode {
        self.resolver.mode()
    }

    /// Validate without storing anything.
    pub fn validate(
        &self,
        document: &TemplateDocument,
    ) -> Result<ChecklistTemplate, ChecklistServiceError> {
        self.validator
            .validate(document)
            .map_err(ChecklistServiceError::Invalid)
    }

    /// Validate and store a new template under a freshly generated id.
    pub fn create(
        &self,
        actor: &ProfileId,
        document: &TemplateDocument,
    ) -> Result<TemplateRecord, ChecklistServiceError> {
        self.require_admin_actor(actor, "create_template")?;
        let template = self.validate(document)?;

        let record = TemplateRecord::new(TemplateId::generate(), template);
        let stored = self.templates.insert(record)?;
        info!(
            template_id = %stored.id,
            items = stored.template.item_count(),
            %actor,
            "checklist template created"
        );
        Ok(stored)
    }

    /// Full-structure replacement. Any id carried by the document is ignored.
    pub fn replace(
        &self,
        actor: &ProfileId,
        id: &TemplateId,
        document: &TemplateDocument,
    ) -> Result<TemplateRecord, ChecklistServiceError> {
        self.require_admin_actor(actor, "replace_template")?;
        let template = self.validate(document)?;

        let current = self.get(id)?;
        let record = current.replaced_with(template);
        self.templates.replace(record.clone())?;
        info!(
            template_id = %id,
            items = record.template.item_count(),
            %actor,
            "checklist template replaced"
        );
        Ok(record)
    }

    /// Delete the template together with its stored assignments and overrides.
    pub fn delete(
        &self,
        actor: &ProfileId,
        id: &TemplateId,
    ) -> Result<usize, ChecklistServiceError> {
        self.require_admin_actor(actor, "delete_template")?;

        self.templates.remove(id)?;
        let removed = self.assignments.remove_template(id)?;
        info!(
            template_id = %id,
            assignments_removed = removed,
            %actor,
            "checklist template deleted"
        );
        Ok(removed)
    }

    pub fn get(&self, id: &TemplateId) -> Result<TemplateRecord, ChecklistServiceError> {
        let record = self.templates.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn list(&self) -> Result<Vec<TemplateRecord>, ChecklistServiceError> {
        Ok(self.templates.list()?)
    }

    /// Resolve against the current fleet and store the result as the template's replace-set.
    pub fn resolve_assignments(
        &self,
        id: &TemplateId,
    ) -> Result<TargetingResolution, ChecklistServiceError> {
        let record = self.get(id)?;
        let fleet = self.fleet.snapshot()?;
        let overrides = self.assignments.overrides(id)?;

        let resolution = self
            .resolver
            .resolve(id, &record.template, &fleet, &overrides);
        self.assignments
            .replace_assignments(id, resolution.assignments.clone())?;

        info!(
            template_id = %id,
            applying = resolution.applying().count(),
            warnings = resolution.warnings.len(),
            "template assignments stored"
        );
        Ok(resolution)
    }

    pub fn assignments(&self, id: &TemplateId) -> Result<Vec<Assignment>, ChecklistServiceError> {
        self.get(id)?;
        Ok(self.assignments.assignments(id)?)
    }

    /// Record a toggle-matrix override; it takes effect on the next resolution.
    pub fn set_override(
        &self,
        actor: &ProfileId,
        id: &TemplateId,
        target: AssignmentTarget,
        toggles: SideEffectToggles,
    ) -> Result<(), ChecklistServiceError> {
        self.require_admin_actor(actor, "set_assignment_override")?;
        self.get(id)?;

        self.assignments.set_override(id, target, toggles)?;
        info!(
            template_id = %id,
            report = toggles.report,
            email = toggles.email,
            "assignment override set"
        );
        Ok(())
    }

    fn require_admin_actor(
        &self,
        actor: &ProfileId,
        operation: &str,
    ) -> Result<(), ChecklistServiceError> {
        let profile = load_actor(self.profiles.as_ref(), actor)?;
        require_admin(&profile, operation)?;
        Ok(())
    }
}

/// Error raised by the checklist service.
#[derive(Debug, thiserror::Error)]
pub enum ChecklistServiceError {
    #[error("template failed validation with {} error(s)", .0.len())]
    Invalid(Vec<SchemaError>),
    #[error(transparent)]
    PermissionDenied(#[from] PermissionDenied),
    #[error("unknown acting profile `{0}`")]
    UnknownActor(ProfileId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<ActorError> for ChecklistServiceError {
    fn from(error: ActorError) -> Self {
        match error {
            ActorError::Unknown(actor) => ChecklistServiceError::UnknownActor(actor),
            ActorError::Repository(error) => ChecklistServiceError::Repository(error),
        }
    }
}
