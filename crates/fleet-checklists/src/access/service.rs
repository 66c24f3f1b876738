use std::sync::Arc;

use tracing::{info, warn};

use super::evaluator::{
    authorize, require_admin, AccessContext, Action, Decision, PermissionDenied,
};
use super::profile::{AccessProfile, ProfileId};
use super::repository::{ProfileRepository, UserDirectory};
use crate::checklists::domain::UserId;
use crate::store::RepositoryError;

/// Profile lifecycle plus authorization lookups by profile or user id.
pub struct AccessProfileService<P, U> {
    profiles: Arc<P>,
    users: Arc<U>,
}

impl<P, U> AccessProfileService<P, U>
where
    P: ProfileRepository + 'static,
    U: UserDirectory + 'static,
{
    pub fn new(profiles: Arc<P>, users: Arc<U>) -> Self {
        Self { profiles, users }
    }

    pub fn create(
        &self,
        actor: &ProfileId,
        profile: AccessProfile,
    ) -> Result<AccessProfile, ProfileServiceError> {
        self.require_admin_actor(actor, "create_profile")?;
        let profile = normalize(profile)?;

        let stored = self.profiles.insert(profile)?;
        info!(profile = %stored.id, admin = stored.is_admin, %actor, "access profile created");
        Ok(stored)
    }

    pub fn update(
        &self,
        actor: &ProfileId,
        profile: AccessProfile,
    ) -> Result<AccessProfile, ProfileServiceError> {
        self.require_admin_actor(actor, "update_profile")?;
        let profile = normalize(profile)?;

        let demoted = self
            .profiles
            .fetch(&profile.id)?
            .is_some_and(|stored| stored.is_admin && !profile.is_admin);
        if demoted {
            self.ensure_other_administrator(&profile.id)?;
        }

        self.profiles.update(profile.clone())?;
        info!(profile = %profile.id, %actor, "access profile updated");
        Ok(profile)
    }

    /// Deletion is refused while any user account still references the profile, and for the
    /// last administrator profile.
    pub fn delete(&self, actor: &ProfileId, id: &ProfileId) -> Result<(), ProfileServiceError> {
        self.require_admin_actor(actor, "delete_profile")?;

        let target = self.get(id)?;
        if target.is_admin {
            self.ensure_other_administrator(id)?;
        }

        let users = self.users.users_with_profile(id)?;
        if !users.is_empty() {
            return Err(ProfileServiceError::ProfileInUse {
                profile: id.clone(),
                users,
            });
        }

        self.profiles.remove(id)?;
        info!(profile = %id, %actor, "access profile deleted");
        Ok(())
    }

    pub fn get(&self, id: &ProfileId) -> Result<AccessProfile, ProfileServiceError> {
        let profile = self.profiles.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(profile)
    }

    pub fn list(&self) -> Result<Vec<AccessProfile>, ProfileServiceError> {
        Ok(self.profiles.list()?)
    }

    pub fn authorize(
        &self,
        profile_id: &ProfileId,
        action: Action,
        context: &AccessContext,
    ) -> Result<Decision, ProfileServiceError> {
        let profile = self.get(profile_id)?;
        Ok(authorize(&profile, action, context))
    }

    /// Resolve the user's profile first; users without one are denied.
    pub fn authorize_user(
        &self,
        user: &UserId,
        action: Action,
        context: &AccessContext,
    ) -> Result<Decision, ProfileServiceError> {
        match self.users.profile_of(user)? {
            Some(profile_id) => self.authorize(&profile_id, action, context),
            None => Ok(Decision::Deny {
                reason: format!("user `{user}` has no access profile"),
            }),
        }
    }

    /// At least one administrator profile must survive every update or deletion.
    fn ensure_other_administrator(&self, leaving: &ProfileId) -> Result<(), ProfileServiceError> {
        let remaining = self
            .profiles
            .list()?
            .iter()
            .filter(|profile| profile.is_admin && &profile.id != leaving)
            .count();
        if remaining == 0 {
            warn!(profile = %leaving, "refusing to remove the last administrator profile");
            return Err(ProfileServiceError::LastAdministrator(leaving.clone()));
        }
        Ok(())
    }

    fn require_admin_actor(
        &self,
        actor: &ProfileId,
        operation: &str,
    ) -> Result<(), ProfileServiceError> {
        let profile = load_actor(self.profiles.as_ref(), actor)?;
        require_admin(&profile, operation)?;
        Ok(())
    }
}

/// Fetch the acting profile, distinguishing an unknown actor from a missing record.
pub fn load_actor<P>(profiles: &P, actor: &ProfileId) -> Result<AccessProfile, ActorError>
where
    P: ProfileRepository + ?Sized,
{
    profiles
        .fetch(actor)?
        .ok_or_else(|| ActorError::Unknown(actor.clone()))
}

fn normalize(mut profile: AccessProfile) -> Result<AccessProfile, ProfileServiceError> {
    profile.id = ProfileId::new(profile.id.0.trim());
    profile.name = profile.name.trim().to_string();

    if profile.id.0.is_empty() {
        return Err(ProfileServiceError::InvalidProfile("profile id is empty"));
    }
    if profile.name.is_empty() {
        return Err(ProfileServiceError::InvalidProfile("profile name is empty"));
    }
    Ok(profile)
}

#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    #[error("unknown acting profile `{0}`")]
    Unknown(ProfileId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileServiceError {
    #[error(transparent)]
    PermissionDenied(#[from] PermissionDenied),
    #[error("unknown acting profile `{0}`")]
    UnknownActor(ProfileId),
    #[error("profile `{profile}` is still referenced by {} user(s)", users.len())]
    ProfileInUse {
        profile: ProfileId,
        users: Vec<UserId>,
    },
    #[error("profile `{0}` is the last administrator profile")]
    LastAdministrator(ProfileId),
    #[error("invalid profile: {0}")]
    InvalidProfile(&'static str),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<ActorError> for ProfileServiceError {
    fn from(error: ActorError) -> Self {
        match error {
            ActorError::Unknown(actor) => ProfileServiceError::UnknownActor(actor),
            ActorError::Repository(error) => ProfileServiceError::Repository(error),
        }
    }
}
