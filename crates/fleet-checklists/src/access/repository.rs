use super::profile::{AccessProfile, ProfileId};
use crate::checklists::domain::UserId;
use crate::store::RepositoryError;

/// Storage abstraction for access profiles.
pub trait ProfileRepository: Send + Sync {
    fn insert(&self, profile: AccessProfile) -> Result<AccessProfile, RepositoryError>;
    fn update(&self, profile: AccessProfile) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ProfileId) -> Result<Option<AccessProfile>, RepositoryError>;
    fn list(&self) -> Result<Vec<AccessProfile>, RepositoryError>;
    fn remove(&self, id: &ProfileId) -> Result<AccessProfile, RepositoryError>;
}

/// User accounts and the profile each one references.
pub trait UserDirectory: Send + Sync {
    fn profile_of(&self, user: &UserId) -> Result<Option<ProfileId>, RepositoryError>;
    fn users_with_profile(&self, profile: &ProfileId) -> Result<Vec<UserId>, RepositoryError>;
}
