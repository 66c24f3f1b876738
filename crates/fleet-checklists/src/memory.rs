//! Process-local adapters for every repository and directory trait.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use crate::access::{AccessProfile, ProfileId, ProfileRepository, UserDirectory};
use crate::checklists::domain::{TemplateId, TemplateRecord, UserId};
use crate::checklists::repository::{AssignmentStore, FleetDirectory, TemplateRepository};
use crate::checklists::targeting::{
    Assignment, AssignmentTarget, FleetSnapshot, SideEffectToggles, TargetingOverrides,
};
use crate::store::RepositoryError;

#[derive(Default, Clone)]
pub struct InMemoryTemplateRepository {
    records: Arc<Mutex<BTreeMap<TemplateId, TemplateRecord>>>,
}

impl TemplateRepository for InMemoryTemplateRepository {
    fn insert(&self, record: TemplateRecord) -> Result<TemplateRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("template mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn replace(&self, record: TemplateRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("template mutex poisoned");
        match guard.get_mut(&record.id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &TemplateId) -> Result<Option<TemplateRecord>, RepositoryError> {
        let guard = self.records.lock().expect("template mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<TemplateRecord>, RepositoryError> {
        let guard = self.records.lock().expect("template mutex poisoned");
        let mut records: Vec<_> = guard.values().cloned().collect();
        records.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(records)
    }

    fn remove(&self, id: &TemplateId) -> Result<TemplateRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("template mutex poisoned");
        guard.remove(id).ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryAssignmentStore {
    assignments: Arc<Mutex<HashMap<TemplateId, Vec<Assignment>>>>,
    overrides: Arc<Mutex<HashMap<TemplateId, TargetingOverrides>>>,
}

impl AssignmentStore for InMemoryAssignmentStore {
    fn replace_assignments(
        &self,
        template_id: &TemplateId,
        assignments: Vec<Assignment>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.assignments.lock().expect("assignment mutex poisoned");
        guard.insert(template_id.clone(), assignments);
        Ok(())
    }

    fn assignments(&self, template_id: &TemplateId) -> Result<Vec<Assignment>, RepositoryError> {
        let guard = self.assignments.lock().expect("assignment mutex poisoned");
        Ok(guard.get(template_id).cloned().unwrap_or_default())
    }

    fn overrides(&self, template_id: &TemplateId) -> Result<TargetingOverrides, RepositoryError> {
        let guard = self.overrides.lock().expect("override mutex poisoned");
        Ok(guard.get(template_id).cloned().unwrap_or_default())
    }

    fn set_override(
        &self,
        template_id: &TemplateId,
        target: AssignmentTarget,
        toggles: SideEffectToggles,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.overrides.lock().expect("override mutex poisoned");
        guard
            .entry(template_id.clone())
            .or_default()
            .set(target, toggles);
        Ok(())
    }

    fn remove_template(&self, template_id: &TemplateId) -> Result<usize, RepositoryError> {
        self.overrides
            .lock()
            .expect("override mutex poisoned")
            .remove(template_id);
        let removed = self
            .assignments
            .lock()
            .expect("assignment mutex poisoned")
            .remove(template_id)
            .map(|assignments| assignments.len())
            .unwrap_or(0);
        Ok(removed)
    }
}

/// Fleet directory backed by a snapshot that can be swapped at runtime.
#[derive(Default, Clone)]
pub struct StaticFleetDirectory {
    snapshot: Arc<Mutex<FleetSnapshot>>,
}

impl StaticFleetDirectory {
    pub fn new(snapshot: FleetSnapshot) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(snapshot)),
        }
    }

    pub fn replace(&self, snapshot: FleetSnapshot) {
        *self.snapshot.lock().expect("fleet mutex poisoned") = snapshot;
    }
}

impl FleetDirectory for StaticFleetDirectory {
    fn snapshot(&self) -> Result<FleetSnapshot, RepositoryError> {
        Ok(self.snapshot.lock().expect("fleet mutex poisoned").clone())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryProfileRepository {
    profiles: Arc<Mutex<BTreeMap<ProfileId, AccessProfile>>>,
}

impl InMemoryProfileRepository {
    pub fn seeded(profiles: impl IntoIterator<Item = AccessProfile>) -> Self {
        let profiles = profiles
            .into_iter()
            .map(|profile| (profile.id.clone(), profile))
            .collect();
        Self {
            profiles: Arc::new(Mutex::new(profiles)),
        }
    }
}

impl ProfileRepository for InMemoryProfileRepository {
    fn insert(&self, profile: AccessProfile) -> Result<AccessProfile, RepositoryError> {
        let mut guard = self.profiles.lock().expect("profile mutex poisoned");
        if guard.contains_key(&profile.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    fn update(&self, profile: AccessProfile) -> Result<(), RepositoryError> {
        let mut guard = self.profiles.lock().expect("profile mutex poisoned");
        match guard.get_mut(&profile.id) {
            Some(slot) => {
                *slot = profile;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &ProfileId) -> Result<Option<AccessProfile>, RepositoryError> {
        let guard = self.profiles.lock().expect("profile mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<AccessProfile>, RepositoryError> {
        let guard = self.profiles.lock().expect("profile mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn remove(&self, id: &ProfileId) -> Result<AccessProfile, RepositoryError> {
        let mut guard = self.profiles.lock().expect("profile mutex poisoned");
        guard.remove(id).ok_or(RepositoryError::NotFound)
    }
}

/// User accounts keyed by id, each referencing one profile.
#[derive(Default, Clone)]
pub struct InMemoryUserDirectory {
    accounts: Arc<Mutex<BTreeMap<UserId, ProfileId>>>,
}

impl InMemoryUserDirectory {
    pub fn assign(&self, user: UserId, profile: ProfileId) {
        self.accounts
            .lock()
            .expect("user mutex poisoned")
            .insert(user, profile);
    }

    pub fn unassign(&self, user: &UserId) -> Option<ProfileId> {
        self.accounts
            .lock()
            .expect("user mutex poisoned")
            .remove(user)
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn profile_of(&self, user: &UserId) -> Result<Option<ProfileId>, RepositoryError> {
        let guard = self.accounts.lock().expect("user mutex poisoned");
        Ok(guard.get(user).cloned())
    }

    fn users_with_profile(&self, profile: &ProfileId) -> Result<Vec<UserId>, RepositoryError> {
        let guard = self.accounts.lock().expect("user mutex poisoned");
        Ok(guard
            .iter()
            .filter(|(_, assigned)| *assigned == profile)
            .map(|(user, _)| user.clone())
            .collect())
    }
}
