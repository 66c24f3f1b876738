use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::access::{AccessProfile, AccessProfileService, PermissionFlag, ProfileId};
use crate::checklists::domain::UserId;
use crate::memory::{InMemoryProfileRepository, InMemoryUserDirectory};

pub(super) const ADMIN: &str = "admin";
pub(super) const SUPERVISOR: &str = "supervisor";

pub(super) type MemoryProfileService =
    AccessProfileService<InMemoryProfileRepository, InMemoryUserDirectory>;

pub(super) fn admin() -> ProfileId {
    ProfileId::new(ADMIN)
}

pub(super) fn supervisor_profile() -> AccessProfile {
    AccessProfile::restricted(SUPERVISOR, "Supervisor de frota")
        .with_flag(PermissionFlag::ApproveChecklists, true)
        .with_flag(PermissionFlag::ReopenCompleted, true)
        .with_flag(PermissionFlag::ViewHistory, true)
}

pub(super) struct Harness {
    pub(super) service: Arc<MemoryProfileService>,
    pub(super) users: Arc<InMemoryUserDirectory>,
}

pub(super) fn harness() -> Harness {
    let profiles = InMemoryProfileRepository::seeded([
        AccessProfile::administrator(ADMIN, "Administrador"),
        supervisor_profile(),
    ]);
    let users = Arc::new(InMemoryUserDirectory::default());
    users.assign(UserId::new("u-ana"), ProfileId::new(SUPERVISOR));

    Harness {
        service: Arc::new(AccessProfileService::new(Arc::new(profiles), users.clone())),
        users,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
