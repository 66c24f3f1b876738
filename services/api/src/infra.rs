use fleet_checklists::access::{AccessProfile, AccessProfileService};
use fleet_checklists::checklists::targeting::roster::load_snapshot;
use fleet_checklists::checklists::{ChecklistService, FleetSnapshot};
use fleet_checklists::config::AppConfig;
use fleet_checklists::error::AppError;
use fleet_checklists::memory::{
    InMemoryAssignmentStore, InMemoryProfileRepository, InMemoryTemplateRepository,
    InMemoryUserDirectory, StaticFleetDirectory,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type MemoryChecklistService = ChecklistService<
    InMemoryTemplateRepository,
    StaticFleetDirectory,
    InMemoryAssignmentStore,
    InMemoryProfileRepository,
>;

pub(crate) type MemoryProfileService =
    AccessProfileService<InMemoryProfileRepository, InMemoryUserDirectory>;

pub(crate) struct Services {
    pub(crate) checklists: Arc<MemoryChecklistService>,
    pub(crate) profiles: Arc<MemoryProfileService>,
}

/// Wires the in-memory adapters. Both services share one profile store so profiles
/// managed over HTTP immediately gate template authoring.
pub(crate) fn build_services(config: &AppConfig) -> Result<Services, AppError> {
    let snapshot = match &config.fleet.roster {
        Some(paths) => {
            let snapshot = load_snapshot(&paths.vehicles, &paths.users)?;
            info!(
                vehicles = snapshot.vehicles.len(),
                users = snapshot.users.len(),
                "fleet roster loaded"
            );
            snapshot
        }
        None => {
            warn!("no fleet roster configured; assignments resolve against an empty fleet");
            FleetSnapshot::default()
        }
    };

    let profiles = Arc::new(InMemoryProfileRepository::seeded([
        AccessProfile::administrator(config.access.bootstrap_admin.as_str(), "Administrador"),
    ]));
    let users = Arc::new(InMemoryUserDirectory::default());

    let checklists = ChecklistService::new(
        Arc::new(InMemoryTemplateRepository::default()),
        Arc::new(StaticFleetDirectory::new(snapshot)),
        Arc::new(InMemoryAssignmentStore::default()),
        profiles.clone(),
        config.checklists.limits,
        config.checklists.targeting_mode,
    );

    Ok(Services {
        checklists: Arc::new(checklists),
        profiles: Arc::new(AccessProfileService::new(profiles, users)),
    })
}
