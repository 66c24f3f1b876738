//! Resolution of which vehicles and users a template applies to.

pub mod roster;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{ChecklistTemplate, TemplateId, UserId, VehicleId, VehicleTypeRef};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub vehicle_type_ref: VehicleTypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetUser {
    pub id: UserId,
}

/// Point-in-time view of the fleet directory, supplied by the caller on every resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub users: Vec<FleetUser>,
    /// Known vehicle types. When empty, the types carried by `vehicles` are used instead.
    #[serde(default)]
    pub vehicle_types: Vec<VehicleTypeRef>,
}

impl FleetSnapshot {
    fn known_vehicle_types(&self) -> BTreeSet<&VehicleTypeRef> {
        if self.vehicle_types.is_empty() {
            self.vehicles
                .iter()
                .map(|vehicle| &vehicle.vehicle_type_ref)
                .collect()
        } else {
            self.vehicle_types.iter().collect()
        }
    }
}

/// Which axis assignments are produced on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentMode {
    /// One assignment per vehicle/user pair.
    #[default]
    VehicleUser,
    Vehicle,
    User,
}

impl DeploymentMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "vehicle_user" | "pair" | "pairs" => Some(Self::VehicleUser),
            "vehicle" | "vehicles" => Some(Self::Vehicle),
            "user" | "users" => Some(Self::User),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::VehicleUser => "vehicle_user",
            Self::Vehicle => "vehicle",
            Self::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssignmentTarget {
    Vehicle {
        vehicle_id: VehicleId,
    },
    User {
        user_id: UserId,
    },
    VehicleUser {
        vehicle_id: VehicleId,
        user_id: UserId,
    },
}

/// Report and e-mail switches from the "Aplica / Relatório / E-mail" toggle matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideEffectToggles {
    #[serde(default)]
    pub report: bool,
    #[serde(default)]
    pub email: bool,
}

/// Per-template overrides of the side-effect toggles, keyed by target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetingOverrides {
    entries: BTreeMap<AssignmentTarget, SideEffectToggles>,
}

impl TargetingOverrides {
    pub fn set(&mut self, target: AssignmentTarget, toggles: SideEffectToggles) {
        self.entries.insert(target, toggles);
    }

    pub fn get(&self, target: &AssignmentTarget) -> Option<SideEffectToggles> {
        self.entries.get(target).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pair targets fall back to a vehicle override, then to a user override.
    pub fn lookup(&self, target: &AssignmentTarget) -> SideEffectToggles {
        if let Some(toggles) = self.get(target) {
            return toggles;
        }

        match target {
            AssignmentTarget::VehicleUser {
                vehicle_id,
                user_id,
            } => self
                .get(&AssignmentTarget::Vehicle {
                    vehicle_id: vehicle_id.clone(),
                })
                .or_else(|| {
                    self.get(&AssignmentTarget::User {
                        user_id: user_id.clone(),
                    })
                })
                .unwrap_or_default(),
            AssignmentTarget::Vehicle { .. } | AssignmentTarget::User { .. } => {
                SideEffectToggles::default()
            }
        }
    }
}

/// Resolved answer to "does this template apply here, and with which side effects".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub template_id: TemplateId,
    pub target: AssignmentTarget,
    pub applies: bool,
    pub report: bool,
    pub email: bool,
}

/// A target reference that matches nothing in the current fleet snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", content = "reference", rename_all = "snake_case")]
pub enum DanglingReferenceWarning {
    #[error("vehicle type `{0}` does not exist in the fleet")]
    VehicleType(VehicleTypeRef),
    #[error("user `{0}` does not exist in the fleet")]
    User(UserId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingResolution {
    pub assignments: Vec<Assignment>,
    pub warnings: Vec<DanglingReferenceWarning>,
}

impl TargetingResolution {
    pub fn applying(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments
            .iter()
            .filter(|assignment| assignment.applies)
    }
}

/// Stateless resolver producing the full replace-set of assignments for a template.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetingResolver {
    mode: DeploymentMode,
}

impl TargetingResolver {
    pub fn new(mode: DeploymentMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> DeploymentMode {
        self.mode
    }

    pub fn resolve(
        &self,
        template_id: &TemplateId,
        template: &ChecklistTemplate,
        fleet: &FleetSnapshot,
        overrides: &TargetingOverrides,
    ) -> TargetingResolution {
        let vehicle_in_scope = |vehicle: &Vehicle| {
            template.targets_every_vehicle_type()
                || template
                    .target_vehicle_types
                    .contains(&vehicle.vehicle_type_ref)
        };
        let user_in_scope = |user: &FleetUser| {
            template.targets_every_user() || template.assigned_user_ids.contains(&user.id)
        };

        let vehicles = distinct_vehicles(&fleet.vehicles);
        let users = distinct_users(&fleet.users);

        let mut candidates = Vec::new();
        match self.mode {
            DeploymentMode::VehicleUser => {
                for &vehicle in &vehicles {
                    for &user in &users {
                        candidates.push((
                            AssignmentTarget::VehicleUser {
                                vehicle_id: vehicle.id.clone(),
                                user_id: user.id.clone(),
                            },
                            vehicle_in_scope(vehicle) && user_in_scope(user),
                        ));
                    }
                }
            }
            DeploymentMode::Vehicle => {
                for &vehicle in &vehicles {
                    candidates.push((
                        AssignmentTarget::Vehicle {
                            vehicle_id: vehicle.id.clone(),
                        },
                        vehicle_in_scope(vehicle),
                    ));
                }
            }
            DeploymentMode::User => {
                for &user in &users {
                    candidates.push((
                        AssignmentTarget::User {
                            user_id: user.id.clone(),
                        },
                        user_in_scope(user),
                    ));
                }
            }
        }

        let assignments: Vec<Assignment> = candidates
            .into_iter()
            .map(|(target, applies)| {
                let toggles = if applies {
                    overrides.lookup(&target)
                } else {
                    SideEffectToggles::default()
                };
                Assignment {
                    template_id: template_id.clone(),
                    target,
                    applies,
                    report: toggles.report,
                    email: toggles.email,
                }
            })
            .collect();

        let warnings = dangling_references(template, fleet);
        for warning in &warnings {
            warn!(%template_id, %warning, "template targets a reference missing from the fleet");
        }

        debug!(
            %template_id,
            mode = self.mode.label(),
            assignments = assignments.len(),
            applying = assignments.iter().filter(|assignment| assignment.applies).count(),
            "resolved template assignments"
        );

        TargetingResolution {
            assignments,
            warnings,
        }
    }
}

/// Roster exports may repeat a row; the first entry for each vehicle id wins.
fn distinct_vehicles(vehicles: &[Vehicle]) -> Vec<&Vehicle> {
    let mut seen = BTreeSet::new();
    vehicles
        .iter()
        .filter(|vehicle| {
            let first = seen.insert(&vehicle.id);
            if !first {
                warn!(
                    vehicle_id = %vehicle.id,
                    "vehicle listed more than once; keeping the first entry"
                );
            }
            first
        })
        .collect()
}

fn distinct_users(users: &[FleetUser]) -> Vec<&FleetUser> {
    let mut seen = BTreeSet::new();
    users
        .iter()
        .filter(|user| {
            let first = seen.insert(&user.id);
            if !first {
                warn!(user_id = %user.id, "user listed more than once; keeping the first entry");
            }
            first
        })
        .collect()
}

fn dangling_references(
    template: &ChecklistTemplate,
    fleet: &FleetSnapshot,
) -> Vec<DanglingReferenceWarning> {
    let known_types = fleet.known_vehicle_types();
    let known_users: BTreeSet<&UserId> = fleet.users.iter().map(|user| &user.id).collect();

    let dangling_types = template
        .target_vehicle_types
        .iter()
        .filter(|reference| !known_types.contains(reference))
        .cloned()
        .map(DanglingReferenceWarning::VehicleType);
    let dangling_users = template
        .assigned_user_ids
        .iter()
        .filter(|user| !known_users.contains(user))
        .cloned()
        .map(DanglingReferenceWarning::User);

    dangling_types.chain(dangling_users).collect()
}

/// Resolve with an explicit deployment mode.
pub fn resolve_assignments(
    template_id: &TemplateId,
    template: &ChecklistTemplate,
    fleet: &FleetSnapshot,
    overrides: &TargetingOverrides,
    mode: DeploymentMode,
) -> TargetingResolution {
    TargetingResolver::new(mode).resolve(template_id, template, fleet, overrides)
}
