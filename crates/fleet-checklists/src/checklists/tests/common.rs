use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::access::{AccessProfile, PermissionFlag, ProfileId};
use crate::checklists::document::{
    AreaDocument, ItemConfigDocument, ItemDocument, StructureDocument, TemplateDocument,
};
use crate::checklists::domain::{TemplateId, TemplateRecord, UserId, VehicleId, VehicleTypeRef};
use crate::checklists::repository::TemplateRepository;
use crate::checklists::schema::ValidationLimits;
use crate::checklists::targeting::{DeploymentMode, FleetSnapshot, FleetUser, Vehicle};
use crate::checklists::{checklist_router, ChecklistService};
use crate::memory::{
    InMemoryAssignmentStore, InMemoryProfileRepository, InMemoryTemplateRepository,
    StaticFleetDirectory,
};
use crate::store::RepositoryError;

pub(super) const ADMIN: &str = "admin";
pub(super) const DRIVER: &str = "motorista";

pub(super) type MemoryChecklistService = ChecklistService<
    InMemoryTemplateRepository,
    StaticFleetDirectory,
    InMemoryAssignmentStore,
    InMemoryProfileRepository,
>;

pub(super) fn admin() -> ProfileId {
    ProfileId::new(ADMIN)
}

pub(super) fn driver() -> ProfileId {
    ProfileId::new(DRIVER)
}

pub(super) fn profiles() -> InMemoryProfileRepository {
    InMemoryProfileRepository::seeded([
        AccessProfile::administrator(ADMIN, "Administrador"),
        AccessProfile::restricted(DRIVER, "Motorista")
            .with_flag(PermissionFlag::ApplyChecklists, true),
    ])
}

/// Daily inspection for tractor units: nested areas, one of each item type and a
/// bare notice area.
pub(super) const TRACTOR_TEMPLATE: &str = r#"{
    "name": "  Inspeção diária - Cavalo Mecânico  ",
    "subject": "Pré-viagem",
    "description": "Checklist aplicado antes de cada saída",
    "settings": { "app_only": true, "mandatory_signature": true },
    "structure": {
        "areas": [
            {
                "id": "cabine",
                "name": "Cabine",
                "type": "standard",
                "items": [
                    { "id": "painel", "name": "Painel sem alertas", "type": "Evaluative",
                      "config": { "allow_photo": true } },
                    { "id": "km", "name": "Hodômetro", "type": "RegisteredField" }
                ],
                "sub_areas": [
                    {
                        "id": "documentos",
                        "name": "Documentos",
                        "items": [
                            { "id": "crlv", "name": "CRLV em dia", "type": "SingleOrMultiSelect",
                              "config": { "options": ["Sim", "Não"], "selection_type": "single" } },
                            { "id": "validade", "name": "Validade do extintor", "type": "Date" }
                        ]
                    }
                ]
            },
            {
                "id": "pneus",
                "name": "Pneus",
                "items": [
                    { "id": "obs", "name": "Observações", "type": "Text",
                      "config": { "hint": "Descreva avarias visíveis", "allow_attachment": true } }
                ]
            },
            { "id": "aviso", "name": "Aviso", "type": "standard" }
        ]
    },
    "target_vehicle_types": ["Cavalo Mecânico"],
    "assigned_user_ids": []
}"#;

pub(super) fn tractor_document() -> TemplateDocument {
    TemplateDocument::from_json(TRACTOR_TEMPLATE).expect("fixture parses")
}

pub(super) fn item(id: &str, item_type: &str) -> ItemDocument {
    ItemDocument {
        id: Some(id.to_string()),
        name: Some(format!("Item {id}")),
        item_type: Some(item_type.to_string()),
        config: ItemConfigDocument::default(),
    }
}

pub(super) fn area(
    id: &str,
    items: Vec<ItemDocument>,
    sub_areas: Vec<AreaDocument>,
) -> AreaDocument {
    AreaDocument {
        id: Some(id.to_string()),
        name: Some(format!("Área {id}")),
        kind: None,
        items,
        sub_areas,
    }
}

pub(super) fn document_with(areas: Vec<AreaDocument>) -> TemplateDocument {
    TemplateDocument {
        name: Some("Checklist".to_string()),
        structure: StructureDocument { areas },
        ..TemplateDocument::default()
    }
}

pub(super) fn vehicle(id: &str, vehicle_type: &str) -> Vehicle {
    Vehicle {
        id: VehicleId::new(id),
        vehicle_type_ref: VehicleTypeRef::new(vehicle_type),
    }
}

pub(super) fn user(id: &str) -> FleetUser {
    FleetUser { id: UserId::new(id) }
}

/// Two vehicles of different types and two drivers.
pub(super) fn mixed_fleet() -> FleetSnapshot {
    FleetSnapshot {
        vehicles: vec![vehicle("v1", "Cavalo Mecânico"), vehicle("v2", "VUC")],
        users: vec![user("u1"), user("u2")],
        vehicle_types: Vec::new(),
    }
}

pub(super) struct Harness {
    pub(super) service: Arc<MemoryChecklistService>,
    pub(super) assignments: Arc<InMemoryAssignmentStore>,
    pub(super) fleet: Arc<StaticFleetDirectory>,
}

pub(super) fn harness(mode: DeploymentMode) -> Harness {
    let assignments = Arc::new(InMemoryAssignmentStore::default());
    let fleet = Arc::new(StaticFleetDirectory::new(mixed_fleet()));
    let service = Arc::new(ChecklistService::new(
        Arc::new(InMemoryTemplateRepository::default()),
        fleet.clone(),
        assignments.clone(),
        Arc::new(profiles()),
        ValidationLimits::default(),
        mode,
    ));

    Harness {
        service,
        assignments,
        fleet,
    }
}

pub(super) fn router_with_service(service: Arc<MemoryChecklistService>) -> axum::Router {
    checklist_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Template store whose backend is down.
pub(super) struct UnavailableTemplates;

impl TemplateRepository for UnavailableTemplates {
    fn insert(&self, _record: TemplateRecord) -> Result<TemplateRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("template store offline".to_string()))
    }

    fn replace(&self, _record: TemplateRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("template store offline".to_string()))
    }

    fn fetch(&self, _id: &TemplateId) -> Result<Option<TemplateRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("template store offline".to_string()))
    }

    fn list(&self) -> Result<Vec<TemplateRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("template store offline".to_string()))
    }

    fn remove(&self, _id: &TemplateId) -> Result<TemplateRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("template store offline".to_string()))
    }
}
