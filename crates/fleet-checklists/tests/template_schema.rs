//! Template authoring scenarios exercised through the public validator and service facade.

mod common {
    use std::sync::Arc;

    use fleet_checklists::access::AccessProfile;
    use fleet_checklists::checklists::targeting::DeploymentMode;
    use fleet_checklists::checklists::{ChecklistService, ValidationLimits};
    use fleet_checklists::memory::{
        InMemoryAssignmentStore, InMemoryProfileRepository, InMemoryTemplateRepository,
        StaticFleetDirectory,
    };

    pub(super) type Service = ChecklistService<
        InMemoryTemplateRepository,
        StaticFleetDirectory,
        InMemoryAssignmentStore,
        InMemoryProfileRepository,
    >;

    pub(super) fn service() -> Service {
        ChecklistService::new(
            Arc::new(InMemoryTemplateRepository::default()),
            Arc::new(StaticFleetDirectory::default()),
            Arc::new(InMemoryAssignmentStore::default()),
            Arc::new(InMemoryProfileRepository::seeded([
                AccessProfile::administrator("admin", "Administrador"),
            ])),
            ValidationLimits::default(),
            DeploymentMode::VehicleUser,
        )
    }

    /// Trailer inspection exported from the authoring tool.
    pub(super) const TRAILER_TEMPLATE: &str = r#"{
        "name": "Inspeção de carreta",
        "subject": "Semirreboque",
        "description": "",
        "settings": { "geo_fence_start": true, "geo_fence_end": true, "partial_result": true },
        "structure": { "areas": [
            { "id": "aviso", "name": "Aviso" },
            { "id": "estrutura", "name": "Estrutura", "type": "standard",
              "items": [
                { "id": "lona", "name": "Lona", "type": "Evaluative",
                  "config": { "allow_photo": true, "hint": "Verifique rasgos" } },
                { "id": "lacre", "name": "Número do lacre", "type": "RegisteredField" }
              ],
              "sub_areas": [
                { "id": "eixos", "name": "Eixos",
                  "items": [
                    { "id": "eixo-estado", "name": "Estado dos eixos", "type": "SingleOrMultiSelect",
                      "config": { "options": ["Bom", "Regular", "Ruim"], "selection_type": "single",
                                  "selection_options": [] } }
                  ] }
              ] }
        ] },
        "target_vehicle_types": ["Semirreboque"],
        "assigned_user_ids": ["u7", "u7", " u8 "]
    }"#;
}

use common::*;
use fleet_checklists::access::ProfileId;
use fleet_checklists::checklists::{
    ChecklistServiceError, SchemaError, TemplateDocument, TemplateValidator, UserId,
    ValidationFailure,
};

#[test]
fn exported_templates_validate_and_normalize() {
    let template = TemplateValidator::default()
        .validate_json(TRAILER_TEMPLATE)
        .expect("export is valid");

    assert_eq!(template.item_count(), 3);
    assert!(template.structure[0].is_placeholder());
    assert_eq!(
        template.settings.enabled_flags(),
        vec!["geo_fence_start", "geo_fence_end", "partial_result"]
    );
    let users: Vec<&UserId> = template.assigned_user_ids.iter().collect();
    assert_eq!(users, vec![&UserId::new("u7"), &UserId::new("u8")]);

    let selection = template
        .items()
        .into_iter()
        .find(|item| item.id.as_str() == "eixo-estado")
        .expect("selection item present");
    assert_eq!(selection.config.options(), ["Bom", "Regular", "Ruim"]);
}

#[test]
fn normalized_documents_round_trip_through_json() {
    let validator = TemplateValidator::default();
    let template = validator
        .validate_json(TRAILER_TEMPLATE)
        .expect("export is valid");

    let exported = serde_json::to_string(&TemplateDocument::from(&template)).expect("serializes");
    let revalidated = validator.validate_json(&exported).expect("still valid");

    assert_eq!(revalidated, template);
}

#[test]
fn invalid_exports_list_every_problem() {
    let broken = TRAILER_TEMPLATE
        .replace("\"RegisteredField\"", "\"Barcode\"")
        .replace("\"selection_type\": \"single\"", "\"selection_type\": \"some\"")
        .replace("\"id\": \"lacre\"", "\"id\": \"lona\"");

    match TemplateValidator::default().validate_json(&broken) {
        Err(ValidationFailure::Invalid(errors)) => {
            let codes: Vec<&str> = errors.iter().map(SchemaError::code).collect();
            assert_eq!(
                codes,
                vec!["unknown_item_type", "duplicate_item_id", "unknown_selection_type"]
            );
        }
        other => panic!("expected validation errors, got {other:?}"),
    }
}

#[test]
fn service_stores_only_valid_templates() {
    let service = service();
    let admin = ProfileId::new("admin");

    let document = TemplateDocument::from_json(TRAILER_TEMPLATE).expect("parses");
    let record = service.create(&admin, &document).expect("stored");
    assert_eq!(service.list().expect("list")[0].id, record.id);

    let mut emptied = document.clone();
    emptied.structure.areas.truncate(1);
    match service.replace(&admin, &record.id, &emptied) {
        Err(ChecklistServiceError::Invalid(errors)) => {
            assert_eq!(errors, vec![SchemaError::NoItems]);
        }
        other => panic!("expected no items, got {other:?}"),
    }
    assert_eq!(
        service.get(&record.id).expect("still stored").template,
        record.template
    );
}
