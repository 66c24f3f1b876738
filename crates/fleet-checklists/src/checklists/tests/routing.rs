use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;

use crate::access::ACTOR_HEADER;
use crate::checklists::router::validate_handler;
use crate::checklists::targeting::DeploymentMode;

fn json_request(method: &str, uri: &str, actor: Option<&str>, body: String) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(actor) = actor {
        builder = builder.header(ACTOR_HEADER, actor);
    }
    builder.body(Body::from(body)).expect("request builds")
}

#[tokio::test]
async fn validate_handler_returns_normalized_document() {
    let harness = harness(DeploymentMode::VehicleUser);

    let response = validate_handler(State(harness.service), TRACTOR_TEMPLATE.to_string()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["name"], "Inspeção diária - Cavalo Mecânico");
    let crlv = &payload["structure"]["areas"][0]["sub_areas"][0]["items"][0]["config"];
    assert_eq!(crlv["selection_options"], json!(["Sim", "Não"]));
    assert_eq!(crlv["selection_type"], "single");
}

#[tokio::test]
async fn validate_route_reports_every_error() {
    let harness = harness(DeploymentMode::VehicleUser);
    let router = router_with_service(harness.service);
    let body = json!({
        "name": "",
        "structure": { "areas": [
            { "id": "a1", "name": "Cabine", "items": [
                { "id": "i1", "name": "Buzina", "type": "Text", "config": { "options": ["ok"] } },
                { "id": "i1", "name": "Faróis", "type": "Text" }
            ]}
        ]}
    });

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/checklists/templates/validate",
            None,
            body.to_string(),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    let codes: Vec<&str> = payload["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .filter_map(|error| error["code"].as_str())
        .collect();
    assert_eq!(
        codes,
        vec!["empty_template_name", "duplicate_item_id", "unexpected_options"]
    );
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let harness = harness(DeploymentMode::VehicleUser);
    let router = router_with_service(harness.service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/checklists/templates/validate",
            None,
            "not json".to_string(),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_route_requires_an_actor() {
    let harness = harness(DeploymentMode::VehicleUser);
    let router = router_with_service(harness.service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/checklists/templates",
            None,
            TRACTOR_TEMPLATE.to_string(),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_route_forbids_non_admins() {
    let harness = harness(DeploymentMode::VehicleUser);
    let router = router_with_service(harness.service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/checklists/templates",
            Some(DRIVER),
            TRACTOR_TEMPLATE.to_string(),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn template_lifecycle_over_http() {
    let harness = harness(DeploymentMode::VehicleUser);
    let router = router_with_service(harness.service);

    let created = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/checklists/templates",
            Some(ADMIN),
            TRACTOR_TEMPLATE.to_string(),
        ))
        .await
        .expect("create executes");
    assert_eq!(created.status(), StatusCode::CREATED);
    let created: Value = read_json_body(created).await;
    let id = created["id"].as_str().expect("id present").to_string();
    assert_eq!(created["template"]["structure"]["areas"][2]["name"], "Aviso");

    let resolved = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/checklists/templates/{id}/assignments/resolve"),
            None,
            String::new(),
        ))
        .await
        .expect("resolve executes");
    assert_eq!(resolved.status(), StatusCode::OK);
    let resolved = read_json_body(resolved).await;
    let applying = resolved["assignments"]
        .as_array()
        .expect("assignments")
        .iter()
        .filter(|assignment| assignment["applies"] == json!(true))
        .count();
    assert_eq!(applying, 2);

    let listed = router
        .clone()
        .oneshot(
            Request::get("/api/v1/checklists/templates")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("list executes");
    let listed = read_json_body(listed).await;
    assert_eq!(listed[0]["item_count"], 5);
    assert_eq!(listed[0]["settings"], json!(["app_only", "mandatory_signature"]));

    let deleted = router
        .clone()
        .oneshot(
            Request::delete(format!("/api/v1/checklists/templates/{id}"))
                .header(ACTOR_HEADER, ADMIN)
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("delete executes");
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let fetched = router
        .oneshot(
            Request::get(format!("/api/v1/checklists/templates/{id}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("fetch executes");
    assert_eq!(fetched.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn override_route_accepts_flattened_toggles() {
    let harness = harness(DeploymentMode::Vehicle);
    let record = harness
        .service
        .create(&admin(), &tractor_document())
        .expect("created");
    let router = router_with_service(harness.service.clone());
    let body = json!({
        "target": { "kind": "vehicle", "vehicle_id": "v1" },
        "report": true
    });

    let response = router
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/checklists/templates/{}/assignments/overrides", record.id),
            Some(ADMIN),
            body.to_string(),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["report"], true);
    assert_eq!(payload["email"], false);

    let resolution = harness
        .service
        .resolve_assignments(&record.id)
        .expect("resolved");
    let v1 = resolution.applying().next().expect("v1 applies");
    assert!(v1.report && !v1.email);
}

#[tokio::test]
async fn override_route_rejects_unknown_targets_with_json_errors() {
    let harness = harness(DeploymentMode::Vehicle);
    let record = harness
        .service
        .create(&admin(), &tractor_document())
        .expect("created");
    let router = router_with_service(harness.service);

    let response = router
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/checklists/templates/{}/assignments/overrides", record.id),
            Some(ADMIN),
            json!({ "target": { "kind": "depot", "depot_id": "d1" } }).to_string(),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload: Value = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .starts_with("invalid request body"));
}

#[tokio::test]
async fn unavailable_store_maps_to_internal_error() {
    use std::sync::Arc;

    use crate::checklists::schema::ValidationLimits;
    use crate::checklists::ChecklistService;
    use crate::memory::{InMemoryAssignmentStore, StaticFleetDirectory};

    let service = Arc::new(ChecklistService::new(
        Arc::new(UnavailableTemplates),
        Arc::new(StaticFleetDirectory::default()),
        Arc::new(InMemoryAssignmentStore::default()),
        Arc::new(profiles()),
        ValidationLimits::default(),
        DeploymentMode::VehicleUser,
    ));
    let router = crate::checklists::checklist_router(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/checklists/templates")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
