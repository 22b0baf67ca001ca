//! End-to-end dispatch through the Axum host, in process.

mod common;

use serde_json::{json, Value};
use tower::ServiceExt;

use common::{json_body, request, test_config};
use route_ledger::dispatch::Fault;
use route_ledger::sample::pets_registry;
use route_ledger::{HttpServer, Registry, RequestEnvelope, RouteSpec};

fn pets_app() -> axum::Router {
    HttpServer::new(test_config(), pets_registry().unwrap())
        .unwrap()
        .router()
}

#[tokio::test]
async fn test_list_pets_with_default_headers() {
    let response = pets_app().oneshot(request("GET", "/pets", None)).await.unwrap();

    assert_eq!(response.status(), 200);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert_eq!(headers["content-type"], "application/json");
    assert!(headers.contains_key("x-request-id"));

    let body = json_body(response).await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["fluffy", "spot"]);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let mut req = request("GET", "/pets", None);
    req.headers_mut()
        .insert("x-request-id", "req-123".parse().unwrap());
    let response = pets_app().oneshot(req).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn test_path_parameters_reach_handler() {
    let response = pets_app()
        .oneshot(request("GET", "/pets/fluffy", None))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(json_body(response).await, json!({"id": "fluffy", "name": "fluffy"}));
}

#[tokio::test]
async fn test_path_rule_rejection_is_403() {
    let response = pets_app()
        .oneshot(request("GET", "/pets/NOT_AN_ID", None))
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Validation error: "));
}

#[tokio::test]
async fn test_body_rules_and_creation() {
    let app = pets_app();

    let rejected = app
        .clone()
        .oneshot(request("POST", "/pets", Some(r#"{"id":"rex"}"#)))
        .await
        .unwrap();
    assert_eq!(rejected.status(), 403);

    let created = app
        .clone()
        .oneshot(request("POST", "/pets", Some(r#"{"id":"rex","name":"Rex"}"#)))
        .await
        .unwrap();
    assert_eq!(created.status(), 201);
    assert_eq!(json_body(created).await, json!({"id": "rex", "name": "Rex"}));

    let fetched = app
        .oneshot(request("GET", "/pets/rex", None))
        .await
        .unwrap();
    assert_eq!(fetched.status(), 200);
}

#[tokio::test]
async fn test_mapped_fault() {
    let response = pets_app()
        .oneshot(request("GET", "/pets/nemo", None))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(json_body(response).await, json!("pet 'nemo' not found"));
}

#[tokio::test]
async fn test_unregistered_method_echoes_request() {
    let response = pets_app()
        .oneshot(request("PUT", "/pets", None))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(
        json_body(response).await,
        json!({
            "error": "Requested api endpoint not found",
            "params": {"method": "PUT", "resource": "/pets"}
        })
    );
}

#[tokio::test]
async fn test_unmapped_fault_is_generic_500() {
    let failing = |_req: RequestEnvelope, _body: Option<Value>| async move {
        Err::<Value, _>(Fault::unclassified("database on fire"))
    };
    let registry = Registry::from_routes([RouteSpec::get("/boom", failing)]).unwrap();
    let app = HttpServer::new(test_config(), registry).unwrap().router();

    let response = app.oneshot(request("GET", "/boom", None)).await.unwrap();
    assert_eq!(response.status(), 500);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(
        json_body(response).await,
        json!({"error": "Internal server error"})
    );
}

#[tokio::test]
async fn test_any_route_serves_every_method() {
    let echo = |req: RequestEnvelope, body: Option<Value>| async move {
        Ok::<_, Fault>(json!({"method": req.method, "body": body}))
    };
    let registry = Registry::from_routes([RouteSpec::any("/echo", echo)]).unwrap();
    let app = HttpServer::new(test_config(), registry).unwrap().router();

    let response = app
        .oneshot(request("PATCH", "/echo", Some(r#"{"a":1}"#)))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        json_body(response).await,
        json!({"method": "PATCH", "body": {"a": 1}})
    );
}

#[tokio::test]
async fn test_conflicting_templates_rejected() {
    let noop = |_req: RequestEnvelope, _body: Option<Value>| async move { Ok::<_, Fault>(Value::Null) };
    let registry = Registry::from_routes([
        RouteSpec::get("/items/{id}", noop),
        RouteSpec::delete("/items/{key}", noop),
    ])
    .unwrap();
    assert!(HttpServer::new(test_config(), registry).is_err());
}

#[tokio::test]
async fn test_unmounted_path_gets_echo_and_default_headers() {
    let response = pets_app()
        .oneshot(request("GET", "/nothing/here", None))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(response.headers()["access-control-allow-credentials"], "true");
    assert_eq!(
        json_body(response).await,
        json!({
            "error": "Requested api endpoint not found",
            "params": {"method": "GET", "resource": "/nothing/here"}
        })
    );
}

#[tokio::test]
async fn test_document_carries_default_headers() {
    let response = pets_app()
        .oneshot(request("GET", "/openapi.json", None))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(response.headers()["access-control-allow-credentials"], "true");
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(json_body(response).await["openapi"], "3.0.0");
}

#[tokio::test]
async fn test_delete_answers_204_without_body() {
    let app = pets_app();
    let response = app
        .clone()
        .oneshot(request("DELETE", "/pets/spot", None))
        .await
        .unwrap();
    assert_eq!(response.status(), 204);
    assert!(response.headers().get("content-length").map_or(true, |v| v == "0"));
    assert_eq!(json_body(response).await, Value::Null);

    let gone = app
        .oneshot(request("GET", "/pets/spot", None))
        .await
        .unwrap();
    assert_eq!(gone.status(), 404);
}
