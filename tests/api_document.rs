//! Document endpoints and the client SDK against a live server.

mod common;

use serde_json::json;

use common::{spawn_server, test_config};
use route_ledger::sample::pets_registry;
use sdk_rust::LedgerClient;

#[tokio::test]
async fn test_document_served_over_http() {
    let (addr, shutdown) = spawn_server(test_config(), pets_registry().unwrap()).await;
    let client = LedgerClient::new(&format!("http://{}", addr));

    let document = client.fetch_document().await.unwrap();
    assert_eq!(document["openapi"], "3.0.0");
    assert_eq!(document["info"], json!({"title": "Pets", "version": "0.0.1"}));
    assert_eq!(document["paths"]["/pets"]["get"]["operationId"], "listPets");
    assert_eq!(
        document["paths"]["/pets/{id}"]["get"]["responses"]["404"]["description"],
        "No pet with that id"
    );
    assert_eq!(
        document["components"]["schemas"]["pet"],
        json!({
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "name": {"type": "string"},
                "tag": {"type": "string"}
            }
        })
    );

    let again = client.fetch_document().await.unwrap();
    assert_eq!(document, again);

    shutdown.trigger();
}

#[tokio::test]
async fn test_operations_and_invocation_through_sdk() {
    let (addr, shutdown) = spawn_server(test_config(), pets_registry().unwrap()).await;
    let client = LedgerClient::new(&format!("http://{}", addr));

    let operations = client.list_operations().await.unwrap();
    assert_eq!(
        operations,
        vec![
            ("GET".to_string(), "/pets".to_string()),
            ("POST".to_string(), "/pets".to_string()),
            ("DELETE".to_string(), "/pets/{id}".to_string()),
            ("GET".to_string(), "/pets/{id}".to_string()),
        ]
    );

    let created = client
        .invoke("post", "/pets", Some(&json!({"id": "tom", "name": "Tom", "tag": "cat"})))
        .await
        .unwrap();
    assert_eq!(created.status, 201);

    let duplicate = client
        .invoke("POST", "/pets", Some(&json!({"id": "tom", "name": "Tom"})))
        .await
        .unwrap();
    assert_eq!(duplicate.status, 409);
    assert_eq!(duplicate.error(), Some("pet 'tom' already exists"));

    let missing = client.invoke("GET", "/pets/nobody", None).await.unwrap();
    assert!(!missing.is_success());
    assert_eq!(missing.status, 404);

    shutdown.trigger();
}

#[tokio::test]
async fn test_docs_page_and_disabled_docs() {
    let (addr, shutdown) = spawn_server(test_config(), pets_registry().unwrap()).await;
    let page = reqwest::get(format!("http://{}/docs", addr))
        .await
        .unwrap();
    assert_eq!(page.status(), 200);
    let html = page.text().await.unwrap();
    assert!(html.contains("SwaggerUIBundle"));
    assert!(html.contains("listPets"));
    shutdown.trigger();

    let mut config = test_config();
    config.docs.enabled = false;
    let (addr, shutdown) = spawn_server(config, pets_registry().unwrap()).await;
    let response = reqwest::get(format!("http://{}/openapi.json", addr))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    shutdown.trigger();
}
