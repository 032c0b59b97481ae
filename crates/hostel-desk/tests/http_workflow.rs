use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use hostel_desk::config::StoreConfig;
use hostel_desk::hostel::{hostel_router, open_store, HostelService};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        })
        .expect("request builds");
    let response = app.clone().oneshot(request).await.expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body readable");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

#[tokio::test]
async fn dashboard_flow_over_configured_store() {
    let store = open_store(&StoreConfig {
        database_path: PathBuf::from(":memory:"),
    })
    .expect("store opens");
    let app = hostel_router(Arc::new(HostelService::new(store, "₹")));

    let (status, account) = send(
        &app,
        "POST",
        "/api/v1/accounts/signup",
        Some(json!({ "email": "desk@example.com", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let owner = account["id"].as_i64().expect("owner id");

    let (status, rooms) = send(
        &app,
        "POST",
        &format!("/api/v1/owners/{owner}/rooms"),
        Some(json!({ "room_type": "Single", "capacity": 3, "rent": 6000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rooms["room_type"], "Single");

    let (status, tenant) = send(
        &app,
        "POST",
        &format!("/api/v1/owners/{owner}/tenants"),
        Some(json!({
            "name": "Farah",
            "contact": "91234 56789",
            "room_type": "single",
            "join_date": "2025-05-02",
            "security_deposit": 6000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tenant["monthly_rent"], 6000);
    assert_eq!(tenant["join_date"], "2025-05-02");

    let (status, vacancy) =
        send(&app, "GET", &format!("/api/v1/owners/{owner}/vacancy"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(vacancy[0]["occupied"], 1);
    assert_eq!(vacancy[0]["vacant"], 2);

    let (status, summary) = send(
        &app,
        "GET",
        &format!("/api/v1/owners/{owner}/dashboard?today=2025-06-30"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["active_tenants"], 1);
    assert_eq!(summary["accrued"], 12000);
    assert_eq!(summary["outstanding"], 12000);
}
