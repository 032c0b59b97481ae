use super::common::*;
use crate::hostel::router::hostel_router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn signup_then_login_round_trip() {
    let (_, service) = service();
    let app = hostel_router(service);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/accounts/signup",
            json!({ "email": "owner@example.com", "password": "pw" }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["email"], "owner@example.com");
    assert_eq!(body["subscription"], "trial");
    assert!(body.get("password_hash").is_none());

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/accounts/signup",
            json!({ "email": "owner@example.com", "password": "pw" }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(post_json(
            "/api/v1/accounts/login",
            json!({ "email": "owner@example.com", "password": "nope" }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid email or password");
}

#[tokio::test]
async fn balance_endpoint_honours_evaluation_date() {
    let (_, service) = service();
    let owner = configured_owner(&service);
    let tenant = onboarded_tenant(&service, owner);
    let app = hostel_router(service);

    let uri = format!(
        "/api/v1/owners/{}/tenants/{}/balance?today=2025-03-20",
        owner.0, tenant.id.0
    );
    let response = app.oneshot(get(&uri)).await.expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["evaluated_on"], "2025-03-20");
    assert_eq!(body["months"], 3);
    assert_eq!(body["accrued"], 9000);
    assert_eq!(body["paid"], 0);
    assert_eq!(body["remaining"], 9000);
}

#[tokio::test]
async fn onboarding_unconfigured_room_is_unprocessable() {
    let (_, service) = service();
    let owner = owner(&service, "warden@example.com");
    let app = hostel_router(service);

    let response = app
        .oneshot(post_json(
            &format!("/api/v1/owners/{}/tenants", owner.0),
            json!({
                "name": "Kiran",
                "room_type": "2 Sharing (Attached Bathroom)",
                "security_deposit": 2000
            }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error text")
        .contains("configure rooms first"));
}

#[tokio::test]
async fn payment_and_checkout_flow() {
    let (_, service) = service();
    let owner = configured_owner(&service);
    let tenant = onboarded_tenant(&service, owner);
    let app = hostel_router(service);
    let base = format!("/api/v1/owners/{}/tenants/{}", owner.0, tenant.id.0);

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("{base}/payments"),
            json!({ "amount": 6000, "month": "Feb", "paid_on": "2025-02-05" }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("{base}/payments"),
            json!({ "amount": -5, "month": "Feb" }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("{base}/checkout"),
            json!({ "checkout_date": "2025-03-20" }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["tenant"]["status"], "checked_out");
    assert_eq!(body["settlement"]["remaining"], 3000);
    assert_eq!(body["settlement"]["deposit"], 3000);
    assert_eq!(body["settlement"]["refund"], 0);
    assert_eq!(body["settlement"]["summary"], "Amount to refund tenant: ₹0");

    let response = app
        .clone()
        .oneshot(get(&format!(
            "/api/v1/owners/{}/tenants?status=checked_out",
            owner.0
        )))
        .await
        .expect("router responds");
    let body = body_json(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let response = app
        .oneshot(post_json(&format!("{base}/checkout"), json!({})))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_tenant_is_not_found() {
    let (_, service) = service();
    let owner = configured_owner(&service);
    let app = hostel_router(service);

    let response = app
        .oneshot(get(&format!(
            "/api/v1/owners/{}/tenants/99/settlement",
            owner.0
        )))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_checkout_body_leaves_tenant_active() {
    let (_, service) = service();
    let owner = configured_owner(&service);
    let tenant = onboarded_tenant(&service, owner);
    let app = hostel_router(service.clone());
    let checkout = format!(
        "/api/v1/owners/{}/tenants/{}/checkout",
        owner.0, tenant.id.0
    );

    for bad in [
        json!({ "checkout_date": "2025-13-01" }),
        json!({ "checkout_date": "03/01/2025" }),
    ] {
        let response = app
            .clone()
            .oneshot(post_json(&checkout, bad))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
    assert!(service
        .tenant(owner, tenant.id)
        .expect("tenant present")
        .is_active());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(&checkout)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
}
