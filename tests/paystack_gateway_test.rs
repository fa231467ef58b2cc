mod common;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use common::spawn_app_with;
use procura::domain::user::UserRole;
use procura::infrastructure::paystack::PaystackGateway;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

const SECRET: &str = "sk_test_procura";

/// Initialized references and their amounts in kobo.
#[derive(Clone, Default)]
struct MockPaystack {
    amounts: Arc<Mutex<HashMap<String, i64>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {SECRET}"))
}

async fn initialize(
    State(mock): State<MockPaystack>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "status": false, "message": "Invalid key" })),
        );
    }
    let reference = body["reference"].as_str().unwrap_or_default().to_string();
    let amount = body["amount"].as_i64().unwrap_or_default();
    assert!(body["callback_url"].as_str().unwrap().ends_with("/payment/callback"));
    mock.amounts.lock().unwrap().insert(reference.clone(), amount);
    (
        StatusCode::OK,
        Json(json!({
            "status": true,
            "message": "Authorization URL created",
            "data": {
                "authorization_url": format!("https://checkout.paystack.test/{reference}"),
                "access_code": "ac_123",
                "reference": reference,
            }
        })),
    )
}

async fn verify(
    State(mock): State<MockPaystack>,
    Path(reference): Path<String>,
) -> (StatusCode, Json<Value>) {
    match mock.amounts.lock().unwrap().get(&reference) {
        Some(amount) => (
            StatusCode::OK,
            Json(json!({
                "status": true,
                "message": "Verification successful",
                "data": { "status": "success", "amount": amount, "currency": "NGN" }
            })),
        ),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": false, "message": "Transaction reference not found" })),
        ),
    }
}

async fn spawn_mock() -> (String, MockPaystack) {
    let mock = MockPaystack::default();
    let router = Router::new()
        .route("/transaction/initialize", post(initialize))
        .route("/transaction/verify/:reference", get(verify))
        .with_state(mock.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}/"), mock)
}

#[tokio::test]
async fn test_checkout_round_trip_through_paystack() {
    let (base, mock) = spawn_mock().await;
    let gateway = PaystackGateway::new(SECRET, base).unwrap();
    let app = spawn_app_with(Arc::new(gateway)).await;

    let supplier = app.token_for(UserRole::Supplier).await;
    let buyer = app.token_for(UserRole::Buyer).await;
    let product = app.listed_product(&supplier, "PSK-1", 3).await;
    let (_, order) = app
        .post(
            "/api/orders",
            Some(&buyer),
            json!({
                "items": [{ "productId": product["id"], "quantity": 3 }],
                "shippingAddress": "Ibadan",
            }),
        )
        .await;

    let (status, checkout) = app
        .post(
            "/api/payments/initialize",
            Some(&buyer),
            json!({ "orderId": order["order"]["id"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{checkout}");
    let reference = checkout["reference"].as_str().unwrap().to_string();
    assert_eq!(mock.amounts.lock().unwrap()[&reference], 30_000);

    let (status, verdict) = app
        .post("/api/payments/verify", None, json!({ "reference": reference }))
        .await;
    assert_eq!(status, StatusCode::OK, "{verdict}");
    assert_eq!(verdict["status"], "success");
    assert_eq!(verdict["payment"]["status"], "COMPLETED");
    assert_eq!(verdict["payment"]["provider"], "PAYSTACK");
}

#[tokio::test]
async fn test_rejected_key_surfaces_as_initialization_failure() {
    let (base, _) = spawn_mock().await;
    let gateway = PaystackGateway::new("sk_wrong", base).unwrap();
    let app = spawn_app_with(Arc::new(gateway)).await;

    let supplier = app.token_for(UserRole::Supplier).await;
    let buyer = app.token_for(UserRole::Buyer).await;
    let product = app.listed_product(&supplier, "PSK-2", 1).await;
    let (_, order) = app
        .post(
            "/api/orders",
            Some(&buyer),
            json!({
                "items": [{ "productId": product["id"], "quantity": 1 }],
                "shippingAddress": "Enugu",
            }),
        )
        .await;

    let (status, body) = app
        .post(
            "/api/payments/initialize",
            Some(&buyer),
            json!({ "orderId": order["order"]["id"] }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to initialize payment");
}
