use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tower::ServiceExt;

use server::{ServerState, router};

fn test_router() -> Router {
    let engine = engine::Engine::builder().build().unwrap();
    router(ServerState {
        engine: Arc::new(RwLock::new(engine)),
    })
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn seed_type_and_driver(app: &Router) -> (String, String) {
    let (status, body) = request(
        app,
        "POST",
        "/bottleTypes",
        Some(json!({
            "name": "12KG",
            "capacity": "12KG",
            "unit_price_cents": 5000,
            "total_quantity": 100
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let bottle_type_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        app,
        "POST",
        "/drivers",
        Some(json!({"name": "Rachid", "truck": "A-4821-17"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let driver_id = body["id"].as_str().unwrap().to_string();

    (bottle_type_id, driver_id)
}

#[tokio::test]
async fn create_and_list_bottle_types() {
    let app = test_router();
    let (bottle_type_id, _) = seed_type_and_driver(&app).await;

    let (status, body) = request(&app, "GET", "/bottleTypes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], bottle_type_id.as_str());
    assert_eq!(body[0]["remaining_quantity"], 100);
}

#[tokio::test]
async fn supply_order_flow_over_http() {
    let app = test_router();
    let (bottle_type_id, driver_id) = seed_type_and_driver(&app).await;

    let (status, body) = request(
        &app,
        "POST",
        "/supplyOrders",
        Some(json!({
            "order_number": "BS-7",
            "driver_id": driver_id,
            "items": [{"bottle_type_id": bottle_type_id, "full_quantity": 30}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["subtotal_cents"], 150_000);
    assert_eq!(body["order"]["tax_cents"], 30_000);
    assert_eq!(body["order"]["total_cents"], 180_000);
    assert_eq!(body["warnings"].as_array().unwrap().len(), 0);

    let (status, body) = request(&app, "GET", "/bottleTypes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["distributed_quantity"], 30);
    assert_eq!(body[0]["remaining_quantity"], 70);
}

#[tokio::test]
async fn duplicate_order_number_is_conflict() {
    let app = test_router();
    let (bottle_type_id, driver_id) = seed_type_and_driver(&app).await;

    let payload = json!({
        "order_number": "BS-7",
        "driver_id": driver_id,
        "items": [{"bottle_type_id": bottle_type_id, "full_quantity": 10}]
    });
    let (status, _) = request(&app, "POST", "/supplyOrders", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &app,
        "POST",
        "/supplyOrders",
        Some(json!({
            "order_number": "bs-7",
            "driver_id": driver_id,
            "items": [{"bottle_type_id": bottle_type_id, "full_quantity": 10}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("bs-7"));
}

#[tokio::test]
async fn unknown_bottle_type_is_not_found() {
    let app = test_router();
    let (_, driver_id) = seed_type_and_driver(&app).await;

    let (status, _) = request(
        &app,
        "POST",
        "/supplyOrders",
        Some(json!({
            "order_number": "BS-8",
            "driver_id": driver_id,
            "items": [{
                "bottle_type_id": "00000000-0000-0000-0000-000000000000",
                "full_quantity": 5
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stock_remove_clamps_and_reports_warning() {
    let app = test_router();
    let (bottle_type_id, _) = seed_type_and_driver(&app).await;

    let (status, _) = request(
        &app,
        "POST",
        "/stock/empty/add",
        Some(json!({"bottle_type_id": bottle_type_id, "quantity": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &app,
        "POST",
        "/stock/empty/remove",
        Some(json!({"bottle_type_id": bottle_type_id, "quantity": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 0);
    assert_eq!(body["warnings"][0]["kind"], "negative_clamped");

    let (status, body) = request(&app, "GET", "/stock/history", None).await;
    assert_eq!(status, StatusCode::OK);
    let last = body.as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["previous_quantity"], 3);
    assert_eq!(last["new_quantity"], 0);
}

#[tokio::test]
async fn fractional_quantity_is_a_bad_request() {
    let app = test_router();
    let (bottle_type_id, _) = seed_type_and_driver(&app).await;

    let (status, _) = request(
        &app,
        "POST",
        "/stock/empty/add",
        Some(json!({"bottle_type_id": bottle_type_id, "quantity": 2.5})),
    )
    .await;
    // Serde rejects the fraction before the engine ever sees it.
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn impact_window_over_http() {
    let app = test_router();
    let (bottle_type_id, driver_id) = seed_type_and_driver(&app).await;
    request(
        &app,
        "POST",
        "/supplyOrders",
        Some(json!({
            "order_number": "BS-7",
            "driver_id": driver_id,
            "items": [{"bottle_type_id": bottle_type_id, "full_quantity": 30}]
        })),
    )
    .await;

    let (status, body) = request(&app, "GET", "/impact?window=today", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["full_delta"], -30);
    assert_eq!(body["empty_delta"], 0);
}

#[tokio::test]
async fn snapshot_round_trips_over_http() {
    let app = test_router();
    let (bottle_type_id, _) = seed_type_and_driver(&app).await;
    request(
        &app,
        "POST",
        "/stock/empty/add",
        Some(json!({"bottle_type_id": bottle_type_id, "quantity": 4})),
    )
    .await;

    let (status, exported) = request(&app, "GET", "/snapshot", None).await;
    assert_eq!(status, StatusCode::OK);

    let fresh = test_router();
    let (status, _) = request(&fresh, "PUT", "/snapshot", Some(exported.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let (_, exported_again) = request(&fresh, "GET", "/snapshot", None).await;
    assert_eq!(exported, exported_again);
}
