mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn create_derives_slug_and_appends_display_order() {
    let app = TestApp::new().await;

    let (status, first) = app
        .post_authed("/api/v1/categories", json!({ "name": "Vestidos de Verão" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["slug"], "vestidos-de-verao");
    assert_eq!(first["display_order"], 1);
    assert_eq!(first["is_active"], true);

    let (_, second) = app
        .post_authed("/api/v1/categories", json!({ "name": "Calçados" }))
        .await;
    assert_eq!(second["slug"], "calcados");
    assert_eq!(second["display_order"], 2);
}

#[tokio::test]
async fn duplicate_category_slug_conflicts() {
    let app = TestApp::new().await;
    app.create_category("Vestidos").await;

    let (status, _) = app
        .post_authed("/api/v1/categories", json!({ "name": "VESTIDOS" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn renaming_a_category_rederives_its_slug() {
    let app = TestApp::new().await;
    let id = app.create_category("Vestidos").await;

    let (status, body) = app
        .put_authed(
            &format!("/api/v1/categories/{id}"),
            json!({ "name": "Vestidos & Saias" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Vestidos & Saias");
    assert_eq!(body["slug"], "vestidos-saias");
}

#[tokio::test]
async fn blank_category_name_is_rejected() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post_authed("/api/v1/categories", json!({ "name": "" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post_authed("/api/v1/categories", json!({ "name": "!!!" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn category_writes_require_the_admin_token() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/categories",
            Some(json!({ "name": "Vestidos" })),
            false,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deleting_a_category_detaches_its_products() {
    let app = TestApp::new().await;
    let category_id = app.create_category("Vestidos").await;
    let product_id = app
        .create_product(json!({
            "name": "Vestido Midi",
            "price": "150.00",
            "category_id": category_id,
            "stock_quantity": 1
        }))
        .await;

    let (status, _) = app
        .delete_authed(&format!("/api/v1/categories/{category_id}"))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.get(&format!("/api/v1/products/{product_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category_id"], serde_json::Value::Null);
}

#[tokio::test]
async fn listing_hides_inactive_categories_unless_requested() {
    let app = TestApp::new().await;
    let id = app.create_category("Arquivo").await;
    app.create_category("Vestidos").await;

    let (status, _) = app
        .put_authed(
            &format!("/api/v1/categories/{id}"),
            json!({ "is_active": false }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/api/v1/categories").await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = app.get("/api/v1/categories?include_inactive=true").await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}
