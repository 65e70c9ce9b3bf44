//! HTTP surface tests driving the axum router end to end.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use portfolio_api::api::{self, AppState};
use portfolio_api::config::Config;
use portfolio_api::db::init_db;
use portfolio_api::Repository;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

async fn setup_test_app() -> (axum::Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let upload_dir = temp_dir
        .path()
        .join("uploads")
        .to_string_lossy()
        .to_string();

    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let config = Config {
        port: 0,
        database_path: db_path,
        upload_dir,
        stock_splits_file: None,
    };

    let state = AppState::new(repo, config);
    (api::create_router(state), temp_dir)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _temp) = setup_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_transaction_then_positions() {
    let (app, _temp) = setup_test_app().await;

    let buy = serde_json::json!({
        "account_id": 1,
        "date": "2023-01-10",
        "action": "Buy",
        "symbol": "AAPL",
        "description": "APPLE INC",
        "quantity": 10,
        "price": 150,
        "amount": -1500
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/transactions")
                .header("content-type", "application/json")
                .body(Body::from(buy.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert!(created["id"].as_i64().unwrap() > 0);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/positions?account_id=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let positions = body["positions"].as_array().unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0]["symbol"], "AAPL");
    assert_eq!(positions[0]["opened"], true);
    assert_eq!(positions[0]["cost_basis"], 150.0);
}

#[tokio::test]
async fn test_create_transaction_rejects_unknown_action() {
    let (app, _temp) = setup_test_app().await;

    let req = serde_json::json!({
        "account_id": 1,
        "date": "2023-01-10",
        "action": "Dividend",
        "symbol": "AAPL"
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/transactions")
                .header("content-type", "application/json")
                .body(Body::from(req.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

fn multipart_body(boundary: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, content) in files {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/json\r\n\r\n");
        body.extend_from_slice(content.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}

#[tokio::test]
async fn test_import_accepts_multiple_files_under_per_file_cap() {
    let (app, _temp) = setup_test_app().await;

    // Two files under the per-file cap whose combined size exceeds it.
    let padding = "x".repeat(600 * 1024);
    let file = format!(r#"{{"BrokerageTransactions": [], "note": "{}"}}"#, padding);
    let body = multipart_body("XBOUNDARY", &[("a.json", &file), ("b.json", &file)]);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/import?account_id=1")
                .header("content-type", "multipart/form-data; boundary=XBOUNDARY")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["staged"], 2);
}

#[tokio::test]
async fn test_import_rejects_oversized_file() {
    let (app, _temp) = setup_test_app().await;

    let oversized = "x".repeat(1024 * 1024 + 1);
    let body = multipart_body("XBOUNDARY", &[("big.json", &oversized)]);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/import?account_id=1")
                .header("content-type", "multipart/form-data; boundary=XBOUNDARY")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_missing_transaction_is_404() {
    let (app, _temp) = setup_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/v1/transactions/999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_transactions_paginates_with_total() {
    let (app, _temp) = setup_test_app().await;

    for day in 1..=5 {
        let req = serde_json::json!({
            "account_id": 1,
            "date": format!("2023-01-{:02}", day),
            "action": "Buy",
            "symbol": "AAPL",
            "description": "APPLE INC",
            "quantity": 1,
            "price": 150,
            "amount": -150
        });
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/transactions")
                    .header("content-type", "application/json")
                    .body(Body::from(req.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/transactions?account_id=1&page=1&limit=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 5);
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 2);
    // Newest first.
    assert_eq!(transactions[0]["date"], "2023-01-05");
}
