//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use cashflow_core::db::Database;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn setup_test_app() -> Router {
    let db = Database::in_memory().unwrap();
    create_router(db, None, ServerConfig::default())
}

async fn get_body_json(response: axum::response::Response) -> Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, get_body_json(response).await)
}

async fn send(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, get_body_json(response).await)
}

async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, get_body_json(response).await)
}

async fn create(app: &Router, uri: &str, body: Value) -> i64 {
    let (status, json) = send(app, "POST", uri, body).await;
    assert_eq!(status, StatusCode::OK, "POST {} failed: {}", uri, json);
    json["id"].as_i64().unwrap()
}

struct Ids {
    business: i64,
    income: i64,
    expense: i64,
    sales: i64,
    online: i64,
}

/// Business; Income → Sales → Online Sales; empty Expense type
async fn setup_tree(app: &Router) -> Ids {
    let business = create(app, "/api/statuses", json!({"name": "Business"})).await;
    let income = create(app, "/api/transaction-types", json!({"name": "Income"})).await;
    let expense = create(app, "/api/transaction-types", json!({"name": "Expense"})).await;
    let sales = create(
        app,
        "/api/categories",
        json!({"name": "Sales", "transaction_type": income}),
    )
    .await;
    let online = create(
        app,
        "/api/subcategories",
        json!({"name": "Online Sales", "category": sales}),
    )
    .await;

    Ids {
        business,
        income,
        expense,
        sales,
        online,
    }
}

fn sale(ids: &Ids, date: &str, amount: &str) -> Value {
    json!({
        "transaction_date": date,
        "status": ids.business,
        "transaction_type": ids.income,
        "category": ids.sales,
        "subcategory": ids.online,
        "amount": amount,
        "comment": "web order",
    })
}

// =============================================================================
// Health & Reference Data
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = setup_test_app();
    let (status, json) = get(&app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.contains_key("content-security-policy"));
}

#[tokio::test]
async fn test_reference_data() {
    let app = setup_test_app();
    setup_tree(&app).await;

    let (status, json) = get(&app, "/api/reference-data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["statuses"].as_array().unwrap().len(), 1);
    assert_eq!(json["transaction_types"].as_array().unwrap().len(), 2);
    assert_eq!(json["categories"][0]["transaction_type_name"], "Income");
    assert_eq!(json["subcategories"][0]["category_name"], "Sales");
    assert_eq!(json["subcategories"][0]["transaction_type_name"], "Income");
}

// =============================================================================
// Classification Tests
// =============================================================================

#[tokio::test]
async fn test_status_crud() {
    let app = setup_test_app();

    let (status, json) = send(
        &app,
        "POST",
        "/api/statuses",
        json!({"name": "  Personal  ", "description": "Household"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Personal");
    let id = json["id"].as_i64().unwrap();

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/statuses/{}", id),
        json!({"name": "Private"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Private");
    assert_eq!(json["description"], "");

    let (status, json) = get(&app, &format!("/api/statuses/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Private");

    let (status, json) = delete(&app, &format!("/api/statuses/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["deleted_id"], id);

    let (status, json) = get(&app, &format!("/api/statuses/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["kind"], "not_found");
}

#[tokio::test]
async fn test_duplicate_name_conflict() {
    let app = setup_test_app();
    create(&app, "/api/statuses", json!({"name": "Tax"})).await;

    let (status, json) = send(&app, "POST", "/api/statuses", json!({"name": "Tax"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["kind"], "duplicate_key");
}

#[tokio::test]
async fn test_same_category_name_under_other_type() {
    let app = setup_test_app();
    let ids = setup_tree(&app).await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/categories",
        json!({"name": "Sales", "transaction_type": ids.expense}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["transaction_type_name"], "Expense");

    let (status, _) = send(
        &app,
        "POST",
        "/api/categories",
        json!({"name": "Sales", "transaction_type": ids.income}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_category_unknown_type() {
    let app = setup_test_app();

    let (status, json) = send(
        &app,
        "POST",
        "/api/categories",
        json!({"name": "Sales", "transaction_type": 999}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["kind"], "not_found");
}

#[tokio::test]
async fn test_invalid_json_body() {
    let app = setup_test_app();

    let (status, json) = send(&app, "POST", "/api/statuses", json!({"title": "x"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "bad_request");
}

#[tokio::test]
async fn test_blank_name_rejected() {
    let app = setup_test_app();

    let (status, json) = send(&app, "POST", "/api/statuses", json!({"name": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "invalid_data");
}

#[tokio::test]
async fn test_type_detail_and_children() {
    let app = setup_test_app();
    let ids = setup_tree(&app).await;

    let (status, json) = get(&app, &format!("/api/transaction-types/{}", ids.income)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Income");
    assert_eq!(json["categories"][0]["name"], "Sales");

    let (status, json) = get(
        &app,
        &format!("/api/transaction-types/{}/categories", ids.expense),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.as_array().unwrap().is_empty());

    let (status, json) = get(&app, &format!("/api/categories/{}", ids.sales)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["subcategories"][0]["name"], "Online Sales");

    let (status, json) = get(
        &app,
        &format!("/api/categories/{}/subcategories", ids.sales),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["id"], ids.online);

    let (status, _) = get(&app, "/api/categories/999/subcategories").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_classification_list_filters() {
    let app = setup_test_app();
    let ids = setup_tree(&app).await;
    create(
        &app,
        "/api/categories",
        json!({"name": "Marketing", "transaction_type": ids.expense}),
    )
    .await;

    let (status, json) = get(
        &app,
        &format!("/api/categories?transaction_type={}", ids.expense),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Marketing"]);

    let (_, json) = get(&app, "/api/categories?search=MARK").await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (_, json) = get(&app, "/api/categories?ordering=-name").await;
    assert_eq!(json[0]["name"], "Sales");

    let (status, json) = get(&app, "/api/statuses?category=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "invalid_filter");
}

// =============================================================================
// Transaction Tests
// =============================================================================

#[tokio::test]
async fn test_transaction_crud() {
    let app = setup_test_app();
    let ids = setup_tree(&app).await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/transactions",
        sale(&ids, "2024-01-15", "50000.00"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["amount"], "50000.00");
    assert_eq!(json["category_name"], "Sales");
    assert_eq!(json["subcategory_name"], "Online Sales");
    assert_eq!(json["status_name"], "Business");
    let id = json["id"].as_i64().unwrap();
    let created_at = json["created_at"].clone();

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/transactions/{}", id),
        sale(&ids, "2024-01-20", "125.50"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["amount"], "125.50");
    assert_eq!(json["transaction_date"], "2024-01-20");
    assert_eq!(json["created_at"], created_at);

    let (status, json) = delete(&app, &format!("/api/transactions/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let (status, _) = get(&app, &format!("/api/transactions/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = delete(&app, &format!("/api/transactions/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_transaction_wrong_type_rejected() {
    let app = setup_test_app();
    let ids = setup_tree(&app).await;

    let mut body = sale(&ids, "2024-01-15", "10.00");
    body["transaction_type"] = json!(ids.expense);

    let (status, json) = send(&app, "POST", "/api/transactions", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "inconsistent_classification");

    let (_, json) = get(&app, "/api/transactions").await;
    assert_eq!(json["total"], 0);
}

#[tokio::test]
async fn test_transaction_invalid_amount() {
    let app = setup_test_app();
    let ids = setup_tree(&app).await;

    for amount in ["-5.00", "1.005"] {
        let (status, json) = send(
            &app,
            "POST",
            "/api/transactions",
            sale(&ids, "2024-01-15", amount),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "amount {}", amount);
        assert_eq!(json["kind"], "invalid_data");
    }
}

#[tokio::test]
async fn test_list_transactions_filters_and_paging() {
    let app = setup_test_app();
    let ids = setup_tree(&app).await;

    for (date, amount) in [
        ("2024-01-10", "10.00"),
        ("2024-01-15", "50000.00"),
        ("2024-02-01", "300.00"),
    ] {
        create(&app, "/api/transactions", sale(&ids, date, amount)).await;
    }

    let (status, json) = get(&app, "/api/transactions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 3);
    assert_eq!(json["limit"], 50);
    // Newest first by default
    assert_eq!(json["transactions"][0]["transaction_date"], "2024-02-01");

    let (_, json) = get(
        &app,
        "/api/transactions?date_from=2024-01-01&date_to=2024-01-31&ordering=-amount",
    )
    .await;
    assert_eq!(json["total"], 2);
    assert_eq!(json["transactions"][0]["amount"], "50000.00");

    let (_, json) = get(&app, "/api/transactions?amount_min=100&limit=1&offset=1").await;
    assert_eq!(json["total"], 2);
    assert_eq!(json["transactions"].as_array().unwrap().len(), 1);
    assert_eq!(json["transactions"][0]["amount"], "50000.00");

    let (_, json) = get(&app, "/api/transactions?search=WEB").await;
    assert_eq!(json["total"], 3);

    let (status, json) = get(&app, "/api/transactions?colour=red").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "invalid_filter");

    let (status, _) = get(&app, "/api/transactions?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_limit_clamped_to_configured_max() {
    let db = Database::in_memory().unwrap();
    let config = ServerConfig {
        pagination: PaginationSettings {
            default_limit: 2,
            max_limit: 5,
        },
        ..Default::default()
    };
    let app = create_router(db, None, config);

    let (_, json) = get(&app, "/api/transactions").await;
    assert_eq!(json["limit"], 2);

    let (_, json) = get(&app, "/api/transactions?limit=500").await;
    assert_eq!(json["limit"], 5);
}

#[tokio::test]
async fn test_transaction_summary() {
    let app = setup_test_app();
    let ids = setup_tree(&app).await;

    let (status, json) = get(&app, "/api/transactions/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_count"], 0);
    assert_eq!(json["average_amount"], "0.00");

    create(&app, "/api/transactions", sale(&ids, "2024-01-15", "100.00")).await;
    create(&app, "/api/transactions", sale(&ids, "2024-01-16", "200.00")).await;

    let (status, json) = get(
        &app,
        &format!("/api/transactions/summary?category={}", ids.sales),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_count"], 2);
    assert_eq!(json["total_amount"], "300.00");
    assert_eq!(json["average_amount"], "150.00");
    assert_eq!(json["by_type"][0]["transaction_type_name"], "Income");
    assert_eq!(json["by_category"][0]["category_name"], "Sales");

    // Paging keys are not summary filters
    let (status, _) = get(&app, "/api/transactions/summary?limit=5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Referential Integrity Tests
// =============================================================================

#[tokio::test]
async fn test_referenced_delete_conflicts_then_cascades() {
    let app = setup_test_app();
    let ids = setup_tree(&app).await;
    let tx = create(&app, "/api/transactions", sale(&ids, "2024-01-15", "1.00")).await;

    for uri in [
        format!("/api/statuses/{}", ids.business),
        format!("/api/transaction-types/{}", ids.income),
        format!("/api/categories/{}", ids.sales),
        format!("/api/subcategories/{}", ids.online),
    ] {
        let (status, json) = delete(&app, &uri).await;
        assert_eq!(status, StatusCode::CONFLICT, "DELETE {}", uri);
        assert_eq!(json["kind"], "referential_conflict");
    }

    delete(&app, &format!("/api/transactions/{}", tx)).await;

    let (status, json) = delete(&app, &format!("/api/transaction-types/{}", ids.income)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["categories_removed"], 1);
    assert_eq!(json["subcategories_removed"], 1);

    let (status, _) = get(&app, &format!("/api/subcategories/{}", ids.online)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Error Mapping
// =============================================================================

#[test]
fn test_core_error_status_mapping() {
    use cashflow_core::Error;

    let cases = [
        (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
        (Error::DuplicateKey("x".into()), StatusCode::CONFLICT),
        (Error::ReferentialConflict("x".into()), StatusCode::CONFLICT),
        (
            Error::InconsistentClassification("x".into()),
            StatusCode::BAD_REQUEST,
        ),
        (Error::InvalidFilter("x".into()), StatusCode::BAD_REQUEST),
        (Error::InvalidData("x".into()), StatusCode::BAD_REQUEST),
        (
            Error::Encryption("x".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, expected) in cases {
        assert_eq!(AppError::from(err).status(), expected);
    }
}

#[tokio::test]
async fn test_internal_error_message_is_generic() {
    let err = AppError::from(cashflow_core::Error::Config("secret path".into()));
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = get_body_json(response).await;
    assert_eq!(json["error"], "An internal error occurred");
    assert_eq!(json["kind"], "internal");
}
