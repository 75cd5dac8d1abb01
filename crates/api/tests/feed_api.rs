//! HTTP-level integration tests for feed stock, consumption reconciliation,
//! and the history ledger.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json};
use sqlx::PgPool;

async fn add_cattle(pool: &PgPool, token: &str, name: &str) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/cattle",
        Some(token),
        serde_json::json!({
            "name": name,
            "cattle_type": "Cow",
            "breed": "Gir",
            "entry_date": "2023-06-01"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

/// Create a stock line and return its id.
async fn add_stock(pool: &PgPool, token: &str, name: &str, quantity: f64) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/feed/stock",
        Some(token),
        serde_json::json!({
            "name": name,
            "unit": "kg",
            "quantity": quantity,
            "record_date": "2023-06-01"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn stock_quantity(pool: &PgPool, token: &str, id: i64) -> f64 {
    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/feed/stock?page=1", token).await).await;
    json["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"].as_i64() == Some(id))
        .expect("stock row present")["quantity"]
        .as_f64()
        .unwrap()
}

#[sqlx::test(migrations = "../../migrations")]
async fn consumption_decrements_stock_and_writes_history(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001").await;
    let stock_id = add_stock(&pool, &token, "Hay", 100.0).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/feed/consumption",
        Some(&token),
        serde_json::json!({
            "cattle_name": "Kaveri-001",
            "feed_name": "Hay",
            "feed_kind": "feed",
            "session": "Morning",
            "quantity": 30.0,
            "unit": "kg",
            "record_date": "2023-06-01"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let record_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    assert_eq!(stock_quantity(&pool, &token, stock_id).await, 70.0);

    // The history ledger has the Consumed entry pointing at the record.
    let app = common::build_test_app(pool);
    let json = body_json(
        get(
            app,
            &format!("/api/v1/feed/stock/{stock_id}/history"),
            &token,
        )
        .await,
    )
    .await;
    let entries = json["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["change_type"], "Consumed");
    assert_eq!(entries[0]["new_quantity"], 70.0);
    assert_eq!(entries[0]["consumption_id"].as_i64(), Some(record_id));
}

#[sqlx::test(migrations = "../../migrations")]
async fn over_consumption_conflicts_and_leaves_stock_untouched(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001").await;
    let stock_id = add_stock(&pool, &token, "Hay", 10.0).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/feed/consumption",
        Some(&token),
        serde_json::json!({
            "cattle_name": "Kaveri-001",
            "feed_name": "Hay",
            "feed_kind": "feed",
            "session": "Morning",
            "quantity": 50.0,
            "unit": "kg",
            "record_date": "2023-06-01"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // No mutation happened: balance intact, ledger empty, no record.
    assert_eq!(stock_quantity(&pool, &token, stock_id).await, 10.0);

    let app = common::build_test_app(pool.clone());
    let json = body_json(
        get(
            app,
            &format!("/api/v1/feed/stock/{stock_id}/history"),
            &token,
        )
        .await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/feed/consumption?page=1", &token).await).await;
    assert_eq!(json["data"]["totalCount"], 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn consumption_for_missing_stock_returns_404(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001").await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/feed/consumption",
        Some(&token),
        serde_json::json!({
            "cattle_name": "Kaveri-001",
            "feed_name": "Silage",
            "feed_kind": "feed",
            "session": "Morning",
            "quantity": 5.0,
            "unit": "kg",
            "record_date": "2023-06-01"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn water_entries_skip_the_stock_reconcile(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001").await;
    let stock_id = add_stock(&pool, &token, "Hay", 100.0).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/feed/consumption",
        Some(&token),
        serde_json::json!({
            "cattle_name": "Kaveri-001",
            "feed_name": "Water",
            "feed_kind": "water",
            "session": "Morning",
            "quantity": 20.0,
            "unit": "litre",
            "record_date": "2023-06-01"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    assert_eq!(stock_quantity(&pool, &token, stock_id).await, 100.0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn deleting_consumption_restores_the_stock(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001").await;
    let stock_id = add_stock(&pool, &token, "Hay", 100.0).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/feed/consumption",
        Some(&token),
        serde_json::json!({
            "cattle_name": "Kaveri-001",
            "feed_name": "Hay",
            "feed_kind": "feed",
            "session": "Evening",
            "quantity": 40.0,
            "unit": "kg",
            "record_date": "2023-06-01"
        }),
    )
    .await;
    let record_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    assert_eq!(stock_quantity(&pool, &token, stock_id).await, 60.0);

    let app = common::build_test_app(pool.clone());
    let response = delete(
        app,
        &format!("/api/v1/feed/consumption/{record_id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(stock_quantity(&pool, &token, stock_id).await, 100.0);

    // Ledger now shows Consumed followed by the restoring Added entry.
    let app = common::build_test_app(pool);
    let json = body_json(
        get(
            app,
            &format!("/api/v1/feed/stock/{stock_id}/history"),
            &token,
        )
        .await,
    )
    .await;
    let entries = json["data"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    // Newest first.
    assert_eq!(entries[0]["change_type"], "Added");
    assert_eq!(entries[0]["new_quantity"], 100.0);
    assert_eq!(entries[1]["change_type"], "Consumed");
}

#[sqlx::test(migrations = "../../migrations")]
async fn restock_increments_and_records_history(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let stock_id = add_stock(&pool, &token, "Hay", 10.0).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/feed/stock/{stock_id}/restock"),
        Some(&token),
        serde_json::json!({ "quantity": 15.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["quantity"], 25.0);

    let app = common::build_test_app(pool);
    let json = body_json(
        get(
            app,
            &format!("/api/v1/feed/stock/{stock_id}/history"),
            &token,
        )
        .await,
    )
    .await;
    let entries = json["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["change_type"], "Added");
    assert_eq!(entries[0]["consumption_id"], serde_json::Value::Null);
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_stock_name_returns_409(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_stock(&pool, &token, "Hay", 10.0).await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/feed/stock",
        Some(&token),
        serde_json::json!({
            "name": "Hay",
            "unit": "kg",
            "quantity": 5.0,
            "record_date": "2023-06-02"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../migrations")]
async fn cumulative_listing_combines_filter_and_search(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001").await;
    add_cattle(&pool, &token, "Ganga-002").await;
    add_stock(&pool, &token, "Hay", 100.0).await;

    for (cattle, session) in [("Kaveri-001", "Morning"), ("Ganga-002", "Morning")] {
        let app = common::build_test_app(pool.clone());
        let response = post_json(
            app,
            "/api/v1/feed/consumption",
            Some(&token),
            serde_json::json!({
                "cattle_name": cattle,
                "feed_name": "Hay",
                "feed_kind": "feed",
                "session": session,
                "quantity": 5.0,
                "unit": "kg",
                "record_date": "2023-06-01"
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // Filter and search compose (cumulative merge): only Kaveri's Morning
    // entry matches, and the message reflects the last stage (search).
    let app = common::build_test_app(pool);
    let json = body_json(
        get(
            app,
            "/api/v1/feed/consumption?page=1&filter=Morning&search=Kaveri",
            &token,
        )
        .await,
    )
    .await;
    assert_eq!(
        json["message"],
        "Showing the searched records based on Kaveri"
    );
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 1);
}
