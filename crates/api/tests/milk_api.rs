//! HTTP-level integration tests for milk records and the milk dashboard.

mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{body_json, get, post_json};
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

async fn add_record(
    pool: &PgPool,
    token: &str,
    cattle_name: &str,
    date: &str,
    morning: f64,
    grade: &str,
) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/milk/records",
        Some(token),
        serde_json::json!({
            "cattle_name": cattle_name,
            "record_date": date,
            "morning_litres": morning,
            "grade": grade
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../migrations")]
async fn create_for_unknown_cattle_returns_404(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/milk/records",
        Some(&token),
        serde_json::json!({
            "cattle_name": "Ghost-001",
            "record_date": "2023-06-01",
            "morning_litres": 4.0,
            "grade": "A1"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn create_with_invalid_grade_returns_400(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001").await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/milk/records",
        Some(&token),
        serde_json::json!({
            "cattle_name": "Kaveri-001",
            "record_date": "2023-06-01",
            "morning_litres": 4.0,
            "grade": "B1"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Please enter a valid grade value");
}

#[sqlx::test(migrations = "../../migrations")]
async fn missing_sessions_default_to_zero(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001").await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/milk/records",
        Some(&token),
        serde_json::json!({
            "cattle_name": "Kaveri-001",
            "record_date": "2023-06-01",
            "morning_litres": 4.5,
            "grade": "A2"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["afternoon_litres"], 0.0);
    assert_eq!(json["data"]["evening_litres"], 0.0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn grade_search_term_matches_exactly(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001").await;
    add_record(&pool, &token, "Kaveri-001", "2023-06-01", 4.0, "A1").await;
    add_record(&pool, &token, "Kaveri-001", "2023-06-02", 5.0, "A2").await;

    // "A1" is a known grade literal, so it becomes an exact grade match
    // rather than a name substring search.
    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/milk/records?page=1&search=A1", &token).await).await;
    assert_eq!(json["message"], "Showing the searched records based on A1");
    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["grade"], "A1");
}

#[sqlx::test(migrations = "../../migrations")]
async fn name_sort_is_invalid_for_milk_records(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/milk/records?page=1&sortBy=name-asc", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../migrations")]
async fn dashboard_sums_todays_records_to_two_decimals(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001").await;

    let today = Utc::now().date_naive().to_string();
    add_record(&pool, &token, "Kaveri-001", &today, 1.1, "A1").await;
    add_record(&pool, &token, "Kaveri-001", &today, 2.2, "A1").await;
    add_record(&pool, &token, "Kaveri-001", &today, 3.3, "A2").await;

    let app = common::build_test_app(pool);
    let json = body_json(
        get(
            app,
            &format!("/api/v1/milk/dashboard?date={today}"),
            &token,
        )
        .await,
    )
    .await;

    let cards = json["data"].as_array().unwrap();
    assert_eq!(cards[0]["label"], "totalMilk");
    assert_eq!(cards[0]["number"], "6.60");
    assert_eq!(cards[1]["label"], "gradeA1Milk");
    assert_eq!(cards[1]["number"], "3.30");
    assert_eq!(cards[2]["label"], "gradeA2Milk");
    assert_eq!(cards[2]["number"], "3.30");
}

#[sqlx::test(migrations = "../../migrations")]
async fn dashboard_trend_compares_against_yesterday(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001").await;

    let today = Utc::now().date_naive();
    let yesterday = today.pred_opt().unwrap();
    add_record(&pool, &token, "Kaveri-001", &yesterday.to_string(), 100.0, "A1").await;
    add_record(&pool, &token, "Kaveri-001", &today.to_string(), 150.0, "A1").await;

    // Week window includes both days; the baseline is yesterday alone, so
    // 100 -> 250 is a 150% increase.
    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/milk/dashboard?period=Week", &token).await).await;

    let cards = json["data"].as_array().unwrap();
    assert_eq!(cards[0]["number"], "250.00");
    assert_eq!(cards[0]["status"], "increase");
    assert_eq!(cards[0]["percentage"], "150%");
}
