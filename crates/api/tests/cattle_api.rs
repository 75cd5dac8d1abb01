//! HTTP-level integration tests for the cattle endpoints: CRUD, the
//! paginated listing engine, and the top-section dashboard.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, put_json};
use sqlx::PgPool;

async fn add_cattle(pool: &PgPool, token: &str, name: &str, cattle_type: &str, breed: &str) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/cattle",
        Some(token),
        serde_json::json!({
            "name": name,
            "cattle_type": cattle_type,
            "breed": breed,
            "entry_date": "2023-06-01"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn create_returns_201_with_envelope(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/cattle",
        Some(&token),
        serde_json::json!({
            "name": "Kaveri-001",
            "cattle_type": "Cow",
            "breed": "Gir",
            "entry_date": "2023-06-01"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Successfully added the animal");
    assert_eq!(json["data"]["name"], "Kaveri-001");
    assert_eq!(json["data"]["health_status"], "Healthy");
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_name_returns_409(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001", "Cow", "Gir").await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/cattle",
        Some(&token),
        serde_json::json!({
            "name": "Kaveri-001",
            "cattle_type": "Cow",
            "breed": "Gir",
            "entry_date": "2023-06-02"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../migrations")]
async fn invalid_type_returns_400(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/cattle",
        Some(&token),
        serde_json::json!({
            "name": "Kaveri-001",
            "cattle_type": "Horse",
            "breed": "Gir",
            "entry_date": "2023-06-01"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Please enter a valid type value");
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_unknown_animal_returns_404(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/cattle/Ghost-001", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn rename_collision_returns_409(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001", "Cow", "Gir").await;
    add_cattle(&pool, &token, "Ganga-002", "Buffalo", "Murrah").await;

    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        "/api/v1/cattle/Ganga-002",
        &token,
        serde_json::json!({ "name": "Kaveri-001" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../migrations")]
async fn delete_removes_the_animal(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001", "Cow", "Gir").await;

    let app = common::build_test_app(pool.clone());
    let response = delete(app, "/api/v1/cattle/Kaveri-001", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/cattle/Kaveri-001", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Listing engine
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn initial_listing_returns_both_animals_one_page(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001", "Cow", "Gir").await;
    add_cattle(&pool, &token, "Ganga-002", "Buffalo", "Murrah").await;

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/cattle?page=1", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["message"], "showing the initial paginated data");
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(json["data"]["totalCount"], 2);
    assert_eq!(json["data"]["totalPages"], 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn page_past_the_end_is_empty_with_counts(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001", "Cow", "Gir").await;

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/cattle?page=3", &token).await).await;
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 0);
    assert_eq!(json["data"]["totalCount"], 1);
    assert_eq!(json["data"]["totalPages"], 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn invalid_sort_key_returns_400_without_querying(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/cattle?page=1&sortBy=biggest", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Please enter a valid sortBy value");
}

#[sqlx::test(migrations = "../../migrations")]
async fn invalid_filter_token_returns_400(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/cattle?page=1&filter=Dragon", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Please enter a valid filter value");
}

#[sqlx::test(migrations = "../../migrations")]
async fn sorted_listing_uses_the_sorted_message(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001", "Cow", "Gir").await;

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/cattle?page=1&sortBy=name-asc", &token).await).await;
    assert_eq!(json["message"], "showing the sorted data");
}

#[sqlx::test(migrations = "../../migrations")]
async fn filter_supersedes_sort_and_filters_rows(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001", "Cow", "Gir").await;
    add_cattle(&pool, &token, "Ganga-002", "Buffalo", "Murrah").await;

    // Sort and filter together: the filter stage wins (replace-last merge)
    // and the message reflects it.
    let app = common::build_test_app(pool);
    let json = body_json(
        get(
            app,
            "/api/v1/cattle?page=1&sortBy=name-asc&filter=Buffalo",
            &token,
        )
        .await,
    )
    .await;
    assert_eq!(json["message"], "showing the filtered data");
    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Ganga-002");
}

#[sqlx::test(migrations = "../../migrations")]
async fn search_message_embeds_the_term(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001", "Cow", "Gir").await;
    add_cattle(&pool, &token, "Ganga-002", "Buffalo", "Murrah").await;

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/cattle?page=1&search=kaveri", &token).await).await;
    assert_eq!(
        json["message"],
        "Showing the searched records based on kaveri"
    );
    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Kaveri-001");
}

#[sqlx::test(migrations = "../../migrations")]
async fn single_day_date_range_is_inclusive(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001", "Cow", "Gir").await; // entry 2023-06-01

    let app = common::build_test_app(pool.clone());
    let json = body_json(
        get(
            app,
            "/api/v1/cattle?page=1&fromDate=2023-06-01&toDate=2023-06-01",
            &token,
        )
        .await,
    )
    .await;
    assert_eq!(
        json["message"],
        "Showing the data based on date range 2023-06-01 to 2023-06-01"
    );
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 1);

    // A window before the entry date matches nothing.
    let app = common::build_test_app(pool);
    let json = body_json(
        get(
            app,
            "/api/v1/cattle?page=1&fromDate=2023-05-01&toDate=2023-05-31",
            &token,
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn listing_carries_the_literal_average_milk_figure(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001", "Cow", "Gir").await;

    // One milk record: morning 4, afternoon 5, evening 6.
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/milk/records",
        Some(&token),
        serde_json::json!({
            "cattle_name": "Kaveri-001",
            "record_date": "2023-06-01",
            "morning_litres": 4.0,
            "afternoon_litres": 5.0,
            "evening_litres": 6.0,
            "grade": "A1"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // avg(4) + avg(5) + avg(6)/3 = 11, not the three-way mean 5.
    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/cattle?page=1", &token).await).await;
    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items[0]["avg_milk"], 11.0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn identical_queries_return_identical_results(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    add_cattle(&pool, &token, "Kaveri-001", "Cow", "Gir").await;
    add_cattle(&pool, &token, "Ganga-002", "Buffalo", "Murrah").await;

    let app = common::build_test_app(pool.clone());
    let first = body_json(get(app, "/api/v1/cattle?page=1&filter=Cow", &token).await).await;
    let app = common::build_test_app(pool);
    let second = body_json(get(app, "/api/v1/cattle?page=1&filter=Cow", &token).await).await;
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn dashboard_rejects_unknown_period(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/cattle/dashboard?period=Fortnight", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Enter a valid query value {Week,Month,Quarter,Year}");
}

#[sqlx::test(migrations = "../../migrations")]
async fn dashboard_cards_are_positional(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/cattle/dashboard?period=Week", &token).await).await;

    let cards = json["data"].as_array().unwrap();
    assert_eq!(cards.len(), 5);
    assert_eq!(cards[0]["label"], "totalCattle");
    assert_eq!(cards[1]["label"], "cows");
    assert_eq!(cards[2]["label"], "buffaloes");
    assert_eq!(cards[3]["label"], "goats");
    assert_eq!(cards[4]["label"], "activeCattle");
    // Empty farm: every card is a flat zero.
    assert_eq!(cards[0]["number"], "0.00");
    assert_eq!(cards[0]["status"], "no_change");
    assert_eq!(cards[0]["percentage"], "0%");
}
