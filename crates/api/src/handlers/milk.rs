//! Handlers for the `/milk` resource: per-session records and the milk
//! dashboard cards.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use herdbook_core::error::CoreError;
use herdbook_core::listing::{ensure_domain, MILK_GRADES, MILK_LISTING};
use herdbook_core::types::DbId;
use herdbook_core::{paging, period, trend};
use validator::Validate;

use herdbook_db::models::milk::{CreateMilkRecord, MilkRecord, UpdateMilkRecord};
use herdbook_db::repositories::{CattleRepo, MilkRecordRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac;
use crate::query::{DashboardParams, ListParams};
use crate::response::{ListData, MessageResponse};
use crate::state::AppState;

const MODULE: &str = "milk";

/// POST /api/v1/milk/records
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateMilkRecord>,
) -> AppResult<(StatusCode, Json<MessageResponse<MilkRecord>>)> {
    rbac::ensure_can_edit(&state, &user, MODULE).await?;
    input.validate()?;
    ensure_domain(MILK_GRADES, &input.grade, "grade")?;

    let cattle = CattleRepo::find_by_name(&state.pool, &input.cattle_name)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Cattle", &input.cattle_name)))?;

    let record = MilkRecordRepo::create(&state.pool, cattle.id, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "Successfully added the milk record",
            record,
        )),
    ))
}

/// GET /api/v1/milk/records
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<MessageResponse<ListData<MilkRecord>>>> {
    rbac::ensure_can_view(&state, &user, MODULE).await?;
    let req = params.into_request()?;
    let plan = MILK_LISTING.plan(&req)?;

    let (items, total) =
        MilkRecordRepo::list(&state.pool, &plan.effective(), paging::skip(req.page)).await?;

    Ok(Json(MessageResponse::new(
        plan.message(),
        ListData::new(items, total),
    )))
}

/// PUT /api/v1/milk/records/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMilkRecord>,
) -> AppResult<Json<MessageResponse<MilkRecord>>> {
    rbac::ensure_can_edit(&state, &user, MODULE).await?;
    input.validate()?;
    if let Some(grade) = &input.grade {
        ensure_domain(MILK_GRADES, grade, "grade")?;
    }

    let record = MilkRecordRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Milk record", id)))?;
    Ok(Json(MessageResponse::new(
        "Successfully updated the milk record",
        record,
    )))
}

/// DELETE /api/v1/milk/records/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse<serde_json::Value>>> {
    rbac::ensure_can_edit(&state, &user, MODULE).await?;
    let deleted = MilkRecordRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::not_found("Milk record", id)));
    }
    Ok(Json(MessageResponse::new(
        "Successfully deleted the milk record",
        serde_json::json!({ "id": id }),
    )))
}

/// GET /api/v1/milk/dashboard
///
/// Total, grade A1, and grade A2 litres in the window, each with a trend
/// against the prior calendar day.
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<DashboardParams>,
) -> AppResult<Json<MessageResponse<Vec<trend::DashboardCard>>>> {
    rbac::ensure_can_view(&state, &user, MODULE).await?;
    let now = Utc::now();
    let (start, end) = params.resolve_window(now)?;
    let current =
        MilkRecordRepo::sums_between(&state.pool, start.date_naive(), end.date_naive()).await?;

    let (prev_start, prev_end) = period::previous_day_window(now);
    let previous =
        MilkRecordRepo::sums_between(&state.pool, prev_start.date_naive(), prev_end.date_naive())
            .await?;

    // Card order is the wire contract.
    let cards = vec![
        trend::card("totalMilk", previous.total, current.total),
        trend::card("gradeA1Milk", previous.grade_a1, current.grade_a1),
        trend::card("gradeA2Milk", previous.grade_a2, current.grade_a2),
    ];

    Ok(Json(MessageResponse::new(
        "showing the milk dashboard data",
        cards,
    )))
}
