//! Handlers for `/health-records/vaccinations`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use herdbook_core::error::CoreError;
use herdbook_core::listing::VACCINATION_LISTING;
use herdbook_core::types::DbId;
use herdbook_core::{paging, period, trend};
use validator::Validate;

use herdbook_db::models::vaccination::{
    CreateVaccinationRecord, UpdateVaccinationRecord, VaccinationRecord,
};
use herdbook_db::repositories::{CattleRepo, VaccinationRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac;
use crate::query::{DashboardParams, ListParams};
use crate::response::{ListData, MessageResponse};
use crate::state::AppState;

const MODULE: &str = "health";

/// POST /api/v1/health-records/vaccinations
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateVaccinationRecord>,
) -> AppResult<(StatusCode, Json<MessageResponse<VaccinationRecord>>)> {
    rbac::ensure_can_edit(&state, &user, MODULE).await?;
    input.validate()?;

    let cattle = CattleRepo::find_by_name(&state.pool, &input.cattle_name)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Cattle", &input.cattle_name)))?;

    let record = VaccinationRepo::create(&state.pool, cattle.id, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "Successfully added the vaccination record",
            record,
        )),
    ))
}

/// GET /api/v1/health-records/vaccinations
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<MessageResponse<ListData<VaccinationRecord>>>> {
    rbac::ensure_can_view(&state, &user, MODULE).await?;
    let req = params.into_request()?;
    let plan = VACCINATION_LISTING.plan(&req)?;

    let (items, total) =
        VaccinationRepo::list(&state.pool, &plan.effective(), paging::skip(req.page)).await?;

    Ok(Json(MessageResponse::new(
        plan.message(),
        ListData::new(items, total),
    )))
}

/// PUT /api/v1/health-records/vaccinations/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateVaccinationRecord>,
) -> AppResult<Json<MessageResponse<VaccinationRecord>>> {
    rbac::ensure_can_edit(&state, &user, MODULE).await?;
    input.validate()?;

    let record = VaccinationRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Vaccination record", id)))?;
    Ok(Json(MessageResponse::new(
        "Successfully updated the vaccination record",
        record,
    )))
}

/// DELETE /api/v1/health-records/vaccinations/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse<serde_json::Value>>> {
    rbac::ensure_can_edit(&state, &user, MODULE).await?;
    let deleted = VaccinationRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::not_found(
            "Vaccination record",
            id,
        )));
    }
    Ok(Json(MessageResponse::new(
        "Successfully deleted the vaccination record",
        serde_json::json!({ "id": id }),
    )))
}

/// GET /api/v1/health-records/vaccinations/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<DashboardParams>,
) -> AppResult<Json<MessageResponse<Vec<trend::DashboardCard>>>> {
    rbac::ensure_can_view(&state, &user, MODULE).await?;
    let now = Utc::now();
    let (start, end) = params.resolve_window(now)?;
    let current =
        VaccinationRepo::count_between(&state.pool, start.date_naive(), end.date_naive()).await?;

    let (prev_start, prev_end) = period::previous_day_window(now);
    let previous =
        VaccinationRepo::count_between(&state.pool, prev_start.date_naive(), prev_end.date_naive())
            .await?;

    let cards = vec![trend::card(
        "totalVaccinations",
        previous as f64,
        current as f64,
    )];

    Ok(Json(MessageResponse::new(
        "showing the vaccination dashboard data",
        cards,
    )))
}
