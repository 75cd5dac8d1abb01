//! Handlers for the `/cattle` resource.
//!
//! Animals are addressed by their human-assigned name token:
//! `/cattle[/{name}]`, plus the top-section dashboard at `/cattle/dashboard`.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use herdbook_core::error::CoreError;
use herdbook_core::listing::{
    cattle_average_milk, ensure_domain, CATTLE_BREEDS, CATTLE_LISTING, CATTLE_TYPES,
    HEALTH_STATUSES,
};
use herdbook_core::types::DbId;
use herdbook_core::{paging, period, trend};
use validator::Validate;

use herdbook_db::models::cattle::{Cattle, CattleListItem, CreateCattle, UpdateCattle};
use herdbook_db::repositories::CattleRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac;
use crate::query::{DashboardParams, ListParams};
use crate::response::{ListData, MessageResponse};
use crate::state::AppState;

const MODULE: &str = "cattle";

/// POST /api/v1/cattle
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateCattle>,
) -> AppResult<(StatusCode, Json<MessageResponse<Cattle>>)> {
    rbac::ensure_can_edit(&state, &user, MODULE).await?;
    input.validate()?;
    validate_domains(
        Some(&input.cattle_type),
        Some(&input.breed),
        input.health_status.as_deref(),
    )?;

    if CattleRepo::find_by_name(&state.pool, &input.name)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Cattle {} already exists",
            input.name
        ))));
    }

    let cattle = CattleRepo::create(&state.pool, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Successfully added the animal", cattle)),
    ))
}

/// GET /api/v1/cattle
///
/// Paginated listing. Each returned row carries the animal's rolling
/// average-milk figure, batched into one grouped query per page.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<MessageResponse<ListData<CattleListItem>>>> {
    rbac::ensure_can_view(&state, &user, MODULE).await?;
    let req = params.into_request()?;
    let plan = CATTLE_LISTING.plan(&req)?;

    let (items, total) = CattleRepo::list(&state.pool, &plan.effective(), paging::skip(req.page))
        .await?;

    let ids: Vec<DbId> = items.iter().map(|c| c.id).collect();
    let averages: HashMap<DbId, f64> = CattleRepo::milk_averages(&state.pool, &ids)
        .await?
        .into_iter()
        .map(|(id, morning, afternoon, evening)| {
            (id, cattle_average_milk(morning, afternoon, evening))
        })
        .collect();

    let items = items
        .into_iter()
        .map(|cattle| CattleListItem {
            avg_milk: averages.get(&cattle.id).copied().unwrap_or(0.0),
            cattle,
        })
        .collect();

    Ok(Json(MessageResponse::new(
        plan.message(),
        ListData::new(items, total),
    )))
}

/// GET /api/v1/cattle/{name}
pub async fn get_by_name(
    State(state): State<AppState>,
    user: AuthUser,
    Path(name): Path<String>,
) -> AppResult<Json<MessageResponse<Cattle>>> {
    rbac::ensure_can_view(&state, &user, MODULE).await?;
    let cattle = CattleRepo::find_by_name(&state.pool, &name)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Cattle", &name)))?;
    Ok(Json(MessageResponse::new("showing the animal", cattle)))
}

/// PUT /api/v1/cattle/{name}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(name): Path<String>,
    Json(input): Json<UpdateCattle>,
) -> AppResult<Json<MessageResponse<Cattle>>> {
    rbac::ensure_can_edit(&state, &user, MODULE).await?;
    input.validate()?;
    validate_domains(
        input.cattle_type.as_deref(),
        input.breed.as_deref(),
        input.health_status.as_deref(),
    )?;

    // A rename must not collide with another animal's name.
    if let Some(new_name) = &input.name {
        if new_name != &name
            && CattleRepo::find_by_name(&state.pool, new_name)
                .await?
                .is_some()
        {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Cattle {new_name} already exists"
            ))));
        }
    }

    let cattle = CattleRepo::update_by_name(&state.pool, &name, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Cattle", &name)))?;
    Ok(Json(MessageResponse::new(
        "Successfully updated the animal",
        cattle,
    )))
}

/// DELETE /api/v1/cattle/{name}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(name): Path<String>,
) -> AppResult<Json<MessageResponse<serde_json::Value>>> {
    rbac::ensure_can_edit(&state, &user, MODULE).await?;
    let deleted = CattleRepo::delete_by_name(&state.pool, &name).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::not_found("Cattle", &name)));
    }
    Ok(Json(MessageResponse::new(
        "Successfully deleted the animal",
        serde_json::json!({ "name": name }),
    )))
}

/// GET /api/v1/cattle/dashboard
///
/// Top-section dashboard: counts of animals entered in the window, per type
/// and active, each with a trend against the prior calendar day.
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<DashboardParams>,
) -> AppResult<Json<MessageResponse<Vec<trend::DashboardCard>>>> {
    rbac::ensure_can_view(&state, &user, MODULE).await?;
    let now = Utc::now();
    let (start, end) = params.resolve_window(now)?;
    let current =
        CattleRepo::counts_between(&state.pool, start.date_naive(), end.date_naive()).await?;

    let (prev_start, prev_end) = period::previous_day_window(now);
    let previous =
        CattleRepo::counts_between(&state.pool, prev_start.date_naive(), prev_end.date_naive())
            .await?;

    // Card order is the wire contract.
    let cards = vec![
        trend::card("totalCattle", previous.total as f64, current.total as f64),
        trend::card("cows", previous.cows as f64, current.cows as f64),
        trend::card(
            "buffaloes",
            previous.buffaloes as f64,
            current.buffaloes as f64,
        ),
        trend::card("goats", previous.goats as f64, current.goats as f64),
        trend::card("activeCattle", previous.active as f64, current.active as f64),
    ];

    Ok(Json(MessageResponse::new(
        "showing the cattle dashboard data",
        cards,
    )))
}

/// Closed-domain checks shared by create and update.
fn validate_domains(
    cattle_type: Option<&str>,
    breed: Option<&str>,
    health_status: Option<&str>,
) -> Result<(), CoreError> {
    if let Some(t) = cattle_type {
        ensure_domain(CATTLE_TYPES, t, "type")?;
    }
    if let Some(b) = breed {
        ensure_domain(CATTLE_BREEDS, b, "breed")?;
    }
    if let Some(h) = health_status {
        ensure_domain(HEALTH_STATUSES, h, "health status")?;
    }
    Ok(())
}
