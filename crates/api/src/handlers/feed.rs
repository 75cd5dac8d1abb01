//! Handlers for `/feed/consumption`: intake records reconciled against the
//! stock inventory.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use herdbook_core::error::CoreError;
use herdbook_core::listing::{
    ensure_domain, FEED_CONSUMPTION_LISTING, FEED_KINDS, SESSIONS, UNITS,
};
use herdbook_core::paging;
use herdbook_core::types::DbId;
use validator::Validate;

use herdbook_db::models::feed::{CreateFeedConsumption, FeedConsumption, UpdateFeedConsumption};
use herdbook_db::repositories::{CattleRepo, FeedConsumptionRepo, StockReconcile};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac;
use crate::query::ListParams;
use crate::response::{ListData, MessageResponse};
use crate::state::AppState;

const MODULE: &str = "feed";

/// POST /api/v1/feed/consumption
///
/// A `feed` entry is rejected with a conflict when the requested quantity
/// exceeds the stock balance; nothing is mutated in that case.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateFeedConsumption>,
) -> AppResult<(StatusCode, Json<MessageResponse<FeedConsumption>>)> {
    rbac::ensure_can_edit(&state, &user, MODULE).await?;
    input.validate()?;
    ensure_domain(FEED_KINDS, &input.feed_kind, "feed type")?;
    ensure_domain(SESSIONS, &input.session, "session")?;
    ensure_domain(UNITS, &input.unit, "unit")?;

    let cattle = CattleRepo::find_by_name(&state.pool, &input.cattle_name)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Cattle", &input.cattle_name)))?;

    let record = match FeedConsumptionRepo::create(&state.pool, cattle.id, &input).await? {
        StockReconcile::Done(record) => record,
        StockReconcile::StockNotFound => {
            return Err(AppError::Core(CoreError::not_found(
                "Feed stock",
                &input.feed_name,
            )))
        }
        StockReconcile::InsufficientStock { available } => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Requested quantity exceeds available stock ({available} {} remaining)",
                input.unit
            ))))
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "Successfully added the feed record",
            record,
        )),
    ))
}

/// GET /api/v1/feed/consumption
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<MessageResponse<ListData<FeedConsumption>>>> {
    rbac::ensure_can_view(&state, &user, MODULE).await?;
    let req = params.into_request()?;
    let plan = FEED_CONSUMPTION_LISTING.plan(&req)?;

    let (items, total) =
        FeedConsumptionRepo::list(&state.pool, &plan.effective(), paging::skip(req.page)).await?;

    Ok(Json(MessageResponse::new(
        plan.message(),
        ListData::new(items, total),
    )))
}

/// PUT /api/v1/feed/consumption/{id}
///
/// A quantity change on a `feed` entry adjusts the paired stock balance by
/// the delta, with the same conflict rule as create.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateFeedConsumption>,
) -> AppResult<Json<MessageResponse<FeedConsumption>>> {
    rbac::ensure_can_edit(&state, &user, MODULE).await?;
    input.validate()?;
    if let Some(session) = &input.session {
        ensure_domain(SESSIONS, session, "session")?;
    }

    let existing = FeedConsumptionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Feed record", id)))?;

    let record = match FeedConsumptionRepo::update(&state.pool, &existing, &input).await? {
        StockReconcile::Done(record) => record,
        StockReconcile::StockNotFound => {
            return Err(AppError::Core(CoreError::not_found(
                "Feed stock",
                &existing.feed_name,
            )))
        }
        StockReconcile::InsufficientStock { available } => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Requested quantity exceeds available stock ({available} {} remaining)",
                existing.unit
            ))))
        }
    };

    Ok(Json(MessageResponse::new(
        "Successfully updated the feed record",
        record,
    )))
}

/// DELETE /api/v1/feed/consumption/{id}
///
/// Deleting a `feed` entry restores the consumed quantity to the stock
/// line (when it still exists) with an `Added` history row.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse<serde_json::Value>>> {
    rbac::ensure_can_edit(&state, &user, MODULE).await?;
    let existing = FeedConsumptionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Feed record", id)))?;

    let deleted = FeedConsumptionRepo::delete(&state.pool, &existing).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::not_found("Feed record", id)));
    }
    Ok(Json(MessageResponse::new(
        "Successfully deleted the feed record",
        serde_json::json!({ "id": id }),
    )))
}
