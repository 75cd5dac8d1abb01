//! Handlers for `/feed/stock`: inventory lines, restocking, and the
//! history ledger.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use herdbook_core::error::CoreError;
use herdbook_core::listing::{ensure_domain, FEED_STOCK_LISTING, UNITS};
use herdbook_core::paging;
use herdbook_core::types::DbId;
use validator::Validate;

use herdbook_db::models::feed::{
    CreateFeedStock, FeedStock, FeedStockHistory, RestockFeedStock, UpdateFeedStock,
};
use herdbook_db::repositories::FeedStockRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac;
use crate::query::ListParams;
use crate::response::{ListData, MessageResponse};
use crate::state::AppState;

const MODULE: &str = "feed";

/// POST /api/v1/feed/stock
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateFeedStock>,
) -> AppResult<(StatusCode, Json<MessageResponse<FeedStock>>)> {
    rbac::ensure_can_edit(&state, &user, MODULE).await?;
    input.validate()?;
    ensure_domain(UNITS, &input.unit, "unit")?;

    if FeedStockRepo::find_by_name(&state.pool, &input.name)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Feed stock {} already exists",
            input.name
        ))));
    }

    let stock = FeedStockRepo::create(&state.pool, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "Successfully added the feed stock",
            stock,
        )),
    ))
}

/// GET /api/v1/feed/stock
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<MessageResponse<ListData<FeedStock>>>> {
    rbac::ensure_can_view(&state, &user, MODULE).await?;
    let req = params.into_request()?;
    let plan = FEED_STOCK_LISTING.plan(&req)?;

    let (items, total) =
        FeedStockRepo::list(&state.pool, &plan.effective(), paging::skip(req.page)).await?;

    Ok(Json(MessageResponse::new(
        plan.message(),
        ListData::new(items, total),
    )))
}

/// PUT /api/v1/feed/stock/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateFeedStock>,
) -> AppResult<Json<MessageResponse<FeedStock>>> {
    rbac::ensure_can_edit(&state, &user, MODULE).await?;
    input.validate()?;
    if let Some(unit) = &input.unit {
        ensure_domain(UNITS, unit, "unit")?;
    }

    let stock = FeedStockRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Feed stock", id)))?;
    Ok(Json(MessageResponse::new(
        "Successfully updated the feed stock",
        stock,
    )))
}

/// DELETE /api/v1/feed/stock/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse<serde_json::Value>>> {
    rbac::ensure_can_edit(&state, &user, MODULE).await?;
    let deleted = FeedStockRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::not_found("Feed stock", id)));
    }
    Ok(Json(MessageResponse::new(
        "Successfully deleted the feed stock",
        serde_json::json!({ "id": id }),
    )))
}

/// POST /api/v1/feed/stock/{id}/restock
pub async fn restock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<RestockFeedStock>,
) -> AppResult<Json<MessageResponse<FeedStock>>> {
    rbac::ensure_can_edit(&state, &user, MODULE).await?;
    input.validate()?;

    let stock = FeedStockRepo::restock(&state.pool, id, input.quantity)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Feed stock", id)))?;
    Ok(Json(MessageResponse::new(
        "Successfully restocked the feed stock",
        stock,
    )))
}

/// GET /api/v1/feed/stock/{id}/history
pub async fn history(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse<Vec<FeedStockHistory>>>> {
    rbac::ensure_can_view(&state, &user, MODULE).await?;
    if FeedStockRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::Core(CoreError::not_found("Feed stock", id)));
    }
    let entries = FeedStockRepo::history(&state.pool, id).await?;
    Ok(Json(MessageResponse::new(
        "showing the feed stock history",
        entries,
    )))
}
