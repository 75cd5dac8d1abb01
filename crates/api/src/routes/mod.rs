//! Route tree for the Herdbook API.

pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                  login (public)
/// /auth/refresh                                refresh (public)
/// /auth/logout                                 logout (requires auth)
///
/// /cattle                                      list, add animal
/// /cattle/dashboard                            top-section dashboard
/// /cattle/{name}                               get, edit, delete
///
/// /milk/records                                list, create
/// /milk/records/{id}                           update, delete
/// /milk/dashboard                              milk cards
///
/// /feed/consumption                            list, create (stock-reconciled)
/// /feed/consumption/{id}                       update, delete
/// /feed/stock                                  list, create
/// /feed/stock/{id}                             update, delete
/// /feed/stock/{id}/restock                     restock (POST)
/// /feed/stock/{id}/history                     history ledger (GET)
///
/// /health-records/checkups                     list, create
/// /health-records/checkups/dashboard           checkup cards
/// /health-records/checkups/{id}                update, delete
/// /health-records/vaccinations                 list, create
/// /health-records/vaccinations/dashboard       vaccination cards
/// /health-records/vaccinations/{id}            update, delete
///
/// /employees                                   list, create (admin only)
/// /employees/{code}                            get, update, deactivate
///
/// /roles                                       list, create (admin only)
/// /roles/{name}                                get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/cattle", cattle_routes())
        .nest("/milk", milk_routes())
        .nest("/feed", feed_routes())
        .nest("/health-records", health_record_routes())
        .nest("/employees", employee_routes())
        .nest("/roles", role_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh))
        .route("/logout", post(handlers::auth::logout))
}

fn cattle_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::cattle::list).post(handlers::cattle::create),
        )
        .route("/dashboard", get(handlers::cattle::dashboard))
        .route(
            "/{name}",
            get(handlers::cattle::get_by_name)
                .put(handlers::cattle::update)
                .delete(handlers::cattle::delete),
        )
}

fn milk_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/records",
            get(handlers::milk::list).post(handlers::milk::create),
        )
        .route(
            "/records/{id}",
            axum::routing::put(handlers::milk::update).delete(handlers::milk::delete),
        )
        .route("/dashboard", get(handlers::milk::dashboard))
}

fn feed_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/consumption",
            get(handlers::feed::list).post(handlers::feed::create),
        )
        .route(
            "/consumption/{id}",
            axum::routing::put(handlers::feed::update).delete(handlers::feed::delete),
        )
        .route(
            "/stock",
            get(handlers::feed_stock::list).post(handlers::feed_stock::create),
        )
        .route(
            "/stock/{id}",
            axum::routing::put(handlers::feed_stock::update).delete(handlers::feed_stock::delete),
        )
        .route("/stock/{id}/restock", post(handlers::feed_stock::restock))
        .route("/stock/{id}/history", get(handlers::feed_stock::history))
}

fn health_record_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/checkups",
            get(handlers::checkup::list).post(handlers::checkup::create),
        )
        .route("/checkups/dashboard", get(handlers::checkup::dashboard))
        .route(
            "/checkups/{id}",
            axum::routing::put(handlers::checkup::update).delete(handlers::checkup::delete),
        )
        .route(
            "/vaccinations",
            get(handlers::vaccination::list).post(handlers::vaccination::create),
        )
        .route(
            "/vaccinations/dashboard",
            get(handlers::vaccination::dashboard),
        )
        .route(
            "/vaccinations/{id}",
            axum::routing::put(handlers::vaccination::update).delete(handlers::vaccination::delete),
        )
}

fn employee_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::employee::list).post(handlers::employee::create),
        )
        .route(
            "/{code}",
            get(handlers::employee::get_by_code)
                .put(handlers::employee::update)
                .delete(handlers::employee::delete),
        )
}

fn role_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::role::list).post(handlers::role::create))
        .route(
            "/{name}",
            get(handlers::role::get_by_name)
                .put(handlers::role::update)
                .delete(handlers::role::delete),
        )
}
