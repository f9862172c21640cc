//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One router, one gate: every route below is layered behind
//! `gate::access_gate`, so the login surface and the protected pages share a
//! single choke point. Handlers never check authentication themselves; by
//! the time one runs, the gate has already decided.

pub mod auth;
pub mod couriers;
pub mod customers;
pub mod dashboard;
pub mod orders;
pub mod products;

use axum::Router;
use axum::middleware;
use axum::response::{Json, Redirect};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::gate;
use crate::state::AppState;

/// Write-action envelope: success carries the row, failure carries a
/// message the dashboard renders inline. Service errors never escape as
/// HTTP errors on these paths.
pub(crate) fn action_ok<T: serde::Serialize>(data: T) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true, "data": data }))
}

pub(crate) fn action_fail(error: &impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": false, "error": error.to_string() }))
}

async fn root_redirect() -> Redirect {
    Redirect::temporary(gate::HOME_PATH)
}

/// Assemble the full application router with the gate wrapped around it.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_redirect))
        .route("/dashboard", get(dashboard::home))
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/dashboard/summary", get(dashboard::summary))
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/{id}",
            get(products::get_one).patch(products::update).delete(products::remove),
        )
        .route("/api/couriers", get(couriers::list).post(couriers::create))
        .route(
            "/api/couriers/{id}",
            get(couriers::get_one).patch(couriers::update).delete(couriers::remove),
        )
        .route("/api/customers", get(customers::list).post(customers::create))
        .route(
            "/api/customers/{id}",
            get(customers::get_one).patch(customers::update).delete(customers::remove),
        )
        .route("/api/orders", get(orders::list).post(orders::create))
        .route(
            "/api/orders/{id}",
            get(orders::get_one).patch(orders::update).delete(orders::remove),
        )
        .route("/api/orders/{id}/status", post(orders::set_status))
        .layer(middleware::from_fn_with_state(state.clone(), gate::access_gate))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
