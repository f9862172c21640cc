//! Order routes — CRUD plus the production-workflow endpoint.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::{action_fail, action_ok};
use crate::services::orders::{self, NewOrder, OrderError, OrderPatch, OrderRow};
use crate::state::AppState;

fn error_to_status(err: &OrderError) -> StatusCode {
    match err {
        OrderError::NotFound(_) => StatusCode::NOT_FOUND,
        OrderError::Invalid(_) | OrderError::BadTransition { .. } => StatusCode::BAD_REQUEST,
        OrderError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

/// `GET /api/orders` — list active orders, optionally `?status=…`.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<OrderRow>>, StatusCode> {
    orders::list(&state.pool, query.status.as_deref())
        .await
        .map(Json)
        .map_err(|e| error_to_status(&e))
}

/// `GET /api/orders/:id` — fetch one order with line items.
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<orders::OrderDetail>, StatusCode> {
    orders::get(&state.pool, id)
        .await
        .map(Json)
        .map_err(|e| error_to_status(&e))
}

/// `POST /api/orders` — create an order with line items.
pub async fn create(State(state): State<AppState>, Json(body): Json<NewOrder>) -> Json<serde_json::Value> {
    match orders::create(&state.pool, &body).await {
        Ok(detail) => action_ok(detail),
        Err(e) => action_fail(&e),
    }
}

/// `PATCH /api/orders/:id` — reassign courier / edit notes.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<OrderPatch>,
) -> Json<serde_json::Value> {
    match orders::update(&state.pool, id, &body).await {
        Ok(detail) => action_ok(detail),
        Err(e) => action_fail(&e),
    }
}

#[derive(Debug, Deserialize)]
pub struct SetStatusBody {
    pub status: String,
}

/// `POST /api/orders/:id/status` — move the order through the workflow.
/// A forbidden transition comes back as `{"success":false,…}` so the
/// dashboard can show it inline.
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetStatusBody>,
) -> Json<serde_json::Value> {
    match orders::set_status(&state.pool, id, &body.status).await {
        Ok(detail) => action_ok(detail),
        Err(e) => action_fail(&e),
    }
}

/// `DELETE /api/orders/:id` — soft delete.
pub async fn remove(State(state): State<AppState>, Path(id): Path<Uuid>) -> Json<serde_json::Value> {
    match orders::deactivate(&state.pool, id).await {
        Ok(()) => action_ok(serde_json::json!({ "id": id, "active": false })),
        Err(e) => action_fail(&e),
    }
}
