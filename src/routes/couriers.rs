//! Courier routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use crate::routes::{action_fail, action_ok};
use crate::services::couriers::{self, CourierError, CourierPatch, CourierRow, NewCourier};
use crate::state::AppState;

fn error_to_status(err: &CourierError) -> StatusCode {
    match err {
        CourierError::NotFound(_) => StatusCode::NOT_FOUND,
        CourierError::Invalid(_) => StatusCode::BAD_REQUEST,
        CourierError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `GET /api/couriers` — list active couriers.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<CourierRow>>, StatusCode> {
    couriers::list(&state.pool)
        .await
        .map(Json)
        .map_err(|e| error_to_status(&e))
}

/// `GET /api/couriers/:id` — fetch one courier.
pub async fn get_one(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CourierRow>, StatusCode> {
    couriers::get(&state.pool, id)
        .await
        .map(Json)
        .map_err(|e| error_to_status(&e))
}

/// `POST /api/couriers` — create a courier.
pub async fn create(State(state): State<AppState>, Json(body): Json<NewCourier>) -> Json<serde_json::Value> {
    match couriers::create(&state.pool, &body).await {
        Ok(row) => action_ok(row),
        Err(e) => action_fail(&e),
    }
}

/// `PATCH /api/couriers/:id` — partial update.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CourierPatch>,
) -> Json<serde_json::Value> {
    match couriers::update(&state.pool, id, &body).await {
        Ok(row) => action_ok(row),
        Err(e) => action_fail(&e),
    }
}

/// `DELETE /api/couriers/:id` — soft delete.
pub async fn remove(State(state): State<AppState>, Path(id): Path<Uuid>) -> Json<serde_json::Value> {
    match couriers::deactivate(&state.pool, id).await {
        Ok(()) => action_ok(serde_json::json!({ "id": id, "active": false })),
        Err(e) => action_fail(&e),
    }
}
