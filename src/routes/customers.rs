//! Customer routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use crate::routes::{action_fail, action_ok};
use crate::services::customers::{self, CustomerError, CustomerPatch, CustomerRow, NewCustomer};
use crate::state::AppState;

fn error_to_status(err: &CustomerError) -> StatusCode {
    match err {
        CustomerError::NotFound(_) => StatusCode::NOT_FOUND,
        CustomerError::Invalid(_) => StatusCode::BAD_REQUEST,
        CustomerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `GET /api/customers` — list active customers.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<CustomerRow>>, StatusCode> {
    customers::list(&state.pool)
        .await
        .map(Json)
        .map_err(|e| error_to_status(&e))
}

/// `GET /api/customers/:id` — fetch one customer.
pub async fn get_one(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CustomerRow>, StatusCode> {
    customers::get(&state.pool, id)
        .await
        .map(Json)
        .map_err(|e| error_to_status(&e))
}

/// `POST /api/customers` — create a customer.
pub async fn create(State(state): State<AppState>, Json(body): Json<NewCustomer>) -> Json<serde_json::Value> {
    match customers::create(&state.pool, &body).await {
        Ok(row) => action_ok(row),
        Err(e) => action_fail(&e),
    }
}

/// `PATCH /api/customers/:id` — partial update.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CustomerPatch>,
) -> Json<serde_json::Value> {
    match customers::update(&state.pool, id, &body).await {
        Ok(row) => action_ok(row),
        Err(e) => action_fail(&e),
    }
}

/// `DELETE /api/customers/:id` — soft delete.
pub async fn remove(State(state): State<AppState>, Path(id): Path<Uuid>) -> Json<serde_json::Value> {
    match customers::deactivate(&state.pool, id).await {
        Ok(()) => action_ok(serde_json::json!({ "id": id, "active": false })),
        Err(e) => action_fail(&e),
    }
}
