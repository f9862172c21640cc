//! Product routes — thin translation of HTTP bodies into catalog calls.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use crate::routes::{action_fail, action_ok};
use crate::services::products::{self, NewProduct, ProductError, ProductPatch, ProductRow};
use crate::state::AppState;

fn error_to_status(err: &ProductError) -> StatusCode {
    match err {
        ProductError::NotFound(_) => StatusCode::NOT_FOUND,
        ProductError::Invalid(_) => StatusCode::BAD_REQUEST,
        ProductError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `GET /api/products` — list active products.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProductRow>>, StatusCode> {
    products::list(&state.pool)
        .await
        .map(Json)
        .map_err(|e| error_to_status(&e))
}

/// `GET /api/products/:id` — fetch one product.
pub async fn get_one(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<ProductRow>, StatusCode> {
    products::get(&state.pool, id)
        .await
        .map(Json)
        .map_err(|e| error_to_status(&e))
}

/// `POST /api/products` — create a product. Always responds with the
/// result envelope; validation failures are data, not errors.
pub async fn create(State(state): State<AppState>, Json(body): Json<NewProduct>) -> Json<serde_json::Value> {
    match products::create(&state.pool, &body).await {
        Ok(row) => action_ok(row),
        Err(e) => action_fail(&e),
    }
}

/// `PATCH /api/products/:id` — partial update.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ProductPatch>,
) -> Json<serde_json::Value> {
    match products::update(&state.pool, id, &body).await {
        Ok(row) => action_ok(row),
        Err(e) => action_fail(&e),
    }
}

/// `DELETE /api/products/:id` — soft delete.
pub async fn remove(State(state): State<AppState>, Path(id): Path<Uuid>) -> Json<serde_json::Value> {
    match products::deactivate(&state.pool, id).await {
        Ok(()) => action_ok(serde_json::json!({ "id": id, "active": false })),
        Err(e) => action_fail(&e),
    }
}
