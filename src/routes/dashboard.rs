//! Dashboard routes — the protected home and its summary feed.
//!
//! Rendering stays with the client; this module only serves the shell and
//! the numbers behind it.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, Json};

use crate::state::AppState;

/// `GET /dashboard` — protected home. The redirect target the gate uses for
/// signed-in users landing on the login page.
pub async fn home() -> Html<&'static str> {
    Html(
        r#"<!doctype html>
<html>
<head><title>orderdesk</title></head>
<body>
<h1>orderdesk</h1>
<nav>
  <a href="/api/orders">Orders</a>
  <a href="/api/products">Products</a>
  <a href="/api/couriers">Couriers</a>
  <a href="/api/customers">Customers</a>
</nav>
<form method="post" action="/logout"><button type="submit">Sign out</button></form>
</body>
</html>
"#,
    )
}

/// `GET /api/dashboard/summary` — active entity counts and orders by status.
pub async fn summary(State(state): State<AppState>) -> Result<Json<serde_json::Value>, StatusCode> {
    let products = count_active(&state.pool, "SELECT count(*) FROM products WHERE active").await?;
    let couriers = count_active(&state.pool, "SELECT count(*) FROM couriers WHERE active").await?;
    let customers = count_active(&state.pool, "SELECT count(*) FROM customers WHERE active").await?;

    let by_status = sqlx::query_as::<_, (String, i64)>(
        "SELECT status, count(*) FROM orders WHERE active GROUP BY status ORDER BY status",
    )
    .fetch_all(&state.pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "dashboard summary query failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let orders: serde_json::Map<String, serde_json::Value> = by_status
        .into_iter()
        .map(|(status, count)| (status, serde_json::Value::from(count)))
        .collect();

    Ok(Json(serde_json::json!({
        "products": products,
        "couriers": couriers,
        "customers": customers,
        "orders_by_status": orders,
    })))
}

async fn count_active(pool: &sqlx::PgPool, query: &'static str) -> Result<i64, StatusCode> {
    sqlx::query_as::<_, (i64,)>(query)
        .fetch_one(pool)
        .await
        .map(|(count,)| count)
        .map_err(|e| {
            tracing::error!(error = %e, query, "dashboard count query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}
