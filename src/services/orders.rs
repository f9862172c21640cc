//! Order service — CRUD, line items, and the production workflow.
//!
//! DESIGN
//! ======
//! An order moves through a closed status set: pending → in_production →
//! ready → delivered, with cancelled reachable from any non-terminal state.
//! Transitions are validated here, not in the routes, so every caller gets
//! the same workflow. Like every other entity, orders are soft-deleted.

use sqlx::PgPool;
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("order not found: {0}")]
    NotFound(Uuid),
    #[error("{0}")]
    Invalid(String),
    #[error("order is {current}; cannot move to {requested}")]
    BadTransition { current: OrderStatus, requested: OrderStatus },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Production workflow states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    InProduction,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProduction => "in_production",
            Self::Ready => "ready",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub fn from_str(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "in_production" => Some(Self::InProduction),
            "ready" => Some(Self::Ready),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether the workflow permits moving from `self` to `next`.
    /// Delivered and cancelled are terminal.
    #[must_use]
    pub fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProduction | Self::Cancelled)
                | (Self::InProduction, Self::Ready | Self::Cancelled)
                | (Self::Ready, Self::Delivered | Self::Cancelled)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct OrderRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub courier_id: Option<Uuid>,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct OrderItemRow {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: OrderRow,
    pub items: Vec<OrderItemRow>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewOrder {
    pub customer_id: Uuid,
    pub courier_id: Option<Uuid>,
    pub notes: Option<String>,
    pub items: Vec<NewOrderItem>,
}

/// Partial update for the mutable non-workflow fields.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct OrderPatch {
    pub courier_id: Option<Uuid>,
    pub notes: Option<String>,
}

pub(crate) fn validate_items(items: &[NewOrderItem]) -> Result<(), OrderError> {
    if items.is_empty() {
        return Err(OrderError::Invalid("order needs at least one line item".into()));
    }
    if items.iter().any(|item| item.quantity <= 0) {
        return Err(OrderError::Invalid("line item quantity must be positive".into()));
    }
    Ok(())
}

// =============================================================================
// CRUD
// =============================================================================

/// Create an order with its line items in one transaction.
///
/// # Errors
///
/// Returns `Invalid` for an empty or malformed item list, or a database
/// error (e.g. an unknown customer/product violating a foreign key).
pub async fn create(pool: &PgPool, new: &NewOrder) -> Result<OrderDetail, OrderError> {
    validate_items(&new.items)?;

    let mut tx = pool.begin().await?;

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO orders (id, customer_id, courier_id, status, notes) VALUES ($1, $2, $3, $4, $5)")
        .bind(id)
        .bind(new.customer_id)
        .bind(new.courier_id)
        .bind(OrderStatus::Pending.as_str())
        .bind(&new.notes)
        .execute(&mut *tx)
        .await?;

    for item in &new.items {
        sqlx::query("INSERT INTO order_items (order_id, product_id, quantity) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    get(pool, id).await
}

/// List active orders, newest first, optionally filtered to one status.
///
/// # Errors
///
/// Returns `Invalid` for an unknown status filter, or a database error.
pub async fn list(pool: &PgPool, status: Option<&str>) -> Result<Vec<OrderRow>, OrderError> {
    let status = match status {
        None => None,
        Some(raw) => Some(
            OrderStatus::from_str(raw)
                .ok_or_else(|| OrderError::Invalid(format!("unknown status: {raw}")))?,
        ),
    };

    let rows = sqlx::query_as::<_, (Uuid, Uuid, String, Option<Uuid>, String, Option<String>)>(
        "SELECT o.id, o.customer_id, c.name, o.courier_id, o.status, o.notes
         FROM orders o
         JOIN customers c ON c.id = o.customer_id
         WHERE o.active AND ($1::text IS NULL OR o.status = $1)
         ORDER BY o.created_at DESC",
    )
    .bind(status.map(OrderStatus::as_str))
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, customer_id, customer_name, courier_id, status, notes)| OrderRow {
            id,
            customer_id,
            customer_name,
            courier_id,
            status,
            notes,
        })
        .collect())
}

/// Fetch one active order with its line items.
///
/// # Errors
///
/// Returns `NotFound` for unknown or deactivated ids.
pub async fn get(pool: &PgPool, id: Uuid) -> Result<OrderDetail, OrderError> {
    let row = sqlx::query_as::<_, (Uuid, Uuid, String, Option<Uuid>, String, Option<String>)>(
        "SELECT o.id, o.customer_id, c.name, o.courier_id, o.status, o.notes
         FROM orders o
         JOIN customers c ON c.id = o.customer_id
         WHERE o.id = $1 AND o.active",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some((id, customer_id, customer_name, courier_id, status, notes)) = row else {
        return Err(OrderError::NotFound(id));
    };

    let items = sqlx::query_as::<_, (Uuid, String, i32)>(
        "SELECT i.product_id, p.name, i.quantity
         FROM order_items i
         JOIN products p ON p.id = i.product_id
         WHERE i.order_id = $1",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(OrderDetail {
        order: OrderRow { id, customer_id, customer_name, courier_id, status, notes },
        items: items
            .into_iter()
            .map(|(product_id, product_name, quantity)| OrderItemRow { product_id, product_name, quantity })
            .collect(),
    })
}

/// Patch courier assignment and notes. Workflow state moves only through
/// [`set_status`].
///
/// # Errors
///
/// Returns `NotFound` for unknown or deactivated ids.
pub async fn update(pool: &PgPool, id: Uuid, patch: &OrderPatch) -> Result<OrderDetail, OrderError> {
    let row = sqlx::query(
        "UPDATE orders
         SET courier_id = COALESCE($2, courier_id),
             notes = COALESCE($3, notes)
         WHERE id = $1 AND active
         RETURNING id",
    )
    .bind(id)
    .bind(patch.courier_id)
    .bind(&patch.notes)
    .fetch_optional(pool)
    .await?;

    if row.is_none() {
        return Err(OrderError::NotFound(id));
    }
    get(pool, id).await
}

/// Move an order through the production workflow.
///
/// # Errors
///
/// Returns `Invalid` for an unknown status name, `BadTransition` when the
/// workflow forbids the move, or `NotFound` for unknown ids.
pub async fn set_status(pool: &PgPool, id: Uuid, requested: &str) -> Result<OrderDetail, OrderError> {
    let requested =
        OrderStatus::from_str(requested).ok_or_else(|| OrderError::Invalid(format!("unknown status: {requested}")))?;

    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, (String,)>("SELECT status FROM orders WHERE id = $1 AND active FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

    let Some((current,)) = current else {
        return Err(OrderError::NotFound(id));
    };
    let current = OrderStatus::from_str(&current)
        .ok_or_else(|| OrderError::Invalid(format!("order has unknown status: {current}")))?;

    if !current.can_transition(requested) {
        return Err(OrderError::BadTransition { current, requested });
    }

    sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
        .bind(id)
        .bind(requested.as_str())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    get(pool, id).await
}

/// Soft-delete an order (removes it from the dashboard; distinct from the
/// cancelled business state, which keeps the order visible).
///
/// # Errors
///
/// Returns `NotFound` when the order is unknown or already inactive.
pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<(), OrderError> {
    let row = sqlx::query("UPDATE orders SET active = false WHERE id = $1 AND active RETURNING id")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    if row.is_none() {
        return Err(OrderError::NotFound(id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "orders_test.rs"]
mod tests;
