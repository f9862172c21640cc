//! Product catalog service — CRUD with soft delete.
//!
//! Rows are never removed: deactivation flips `active` and every query
//! filters on it, so historical orders keep their product references.

use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("product not found: {0}")]
    NotFound(Uuid),
    #[error("{0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Row returned from product queries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub price_cents: i64,
    pub stock: i32,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub price_cents: i64,
    #[serde(default)]
    pub stock: i32,
}

/// Partial update. `None` fields keep their current value.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub price_cents: Option<i64>,
    pub stock: Option<i32>,
}

pub(crate) fn validate_new(product: &NewProduct) -> Result<(), ProductError> {
    validate_name(&product.name)?;
    validate_sku(&product.sku)?;
    validate_amounts(product.price_cents, product.stock)
}

pub(crate) fn validate_name(name: &str) -> Result<(), ProductError> {
    if name.trim().is_empty() {
        return Err(ProductError::Invalid("product name must not be empty".into()));
    }
    Ok(())
}

pub(crate) fn validate_sku(sku: &str) -> Result<(), ProductError> {
    let sku = sku.trim();
    if sku.is_empty() || sku.chars().any(char::is_whitespace) {
        return Err(ProductError::Invalid("sku must be a non-empty token".into()));
    }
    Ok(())
}

pub(crate) fn validate_amounts(price_cents: i64, stock: i32) -> Result<(), ProductError> {
    if price_cents < 0 {
        return Err(ProductError::Invalid("price must not be negative".into()));
    }
    if stock < 0 {
        return Err(ProductError::Invalid("stock must not be negative".into()));
    }
    Ok(())
}

/// Create a product.
///
/// # Errors
///
/// Returns `Invalid` on a rejected field, or a database error (e.g. a
/// duplicate sku violating the unique constraint).
pub async fn create(pool: &PgPool, new: &NewProduct) -> Result<ProductRow, ProductError> {
    validate_new(new)?;

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO products (id, name, sku, price_cents, stock) VALUES ($1, $2, $3, $4, $5)")
        .bind(id)
        .bind(new.name.trim())
        .bind(new.sku.trim())
        .bind(new.price_cents)
        .bind(new.stock)
        .execute(pool)
        .await?;

    Ok(ProductRow {
        id,
        name: new.name.trim().to_owned(),
        sku: new.sku.trim().to_owned(),
        price_cents: new.price_cents,
        stock: new.stock,
    })
}

/// List active products.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list(pool: &PgPool) -> Result<Vec<ProductRow>, ProductError> {
    let rows = sqlx::query_as::<_, (Uuid, String, String, i64, i32)>(
        "SELECT id, name, sku, price_cents, stock
         FROM products
         WHERE active
         ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, sku, price_cents, stock)| ProductRow { id, name, sku, price_cents, stock })
        .collect())
}

/// Fetch one active product.
///
/// # Errors
///
/// Returns `NotFound` for unknown or deactivated ids.
pub async fn get(pool: &PgPool, id: Uuid) -> Result<ProductRow, ProductError> {
    let row = sqlx::query_as::<_, (Uuid, String, String, i64, i32)>(
        "SELECT id, name, sku, price_cents, stock FROM products WHERE id = $1 AND active",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(|(id, name, sku, price_cents, stock)| ProductRow { id, name, sku, price_cents, stock })
        .ok_or(ProductError::NotFound(id))
}

/// Patch an active product. Absent fields are left untouched.
///
/// # Errors
///
/// Returns `Invalid` on a rejected field or `NotFound` for unknown ids.
pub async fn update(pool: &PgPool, id: Uuid, patch: &ProductPatch) -> Result<ProductRow, ProductError> {
    if let Some(name) = &patch.name {
        validate_name(name)?;
    }
    if let Some(sku) = &patch.sku {
        validate_sku(sku)?;
    }
    validate_amounts(patch.price_cents.unwrap_or(0), patch.stock.unwrap_or(0))?;

    let row = sqlx::query_as::<_, (Uuid, String, String, i64, i32)>(
        "UPDATE products
         SET name = COALESCE($2, name),
             sku = COALESCE($3, sku),
             price_cents = COALESCE($4, price_cents),
             stock = COALESCE($5, stock)
         WHERE id = $1 AND active
         RETURNING id, name, sku, price_cents, stock",
    )
    .bind(id)
    .bind(patch.name.as_deref().map(str::trim))
    .bind(patch.sku.as_deref().map(str::trim))
    .bind(patch.price_cents)
    .bind(patch.stock)
    .fetch_optional(pool)
    .await?;

    row.map(|(id, name, sku, price_cents, stock)| ProductRow { id, name, sku, price_cents, stock })
        .ok_or(ProductError::NotFound(id))
}

/// Soft-delete: flip `active` off. The row stays for order history.
///
/// # Errors
///
/// Returns `NotFound` when the product is unknown or already inactive.
pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<(), ProductError> {
    let row = sqlx::query("UPDATE products SET active = false WHERE id = $1 AND active RETURNING id")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    if row.is_none() {
        return Err(ProductError::NotFound(id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "products_test.rs"]
mod tests;
