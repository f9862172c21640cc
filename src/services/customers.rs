//! Customer directory service — CRUD with soft delete.

use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    #[error("customer not found: {0}")]
    NotFound(Uuid),
    #[error("{0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CustomerRow {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

fn validate(name: &str, phone: &str) -> Result<(), CustomerError> {
    if name.trim().is_empty() {
        return Err(CustomerError::Invalid("customer name must not be empty".into()));
    }
    if phone.trim().is_empty() {
        return Err(CustomerError::Invalid("customer phone must not be empty".into()));
    }
    Ok(())
}

pub async fn create(pool: &PgPool, new: &NewCustomer) -> Result<CustomerRow, CustomerError> {
    validate(&new.name, &new.phone)?;

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO customers (id, name, phone, address) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(new.name.trim())
        .bind(new.phone.trim())
        .bind(&new.address)
        .execute(pool)
        .await?;

    Ok(CustomerRow {
        id,
        name: new.name.trim().to_owned(),
        phone: new.phone.trim().to_owned(),
        address: new.address.clone(),
    })
}

pub async fn list(pool: &PgPool) -> Result<Vec<CustomerRow>, CustomerError> {
    let rows = sqlx::query_as::<_, (Uuid, String, String, Option<String>)>(
        "SELECT id, name, phone, address FROM customers WHERE active ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, phone, address)| CustomerRow { id, name, phone, address })
        .collect())
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<CustomerRow, CustomerError> {
    let row = sqlx::query_as::<_, (Uuid, String, String, Option<String>)>(
        "SELECT id, name, phone, address FROM customers WHERE id = $1 AND active",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(|(id, name, phone, address)| CustomerRow { id, name, phone, address })
        .ok_or(CustomerError::NotFound(id))
}

pub async fn update(pool: &PgPool, id: Uuid, patch: &CustomerPatch) -> Result<CustomerRow, CustomerError> {
    validate(patch.name.as_deref().unwrap_or("-"), patch.phone.as_deref().unwrap_or("-"))?;

    let row = sqlx::query_as::<_, (Uuid, String, String, Option<String>)>(
        "UPDATE customers
         SET name = COALESCE($2, name),
             phone = COALESCE($3, phone),
             address = COALESCE($4, address)
         WHERE id = $1 AND active
         RETURNING id, name, phone, address",
    )
    .bind(id)
    .bind(patch.name.as_deref().map(str::trim))
    .bind(patch.phone.as_deref().map(str::trim))
    .bind(&patch.address)
    .fetch_optional(pool)
    .await?;

    row.map(|(id, name, phone, address)| CustomerRow { id, name, phone, address })
        .ok_or(CustomerError::NotFound(id))
}

pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<(), CustomerError> {
    let row = sqlx::query("UPDATE customers SET active = false WHERE id = $1 AND active RETURNING id")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    if row.is_none() {
        return Err(CustomerError::NotFound(id));
    }
    Ok(())
}
