//! Courier roster service — CRUD with soft delete.

use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum CourierError {
    #[error("courier not found: {0}")]
    NotFound(Uuid),
    #[error("{0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CourierRow {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub vehicle: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewCourier {
    pub name: String,
    pub phone: String,
    pub vehicle: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct CourierPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub vehicle: Option<String>,
}

fn validate(name: &str, phone: &str) -> Result<(), CourierError> {
    if name.trim().is_empty() {
        return Err(CourierError::Invalid("courier name must not be empty".into()));
    }
    if phone.trim().is_empty() {
        return Err(CourierError::Invalid("courier phone must not be empty".into()));
    }
    Ok(())
}

pub async fn create(pool: &PgPool, new: &NewCourier) -> Result<CourierRow, CourierError> {
    validate(&new.name, &new.phone)?;

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO couriers (id, name, phone, vehicle) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(new.name.trim())
        .bind(new.phone.trim())
        .bind(&new.vehicle)
        .execute(pool)
        .await?;

    Ok(CourierRow {
        id,
        name: new.name.trim().to_owned(),
        phone: new.phone.trim().to_owned(),
        vehicle: new.vehicle.clone(),
    })
}

pub async fn list(pool: &PgPool) -> Result<Vec<CourierRow>, CourierError> {
    let rows = sqlx::query_as::<_, (Uuid, String, String, Option<String>)>(
        "SELECT id, name, phone, vehicle FROM couriers WHERE active ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, phone, vehicle)| CourierRow { id, name, phone, vehicle })
        .collect())
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<CourierRow, CourierError> {
    let row = sqlx::query_as::<_, (Uuid, String, String, Option<String>)>(
        "SELECT id, name, phone, vehicle FROM couriers WHERE id = $1 AND active",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(|(id, name, phone, vehicle)| CourierRow { id, name, phone, vehicle })
        .ok_or(CourierError::NotFound(id))
}

pub async fn update(pool: &PgPool, id: Uuid, patch: &CourierPatch) -> Result<CourierRow, CourierError> {
    validate(patch.name.as_deref().unwrap_or("-"), patch.phone.as_deref().unwrap_or("-"))?;

    let row = sqlx::query_as::<_, (Uuid, String, String, Option<String>)>(
        "UPDATE couriers
         SET name = COALESCE($2, name),
             phone = COALESCE($3, phone),
             vehicle = COALESCE($4, vehicle)
         WHERE id = $1 AND active
         RETURNING id, name, phone, vehicle",
    )
    .bind(id)
    .bind(patch.name.as_deref().map(str::trim))
    .bind(patch.phone.as_deref().map(str::trim))
    .bind(&patch.vehicle)
    .fetch_optional(pool)
    .await?;

    row.map(|(id, name, phone, vehicle)| CourierRow { id, name, phone, vehicle })
        .ok_or(CourierError::NotFound(id))
}

pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<(), CourierError> {
    let row = sqlx::query("UPDATE couriers SET active = false WHERE id = $1 AND active RETURNING id")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    if row.is_none() {
        return Err(CourierError::NotFound(id));
    }
    Ok(())
}
