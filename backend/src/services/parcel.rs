//! Parcel management service for land parcel operations

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{ClimateZone, Crop, Parcel, SoilType};

/// Parcel service for managing land parcels
#[derive(Clone)]
pub struct ParcelService {
    db: PgPool,
}

/// Database row for a parcel; enums travel as their display names
#[derive(Debug, sqlx::FromRow)]
struct ParcelRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    area_hectares: Decimal,
    zone: String,
    soil_type: String,
    current_crop: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ParcelRow> for Parcel {
    fn from(row: ParcelRow) -> Self {
        Parcel {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            area_hectares: row.area_hectares,
            zone: ClimateZone::from_name(&row.zone),
            soil_type: SoilType::from_name(&row.soil_type),
            current_crop: row.current_crop.map(|c| Crop::from_name(&c)),
            created_at: row.created_at,
        }
    }
}

/// Input for creating a parcel
#[derive(Debug, Deserialize)]
pub struct CreateParcelInput {
    pub name: String,
    pub area_hectares: Decimal,
    pub zone: ClimateZone,
    pub soil_type: SoilType,
    pub current_crop: Option<Crop>,
}

/// Input for updating a parcel
#[derive(Debug, Deserialize)]
pub struct UpdateParcelInput {
    pub name: Option<String>,
    pub area_hectares: Option<Decimal>,
    pub zone: Option<ClimateZone>,
    pub soil_type: Option<SoilType>,
    pub current_crop: Option<Crop>,
}

impl ParcelService {
    /// Create a new ParcelService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all parcels owned by a user, ordered by zone then name
    pub async fn get_parcels(&self, user_id: Uuid) -> AppResult<Vec<Parcel>> {
        let rows = sqlx::query_as::<_, ParcelRow>(
            r#"
            SELECT id, user_id, name, area_hectares, zone, soil_type, current_crop, created_at
            FROM parcels
            WHERE user_id = $1
            ORDER BY zone ASC, name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a parcel by ID, scoped to its owner
    pub async fn get_parcel(&self, user_id: Uuid, parcel_id: Uuid) -> AppResult<Parcel> {
        let row = sqlx::query_as::<_, ParcelRow>(
            r#"
            SELECT id, user_id, name, area_hectares, zone, soil_type, current_crop, created_at
            FROM parcels
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(parcel_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Parcel".to_string()))?;

        Ok(row.into())
    }

    /// Create a new parcel
    pub async fn create_parcel(
        &self,
        user_id: Uuid,
        input: CreateParcelInput,
    ) -> AppResult<Parcel> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Parcel name cannot be empty".to_string(),
                message_es: "El nombre del predio no puede estar vacío".to_string(),
            });
        }

        if input.area_hectares <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "area_hectares".to_string(),
                message: "Area must be greater than zero hectares".to_string(),
                message_es: "La superficie debe ser mayor que cero hectáreas".to_string(),
            });
        }

        // Check for duplicate name
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM parcels WHERE user_id = $1 AND LOWER(name) = LOWER($2)",
        )
        .bind(user_id)
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::Conflict {
                resource: "parcel".to_string(),
                message: "A parcel with this name already exists".to_string(),
                message_es: "Ya existe un predio con este nombre".to_string(),
            });
        }

        let row = sqlx::query_as::<_, ParcelRow>(
            r#"
            INSERT INTO parcels (user_id, name, area_hectares, zone, soil_type, current_crop)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, name, area_hectares, zone, soil_type, current_crop, created_at
            "#,
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(input.area_hectares)
        .bind(input.zone.name())
        .bind(input.soil_type.name())
        .bind(input.current_crop.as_ref().map(|c| c.name().to_string()))
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Update a parcel; only the owner may modify it
    pub async fn update_parcel(
        &self,
        user_id: Uuid,
        parcel_id: Uuid,
        input: UpdateParcelInput,
    ) -> AppResult<Parcel> {
        let existing = self.get_parcel(user_id, parcel_id).await?;

        if let Some(ref name) = input.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation {
                    field: "name".to_string(),
                    message: "Parcel name cannot be empty".to_string(),
                    message_es: "El nombre del predio no puede estar vacío".to_string(),
                });
            }

            let duplicate = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM parcels WHERE user_id = $1 AND LOWER(name) = LOWER($2) AND id != $3",
            )
            .bind(user_id)
            .bind(name)
            .bind(parcel_id)
            .fetch_one(&self.db)
            .await?;

            if duplicate > 0 {
                return Err(AppError::Conflict {
                    resource: "parcel".to_string(),
                    message: "A parcel with this name already exists".to_string(),
                    message_es: "Ya existe un predio con este nombre".to_string(),
                });
            }
        }

        if let Some(area) = input.area_hectares {
            if area <= Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "area_hectares".to_string(),
                    message: "Area must be greater than zero hectares".to_string(),
                    message_es: "La superficie debe ser mayor que cero hectáreas".to_string(),
                });
            }
        }

        let name = input.name.unwrap_or(existing.name);
        let area_hectares = input.area_hectares.unwrap_or(existing.area_hectares);
        let zone = input.zone.unwrap_or(existing.zone);
        let soil_type = input.soil_type.unwrap_or(existing.soil_type);
        let current_crop = input.current_crop.or(existing.current_crop);

        let row = sqlx::query_as::<_, ParcelRow>(
            r#"
            UPDATE parcels
            SET name = $1, area_hectares = $2, zone = $3, soil_type = $4, current_crop = $5
            WHERE id = $6 AND user_id = $7
            RETURNING id, user_id, name, area_hectares, zone, soil_type, current_crop, created_at
            "#,
        )
        .bind(&name)
        .bind(area_hectares)
        .bind(zone.name())
        .bind(soil_type.name())
        .bind(current_crop.as_ref().map(|c| c.name().to_string()))
        .bind(parcel_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Delete a parcel; its readings and recommendations cascade with it
    pub async fn delete_parcel(&self, user_id: Uuid, parcel_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM parcels WHERE id = $1 AND user_id = $2")
            .bind(parcel_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Parcel".to_string()));
        }

        Ok(())
    }
}
