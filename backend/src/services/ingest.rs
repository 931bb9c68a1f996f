//! Sensor ingest service for field-device readings

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Reading, ReadingOrigin};
use shared::validation::{validate_percentage, validate_ph};

/// Ingest service storing sensor-fed readings
#[derive(Clone)]
pub struct IngestService {
    db: PgPool,
}

/// Payload reported by a field device.
///
/// The probes measure pH, temperature, and humidity; N/P/K are present only
/// on devices with the nutrient module fitted.
#[derive(Debug, Deserialize)]
pub struct SensorPayload {
    pub parcel_id: Uuid,
    pub ph: Option<Decimal>,
    pub temperature: Option<Decimal>,
    pub humidity: Option<Decimal>,
    pub nitrogen: Option<Decimal>,
    pub phosphorus: Option<Decimal>,
    pub potassium: Option<Decimal>,
}

#[derive(Debug, sqlx::FromRow)]
struct InsertedReadingRow {
    id: Uuid,
    parcel_id: Uuid,
    recorded_at: DateTime<Utc>,
    ph: Option<Decimal>,
    temperature: Option<Decimal>,
    humidity: Option<Decimal>,
    nitrogen: Option<Decimal>,
    phosphorus: Option<Decimal>,
    potassium: Option<Decimal>,
    origin: String,
}

impl IngestService {
    /// Create a new IngestService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Store a sensor reading against its parcel
    pub async fn store_sensor_reading(&self, payload: SensorPayload) -> AppResult<Reading> {
        let parcel_exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM parcels WHERE id = $1")
                .bind(payload.parcel_id)
                .fetch_one(&self.db)
                .await?;

        if parcel_exists == 0 {
            return Err(AppError::NotFound("Parcel".to_string()));
        }

        if let Some(ph) = payload.ph {
            validate_ph(ph).map_err(|msg| AppError::Validation {
                field: "ph".to_string(),
                message: msg.to_string(),
                message_es: "El pH debe estar entre 0 y 14".to_string(),
            })?;
        }

        if let Some(humidity) = payload.humidity {
            validate_percentage(humidity).map_err(|msg| AppError::Validation {
                field: "humidity".to_string(),
                message: msg.to_string(),
                message_es: "La humedad debe estar entre 0 y 100".to_string(),
            })?;
        }

        let row = sqlx::query_as::<_, InsertedReadingRow>(
            r#"
            INSERT INTO readings (parcel_id, ph, temperature, humidity, nitrogen, phosphorus, potassium, origin)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'sensor')
            RETURNING id, parcel_id, recorded_at, ph, temperature, humidity,
                      nitrogen, phosphorus, potassium, origin
            "#,
        )
        .bind(payload.parcel_id)
        .bind(payload.ph)
        .bind(payload.temperature)
        .bind(payload.humidity)
        .bind(payload.nitrogen)
        .bind(payload.phosphorus)
        .bind(payload.potassium)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(parcel_id = %row.parcel_id, reading_id = %row.id, "Stored sensor reading");

        Ok(Reading {
            id: row.id,
            parcel_id: row.parcel_id,
            recorded_at: row.recorded_at,
            ph: row.ph,
            temperature: row.temperature,
            humidity: row.humidity,
            nitrogen: row.nitrogen,
            phosphorus: row.phosphorus,
            potassium: row.potassium,
            origin: ReadingOrigin::from_str(&row.origin),
        })
    }
}
