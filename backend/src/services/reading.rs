//! Reading management service for soil measurements

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::engine::weekly::{aggregate_weekly, WeeklySummary};
use shared::models::{Reading, ReadingOrigin};
use shared::validation::{validate_percentage, validate_ph};

/// Reading service for recording and querying soil measurements
#[derive(Clone)]
pub struct ReadingService {
    db: PgPool,
}

/// Database row for a reading
#[derive(Debug, sqlx::FromRow)]
struct ReadingRow {
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

impl From<ReadingRow> for Reading {
    fn from(row: ReadingRow) -> Self {
        Reading {
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
        }
    }
}

/// Input for recording a reading
#[derive(Debug, Deserialize)]
pub struct CreateReadingInput {
    pub parcel_id: Uuid,
    pub ph: Option<Decimal>,
    pub temperature: Option<Decimal>,
    pub humidity: Option<Decimal>,
    pub nitrogen: Option<Decimal>,
    pub phosphorus: Option<Decimal>,
    pub potassium: Option<Decimal>,
    #[serde(default)]
    pub origin: ReadingOrigin,
}

/// Query filter for listing readings
#[derive(Debug, Default, Deserialize)]
pub struct ReadingFilter {
    pub parcel_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ReadingService {
    /// Create a new ReadingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a reading for a parcel owned by the user.
    ///
    /// Readings are immutable after this point; there is no update path.
    pub async fn create_reading(
        &self,
        user_id: Uuid,
        input: CreateReadingInput,
    ) -> AppResult<Reading> {
        self.ensure_parcel_owned(user_id, input.parcel_id).await?;
        validate_measurements(&input)?;

        let row = sqlx::query_as::<_, ReadingRow>(
            r#"
            INSERT INTO readings (parcel_id, ph, temperature, humidity, nitrogen, phosphorus, potassium, origin)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, parcel_id, recorded_at, ph, temperature, humidity,
                      nitrogen, phosphorus, potassium, origin
            "#,
        )
        .bind(input.parcel_id)
        .bind(input.ph)
        .bind(input.temperature)
        .bind(input.humidity)
        .bind(input.nitrogen)
        .bind(input.phosphorus)
        .bind(input.potassium)
        .bind(input.origin.as_str())
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Get a reading by ID, scoped to the owner of its parcel
    pub async fn get_reading(&self, user_id: Uuid, reading_id: Uuid) -> AppResult<Reading> {
        let row = sqlx::query_as::<_, ReadingRow>(
            r#"
            SELECT r.id, r.parcel_id, r.recorded_at, r.ph, r.temperature, r.humidity,
                   r.nitrogen, r.phosphorus, r.potassium, r.origin
            FROM readings r
            JOIN parcels p ON p.id = r.parcel_id
            WHERE r.id = $1 AND p.user_id = $2
            "#,
        )
        .bind(reading_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Reading".to_string()))?;

        Ok(row.into())
    }

    /// List readings for the user's parcels, newest first, optionally
    /// filtered by parcel and calendar date range
    pub async fn list_readings(
        &self,
        user_id: Uuid,
        filter: ReadingFilter,
    ) -> AppResult<Vec<Reading>> {
        let rows = sqlx::query_as::<_, ReadingRow>(
            r#"
            SELECT r.id, r.parcel_id, r.recorded_at, r.ph, r.temperature, r.humidity,
                   r.nitrogen, r.phosphorus, r.potassium, r.origin
            FROM readings r
            JOIN parcels p ON p.id = r.parcel_id
            WHERE p.user_id = $1
              AND ($2::uuid IS NULL OR r.parcel_id = $2)
              AND ($3::date IS NULL OR r.recorded_at >= $3::date)
              AND ($4::date IS NULL OR r.recorded_at < ($4::date + INTERVAL '1 day'))
            ORDER BY r.recorded_at DESC
            "#,
        )
        .bind(user_id)
        .bind(filter.parcel_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// All readings of one parcel whose timestamp falls inside the week
    /// starting at `week_start` (Monday through Sunday, inclusive)
    pub async fn readings_in_week(
        &self,
        user_id: Uuid,
        parcel_id: Uuid,
        week_start: NaiveDate,
    ) -> AppResult<Vec<Reading>> {
        self.ensure_parcel_owned(user_id, parcel_id).await?;

        let rows = sqlx::query_as::<_, ReadingRow>(
            r#"
            SELECT r.id, r.parcel_id, r.recorded_at, r.ph, r.temperature, r.humidity,
                   r.nitrogen, r.phosphorus, r.potassium, r.origin
            FROM readings r
            WHERE r.parcel_id = $1
              AND r.recorded_at >= $2::date
              AND r.recorded_at < ($2::date + INTERVAL '7 days')
            ORDER BY r.recorded_at ASC
            "#,
        )
        .bind(parcel_id)
        .bind(week_start)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Weekly summaries of a parcel's readings, most recent week first
    pub async fn weekly_summaries(
        &self,
        user_id: Uuid,
        parcel_id: Uuid,
    ) -> AppResult<Vec<WeeklySummary>> {
        self.ensure_parcel_owned(user_id, parcel_id).await?;

        let rows = sqlx::query_as::<_, ReadingRow>(
            r#"
            SELECT id, parcel_id, recorded_at, ph, temperature, humidity,
                   nitrogen, phosphorus, potassium, origin
            FROM readings
            WHERE parcel_id = $1
            ORDER BY recorded_at DESC
            "#,
        )
        .bind(parcel_id)
        .fetch_all(&self.db)
        .await?;

        let readings: Vec<Reading> = rows.into_iter().map(Into::into).collect();
        Ok(aggregate_weekly(&readings))
    }

    async fn ensure_parcel_owned(&self, user_id: Uuid, parcel_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM parcels WHERE id = $1 AND user_id = $2",
        )
        .bind(parcel_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        if exists == 0 {
            return Err(AppError::NotFound("Parcel".to_string()));
        }

        Ok(())
    }
}

/// Range checks for the measurement fields that have physical bounds
fn validate_measurements(input: &CreateReadingInput) -> AppResult<()> {
    if let Some(ph) = input.ph {
        validate_ph(ph).map_err(|msg| AppError::Validation {
            field: "ph".to_string(),
            message: msg.to_string(),
            message_es: "El pH debe estar entre 0 y 14".to_string(),
        })?;
    }

    if let Some(humidity) = input.humidity {
        validate_percentage(humidity).map_err(|msg| AppError::Validation {
            field: "humidity".to_string(),
            message: msg.to_string(),
            message_es: "La humedad debe estar entre 0 y 100".to_string(),
        })?;
    }

    Ok(())
}
