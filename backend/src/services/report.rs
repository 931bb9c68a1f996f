//! Reporting service for data export

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Report service
#[derive(Clone)]
pub struct ReportService {
    db: PgPool,
}

/// Flat reading record for CSV export
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ReadingExportRow {
    pub parcel_name: String,
    pub recorded_at: DateTime<Utc>,
    pub ph: Option<Decimal>,
    pub temperature: Option<Decimal>,
    pub humidity: Option<Decimal>,
    pub nitrogen: Option<Decimal>,
    pub phosphorus: Option<Decimal>,
    pub potassium: Option<Decimal>,
    pub origin: String,
}

impl ReportService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Export the readings of one parcel (or all of the user's parcels) as CSV
    pub async fn export_readings_csv(
        &self,
        user_id: Uuid,
        parcel_id: Option<Uuid>,
    ) -> AppResult<String> {
        let rows = sqlx::query_as::<_, ReadingExportRow>(
            r#"
            SELECT p.name AS parcel_name, r.recorded_at, r.ph, r.temperature, r.humidity,
                   r.nitrogen, r.phosphorus, r.potassium, r.origin
            FROM readings r
            JOIN parcels p ON p.id = r.parcel_id
            WHERE p.user_id = $1
              AND ($2::uuid IS NULL OR r.parcel_id = $2)
            ORDER BY r.recorded_at DESC
            "#,
        )
        .bind(user_id)
        .bind(parcel_id)
        .fetch_all(&self.db)
        .await?;

        Self::export_to_csv(&rows)
    }

    /// Serialize records into a CSV string
    fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization failed: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("CSV encoding error: {}", e)))?;

        Ok(csv_data)
    }
}
