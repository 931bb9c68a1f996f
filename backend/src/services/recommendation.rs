//! Recommendation service: computes fertilizer dosage plans and persists
//! them under their idempotent keys.
//!
//! A recommendation is keyed either to a single reading or to a
//! (parcel, week-start) pair. Recomputing replaces the stored row through a
//! single atomic upsert; the uniqueness constraints live in the database, so
//! two concurrent recomputes for the same key serialize there instead of in
//! process. A failed computation never touches a previously stored row.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::engine::weekly::{sample_means, week_start};
use shared::engine::{compute_recommendation, DosagePlan, EngineError, SoilSample};
use shared::models::{ClimateZone, Crop, Parcel, Reading, ReadingOrigin, Recommendation, SoilType};

/// Recommendation service
#[derive(Clone)]
pub struct RecommendationService {
    db: PgPool,
}

/// Database row for a recommendation
#[derive(Debug, sqlx::FromRow)]
struct RecommendationRow {
    id: Uuid,
    reading_id: Option<Uuid>,
    parcel_id: Uuid,
    week_start: Option<NaiveDate>,
    computed_at: DateTime<Utc>,
    ph_avg: Option<Decimal>,
    temperature_avg: Option<Decimal>,
    humidity_avg: Option<Decimal>,
    nitrogen_avg: Option<Decimal>,
    phosphorus_avg: Option<Decimal>,
    potassium_avg: Option<Decimal>,
    urea_kg_ha: Decimal,
    triple_superphosphate_kg_ha: Decimal,
    potash_kg_ha: Decimal,
    lime_kg_ha: Decimal,
    urea_total_kg: Decimal,
    triple_superphosphate_total_kg: Decimal,
    potash_total_kg: Decimal,
    lime_total_kg: Decimal,
    zone_factor: Decimal,
    soil_factor: Decimal,
    precipitation_factor: Decimal,
}

impl From<RecommendationRow> for Recommendation {
    fn from(row: RecommendationRow) -> Self {
        Recommendation {
            id: row.id,
            reading_id: row.reading_id,
            parcel_id: row.parcel_id,
            week_start: row.week_start,
            computed_at: row.computed_at,
            ph_avg: row.ph_avg,
            temperature_avg: row.temperature_avg,
            humidity_avg: row.humidity_avg,
            nitrogen_avg: row.nitrogen_avg,
            phosphorus_avg: row.phosphorus_avg,
            potassium_avg: row.potassium_avg,
            urea_kg_ha: row.urea_kg_ha,
            triple_superphosphate_kg_ha: row.triple_superphosphate_kg_ha,
            potash_kg_ha: row.potash_kg_ha,
            lime_kg_ha: row.lime_kg_ha,
            urea_total_kg: row.urea_total_kg,
            triple_superphosphate_total_kg: row.triple_superphosphate_total_kg,
            potash_total_kg: row.potash_total_kg,
            lime_total_kg: row.lime_total_kg,
            zone_factor: row.zone_factor,
            soil_factor: row.soil_factor,
            precipitation_factor: row.precipitation_factor,
        }
    }
}

/// Parcel fields the engine needs, joined through the ownership check
#[derive(Debug, sqlx::FromRow)]
struct EngineParcelRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    area_hectares: Decimal,
    zone: String,
    soil_type: String,
    current_crop: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<EngineParcelRow> for Parcel {
    fn from(row: EngineParcelRow) -> Self {
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

#[derive(Debug, sqlx::FromRow)]
struct EngineReadingRow {
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

impl From<EngineReadingRow> for Reading {
    fn from(row: EngineReadingRow) -> Self {
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

impl RecommendationService {
    /// Create a new RecommendationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List recommendations across the user's parcels, newest first
    pub async fn list_recommendations(&self, user_id: Uuid) -> AppResult<Vec<Recommendation>> {
        let rows = sqlx::query_as::<_, RecommendationRow>(
            r#"
            SELECT rec.id, rec.reading_id, rec.parcel_id, rec.week_start, rec.computed_at,
                   rec.ph_avg, rec.temperature_avg, rec.humidity_avg,
                   rec.nitrogen_avg, rec.phosphorus_avg, rec.potassium_avg,
                   rec.urea_kg_ha, rec.triple_superphosphate_kg_ha, rec.potash_kg_ha, rec.lime_kg_ha,
                   rec.urea_total_kg, rec.triple_superphosphate_total_kg,
                   rec.potash_total_kg, rec.lime_total_kg,
                   rec.zone_factor, rec.soil_factor, rec.precipitation_factor
            FROM recommendations rec
            JOIN parcels p ON p.id = rec.parcel_id
            WHERE p.user_id = $1
            ORDER BY rec.computed_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a recommendation by ID, scoped to the owner
    pub async fn get_recommendation(
        &self,
        user_id: Uuid,
        recommendation_id: Uuid,
    ) -> AppResult<Recommendation> {
        let row = sqlx::query_as::<_, RecommendationRow>(
            r#"
            SELECT rec.id, rec.reading_id, rec.parcel_id, rec.week_start, rec.computed_at,
                   rec.ph_avg, rec.temperature_avg, rec.humidity_avg,
                   rec.nitrogen_avg, rec.phosphorus_avg, rec.potassium_avg,
                   rec.urea_kg_ha, rec.triple_superphosphate_kg_ha, rec.potash_kg_ha, rec.lime_kg_ha,
                   rec.urea_total_kg, rec.triple_superphosphate_total_kg,
                   rec.potash_total_kg, rec.lime_total_kg,
                   rec.zone_factor, rec.soil_factor, rec.precipitation_factor
            FROM recommendations rec
            JOIN parcels p ON p.id = rec.parcel_id
            WHERE rec.id = $1 AND p.user_id = $2
            "#,
        )
        .bind(recommendation_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recommendation".to_string()))?;

        Ok(row.into())
    }

    /// Compute and store the recommendation for a single reading.
    ///
    /// Replaces any previous recommendation for the same reading; the
    /// reading must carry N, P, K (pH is separately required for lime).
    pub async fn upsert_for_reading(
        &self,
        user_id: Uuid,
        reading_id: Uuid,
    ) -> AppResult<Recommendation> {
        let reading = self.fetch_reading(user_id, reading_id).await?;
        let parcel = self.fetch_parcel(user_id, reading.parcel_id).await?;

        let sample = SoilSample::from_reading(&reading);
        require_npk(&sample)?;

        let plan = compute_recommendation(&sample, &parcel).map_err(engine_error)?;
        let week = week_start(reading.recorded_at);

        self.upsert(
            Some(reading.id),
            parcel.id,
            Some(week),
            &sample,
            &plan,
            "reading",
        )
        .await
    }

    /// Compute and store the weekly recommendation for a parcel.
    ///
    /// Averages the readings recorded between `week_start` and
    /// `week_start + 6 days` inclusive and feeds the means through the same
    /// calculation as a single reading. Replaces any previous recommendation
    /// for the same (parcel, week) pair.
    pub async fn upsert_for_week(
        &self,
        user_id: Uuid,
        parcel_id: Uuid,
        week: NaiveDate,
    ) -> AppResult<Recommendation> {
        let parcel = self.fetch_parcel(user_id, parcel_id).await?;
        let readings = self.fetch_week_readings(parcel_id, week).await?;

        if readings.is_empty() {
            return Err(AppError::NoDataInWindow);
        }

        let sample = sample_means(readings.iter());
        require_npk(&sample)?;

        let plan = compute_recommendation(&sample, &parcel).map_err(engine_error)?;

        self.upsert(None, parcel.id, Some(week), &sample, &plan, "week")
            .await
    }

    /// Single-statement atomic replace keyed on the reading or on the
    /// (parcel, week) pair; a unique-violation race is retried once
    async fn upsert(
        &self,
        reading_id: Option<Uuid>,
        parcel_id: Uuid,
        week: Option<NaiveDate>,
        sample: &SoilSample,
        plan: &DosagePlan,
        key_kind: &str,
    ) -> AppResult<Recommendation> {
        match self
            .execute_upsert(reading_id, parcel_id, week, sample, plan)
            .await
        {
            Ok(row) => Ok(row.into()),
            Err(e) if is_unique_violation(&e) => {
                tracing::warn!("Recommendation upsert hit a concurrent insert, retrying once");
                self.execute_upsert(reading_id, parcel_id, week, sample, plan)
                    .await
                    .map(Into::into)
                    .map_err(|_| AppError::PersistenceConflict(key_kind.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn execute_upsert(
        &self,
        reading_id: Option<Uuid>,
        parcel_id: Uuid,
        week: Option<NaiveDate>,
        sample: &SoilSample,
        plan: &DosagePlan,
    ) -> Result<RecommendationRow, sqlx::Error> {
        let conflict_clause = if reading_id.is_some() {
            "ON CONFLICT (reading_id)"
        } else {
            "ON CONFLICT (parcel_id, week_start) WHERE reading_id IS NULL"
        };

        let sql = format!(
            r#"
            INSERT INTO recommendations (
                reading_id, parcel_id, week_start,
                ph_avg, temperature_avg, humidity_avg, nitrogen_avg, phosphorus_avg, potassium_avg,
                urea_kg_ha, triple_superphosphate_kg_ha, potash_kg_ha, lime_kg_ha,
                urea_total_kg, triple_superphosphate_total_kg, potash_total_kg, lime_total_kg,
                zone_factor, soil_factor, precipitation_factor
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            {conflict_clause} DO UPDATE SET
                week_start = EXCLUDED.week_start,
                ph_avg = EXCLUDED.ph_avg,
                temperature_avg = EXCLUDED.temperature_avg,
                humidity_avg = EXCLUDED.humidity_avg,
                nitrogen_avg = EXCLUDED.nitrogen_avg,
                phosphorus_avg = EXCLUDED.phosphorus_avg,
                potassium_avg = EXCLUDED.potassium_avg,
                urea_kg_ha = EXCLUDED.urea_kg_ha,
                triple_superphosphate_kg_ha = EXCLUDED.triple_superphosphate_kg_ha,
                potash_kg_ha = EXCLUDED.potash_kg_ha,
                lime_kg_ha = EXCLUDED.lime_kg_ha,
                urea_total_kg = EXCLUDED.urea_total_kg,
                triple_superphosphate_total_kg = EXCLUDED.triple_superphosphate_total_kg,
                potash_total_kg = EXCLUDED.potash_total_kg,
                lime_total_kg = EXCLUDED.lime_total_kg,
                zone_factor = EXCLUDED.zone_factor,
                soil_factor = EXCLUDED.soil_factor,
                precipitation_factor = EXCLUDED.precipitation_factor,
                computed_at = NOW()
            RETURNING id, reading_id, parcel_id, week_start, computed_at,
                      ph_avg, temperature_avg, humidity_avg,
                      nitrogen_avg, phosphorus_avg, potassium_avg,
                      urea_kg_ha, triple_superphosphate_kg_ha, potash_kg_ha, lime_kg_ha,
                      urea_total_kg, triple_superphosphate_total_kg, potash_total_kg, lime_total_kg,
                      zone_factor, soil_factor, precipitation_factor
            "#
        );

        sqlx::query_as::<_, RecommendationRow>(&sql)
            .bind(reading_id)
            .bind(parcel_id)
            .bind(week)
            .bind(sample.ph)
            .bind(sample.temperature)
            .bind(sample.humidity)
            .bind(sample.nitrogen)
            .bind(sample.phosphorus)
            .bind(sample.potassium)
            .bind(plan.urea_kg_ha)
            .bind(plan.triple_superphosphate_kg_ha)
            .bind(plan.potash_kg_ha)
            .bind(plan.lime_kg_ha)
            .bind(plan.urea_total_kg)
            .bind(plan.triple_superphosphate_total_kg)
            .bind(plan.potash_total_kg)
            .bind(plan.lime_total_kg)
            .bind(plan.zone_factor)
            .bind(plan.soil_factor)
            .bind(plan.precipitation_factor)
            .fetch_one(&self.db)
            .await
    }

    async fn fetch_parcel(&self, user_id: Uuid, parcel_id: Uuid) -> AppResult<Parcel> {
        let row = sqlx::query_as::<_, EngineParcelRow>(
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

    async fn fetch_reading(&self, user_id: Uuid, reading_id: Uuid) -> AppResult<Reading> {
        let row = sqlx::query_as::<_, EngineReadingRow>(
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

    async fn fetch_week_readings(
        &self,
        parcel_id: Uuid,
        week: NaiveDate,
    ) -> AppResult<Vec<Reading>> {
        let rows = sqlx::query_as::<_, EngineReadingRow>(
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
        .bind(week)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// N, P, and K must all be present (or have a mean) before the engine runs;
/// the error names the first missing nutrient so the caller can fix its input
fn require_npk(sample: &SoilSample) -> AppResult<()> {
    let missing = if sample.nitrogen.is_none() {
        Some(("nitrogen", "nitrógeno"))
    } else if sample.phosphorus.is_none() {
        Some(("phosphorus", "fósforo"))
    } else if sample.potassium.is_none() {
        Some(("potassium", "potasio"))
    } else if sample.ph.is_none() {
        Some(("ph", "pH"))
    } else {
        None
    };

    if let Some((field, name_es)) = missing {
        return Err(AppError::InputIncomplete {
            field: field.to_string(),
            message: format!(
                "A value for {} is required to compute a recommendation",
                field
            ),
            message_es: format!(
                "Se requiere un valor de {} para generar la recomendación",
                name_es
            ),
        });
    }

    Ok(())
}

fn engine_error(e: EngineError) -> AppError {
    match e {
        EngineError::MissingPh => AppError::InputIncomplete {
            field: "ph".to_string(),
            message: "A pH value is required for the lime calculation".to_string(),
            message_es: "Se requiere un valor de pH para el cálculo de cal".to_string(),
        },
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    )
}
