//! Reading management HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::reading::{CreateReadingInput, ReadingFilter, ReadingService};
use crate::services::report::ReportService;
use crate::AppState;

/// Query parameters for weekly summaries
#[derive(Debug, Deserialize)]
pub struct WeeklySummariesQuery {
    pub parcel_id: Uuid,
}

/// Query parameters for the CSV export
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub parcel_id: Option<Uuid>,
}

/// List readings, optionally filtered by parcel and date range
pub async fn list_readings(
    State(state): State<AppState>,
    CurrentUser(current_user): CurrentUser,
    Query(filter): Query<ReadingFilter>,
) -> impl IntoResponse {
    let service = ReadingService::new(state.db.clone());

    match service.list_readings(current_user.user_id, filter).await {
        Ok(readings) => {
            (StatusCode::OK, Json(serde_json::json!({ "readings": readings }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a specific reading
pub async fn get_reading(
    State(state): State<AppState>,
    CurrentUser(current_user): CurrentUser,
    Path(reading_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ReadingService::new(state.db.clone());

    match service.get_reading(current_user.user_id, reading_id).await {
        Ok(reading) => (StatusCode::OK, Json(reading)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a manual reading
pub async fn create_reading(
    State(state): State<AppState>,
    CurrentUser(current_user): CurrentUser,
    Json(input): Json<CreateReadingInput>,
) -> impl IntoResponse {
    let service = ReadingService::new(state.db.clone());

    match service.create_reading(current_user.user_id, input).await {
        Ok(reading) => (StatusCode::CREATED, Json(reading)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Weekly summaries of a parcel's readings, most recent week first
pub async fn get_weekly_summaries(
    State(state): State<AppState>,
    CurrentUser(current_user): CurrentUser,
    Query(query): Query<WeeklySummariesQuery>,
) -> impl IntoResponse {
    let service = ReadingService::new(state.db.clone());

    match service
        .weekly_summaries(current_user.user_id, query.parcel_id)
        .await
    {
        Ok(summaries) => {
            (StatusCode::OK, Json(serde_json::json!({ "weeks": summaries }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Export readings as CSV
pub async fn export_readings(
    State(state): State<AppState>,
    CurrentUser(current_user): CurrentUser,
    Query(query): Query<ExportQuery>,
) -> impl IntoResponse {
    let service = ReportService::new(state.db.clone());

    match service
        .export_readings_csv(current_user.user_id, query.parcel_id)
        .await
    {
        Ok(csv_data) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"readings.csv\"",
                ),
            ],
            csv_data,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
