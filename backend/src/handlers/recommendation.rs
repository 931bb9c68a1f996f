//! Recommendation HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::recommendation::RecommendationService;
use crate::AppState;
use shared::engine::SoilSample;
use shared::models::Recommendation;
use shared::validation::{soil_alerts, SoilAlert};

/// Input for computing a recommendation from one reading
#[derive(Debug, Deserialize)]
pub struct RecommendForReadingInput {
    pub reading_id: Uuid,
}

/// Input for computing a weekly recommendation
#[derive(Debug, Deserialize)]
pub struct RecommendForWeekInput {
    pub parcel_id: Uuid,
    pub week_start: NaiveDate,
}

/// Recommendation detail enriched with advisory alerts
#[derive(Debug, Serialize)]
pub struct RecommendationDetail {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub alerts: Vec<SoilAlert>,
}

/// List all recommendations for the current user
pub async fn list_recommendations(
    State(state): State<AppState>,
    CurrentUser(current_user): CurrentUser,
) -> impl IntoResponse {
    let service = RecommendationService::new(state.db.clone());

    match service.list_recommendations(current_user.user_id).await {
        Ok(recommendations) => (
            StatusCode::OK,
            Json(serde_json::json!({ "recommendations": recommendations })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a recommendation with its advisory alerts
pub async fn get_recommendation(
    State(state): State<AppState>,
    CurrentUser(current_user): CurrentUser,
    Path(recommendation_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = RecommendationService::new(state.db.clone());

    match service
        .get_recommendation(current_user.user_id, recommendation_id)
        .await
    {
        Ok(recommendation) => {
            let sample = SoilSample {
                ph: recommendation.ph_avg,
                temperature: recommendation.temperature_avg,
                humidity: recommendation.humidity_avg,
                nitrogen: recommendation.nitrogen_avg,
                phosphorus: recommendation.phosphorus_avg,
                potassium: recommendation.potassium_avg,
            };
            let alerts = soil_alerts(&sample);

            (
                StatusCode::OK,
                Json(RecommendationDetail {
                    recommendation,
                    alerts,
                }),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Compute (or recompute) the recommendation for a single reading
pub async fn recommend_for_reading(
    State(state): State<AppState>,
    CurrentUser(current_user): CurrentUser,
    Json(input): Json<RecommendForReadingInput>,
) -> impl IntoResponse {
    let service = RecommendationService::new(state.db.clone());

    match service
        .upsert_for_reading(current_user.user_id, input.reading_id)
        .await
    {
        Ok(recommendation) => (StatusCode::CREATED, Json(recommendation)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Compute (or recompute) the weekly recommendation for a parcel
pub async fn recommend_for_week(
    State(state): State<AppState>,
    CurrentUser(current_user): CurrentUser,
    Json(input): Json<RecommendForWeekInput>,
) -> impl IntoResponse {
    let service = RecommendationService::new(state.db.clone());

    match service
        .upsert_for_week(current_user.user_id, input.parcel_id, input.week_start)
        .await
    {
        Ok(recommendation) => (StatusCode::CREATED, Json(recommendation)).into_response(),
        Err(e) => e.into_response(),
    }
}
