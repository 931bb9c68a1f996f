//! Parcel management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::parcel::{CreateParcelInput, ParcelService, UpdateParcelInput};
use crate::AppState;

/// List all parcels owned by the current user
pub async fn list_parcels(
    State(state): State<AppState>,
    CurrentUser(current_user): CurrentUser,
) -> impl IntoResponse {
    let service = ParcelService::new(state.db.clone());

    match service.get_parcels(current_user.user_id).await {
        Ok(parcels) => {
            (StatusCode::OK, Json(serde_json::json!({ "parcels": parcels }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a specific parcel
pub async fn get_parcel(
    State(state): State<AppState>,
    CurrentUser(current_user): CurrentUser,
    Path(parcel_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ParcelService::new(state.db.clone());

    match service.get_parcel(current_user.user_id, parcel_id).await {
        Ok(parcel) => (StatusCode::OK, Json(parcel)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a new parcel
pub async fn create_parcel(
    State(state): State<AppState>,
    CurrentUser(current_user): CurrentUser,
    Json(input): Json<CreateParcelInput>,
) -> impl IntoResponse {
    let service = ParcelService::new(state.db.clone());

    match service.create_parcel(current_user.user_id, input).await {
        Ok(parcel) => (StatusCode::CREATED, Json(parcel)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a parcel
pub async fn update_parcel(
    State(state): State<AppState>,
    CurrentUser(current_user): CurrentUser,
    Path(parcel_id): Path<Uuid>,
    Json(input): Json<UpdateParcelInput>,
) -> impl IntoResponse {
    let service = ParcelService::new(state.db.clone());

    match service
        .update_parcel(current_user.user_id, parcel_id, input)
        .await
    {
        Ok(parcel) => (StatusCode::OK, Json(parcel)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a parcel and everything it owns
pub async fn delete_parcel(
    State(state): State<AppState>,
    CurrentUser(current_user): CurrentUser,
    Path(parcel_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ParcelService::new(state.db.clone());

    match service.delete_parcel(current_user.user_id, parcel_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
