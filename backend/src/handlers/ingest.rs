//! HTTP handler for field-device ingest
//!
//! Devices are not interactive users; instead of a bearer token they sign
//! the request body with a shared secret, HMAC-SHA256 encoded as base64 in
//! the `X-Signature` header.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AppError;
use crate::services::ingest::{IngestService, SensorPayload};
use crate::AppState;

/// Receive a signed sensor reading
/// POST /ingest/sensor
pub async fn ingest_sensor_reading(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    if let Err(e) = verify_device_signature(&headers, &body, &state.config.ingest.device_secret) {
        tracing::warn!("Sensor ingest signature verification failed: {}", e);
        return AppError::InvalidSignature.into_response();
    }

    let payload: SensorPayload = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            return AppError::ValidationError(format!("Invalid sensor payload: {}", e))
                .into_response();
        }
    };

    let service = IngestService::new(state.db.clone());

    match service.store_sensor_reading(payload).await {
        Ok(reading) => (StatusCode::CREATED, Json(reading)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Verify the device payload signature
fn verify_device_signature(
    headers: &HeaderMap,
    body: &[u8],
    device_secret: &str,
) -> Result<(), String> {
    let signature = headers
        .get("x-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or("Missing x-signature header")?;

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(device_secret.as_bytes())
        .map_err(|_| "Failed to create HMAC")?;
    mac.update(body);
    let expected = BASE64.encode(mac.finalize().into_bytes());

    if signature != expected {
        return Err("Signature mismatch".to_string());
    }

    Ok(())
}
