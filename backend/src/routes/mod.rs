//! Route definitions for the Soil Fertility Management Platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Sensor ingest (public - signed by the field device)
        .route("/ingest/sensor", post(handlers::ingest_sensor_reading))
        // Protected routes - parcel management
        .nest("/parcels", parcel_routes())
        // Protected routes - reading management
        .nest("/readings", reading_routes())
        // Protected routes - recommendations
        .nest("/recommendations", recommendation_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

/// Parcel management routes (protected)
fn parcel_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_parcels).post(handlers::create_parcel),
        )
        .route(
            "/:parcel_id",
            get(handlers::get_parcel)
                .put(handlers::update_parcel)
                .delete(handlers::delete_parcel),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reading management routes (protected)
fn reading_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_readings).post(handlers::create_reading),
        )
        .route("/weekly-summaries", get(handlers::get_weekly_summaries))
        .route("/export", get(handlers::export_readings))
        .route("/:reading_id", get(handlers::get_reading))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Recommendation routes (protected)
fn recommendation_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_recommendations))
        .route("/by-reading", post(handlers::recommend_for_reading))
        .route("/by-week", post(handlers::recommend_for_week))
        .route("/:recommendation_id", get(handlers::get_recommendation))
        .route_layer(middleware::from_fn(auth_middleware))
}
