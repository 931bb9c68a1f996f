//! Business logic services for the Soil Fertility Management Platform

pub mod auth;
pub mod ingest;
pub mod parcel;
pub mod reading;
pub mod recommendation;
pub mod report;

pub use auth::AuthService;
pub use ingest::IngestService;
pub use parcel::ParcelService;
pub use reading::ReadingService;
pub use recommendation::RecommendationService;
pub use report::ReportService;
