//! HTTP handlers for the Soil Fertility Management Platform

pub mod auth;
pub mod health;
pub mod ingest;
pub mod parcel;
pub mod reading;
pub mod recommendation;

pub use auth::*;
pub use health::*;
pub use ingest::*;
pub use parcel::*;
pub use reading::*;
pub use recommendation::*;
