//! Database models for the Soil Fertility Management Platform
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
