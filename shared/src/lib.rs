//! Shared types and models for the Soil Fertility Management Platform
//!
//! This crate contains the domain models, the fertilization engine, and the
//! validation helpers shared between the backend and other components of the
//! system.

pub mod engine;
pub mod models;
pub mod types;
pub mod validation;

pub use engine::*;
pub use models::*;
pub use types::*;
pub use validation::*;
