//! Middleware for the Soil Fertility Management Platform

pub mod auth;

pub use auth::{auth_middleware, AuthUser, CurrentUser};
