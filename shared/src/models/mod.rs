//! Domain models for the Soil Fertility Management Platform

pub mod parcel;
pub mod reading;
pub mod recommendation;
pub mod user;

pub use parcel::*;
pub use reading::*;
pub use recommendation::*;
pub use user::*;
