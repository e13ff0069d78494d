//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by domain.

pub mod clients;
pub mod health;
pub mod trips;

pub use clients::{create_client, register_for_trip, unregister_from_trip};
pub use health::{health_check, readiness_check};
pub use trips::{list_client_trips, list_trips};
