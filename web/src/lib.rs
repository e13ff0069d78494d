//! Axum HTTP surface for the travel agency.
//!
//! Maps the catalog, registry and enrollment engine from
//! `travel-agency-core` onto a JSON API.
//!
//! # Request Flow
//!
//! 1. **Correlation ID** assigned by [`middleware::correlation_id_layer`]
//! 2. **Extract** path parameters and JSON body
//! 3. **Call** the catalog, registry or engine on [`AppState::agency`]
//! 4. **Map** [`AgencyError`](travel_agency_core::AgencyError) to a status via [`AppError`]
//!
//! # Example
//!
//! ```ignore
//! use travel_agency_web::{build_router, AppState};
//!
//! let app = build_router(AppState::new(agency));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::CorrelationId;
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use router::build_router;
pub use state::AppState;
