//! `PostgreSQL` storage for the travel agency.
//!
//! This crate provides [`PostgresAgencyStore`], which implements every storage
//! trait from `travel-agency-core` on top of a sqlx connection pool:
//!
//! - Trip catalog reads via an outer join over `trip`, `country_trip` and `country`
//! - Client inserts returning the generated id
//! - Atomic, per-trip registration with a row lock on the trip
//!
//! # Example
//!
//! ```ignore
//! use travel_agency_postgres::{PoolSettings, PostgresAgencyStore};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PostgresAgencyStore::connect(&PoolSettings::new("postgres://localhost/agency")).await?;
//!     store.migrate().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod rows;
mod store;

pub use store::{PoolSettings, PostgresAgencyStore};
