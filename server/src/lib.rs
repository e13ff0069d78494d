//! Travel agency server.
//!
//! Wires the `PostgreSQL` store, the enrollment engine and the HTTP surface
//! into one process, configured from the environment.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]

pub mod config;
pub mod lifecycle;
pub mod metrics;

pub use config::Config;
pub use lifecycle::Application;
