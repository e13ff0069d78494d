//! # Travel Agency Core
//!
//! Trip catalog, client registry and enrollment engine for a travel agency.
//!
//! ## Components
//!
//! - [`TripCatalog`]: read-only trips with their countries
//! - [`ClientRegistry`]: validates and creates clients
//! - [`EnrollmentEngine`]: registers clients for trips, enforcing seat
//!   capacity and one registration per (client, trip) under concurrency
//!
//! All durable state lives behind the traits in [`store`]. Components are
//! cheap `Clone` handles that receive their storage explicitly.
//!
//! ## Example
//!
//! ```ignore
//! use travel_agency_core::{Agency, SystemClock, TripId, ClientId};
//!
//! let agency = Agency::new(store, Arc::new(SystemClock), Duration::from_secs(5));
//! agency.engine.register(ClientId::new(10), TripId::new(1)).await?;
//! ```

pub mod catalog;
pub mod enrollment;
pub mod environment;
pub mod error;
pub mod registry;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use catalog::TripCatalog;
pub use enrollment::EnrollmentEngine;
pub use environment::{Clock, SystemClock};
pub use error::{AgencyError, Resource, StoreError};
pub use registry::ClientRegistry;
pub use store::{AgencyStore, CatalogStore, ClientStore, EnrollmentStore, InsertOutcome, StoreFuture};
pub use types::{
    ClientId, ClientTrip, DateCode, NewClient, Registration, Trip, TripCountryRow, TripId,
    TripSummary,
};

use std::sync::Arc;
use std::time::Duration;

/// Every component wired to one storage backend.
#[derive(Clone)]
pub struct Agency {
    /// Trip Catalog Reader
    pub catalog: TripCatalog,
    /// Client Registry
    pub registry: ClientRegistry,
    /// Enrollment Engine
    pub engine: EnrollmentEngine,
    store: Arc<dyn AgencyStore>,
    timeout: Duration,
}

impl Agency {
    /// Wire catalog, registry and engine to `store`.
    ///
    /// `timeout` bounds each individual storage call.
    #[must_use]
    pub fn new<S>(store: Arc<S>, clock: Arc<dyn Clock>, timeout: Duration) -> Self
    where
        S: AgencyStore + 'static,
    {
        let catalog = TripCatalog::new(store.clone(), store.clone(), timeout);
        let registry = ClientRegistry::new(store.clone(), timeout);
        let engine = EnrollmentEngine::new(
            registry.clone(),
            catalog.clone(),
            store.clone(),
            clock,
            timeout,
        );

        Self {
            catalog,
            registry,
            engine,
            store,
            timeout,
        }
    }

    /// Check that storage is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails or does not answer in time.
    pub async fn ping(&self) -> Result<(), StoreError> {
        store::bounded(self.timeout, self.store.ping()).await
    }
}
