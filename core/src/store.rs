//! Storage abstractions used by the catalog, registry and enrollment engine.
//!
//! # Implementations
//!
//! - `PostgresAgencyStore` (in `travel-agency-postgres`): production storage
//! - `InMemoryAgencyStore` (in `travel-agency-testing`): fast, deterministic tests
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` instead of using `async fn` so the
//! components can hold their storage as `Arc<dyn …Store>`.
//!
//! # Atomicity
//!
//! [`EnrollmentStore::insert_registration`] is the only operation with an
//! invariant to protect. Implementations must run the capacity check, the
//! duplicate check and the insert as one unit with respect to every other
//! insert for the same trip, while inserts for different trips proceed
//! independently.

use crate::error::StoreError;
use crate::types::{ClientId, ClientTrip, NewClient, Registration, TripCountryRow, TripId, TripSummary};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Boxed future returned by every storage method.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Read-only access to trips and their countries.
pub trait CatalogStore: Send + Sync {
    /// Every trip joined with its countries (outer join, one row per pair).
    fn list_trip_rows(&self) -> StoreFuture<'_, Vec<TripCountryRow>>;

    /// Core fields of a single trip.
    fn find_trip(&self, trip_id: TripId) -> StoreFuture<'_, Option<TripSummary>>;

    /// Trips the client is registered to, with registration dates.
    ///
    /// Returns an empty list for unknown clients; callers check existence.
    fn list_client_trips(&self, client_id: ClientId) -> StoreFuture<'_, Vec<ClientTrip>>;
}

/// Client record persistence.
pub trait ClientStore: Send + Sync {
    /// Persist an already validated client and return its new id.
    fn insert_client(&self, client: NewClient) -> StoreFuture<'_, ClientId>;

    /// Whether a client with this id exists.
    fn client_exists(&self, client_id: ClientId) -> StoreFuture<'_, bool>;
}

/// Result of an atomic registration attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The registration was stored.
    Inserted,
    /// The trip does not exist (any more).
    TripNotFound,
    /// The trip already holds `max_people` registrations.
    CapacityExceeded,
    /// The pair is already registered.
    AlreadyRegistered,
}

/// Registration persistence with atomic capacity enforcement.
pub trait EnrollmentStore: Send + Sync {
    /// Insert `registration` if the trip has a free seat and the pair is not
    /// yet registered, checking capacity before duplication.
    fn insert_registration(&self, registration: Registration) -> StoreFuture<'_, InsertOutcome>;

    /// Delete the registration for the pair. Returns `false` if none existed.
    fn delete_registration(&self, client_id: ClientId, trip_id: TripId) -> StoreFuture<'_, bool>;
}

/// A single backend providing every store, plus a liveness probe.
pub trait AgencyStore: CatalogStore + ClientStore + EnrollmentStore {
    /// Round-trip to the backend to verify it is reachable.
    fn ping(&self) -> StoreFuture<'_, ()>;
}

/// Run a storage future under a time bound.
///
/// Dropping a timed-out future releases whatever it held (a Postgres
/// transaction is rolled back, an in-memory lock is released).
///
/// # Errors
///
/// Returns [`StoreError::Timeout`] when `limit` elapses first, otherwise the
/// future's own result.
pub async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| StoreError::Timeout)?
}
