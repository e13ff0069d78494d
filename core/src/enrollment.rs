//! Enrollment engine: registering clients for trips under a seat cap.
//!
//! Each (client, trip) pair is either registered or not. `register` moves it
//! to registered, `unregister` moves it back; repeating either is rejected.
//!
//! `register` checks, in order:
//!
//! 1. the client exists, else `NotFound(Client)`
//! 2. the trip exists, else `NotFound(Trip)`
//! 3. the trip has a free seat, else `CapacityExceeded`
//! 4. the pair is not registered yet, else `Conflict`
//!
//! Steps 3 and 4 and the insert run inside a single
//! [`EnrollmentStore::insert_registration`] call, which the store executes
//! atomically per trip. The engine itself holds no mutable state.

use crate::catalog::TripCatalog;
use crate::environment::Clock;
use crate::error::{AgencyError, Resource, Result};
use crate::registry::ClientRegistry;
use crate::store::{bounded, EnrollmentStore, InsertOutcome};
use crate::types::{ClientId, DateCode, Registration, TripId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Enrollment Engine.
#[derive(Clone)]
pub struct EnrollmentEngine {
    registry: ClientRegistry,
    catalog: TripCatalog,
    store: Arc<dyn EnrollmentStore>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl EnrollmentEngine {
    /// Create an engine.
    ///
    /// `timeout` bounds the atomic insert and delete calls; the registry and
    /// catalog apply their own bounds to the existence checks.
    #[must_use]
    pub fn new(
        registry: ClientRegistry,
        catalog: TripCatalog,
        store: Arc<dyn EnrollmentStore>,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            catalog,
            store,
            clock,
            timeout,
        }
    }

    /// Register a client for a trip.
    ///
    /// On success the registration is dated today and unpaid. "Today" is the
    /// UTC calendar date of the [`Clock`], not the server's local date.
    ///
    /// # Errors
    ///
    /// - [`AgencyError::NotFound`] for an unknown client or trip
    /// - [`AgencyError::CapacityExceeded`] if the trip is full
    /// - [`AgencyError::Conflict`] if the client is already registered
    /// - [`AgencyError::Unavailable`] if storage fails or times out
    #[instrument(skip(self), fields(client_id = %client_id, trip_id = %trip_id))]
    pub async fn register(&self, client_id: ClientId, trip_id: TripId) -> Result<Registration> {
        let registration = self
            .try_register(client_id, trip_id)
            .await
            .map_err(|err| rejected("register", err))?;

        metrics::counter!("agency_registrations_total", "outcome" => "registered").increment(1);
        info!(registered_at = %registration.registered_at, "Client registered for trip");
        Ok(registration)
    }

    async fn try_register(&self, client_id: ClientId, trip_id: TripId) -> Result<Registration> {
        if !self.registry.client_exists(client_id).await? {
            return Err(AgencyError::NotFound(Resource::Client));
        }
        if self.catalog.find_trip(trip_id).await?.is_none() {
            return Err(AgencyError::NotFound(Resource::Trip));
        }

        let registered_at = DateCode::from_date(self.clock.now().date_naive());
        let registration = Registration::new(client_id, trip_id, registered_at);

        match bounded(self.timeout, self.store.insert_registration(registration.clone())).await? {
            InsertOutcome::Inserted => Ok(registration),
            InsertOutcome::TripNotFound => Err(AgencyError::NotFound(Resource::Trip)),
            InsertOutcome::CapacityExceeded => Err(AgencyError::CapacityExceeded),
            InsertOutcome::AlreadyRegistered => Err(AgencyError::Conflict),
        }
    }

    /// Remove a client's registration for a trip.
    ///
    /// Not idempotent: a second call for the same pair fails.
    ///
    /// # Errors
    ///
    /// - [`AgencyError::NotFound`] with [`Resource::Registration`] if the
    ///   pair is not registered
    /// - [`AgencyError::Unavailable`] if storage fails or times out
    #[instrument(skip(self), fields(client_id = %client_id, trip_id = %trip_id))]
    pub async fn unregister(&self, client_id: ClientId, trip_id: TripId) -> Result<()> {
        let deleted = bounded(self.timeout, self.store.delete_registration(client_id, trip_id))
            .await
            .map_err(|err| rejected("unregister", err.into()))?;
        if !deleted {
            return Err(rejected(
                "unregister",
                AgencyError::NotFound(Resource::Registration),
            ));
        }

        metrics::counter!("agency_unregistrations_total", "outcome" => "unregistered").increment(1);
        info!("Client unregistered from trip");
        Ok(())
    }
}

/// Record a rejected operation and hand the error back.
fn rejected(operation: &'static str, err: AgencyError) -> AgencyError {
    let outcome = match &err {
        AgencyError::NotFound(_) => "not_found",
        AgencyError::CapacityExceeded => "capacity_exceeded",
        AgencyError::Conflict => "conflict",
        // Enrollment takes no free-form input; only storage faults remain.
        AgencyError::Unavailable(_) | AgencyError::Validation(_) => "unavailable",
    };
    let metric = if operation == "register" {
        "agency_registrations_total"
    } else {
        "agency_unregistrations_total"
    };
    metrics::counter!(metric, "outcome" => outcome).increment(1);
    warn!(operation, error = %err, "Enrollment rejected");
    err
}
