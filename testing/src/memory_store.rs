//! In-memory agency storage for fast, deterministic testing.
//!
//! [`InMemoryAgencyStore`] implements every storage trait from
//! `travel-agency-core`, honoring the same per-trip atomicity contract as the
//! Postgres store: each trip has its own async mutex held across the capacity
//! check, the duplicate check and the insert. Inserts for different trips take
//! different locks and never wait on each other.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use travel_agency_core::store::{
    AgencyStore, CatalogStore, ClientStore, EnrollmentStore, InsertOutcome, StoreFuture,
};
use travel_agency_core::{
    ClientId, ClientTrip, NewClient, Registration, StoreError, TripCountryRow, TripId, TripSummary,
};

type RegistrationKey = (ClientId, TripId);

#[derive(Default)]
struct Tables {
    trips: BTreeMap<TripId, TripSummary>,
    trip_countries: BTreeMap<TripId, Vec<String>>,
    clients: BTreeMap<ClientId, NewClient>,
    registrations: BTreeMap<RegistrationKey, Registration>,
    /// Highest registration count ever observed per trip.
    peaks: HashMap<TripId, usize>,
}

impl Tables {
    fn count_for(&self, trip_id: TripId) -> usize {
        self.registrations
            .keys()
            .filter(|(_, trip)| *trip == trip_id)
            .count()
    }
}

/// In-memory implementation of every agency store.
///
/// # Example
///
/// ```
/// use travel_agency_testing::{fixtures, InMemoryAgencyStore};
///
/// let store = InMemoryAgencyStore::new().with_trip(fixtures::trip(1, 2), &["Italy"]);
/// assert_eq!(store.registration_count(fixtures::trip(1, 2).id), 0);
/// ```
#[derive(Clone)]
pub struct InMemoryAgencyStore {
    tables: Arc<RwLock<Tables>>,
    trip_locks: Arc<Mutex<HashMap<TripId, Arc<tokio::sync::Mutex<()>>>>>,
    next_client_id: Arc<AtomicI32>,
    failure: Arc<RwLock<Option<StoreError>>>,
    latency: Arc<RwLock<Option<Duration>>>,
}

impl InMemoryAgencyStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            trip_locks: Arc::new(Mutex::new(HashMap::new())),
            next_client_id: Arc::new(AtomicI32::new(1)),
            failure: Arc::new(RwLock::new(None)),
            latency: Arc::new(RwLock::new(None)),
        }
    }

    /// Seed a trip with its countries.
    #[must_use]
    pub fn with_trip(self, trip: TripSummary, countries: &[&str]) -> Self {
        if let Ok(mut tables) = self.tables.write() {
            tables.trip_countries.insert(
                trip.id,
                countries.iter().map(|c| (*c).to_string()).collect(),
            );
            tables.trips.insert(trip.id, trip);
        }
        self
    }

    /// Seed a client under a fixed id, bypassing validation.
    #[must_use]
    pub fn with_client(self, client_id: ClientId, client: NewClient) -> Self {
        if let Ok(mut tables) = self.tables.write() {
            tables.clients.insert(client_id, client);
        }
        self.next_client_id
            .fetch_max(client_id.value() + 1, Ordering::SeqCst);
        self
    }

    /// Make every subsequent operation fail with `error` (`None` heals).
    pub fn fail_with(&self, error: Option<StoreError>) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = error;
        }
    }

    /// Delay every subsequent operation by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut current) = self.latency.write() {
            *current = latency;
        }
    }

    /// Current number of registrations for a trip.
    #[must_use]
    pub fn registration_count(&self, trip_id: TripId) -> usize {
        self.tables.read().map_or(0, |t| t.count_for(trip_id))
    }

    /// Highest registration count the trip has ever reached.
    #[must_use]
    pub fn peak_registrations(&self, trip_id: TripId) -> usize {
        self.tables
            .read()
            .map_or(0, |t| t.peaks.get(&trip_id).copied().unwrap_or(0))
    }

    /// Look up a stored client.
    #[must_use]
    pub fn client(&self, client_id: ClientId) -> Option<NewClient> {
        self.tables
            .read()
            .ok()
            .and_then(|t| t.clients.get(&client_id).cloned())
    }

    /// Look up a stored registration.
    #[must_use]
    pub fn registration(&self, client_id: ClientId, trip_id: TripId) -> Option<Registration> {
        self.tables
            .read()
            .ok()
            .and_then(|t| t.registrations.get(&(client_id, trip_id)).cloned())
    }

    /// Take a trip's insert lock and keep it until the guard is dropped.
    ///
    /// Registrations for that trip wait meanwhile; other trips are unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the lock table is poisoned.
    pub async fn hold_trip(
        &self,
        trip_id: TripId,
    ) -> Result<tokio::sync::OwnedMutexGuard<()>, StoreError> {
        Ok(self.trip_lock(trip_id)?.lock_owned().await)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|e| StoreError::Database(format!("Poisoned tables: {e}")))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|e| StoreError::Database(format!("Poisoned tables: {e}")))
    }

    fn trip_lock(&self, trip_id: TripId) -> Result<Arc<tokio::sync::Mutex<()>>, StoreError> {
        let mut locks = self
            .trip_locks
            .lock()
            .map_err(|e| StoreError::Database(format!("Poisoned lock table: {e}")))?;
        Ok(locks.entry(trip_id).or_default().clone())
    }

    /// Simulated round trip: injected latency, injected failure.
    async fn round_trip(&self) -> Result<(), StoreError> {
        let latency = self.latency.read().ok().and_then(|l| *l);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let failure = self.failure.read().ok().and_then(|f| f.clone());
        failure.map_or(Ok(()), Err)
    }
}

impl Default for InMemoryAgencyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore for InMemoryAgencyStore {
    fn list_trip_rows(&self) -> StoreFuture<'_, Vec<TripCountryRow>> {
        Box::pin(async move {
            self.round_trip().await?;
            let tables = self.read()?;

            let mut rows = Vec::new();
            for (trip_id, trip) in &tables.trips {
                let countries = tables.trip_countries.get(trip_id).map_or(&[][..], Vec::as_slice);
                if countries.is_empty() {
                    rows.push(TripCountryRow {
                        trip: trip.clone(),
                        country: None,
                    });
                }
                for country in countries {
                    rows.push(TripCountryRow {
                        trip: trip.clone(),
                        country: Some(country.clone()),
                    });
                }
            }
            Ok(rows)
        })
    }

    fn find_trip(&self, trip_id: TripId) -> StoreFuture<'_, Option<TripSummary>> {
        Box::pin(async move {
            self.round_trip().await?;
            Ok(self.read()?.trips.get(&trip_id).cloned())
        })
    }

    fn list_client_trips(&self, client_id: ClientId) -> StoreFuture<'_, Vec<ClientTrip>> {
        Box::pin(async move {
            self.round_trip().await?;
            let tables = self.read()?;

            Ok(tables
                .registrations
                .values()
                .filter(|r| r.client_id == client_id)
                .filter_map(|r| {
                    tables.trips.get(&r.trip_id).map(|trip| ClientTrip {
                        trip: trip.clone(),
                        registered_at: r.registered_at,
                        payment_date: r.payment_date,
                    })
                })
                .collect())
        })
    }
}

impl ClientStore for InMemoryAgencyStore {
    fn insert_client(&self, client: NewClient) -> StoreFuture<'_, ClientId> {
        Box::pin(async move {
            self.round_trip().await?;
            let client_id = ClientId::new(self.next_client_id.fetch_add(1, Ordering::SeqCst));
            self.write()?.clients.insert(client_id, client);
            Ok(client_id)
        })
    }

    fn client_exists(&self, client_id: ClientId) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            self.round_trip().await?;
            Ok(self.read()?.clients.contains_key(&client_id))
        })
    }
}

impl EnrollmentStore for InMemoryAgencyStore {
    fn insert_registration(&self, registration: Registration) -> StoreFuture<'_, InsertOutcome> {
        Box::pin(async move {
            self.round_trip().await?;

            let lock = self.trip_lock(registration.trip_id)?;
            let _guard = lock.lock().await;

            let max_people = {
                let tables = self.read()?;
                let Some(trip) = tables.trips.get(&registration.trip_id) else {
                    return Ok(InsertOutcome::TripNotFound);
                };
                let count = tables.count_for(registration.trip_id);
                if i64::try_from(count).unwrap_or(i64::MAX) >= i64::from(trip.max_people) {
                    return Ok(InsertOutcome::CapacityExceeded);
                }
                if tables
                    .registrations
                    .contains_key(&(registration.client_id, registration.trip_id))
                {
                    return Ok(InsertOutcome::AlreadyRegistered);
                }
                trip.max_people
            };

            // Widen the window between check and write, as a database round
            // trip would. Only the trip lock keeps concurrent inserts out.
            tokio::task::yield_now().await;

            let mut tables = self.write()?;
            let trip_id = registration.trip_id;
            tables
                .registrations
                .insert((registration.client_id, trip_id), registration);
            let count = tables.count_for(trip_id);
            let peak = tables.peaks.entry(trip_id).or_insert(0);
            *peak = (*peak).max(count);
            tracing::trace!(trip_id = %trip_id, count, max_people, "Registration stored");
            Ok(InsertOutcome::Inserted)
        })
    }

    fn delete_registration(&self, client_id: ClientId, trip_id: TripId) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            self.round_trip().await?;
            Ok(self
                .write()?
                .registrations
                .remove(&(client_id, trip_id))
                .is_some())
        })
    }
}

impl AgencyStore for InMemoryAgencyStore {
    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move { self.round_trip().await })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures;
    use travel_agency_core::DateCode;

    fn reg(client: i32, trip: i32) -> Registration {
        Registration::new(
            ClientId::new(client),
            TripId::new(trip),
            DateCode::from_raw(20_250_101),
        )
    }

    #[tokio::test]
    async fn trips_without_countries_yield_one_null_row() {
        let store = InMemoryAgencyStore::new()
            .with_trip(fixtures::trip(1, 5), &["Italy", "France"])
            .with_trip(fixtures::trip(2, 5), &[]);

        let rows = store.list_trip_rows().await.unwrap();

        assert_eq!(rows.len(), 3);
        assert!(rows
            .iter()
            .any(|r| r.trip.id == TripId::new(2) && r.country.is_none()));
    }

    #[tokio::test]
    async fn insert_checks_capacity_before_duplicates() {
        let store = InMemoryAgencyStore::new().with_trip(fixtures::trip(1, 1), &[]);

        assert_eq!(store.insert_registration(reg(1, 1)).await.unwrap(), InsertOutcome::Inserted);
        // Trip is full, so even a duplicate reports capacity first.
        assert_eq!(
            store.insert_registration(reg(1, 1)).await.unwrap(),
            InsertOutcome::CapacityExceeded
        );
    }

    #[tokio::test]
    async fn insert_into_missing_trip_is_reported() {
        let store = InMemoryAgencyStore::new();
        assert_eq!(
            store.insert_registration(reg(1, 9)).await.unwrap(),
            InsertOutcome::TripNotFound
        );
    }

    #[tokio::test]
    async fn seeded_clients_do_not_collide_with_new_ids() {
        let store = InMemoryAgencyStore::new().with_client(ClientId::new(10), fixtures::client("Anna"));
        let id = store.insert_client(fixtures::client("Ewa")).await.unwrap();
        assert_eq!(id, ClientId::new(11));
    }

    #[tokio::test]
    async fn injected_failures_surface_as_errors() {
        let store = InMemoryAgencyStore::new();
        store.fail_with(Some(StoreError::Database("connection refused".to_string())));
        assert!(store.ping().await.is_err());

        store.fail_with(None);
        assert!(store.ping().await.is_ok());
    }
}
