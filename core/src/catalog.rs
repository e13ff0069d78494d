//! Read-only trip catalog.
//!
//! Trips are seeded outside this service; the catalog only reads them. Storage
//! hands back flat rows of the trip/country outer join and the catalog folds
//! them into one [`Trip`] per id.

use crate::error::{AgencyError, Resource, Result};
use crate::store::{bounded, CatalogStore, ClientStore};
use crate::types::{ClientId, ClientTrip, Trip, TripCountryRow, TripId, TripSummary};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Trip Catalog Reader.
#[derive(Clone)]
pub struct TripCatalog {
    trips: Arc<dyn CatalogStore>,
    clients: Arc<dyn ClientStore>,
    timeout: Duration,
}

impl TripCatalog {
    /// Create a catalog over the given stores.
    ///
    /// `timeout` bounds every storage call.
    #[must_use]
    pub fn new(trips: Arc<dyn CatalogStore>, clients: Arc<dyn ClientStore>, timeout: Duration) -> Self {
        Self {
            trips,
            clients,
            timeout,
        }
    }

    /// List every trip with its countries, ordered by trip id.
    ///
    /// # Errors
    ///
    /// Returns [`AgencyError::Unavailable`] if storage fails or times out.
    pub async fn list_trips(&self) -> Result<Vec<Trip>> {
        let rows = bounded(self.timeout, self.trips.list_trip_rows()).await?;
        Ok(aggregate_trip_rows(rows))
    }

    /// Look up the core fields of one trip.
    ///
    /// # Errors
    ///
    /// Returns [`AgencyError::Unavailable`] if storage fails or times out.
    pub async fn find_trip(&self, trip_id: TripId) -> Result<Option<TripSummary>> {
        Ok(bounded(self.timeout, self.trips.find_trip(trip_id)).await?)
    }

    /// List the trips a client is registered to, ordered by trip id.
    ///
    /// # Errors
    ///
    /// - [`AgencyError::NotFound`] with [`Resource::Client`] for unknown clients
    /// - [`AgencyError::Unavailable`] if storage fails or times out
    pub async fn list_trips_for_client(&self, client_id: ClientId) -> Result<Vec<ClientTrip>> {
        if !bounded(self.timeout, self.clients.client_exists(client_id)).await? {
            return Err(AgencyError::NotFound(Resource::Client));
        }

        let mut trips = bounded(self.timeout, self.trips.list_client_trips(client_id)).await?;
        trips.sort_by_key(|t| t.trip.id);
        Ok(trips)
    }
}

/// Fold outer-join rows into trips.
///
/// Rows for the same trip may arrive in any order. A `None` country marks a
/// trip without countries and contributes nothing to its list. Country names
/// are sorted and deduplicated.
#[must_use]
pub fn aggregate_trip_rows(rows: Vec<TripCountryRow>) -> Vec<Trip> {
    let mut by_id: BTreeMap<TripId, Trip> = BTreeMap::new();

    for row in rows {
        let trip = by_id.entry(row.trip.id).or_insert_with(|| Trip {
            summary: row.trip,
            countries: Vec::new(),
        });
        if let Some(country) = row.country {
            trip.countries.push(country);
        }
    }

    by_id
        .into_values()
        .map(|mut trip| {
            trip.countries.sort();
            trip.countries.dedup();
            trip
        })
        .collect()
}
