//! Trip catalog endpoints.
//!
//! - GET /api/trips - All trips with their countries
//! - GET /api/clients/:id/trips - Trips a client is registered for

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use travel_agency_core::{ClientId, ClientTrip, Trip};

// ============================================================================
// Response Types
// ============================================================================

/// A trip in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripResponse {
    /// Trip ID
    pub id: i32,
    /// Trip name
    pub name: String,
    /// Trip description
    pub description: String,
    /// First day of the trip
    pub date_from: NaiveDate,
    /// Last day of the trip
    pub date_to: NaiveDate,
    /// Seat capacity
    pub max_people: i32,
    /// Visited countries, possibly empty
    pub countries: Vec<String>,
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        let Trip { summary, countries } = trip;
        Self {
            id: summary.id.value(),
            name: summary.name,
            description: summary.description,
            date_from: summary.date_from,
            date_to: summary.date_to,
            max_people: summary.max_people,
            countries,
        }
    }
}

/// A trip joined with one client's registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTripResponse {
    /// Trip ID
    pub trip_id: i32,
    /// Trip name
    pub name: String,
    /// Trip description
    pub description: String,
    /// First day of the trip
    pub date_from: NaiveDate,
    /// Last day of the trip
    pub date_to: NaiveDate,
    /// Seat capacity
    pub max_people: i32,
    /// Registration date (YYYYMMDD)
    pub registered_at: i32,
    /// Payment date (YYYYMMDD), null when unpaid
    pub payment_date: Option<i32>,
}

impl From<ClientTrip> for ClientTripResponse {
    fn from(entry: ClientTrip) -> Self {
        let ClientTrip {
            trip,
            registered_at,
            payment_date,
        } = entry;
        Self {
            trip_id: trip.id.value(),
            name: trip.name,
            description: trip.description,
            date_from: trip.date_from,
            date_to: trip.date_to,
            max_people: trip.max_people,
            registered_at: registered_at.value(),
            payment_date: payment_date.map(|d| d.value()),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// List every trip with its countries.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/trips
/// # [{"id":1,"name":"Alpine Lakes","description":"...","dateFrom":"2025-07-01",
/// #   "dateTo":"2025-07-10","maxPeople":12,"countries":["Austria","Italy"]}]
/// ```
pub async fn list_trips(State(state): State<AppState>) -> Result<Json<Vec<TripResponse>>, AppError> {
    let trips = state.agency.catalog.list_trips().await?;
    Ok(Json(trips.into_iter().map(TripResponse::from).collect()))
}

/// List the trips a client is registered for.
///
/// Returns 404 if the client does not exist. A client with no registrations
/// gets an empty list.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/clients/10/trips
/// # [{"tripId":1,"name":"Alpine Lakes",...,"registeredAt":20250409,"paymentDate":null}]
/// ```
pub async fn list_client_trips(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vec<ClientTripResponse>>, AppError> {
    let Path(client_id) = path?;
    let trips = state
        .agency
        .catalog
        .list_trips_for_client(ClientId::new(client_id))
        .await?;
    Ok(Json(trips.into_iter().map(ClientTripResponse::from).collect()))
}
