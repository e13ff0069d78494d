//! Typed row projections decoded at the storage boundary.
//!
//! A missing or mistyped column fails when the row is decoded instead of
//! surfacing later as a wrong value.

use chrono::NaiveDate;
use travel_agency_core::{ClientTrip, DateCode, TripCountryRow, TripId, TripSummary};

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TripRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub max_people: i32,
}

impl From<TripRow> for TripSummary {
    fn from(row: TripRow) -> Self {
        Self {
            id: TripId::new(row.id),
            name: row.name,
            description: row.description,
            date_from: row.date_from,
            date_to: row.date_to,
            max_people: row.max_people,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TripCountryRecord {
    #[sqlx(flatten)]
    pub trip: TripRow,
    pub country: Option<String>,
}

impl From<TripCountryRecord> for TripCountryRow {
    fn from(record: TripCountryRecord) -> Self {
        Self {
            trip: record.trip.into(),
            country: record.country,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ClientTripRecord {
    #[sqlx(flatten)]
    pub trip: TripRow,
    pub registered_at: i32,
    pub payment_date: Option<i32>,
}

impl From<ClientTripRecord> for ClientTrip {
    fn from(record: ClientTripRecord) -> Self {
        Self {
            trip: record.trip.into(),
            registered_at: DateCode::from_raw(record.registered_at),
            payment_date: record.payment_date.map(DateCode::from_raw),
        }
    }
}
