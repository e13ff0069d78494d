//! Domain types for the travel agency.
//!
//! Identifiers are newtypes over the integer keys used by the storage layer,
//! so a `ClientId` can never be passed where a `TripId` is expected.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a trip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(i32);

impl TripId {
    /// Wrap a raw trip key.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Get the raw key.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(i32);

impl ClientId {
    /// Wrap a raw client key.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Get the raw key.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Date code
// ============================================================================

/// A calendar day encoded as an eight digit `YYYYMMDD` integer.
///
/// The encoding is kept for compatibility with existing registration data.
/// It is not a timestamp: arithmetic on the raw value is meaningless.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use travel_agency_core::types::DateCode;
///
/// let day = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
/// assert_eq!(DateCode::from_date(day).value(), 20_250_307);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateCode(i32);

impl DateCode {
    /// Encode a calendar date.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)] // month and day are at most 31
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.year() * 10_000 + date.month() as i32 * 100 + date.day() as i32)
    }

    /// Wrap a value read back from storage.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Get the raw encoded value.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for DateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08}", self.0)
    }
}

// ============================================================================
// Trips
// ============================================================================

/// Core fields of a trip, without its countries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripSummary {
    /// Trip identifier
    pub id: TripId,
    /// Display name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// First day of the trip
    pub date_from: NaiveDate,
    /// Last day of the trip
    pub date_to: NaiveDate,
    /// Seat capacity
    pub max_people: i32,
}

/// A trip together with the names of every country it visits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    /// Core trip fields
    #[serde(flatten)]
    pub summary: TripSummary,
    /// Country names, sorted; empty when the trip has no countries
    pub countries: Vec<String>,
}

/// One row of the trip/country outer join.
///
/// A trip with no countries yields exactly one row with `country == None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TripCountryRow {
    /// Trip the row belongs to
    pub trip: TripSummary,
    /// Joined country name, if any
    pub country: Option<String>,
}

/// A trip a client is registered to, with the registration dates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientTrip {
    /// Core trip fields
    #[serde(flatten)]
    pub trip: TripSummary,
    /// Day the registration was made
    pub registered_at: DateCode,
    /// Day the trip was paid for, if it was
    pub payment_date: Option<DateCode>,
}

// ============================================================================
// Clients
// ============================================================================

/// Input for creating a client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact email
    pub email: String,
    /// Optional contact phone
    pub telephone: Option<String>,
    /// National identification number
    pub pesel: String,
}

// ============================================================================
// Registrations
// ============================================================================

/// An active enrollment of a client in a trip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Enrolled client
    pub client_id: ClientId,
    /// Trip enrolled in
    pub trip_id: TripId,
    /// Day the registration was made
    pub registered_at: DateCode,
    /// Day the trip was paid for; never set by the engine
    pub payment_date: Option<DateCode>,
}

impl Registration {
    /// A fresh, unpaid registration.
    #[must_use]
    pub const fn new(client_id: ClientId, trip_id: TripId, registered_at: DateCode) -> Self {
        Self {
            client_id,
            trip_id,
            registered_at,
            payment_date: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn date_code_pads_month_and_day() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let code = DateCode::from_date(date);
        assert_eq!(code.value(), 20_240_105);
        assert_eq!(code.to_string(), "20240105");
    }

    #[test]
    fn date_code_orders_chronologically() {
        let earlier = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let later = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(DateCode::from_date(earlier) < DateCode::from_date(later));
    }

    #[test]
    fn ids_serialize_as_bare_integers() {
        let json = serde_json::to_string(&TripId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn new_registration_is_unpaid() {
        let reg = Registration::new(ClientId::new(1), TripId::new(2), DateCode::from_raw(20_250_101));
        assert_eq!(reg.payment_date, None);
    }
}
