//! Error types for catalog, registry and enrollment operations.

use std::fmt;
use thiserror::Error;

/// The kind of record a [`AgencyError::NotFound`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    /// A client record
    Client,
    /// A trip record
    Trip,
    /// A (client, trip) registration
    Registration,
}

impl Resource {
    /// Lowercase label used in metrics and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Trip => "trip",
            Self::Registration => "registration",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => write!(f, "Client"),
            Self::Trip => write!(f, "Trip"),
            Self::Registration => write!(f, "Registration"),
        }
    }
}

/// Errors returned by the agency's domain operations.
///
/// Every variant except [`AgencyError::Unavailable`] is a rejection of the
/// request itself and is safe to show to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgencyError {
    /// The referenced record does not exist.
    #[error("{0} not found")]
    NotFound(Resource),

    /// A required field is missing or blank.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The client is already registered for the trip.
    #[error("Client is already registered for this trip")]
    Conflict,

    /// The trip has no free seats left.
    #[error("Maximum number of participants reached")]
    CapacityExceeded,

    /// Storage could not be reached or did not answer in time.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors reported by storage adapters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Database connection or query failure.
    #[error("Database error: {0}")]
    Database(String),

    /// The operation exceeded its time bound.
    #[error("Storage operation timed out")]
    Timeout,
}

impl From<StoreError> for AgencyError {
    fn from(err: StoreError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Result alias for domain operations.
pub type Result<T> = std::result::Result<T, AgencyError>;
