//! # Travel Agency Testing
//!
//! Testing utilities for the travel agency crates.
//!
//! This crate provides:
//! - [`InMemoryAgencyStore`]: storage with the same per-trip atomicity as Postgres
//! - [`FixedClock`]: deterministic registration dates
//! - [`fixtures`]: trips and clients for tests
//!
//! ## Example
//!
//! ```ignore
//! use travel_agency_testing::{fixtures, in_memory_agency, InMemoryAgencyStore};
//!
//! #[tokio::test]
//! async fn registers() {
//!     let store = InMemoryAgencyStore::new().with_trip(fixtures::trip(1, 2), &[]);
//!     let agency = in_memory_agency(&store);
//!     let id = agency.registry.create_client(fixtures::client("Jan")).await?;
//!     agency.engine.register(id, fixtures::trip(1, 2).id).await?;
//! }
//! ```

pub mod memory_store;

use std::sync::Arc;
use std::time::Duration;
use travel_agency_core::Agency;

/// Mock implementations of injected dependencies.
pub mod mocks {
    use chrono::{DateTime, Utc};
    use travel_agency_core::environment::Clock;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use travel_agency_testing::mocks::FixedClock;
    /// use travel_agency_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Trips and clients for tests.
pub mod fixtures {
    use chrono::NaiveDate;
    use travel_agency_core::{NewClient, TripId, TripSummary};

    /// A summer trip with the given id and capacity.
    #[must_use]
    pub fn trip(id: i32, max_people: i32) -> TripSummary {
        TripSummary {
            id: TripId::new(id),
            name: format!("Trip {id}"),
            description: format!("Guided tour number {id}"),
            date_from: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap_or_default(),
            date_to: NaiveDate::from_ymd_opt(2025, 7, 14).unwrap_or_default(),
            max_people,
        }
    }

    /// A valid client whose first name is `first_name`.
    #[must_use]
    pub fn client(first_name: &str) -> NewClient {
        NewClient {
            first_name: first_name.to_string(),
            last_name: "Nowak".to_string(),
            email: format!("{}@example.com", first_name.to_lowercase()),
            telephone: None,
            pesel: "85020354321".to_string(),
        }
    }
}

/// Timeout used by [`in_memory_agency`].
pub const TEST_STORAGE_TIMEOUT: Duration = Duration::from_secs(2);

/// Wire an [`Agency`] to a clone of `store` with [`mocks::test_clock`].
#[must_use]
pub fn in_memory_agency(store: &InMemoryAgencyStore) -> Agency {
    Agency::new(
        Arc::new(store.clone()),
        Arc::new(mocks::test_clock()),
        TEST_STORAGE_TIMEOUT,
    )
}

/// Install a test-friendly tracing subscriber (idempotent).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use memory_store::InMemoryAgencyStore;
pub use mocks::{test_clock, FixedClock};
