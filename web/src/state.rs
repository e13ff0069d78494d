//! Application state for Axum handlers.

use travel_agency_core::Agency;

/// Application state shared across all HTTP handlers.
///
/// Holds the wired catalog, registry and engine. Cloning is cheap; every
/// component is an `Arc` handle over the same storage.
#[derive(Clone)]
pub struct AppState {
    /// Catalog, registry and engine over one storage backend
    pub agency: Agency,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub const fn new(agency: Agency) -> Self {
        Self { agency }
    }
}
