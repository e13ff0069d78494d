//! Router configuration.

use crate::handlers::{
    create_client, health_check, list_client_trips, list_trips, readiness_check,
    register_for_trip, unregister_from_trip,
};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// # Routes
///
/// - `GET /health` - Liveness
/// - `GET /ready` - Readiness (pings storage)
/// - `GET /api/trips` - Trip catalog
/// - `POST /api/clients` - Create a client
/// - `GET /api/clients/:id/trips` - A client's registrations
/// - `PUT /api/clients/:id/trips/:trip_id` - Register
/// - `DELETE /api/clients/:id/trips/:trip_id` - Unregister
///
/// Every response carries an `X-Correlation-ID` header.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/trips", get(list_trips))
        .route("/clients", post(create_client))
        .route("/clients/:id/trips", get(list_client_trips))
        .route(
            "/clients/:id/trips/:trip_id",
            put(register_for_trip).delete(unregister_from_trip),
        );

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
