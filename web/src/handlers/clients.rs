//! Client and registration endpoints.
//!
//! - POST /api/clients - Create a client
//! - PUT /api/clients/:id/trips/:trip_id - Register a client for a trip
//! - DELETE /api/clients/:id/trips/:trip_id - Cancel a registration

use crate::error::AppError;
use crate::extractors::CorrelationId;
use crate::state::AppState;
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
};
use serde::{Deserialize, Serialize};
use travel_agency_core::{ClientId, NewClient, TripId};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create a client.
///
/// Every field is optional at the JSON level; an absent or null field is
/// treated as blank so the registry rejects it with a 400.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateClientRequest {
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Telephone number
    pub telephone: Option<String>,
    /// National identification number
    pub pesel: Option<String>,
}

impl From<CreateClientRequest> for NewClient {
    fn from(request: CreateClientRequest) -> Self {
        Self {
            first_name: request.first_name.unwrap_or_default(),
            last_name: request.last_name.unwrap_or_default(),
            email: request.email.unwrap_or_default(),
            telephone: request.telephone,
            pesel: request.pesel.unwrap_or_default(),
        }
    }
}

/// Response after creating a client.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientResponse {
    /// Generated client ID
    pub client_id: i32,
}

/// Outcome message for registration changes.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a client.
///
/// Responds 201 with the new id and a `Location` header.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/clients \
///   -H "Content-Type: application/json" \
///   -d '{"firstName":"Anna","lastName":"Nowak","email":"anna@example.com","pesel":"85020354321"}'
/// # {"clientId":11}
/// ```
pub async fn create_client(
    State(state): State<AppState>,
    payload: Result<Json<CreateClientRequest>, JsonRejection>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<CreateClientResponse>), AppError> {
    let Json(request) = payload?;
    let client_id = state.agency.registry.create_client(request.into()).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/clients/{client_id}"))],
        Json(CreateClientResponse {
            client_id: client_id.value(),
        }),
    ))
}

/// Register a client for a trip.
///
/// # Status Codes
///
/// - 200 OK: registered
/// - 404 Not Found: unknown client or trip
/// - 400 Bad Request: the trip is full
/// - 409 Conflict: the client is already registered
///
/// # Example
///
/// ```bash
/// curl -X PUT http://localhost:8080/api/clients/10/trips/1
/// # {"message":"Client registered for trip"}
/// ```
pub async fn register_for_trip(
    State(state): State<AppState>,
    path: Result<Path<(i32, i32)>, PathRejection>,
    correlation_id: CorrelationId,
) -> Result<Json<MessageResponse>, AppError> {
    let Path((client_id, trip_id)) = path?;
    tracing::debug!(correlation_id = %correlation_id.0, client_id, trip_id, "Register request");

    state
        .agency
        .engine
        .register(ClientId::new(client_id), TripId::new(trip_id))
        .await?;

    Ok(Json(MessageResponse {
        message: "Client registered for trip".to_string(),
    }))
}

/// Cancel a client's registration for a trip.
///
/// Returns 404 when no such registration exists, including on a repeated
/// call for the same pair.
///
/// # Example
///
/// ```bash
/// curl -X DELETE http://localhost:8080/api/clients/10/trips/1
/// # {"message":"Client unregistered from trip"}
/// ```
pub async fn unregister_from_trip(
    State(state): State<AppState>,
    path: Result<Path<(i32, i32)>, PathRejection>,
    correlation_id: CorrelationId,
) -> Result<Json<MessageResponse>, AppError> {
    let Path((client_id, trip_id)) = path?;
    tracing::debug!(correlation_id = %correlation_id.0, client_id, trip_id, "Unregister request");

    state
        .agency
        .engine
        .unregister(ClientId::new(client_id), TripId::new(trip_id))
        .await?;

    Ok(Json(MessageResponse {
        message: "Client unregistered from trip".to_string(),
    }))
}
