//! Client registry: validation and creation of client records.

use crate::error::{AgencyError, Result};
use crate::store::{bounded, ClientStore};
use crate::types::{ClientId, NewClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Client Registry.
///
/// Clients are written once and never updated. Email and pesel are not
/// required to be unique across clients.
#[derive(Clone)]
pub struct ClientRegistry {
    store: Arc<dyn ClientStore>,
    timeout: Duration,
}

impl ClientRegistry {
    /// Create a registry over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn ClientStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Validate and persist a new client.
    ///
    /// # Errors
    ///
    /// - [`AgencyError::Validation`] if a required field is blank
    /// - [`AgencyError::Unavailable`] if storage fails or times out
    pub async fn create_client(&self, client: NewClient) -> Result<ClientId> {
        let client = validate(client)?;
        let client_id = bounded(self.timeout, self.store.insert_client(client)).await?;

        metrics::counter!("agency_clients_created_total").increment(1);
        info!(client_id = %client_id, "Client created");
        Ok(client_id)
    }

    /// Whether a client with this id exists.
    ///
    /// # Errors
    ///
    /// Returns [`AgencyError::Unavailable`] if storage fails or times out.
    pub async fn client_exists(&self, client_id: ClientId) -> Result<bool> {
        Ok(bounded(self.timeout, self.store.client_exists(client_id)).await?)
    }
}

/// Check required fields and normalize whitespace.
///
/// Required fields are trimmed; a blank telephone becomes `None`.
///
/// # Errors
///
/// Returns [`AgencyError::Validation`] naming the first blank required field.
pub fn validate(client: NewClient) -> Result<NewClient> {
    let NewClient {
        first_name,
        last_name,
        email,
        telephone,
        pesel,
    } = client;

    let validated = NewClient {
        first_name: required("firstName", &first_name)?,
        last_name: required("lastName", &last_name)?,
        email: required("email", &email)?,
        telephone: telephone
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()),
        pesel: required("pesel", &pesel)?,
    };
    Ok(validated)
}

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        debug!(field, "Rejected blank client field");
        return Err(AgencyError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::StoreFuture;
    use std::sync::Mutex;

    fn jan() -> NewClient {
        NewClient {
            first_name: "Jan".to_string(),
            last_name: "Kowalski".to_string(),
            email: "jan@example.com".to_string(),
            telephone: Some("+48 600 100 200".to_string()),
            pesel: "90010112345".to_string(),
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        inserted: Mutex<Vec<NewClient>>,
    }

    impl ClientStore for RecordingStore {
        fn insert_client(&self, client: NewClient) -> StoreFuture<'_, ClientId> {
            Box::pin(async move {
                let mut inserted = self
                    .inserted
                    .lock()
                    .map_err(|e| StoreError::Database(e.to_string()))?;
                inserted.push(client);
                Ok(ClientId::new(i32::try_from(inserted.len()).unwrap_or(i32::MAX)))
            })
        }

        fn client_exists(&self, client_id: ClientId) -> StoreFuture<'_, bool> {
            Box::pin(async move { Ok(client_id.value() == 1) })
        }
    }

    #[test]
    fn empty_last_name_is_rejected() {
        let client = NewClient {
            last_name: String::new(),
            ..jan()
        };
        assert_eq!(
            validate(client),
            Err(AgencyError::Validation("lastName is required".to_string()))
        );
    }

    #[test]
    fn whitespace_only_fields_are_blank() {
        let client = NewClient {
            pesel: "   \t".to_string(),
            ..jan()
        };
        assert!(matches!(validate(client), Err(AgencyError::Validation(_))));
    }

    #[test]
    fn telephone_is_optional() {
        let client = NewClient {
            telephone: None,
            ..jan()
        };
        assert_eq!(validate(client).unwrap().telephone, None);

        let blank_phone = NewClient {
            telephone: Some("  ".to_string()),
            ..jan()
        };
        assert_eq!(validate(blank_phone).unwrap().telephone, None);
    }

    #[test]
    fn fields_are_trimmed() {
        let client = NewClient {
            first_name: "  Jan ".to_string(),
            ..jan()
        };
        assert_eq!(validate(client).unwrap().first_name, "Jan");
    }

    #[tokio::test]
    async fn create_client_persists_valid_records() {
        let store = Arc::new(RecordingStore::default());
        let registry = ClientRegistry::new(store.clone(), Duration::from_secs(1));

        let id = registry.create_client(jan()).await.unwrap();

        assert_eq!(id, ClientId::new(1));
        assert_eq!(store.inserted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_clients_never_reach_storage() {
        let store = Arc::new(RecordingStore::default());
        let registry = ClientRegistry::new(store.clone(), Duration::from_secs(1));

        let result = registry
            .create_client(NewClient {
                email: String::new(),
                ..jan()
            })
            .await;

        assert!(matches!(result, Err(AgencyError::Validation(_))));
        assert!(store.inserted.lock().unwrap().is_empty());
    }
}
