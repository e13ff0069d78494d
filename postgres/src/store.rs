//! [`PostgresAgencyStore`]: sqlx-backed implementation of the agency stores.

use crate::rows::{ClientTripRecord, TripCountryRecord, TripRow};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;
use travel_agency_core::store::{
    AgencyStore, CatalogStore, ClientStore, EnrollmentStore, InsertOutcome, StoreFuture,
};
use travel_agency_core::{
    ClientId, ClientTrip, NewClient, Registration, StoreError, TripCountryRow, TripId, TripSummary,
};

/// `PostgreSQL` unique violation (duplicate primary key).
const UNIQUE_VIOLATION: &str = "23505";

/// Demo catalog seed, see [`PostgresAgencyStore::seed_demo_catalog`].
const DEMO_CATALOG: &str = include_str!("../seeds/demo_catalog.sql");

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// `PostgreSQL` connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections in the pool
    pub min_connections: u32,
    /// Time allowed to acquire a connection
    pub connect_timeout: Duration,
    /// Server-side limit on any single statement
    pub statement_timeout: Duration,
    /// Connections idle longer than this are closed
    pub idle_timeout: Duration,
}

impl PoolSettings {
    /// Settings for `url` with the defaults used by the server.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
            statement_timeout: Duration::from_secs(60),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

/// `PostgreSQL`-backed storage for trips, clients and registrations.
///
/// # Registration atomicity
///
/// [`EnrollmentStore::insert_registration`] runs in one transaction:
///
/// 1. `SELECT … FOR UPDATE` on the trip row (per-trip exclusive lock)
/// 2. count registrations for the trip
/// 3. check the (client, trip) pair
/// 4. insert, commit
///
/// A concurrent insert for the same trip blocks at step 1 until the first
/// transaction ends, then counts the committed result. Inserts for other trips
/// lock other rows and proceed in parallel. The primary key on `client_trip`
/// still rejects a duplicate that slips past step 3.
#[derive(Clone, Debug)]
pub struct PostgresAgencyStore {
    pool: PgPool,
}

impl PostgresAgencyStore {
    /// Connect a new pool.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the URL is invalid or the initial
    /// connection fails.
    pub async fn connect(settings: &PoolSettings) -> Result<Self, StoreError> {
        let statement_timeout_ms = settings.statement_timeout.as_millis().to_string();
        let options = PgConnectOptions::from_str(&settings.url)
            .map_err(|e| StoreError::Database(format!("Invalid database URL: {e}")))?
            .options([("statement_timeout", statement_timeout_ms.as_str())]);

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.connect_timeout)
            .idle_timeout(settings.idle_timeout)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to connect: {e}")))?;

        tracing::info!(
            max_connections = settings.max_connections,
            "Connected to PostgreSQL"
        );
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create or upgrade the schema.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Migration failed: {e}")))?;
        tracing::info!("Database migrations complete");
        Ok(())
    }

    /// Load a small demo catalog of countries and trips. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the seed script fails.
    pub async fn seed_demo_catalog(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(DEMO_CATALOG)
            .execute(&self.pool)
            .await
            .map_err(db_error("seed demo catalog"))?;
        tracing::info!("Demo catalog seeded");
        Ok(())
    }
}

/// Map a sqlx error, keeping pool exhaustion distinguishable as a timeout.
fn db_error(action: &'static str) -> impl Fn(sqlx::Error) -> StoreError {
    move |e| match e {
        sqlx::Error::PoolTimedOut => StoreError::Timeout,
        other => StoreError::Database(format!("Failed to {action}: {other}")),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

impl CatalogStore for PostgresAgencyStore {
    fn list_trip_rows(&self) -> StoreFuture<'_, Vec<TripCountryRow>> {
        Box::pin(async move {
            let records: Vec<TripCountryRecord> = sqlx::query_as(
                "SELECT t.id, t.name, t.description, t.date_from, t.date_to, t.max_people,
                        c.name AS country
                 FROM trip t
                 LEFT JOIN country_trip ct ON ct.trip_id = t.id
                 LEFT JOIN country c ON c.id = ct.country_id
                 ORDER BY t.id",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list trips"))?;

            Ok(records.into_iter().map(Into::into).collect())
        })
    }

    fn find_trip(&self, trip_id: TripId) -> StoreFuture<'_, Option<TripSummary>> {
        Box::pin(async move {
            let row: Option<TripRow> = sqlx::query_as(
                "SELECT id, name, description, date_from, date_to, max_people
                 FROM trip
                 WHERE id = $1",
            )
            .bind(trip_id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find trip"))?;

            Ok(row.map(Into::into))
        })
    }

    fn list_client_trips(&self, client_id: ClientId) -> StoreFuture<'_, Vec<ClientTrip>> {
        Box::pin(async move {
            let records: Vec<ClientTripRecord> = sqlx::query_as(
                "SELECT t.id, t.name, t.description, t.date_from, t.date_to, t.max_people,
                        ct.registered_at, ct.payment_date
                 FROM trip t
                 JOIN client_trip ct ON ct.trip_id = t.id
                 WHERE ct.client_id = $1
                 ORDER BY t.id",
            )
            .bind(client_id.value())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list client trips"))?;

            Ok(records.into_iter().map(Into::into).collect())
        })
    }
}

impl ClientStore for PostgresAgencyStore {
    fn insert_client(&self, client: NewClient) -> StoreFuture<'_, ClientId> {
        Box::pin(async move {
            let id: i32 = sqlx::query_scalar(
                "INSERT INTO client (first_name, last_name, email, telephone, pesel)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING id",
            )
            .bind(&client.first_name)
            .bind(&client.last_name)
            .bind(&client.email)
            .bind(client.telephone.as_deref())
            .bind(&client.pesel)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("insert client"))?;

            Ok(ClientId::new(id))
        })
    }

    fn client_exists(&self, client_id: ClientId) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM client WHERE id = $1)")
                .bind(client_id.value())
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("check client"))
        })
    }
}

impl EnrollmentStore for PostgresAgencyStore {
    fn insert_registration(&self, registration: Registration) -> StoreFuture<'_, InsertOutcome> {
        Box::pin(async move {
            let client_id = registration.client_id.value();
            let trip_id = registration.trip_id.value();

            let mut tx = self.pool.begin().await.map_err(db_error("start transaction"))?;

            // Held until commit or rollback; serializes inserts for this trip only.
            let max_people: Option<i32> =
                sqlx::query_scalar("SELECT max_people FROM trip WHERE id = $1 FOR UPDATE")
                    .bind(trip_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(db_error("lock trip"))?;

            let Some(max_people) = max_people else {
                let _ = tx.rollback().await;
                return Ok(InsertOutcome::TripNotFound);
            };

            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM client_trip WHERE trip_id = $1")
                .bind(trip_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_error("count registrations"))?;

            if count >= i64::from(max_people) {
                let _ = tx.rollback().await;
                return Ok(InsertOutcome::CapacityExceeded);
            }

            let already: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM client_trip WHERE client_id = $1 AND trip_id = $2)",
            )
            .bind(client_id)
            .bind(trip_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("check registration"))?;

            if already {
                let _ = tx.rollback().await;
                return Ok(InsertOutcome::AlreadyRegistered);
            }

            let inserted = sqlx::query(
                "INSERT INTO client_trip (client_id, trip_id, registered_at, payment_date)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(client_id)
            .bind(trip_id)
            .bind(registration.registered_at.value())
            .bind(registration.payment_date.map(|d| d.value()))
            .execute(&mut *tx)
            .await;

            match inserted {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => {
                    let _ = tx.rollback().await;
                    return Ok(InsertOutcome::AlreadyRegistered);
                }
                Err(e) => return Err(db_error("insert registration")(e)),
            }

            tx.commit().await.map_err(db_error("commit registration"))?;
            tracing::debug!(client_id, trip_id, count = count + 1, max_people, "Registration committed");
            Ok(InsertOutcome::Inserted)
        })
    }

    fn delete_registration(&self, client_id: ClientId, trip_id: TripId) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM client_trip WHERE client_id = $1 AND trip_id = $2")
                .bind(client_id.value())
                .bind(trip_id.value())
                .execute(&self.pool)
                .await
                .map_err(db_error("delete registration"))?;

            Ok(result.rows_affected() == 1)
        })
    }
}

impl AgencyStore for PostgresAgencyStore {
    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(db_error("ping database"))?;
            Ok(())
        })
    }
}
