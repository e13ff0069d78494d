//! Application bootstrap and graceful shutdown.
//!
//! Bootstrap order:
//!
//! 1. Connect the `PostgreSQL` pool
//! 2. Apply migrations (and the demo seed, if enabled)
//! 3. Wire catalog, registry and engine into an [`Agency`]
//! 4. Bind the HTTP listener
//!
//! [`Application::run`] then serves until Ctrl+C or SIGTERM and gives
//! in-flight requests up to the configured grace period to finish.

use crate::config::Config;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{info, warn};
use travel_agency_core::{Agency, SystemClock};
use travel_agency_postgres::PostgresAgencyStore;
use travel_agency_web::{AppState, build_router};

/// A fully wired server, ready to accept connections.
pub struct Application {
    config: Config,
    store: PostgresAgencyStore,
    listener: TcpListener,
    app: Router,
}

impl Application {
    /// Build every component from `config`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - the database is unreachable or a migration fails
    /// - the HTTP address is invalid or cannot be bound
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        info!(database = %config.database.redacted_url(), "Connecting to PostgreSQL");
        let store = PostgresAgencyStore::connect(&config.database.pool_settings()).await?;

        if config.database.run_migrations {
            store.migrate().await?;
        } else {
            info!("Skipping database migrations");
        }
        if config.database.seed_demo {
            store.seed_demo_catalog().await?;
        }

        let agency = Agency::new(
            Arc::new(store.clone()),
            Arc::new(SystemClock),
            config.server.storage_timeout(),
        );
        let app = build_router(AppState::new(agency));

        let address = config.server.bind_address()?;
        let listener = TcpListener::bind(address).await?;
        info!(%address, "HTTP listener bound");

        Ok(Self {
            config,
            store,
            listener,
            app,
        })
    }

    /// Serve requests until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP server fails.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let Self {
            config,
            store,
            listener,
            app,
        } = self;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let mut server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!("HTTP server listening for requests");

        tokio::select! {
            joined = &mut server => {
                // Server stopped on its own; nothing left to drain.
                joined??;
                store.pool().close().await;
                return Ok(());
            }
            () = shutdown_signal() => {}
        }

        let grace = config.server.shutdown_grace();
        info!(grace_secs = grace.as_secs(), "Draining in-flight requests");
        let _ = shutdown_tx.send(());

        match tokio::time::timeout(grace, &mut server).await {
            Ok(joined) => joined??,
            Err(_) => {
                warn!("Shutdown grace period elapsed, aborting open connections");
                server.abort();
            }
        }

        store.pool().close().await;
        info!("Graceful shutdown complete");
        Ok(())
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        () = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
