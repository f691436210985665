//! `vault`: encrypted field service entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (tracing + optional OTLP).
//! 3. Parse the field key and build the [`FieldCodec`].
//! 4. Open the SQLite database and apply pending migrations.
//! 5. Build the Axum router and start the HTTP server.

mod config;
mod crypto;
mod db;
mod server;
mod store;
mod telemetry;

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use tracing::info;

use config::Config;
use crypto::FieldCodec;
use server::{middleware::Limits, state::AppState};
use store::{RecordStore, SqliteRecordRepository};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let mut cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        "vault starting"
    );

    // -----------------------------------------------------------------------
    // 3. Field codec
    // -----------------------------------------------------------------------
    let codec = FieldCodec::new(&cfg.take_field_key()?);

    // -----------------------------------------------------------------------
    // 4. Database
    // -----------------------------------------------------------------------
    let conn = db::open_db(&cfg.database_path).context("failed to open database")?;
    let store = RecordStore::new(Arc::new(codec), SqliteRecordRepository::new(conn));

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(store, cfg.owner_header_name.clone());
    let limits = Limits {
        max_body_bytes: cfg.max_body_bytes,
        request_timeout: Duration::from_secs(cfg.request_timeout_secs),
    };
    let router = server::router::build(state, limits);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
