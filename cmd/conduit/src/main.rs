//! # Conduit Binary
//!
//! Loads settings, wires the adapters into the services and serves the
//! router until SIGINT/SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::{router, AppState};
use auth_adapters::{Argon2Hasher, JwtTokens};
use configs::{LogSettings, Settings};
use domains::Disclosure;
use services::AppServices;
use storage_adapters::{Neo4jConfig, Neo4jGraph};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Settings {
        server,
        neo4j,
        auth,
        marshal,
        log,
    } = Settings::load().context("loading settings")?;
    init_tracing(&log);

    // 1. Graph database
    let graph = Neo4jGraph::connect(Neo4jConfig {
        uri: neo4j.url.clone(),
        username: neo4j.username,
        password: neo4j.password,
        database: neo4j.database.clone(),
        max_connections: neo4j.max_connections,
        fetch_size: neo4j.fetch_size,
    })
    .await
    .context("connecting to Neo4j")?;
    info!(url = %neo4j.url, database = %neo4j.database, "graph database connected");

    // 2. Credentials
    let tokens = JwtTokens::new(&auth.jwt_secret, auth.token_ttl_secs);

    // 3. Services and router
    let services = AppServices::new(Arc::new(graph), Arc::new(Argon2Hasher), Arc::new(tokens));
    let disclosure = Disclosure {
        labels_or_type: marshal.reveal_labels,
        identity: marshal.reveal_identity,
    };
    let app = router(AppState::new(services, disclosure), &server.api_prefix);

    let listener = tokio::net::TcpListener::bind(server.bind_addr())
        .await
        .with_context(|| format!("binding {}", server.bind_addr()))?;
    info!(addr = %listener.local_addr()?, prefix = %server.api_prefix, "conduit listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("conduit stopped");
    Ok(())
}
