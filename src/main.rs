// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

use std::{env, net::SocketAddr, sync::Arc};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hhn_kyc_server::{
    api::router,
    config::{DATA_DIR_ENV, HOST_ENV, JWT_SECRET_ENV, LOG_FORMAT_ENV, PORT_ENV},
    provider::SandboxClient,
    state::{AppState, AuthConfig},
    storage::{FsAuditSink, JsonStore, StoragePaths},
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}

fn env_trimmed(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install shutdown signal handler");
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() {
    init_tracing();

    let paths = match env_trimmed(DATA_DIR_ENV) {
        Some(dir) => StoragePaths::new(dir),
        None => StoragePaths::default(),
    };
    let data_dir = paths.root().display().to_string();
    let mut store = JsonStore::new(paths);
    store
        .initialize()
        .expect("failed to initialize data directory");
    info!(%data_dir, "data directory initialized");

    let audit = Arc::new(FsAuditSink::new(store.clone()));
    let provider = if SandboxClient::is_configured() {
        match SandboxClient::from_env(audit) {
            Ok(client) => Some(Arc::new(client)),
            Err(error) => {
                warn!(%error, "failed to build eKYC gateway client; verification disabled");
                None
            }
        }
    } else {
        warn!("SANDBOX_API_KEY/SANDBOX_API_SECRET not set; verification endpoints will return 503");
        None
    };

    let jwt_secret = env_trimmed(JWT_SECRET_ENV);
    if jwt_secret.is_none() {
        warn!("{JWT_SECRET_ENV} not set; running in development mode without signature verification");
    }

    let state = AppState::new(store, AuthConfig { jwt_secret }, provider);
    let app = router(state);

    let host = env_trimmed(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
    let port: u16 = env_trimmed(PORT_ENV)
        .and_then(|value| value.parse().ok())
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("failed to parse bind address");

    info!(%addr, "HHN KYC server listening (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind server address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");
}
