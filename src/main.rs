// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use relational_polls_server::{
    api::{cors_layer, router},
    auth::password::hash_password,
    config::{SeedUser, ServerConfig},
    directory::{InMemoryUserDirectory, UserRecord},
    state::AppState,
    telemetry,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            telemetry::init(Default::default());
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    telemetry::init(config.log_format);

    let addr = match config.bind_addr() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, "invalid bind address");
            return ExitCode::FAILURE;
        }
    };

    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL is set but only the in-memory user directory is available");
    }

    let directory = InMemoryUserDirectory::new();
    if let Some(seed) = &config.seed_user {
        if let Err(e) = seed_user(&directory, seed) {
            tracing::error!(error = %e, "failed to create seed user");
            return ExitCode::FAILURE;
        }
        tracing::info!(username = %seed.username, roles = ?seed.roles, "seed user created");
    }

    let state = AppState::from_config(&config, Arc::new(directory));
    let app = router(state, cors_layer(&config.cors_allowed_origins));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        %addr,
        token_lifetime_ms = config.jwt_lifetime.num_milliseconds(),
        "Polls API listening (docs at /docs)"
    );

    let shutdown = CancellationToken::new();
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await;

    match result {
        Ok(()) => {
            tracing::info!("server shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

fn seed_user(
    directory: &InMemoryUserDirectory,
    seed: &SeedUser,
) -> Result<(), Box<dyn std::error::Error>> {
    let password_hash = hash_password(&seed.password)?;
    directory.insert(UserRecord {
        id: Uuid::new_v4(),
        name: seed.username.clone(),
        username: seed.username.clone(),
        email: seed.email.clone(),
        password_hash,
        roles: seed.roles.clone(),
        created_at: Utc::now(),
    })?;
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = shutdown.cancelled() => {},
    }

    tracing::info!("Shutdown signal received, stopping...");
    shutdown.cancel();
}
