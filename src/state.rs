// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use chrono::Duration;

use crate::auth::{CredentialVerifier, RuleTable, TokenService};
use crate::clock::{Clock, SystemClock};
use crate::config::{ServerConfig, DEFAULT_JWT_EXPIRATION_MS};
use crate::directory::{InMemoryUserDirectory, UserDirectory};

/// Authentication wiring, built once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AuthConfig {
    pub tokens: TokenService,
    pub credentials: CredentialVerifier,
    pub rules: Arc<RuleTable>,
}

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn UserDirectory>,
    pub auth_config: AuthConfig,
}

impl AppState {
    pub fn new(directory: Arc<dyn UserDirectory>, tokens: TokenService) -> Self {
        Self {
            auth_config: AuthConfig {
                tokens,
                credentials: CredentialVerifier::new(Arc::clone(&directory)),
                rules: Arc::new(RuleTable::polls_default()),
            },
            directory,
        }
    }

    pub fn from_config(config: &ServerConfig, directory: Arc<dyn UserDirectory>) -> Self {
        Self::with_clock(config, directory, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: &ServerConfig,
        directory: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tokens =
            TokenService::with_clock(config.jwt_secret.as_bytes(), config.jwt_lifetime, clock);
        Self::new(directory, tokens)
    }

    /// Replace the authorization rules.
    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.auth_config.rules = Arc::new(rules);
        self
    }
}

impl Default for AppState {
    /// Empty directory and a throwaway signing secret. Tests only.
    fn default() -> Self {
        let secret = uuid::Uuid::new_v4().to_string();
        Self::new(
            Arc::new(InMemoryUserDirectory::new()),
            TokenService::new(
                secret.as_bytes(),
                Duration::milliseconds(DEFAULT_JWT_EXPIRATION_MS),
            ),
        )
    }
}
