// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`ServerConfig`] loaded from the environment once at startup. The result is
//! immutable for the lifetime of the process.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HMAC secret used to sign access tokens | Required |
//! | `JWT_EXPIRATION_MS` | Access token lifetime in milliseconds | `604800000` (7 days) |
//! | `CORS_ALLOWED_ORIGINS` | Comma separated list of allowed origins | Any origin |
//! | `DATABASE_URL` | Connection string handed to the user directory | Unset |
//! | `SEED_USERNAME` / `SEED_EMAIL` / `SEED_PASSWORD` / `SEED_ROLES` | Account created at startup | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;

use chrono::{Duration, Utc};

use crate::auth::Role;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_EXPIRATION_MS_ENV: &str = "JWT_EXPIRATION_MS";
pub const CORS_ALLOWED_ORIGINS_ENV: &str = "CORS_ALLOWED_ORIGINS";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const SEED_USERNAME_ENV: &str = "SEED_USERNAME";
pub const SEED_EMAIL_ENV: &str = "SEED_EMAIL";
pub const SEED_PASSWORD_ENV: &str = "SEED_PASSWORD";
pub const SEED_ROLES_ENV: &str = "SEED_ROLES";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Default access token lifetime: 7 days.
pub const DEFAULT_JWT_EXPIRATION_MS: i64 = 604_800_000;

/// Shortest accepted access token lifetime.
pub const MIN_JWT_EXPIRATION_MS: u64 = 1000;

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// HS512 keys shorter than this are rejected at startup.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Account created at startup when the `SEED_*` variables are present.
#[derive(Clone)]
pub struct SeedUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub roles: Vec<Role>,
}

impl std::fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_lifetime: Duration,
    /// Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
    pub database_url: Option<String>,
    pub seed_user: Option<SeedUser>,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_lifetime", &self.jwt_lifetime)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("seed_user", &self.seed_user)
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV,
                reason: format!("'{raw}' is not a port number"),
            })?,
            None => DEFAULT_PORT,
        };

        let jwt_secret = get(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: JWT_SECRET_ENV,
                reason: format!("must be at least {MIN_SECRET_LEN} bytes"),
            });
        }

        let jwt_lifetime = match get(JWT_EXPIRATION_MS_ENV) {
            Some(raw) => parse_lifetime(&raw)?,
            None => Duration::milliseconds(DEFAULT_JWT_EXPIRATION_MS),
        };

        let cors_allowed_origins = get(CORS_ALLOWED_ORIGINS_ENV)
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let log_format = match get(LOG_FORMAT_ENV).map(|v| v.to_lowercase()) {
            None => LogFormat::Pretty,
            Some(v) if v == "pretty" => LogFormat::Pretty,
            Some(v) if v == "json" => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    reason: format!("'{other}' (expected 'json' or 'pretty')"),
                })
            }
        };

        let seed_user = match (get(SEED_USERNAME_ENV), get(SEED_PASSWORD_ENV)) {
            (Some(username), Some(password)) => {
                let email = get(SEED_EMAIL_ENV).unwrap_or_else(|| format!("{username}@localhost"));
                let roles = match get(SEED_ROLES_ENV) {
                    Some(raw) => parse_roles(&raw)?,
                    None => vec![Role::User],
                };
                Some(SeedUser {
                    username,
                    email,
                    password,
                    roles,
                })
            }
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(SEED_PASSWORD_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(SEED_USERNAME_ENV)),
        };

        Ok(Self {
            host,
            port,
            jwt_secret,
            jwt_lifetime,
            cors_allowed_origins,
            database_url: get(DATABASE_URL_ENV),
            seed_user,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Invalid {
                name: HOST_ENV,
                reason: format!("{e}"),
            })
    }
}

/// Parse a token lifetime in milliseconds.
///
/// The lifetime must be long enough to use and short enough that an expiry
/// computed from the current time is still representable.
fn parse_lifetime(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: JWT_EXPIRATION_MS_ENV,
        reason,
    };

    let ms = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| invalid(format!("'{raw}' is not a number of milliseconds")))?;
    if ms < MIN_JWT_EXPIRATION_MS {
        return Err(invalid(format!("must be at least {MIN_JWT_EXPIRATION_MS} ms")));
    }

    i64::try_from(ms)
        .ok()
        .and_then(Duration::try_milliseconds)
        .filter(|lifetime| Utc::now().checked_add_signed(*lifetime).is_some())
        .ok_or_else(|| invalid(format!("{ms} ms is too long to compute an expiry time")))
}

fn parse_roles(raw: &str) -> Result<Vec<Role>, ConfigError> {
    let mut roles = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let role = Role::from_str(name).ok_or_else(|| ConfigError::Invalid {
            name: SEED_ROLES_ENV,
            reason: format!("unknown role '{name}'"),
        })?;
        if !roles.contains(&role) {
            roles.push(role);
        }
    }
    Ok(roles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[(JWT_SECRET_ENV, SECRET)]).unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.jwt_lifetime, Duration::days(7));
        assert!(config.cors_allowed_origins.is_empty());
        assert!(config.database_url.is_none());
        assert!(config.seed_user.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.bind_addr().unwrap().port(), 8080);
    }

    #[test]
    fn secret_is_required_and_long_enough() {
        assert!(matches!(load(&[]), Err(ConfigError::Missing(JWT_SECRET_ENV))));
        assert!(matches!(
            load(&[(JWT_SECRET_ENV, "short")]),
            Err(ConfigError::Invalid { name: JWT_SECRET_ENV, .. })
        ));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            (JWT_SECRET_ENV, SECRET),
            (PORT_ENV, "9000"),
            (JWT_EXPIRATION_MS_ENV, "3600000"),
            (CORS_ALLOWED_ORIGINS_ENV, "http://localhost:3000, https://polls.example.com"),
            (LOG_FORMAT_ENV, "JSON"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.jwt_lifetime, Duration::hours(1));
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:3000", "https://polls.example.com"]
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(load(&[(JWT_SECRET_ENV, SECRET), (PORT_ENV, "http")]).is_err());
        assert!(load(&[(JWT_SECRET_ENV, SECRET), (JWT_EXPIRATION_MS_ENV, "10")]).is_err());
        assert!(load(&[(JWT_SECRET_ENV, SECRET), (LOG_FORMAT_ENV, "xml")]).is_err());
    }

    #[test]
    fn unrepresentable_lifetimes_are_rejected() {
        for raw in ["18446744073709551615", "9223372036854775807", "9223372036854775"] {
            assert!(
                matches!(
                    load(&[(JWT_SECRET_ENV, SECRET), (JWT_EXPIRATION_MS_ENV, raw)]),
                    Err(ConfigError::Invalid { name: JWT_EXPIRATION_MS_ENV, .. })
                ),
                "{raw} should be rejected"
            );
        }

        let config =
            load(&[(JWT_SECRET_ENV, SECRET), (JWT_EXPIRATION_MS_ENV, "315360000000")]).unwrap();
        assert_eq!(config.jwt_lifetime, Duration::days(3650));
    }

    #[test]
    fn seed_user_parsing() {
        let config = load(&[
            (JWT_SECRET_ENV, SECRET),
            (SEED_USERNAME_ENV, "root"),
            (SEED_PASSWORD_ENV, "hunter22"),
            (SEED_ROLES_ENV, "ROLE_ADMIN, user"),
        ])
        .unwrap();
        let seed = config.seed_user.unwrap();
        assert_eq!(seed.email, "root@localhost");
        assert_eq!(seed.roles, vec![Role::Admin, Role::User]);
        assert!(!format!("{seed:?}").contains("hunter22"));

        assert!(matches!(
            load(&[(JWT_SECRET_ENV, SECRET), (SEED_USERNAME_ENV, "root")]),
            Err(ConfigError::Missing(SEED_PASSWORD_ENV))
        ));
        assert!(load(&[
            (JWT_SECRET_ENV, SECRET),
            (SEED_USERNAME_ENV, "root"),
            (SEED_PASSWORD_ENV, "pw"),
            (SEED_ROLES_ENV, "superuser"),
        ])
        .is_err());
    }

    #[test]
    fn debug_output_hides_secret() {
        let config = load(&[(JWT_SECRET_ENV, SECRET)]).unwrap();
        assert!(!format!("{config:?}").contains(SECRET));
    }
}
