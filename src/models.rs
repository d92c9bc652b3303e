// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. Field names are camelCase on
//! the wire to stay compatible with the existing web client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::{AuthenticatedUser, IssuedToken, Role};
use crate::directory::UserRecord;

// =============================================================================
// Authentication
// =============================================================================

/// Body of `POST /api/auth/signin`.
#[derive(Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    /// Username or email address
    pub username_or_email: String,
    pub password: String,
}

impl std::fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInRequest")
            .field("username_or_email", &self.username_or_email)
            .finish_non_exhaustive()
    }
}

/// Identity summary returned alongside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<Role>,
}

impl From<AuthenticatedUser> for UserSummary {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            id: user.user_id,
            username: user.username,
            roles: user.roles,
        }
    }
}

/// Issued access token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `Bearer`
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserSummary,
}

impl TokenResponse {
    pub fn new(issued: IssuedToken, user: AuthenticatedUser) -> Self {
        Self {
            access_token: issued.token,
            token_type: "Bearer".to_string(),
            expires_at: issued.expires_at,
            user: user.into(),
        }
    }
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Deserialize, IntoParams)]
pub struct UsernameQuery {
    pub username: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityResponse {
    pub available: bool,
}

/// Public view of an account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub joined_at: DateTime<Utc>,
}

impl From<UserRecord> for UserProfile {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            joined_at: user.created_at,
        }
    }
}

/// Account listing entry for administrators.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub roles: Vec<Role>,
    pub joined_at: DateTime<Utc>,
}

impl From<UserRecord> for AdminUserView {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            roles: user.roles,
            joined_at: user.created_at,
        }
    }
}
