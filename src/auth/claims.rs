// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::roles::Role;

/// Claims carried by an access token.
///
/// Roles are a snapshot taken at sign-in; the gate does not consult the user
/// directory again while the token is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: Uuid,

    /// Username at issuance
    pub username: String,

    /// Granted roles
    #[serde(default)]
    pub roles: Vec<Role>,

    /// Issued at timestamp (seconds, UTC)
    pub iat: i64,

    /// Expiration timestamp (seconds, UTC)
    pub exp: i64,
}

/// Authenticated user information extracted from a verified token.
///
/// This is the primary type used throughout the application to represent
/// the identity acting on a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Canonical user ID
    pub user_id: Uuid,

    /// Login name
    pub username: String,

    /// Granted roles
    pub roles: Vec<Role>,

    /// Token expiration (Unix timestamp), zero for identities that did not
    /// come from a token
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Build an identity that has not been through a token yet (sign-in).
    pub fn new(user_id: Uuid, username: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            user_id,
            username: username.into(),
            roles,
            expires_at: 0,
        }
    }

    /// Create from verified token claims.
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            roles: claims.roles,
            expires_at: claims.exp,
        }
    }

    /// Check if any granted role carries the required privilege.
    pub fn has_role(&self, required: Role) -> bool {
        self.roles.iter().any(|role| role.has_privilege(required))
    }

    /// Check if this user is an admin.
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}
