// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// ## Role Hierarchy
///
/// - `Admin` - Everything a user can do, plus the `/api/admin` area
/// - `User` - Regular account: create polls, vote, read own profile
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account holder
    User,
    /// Full administrative access
    Admin,
}

impl Role {
    /// Check if this role has at least the privileges of the required role.
    pub fn has_privilege(&self, required: Role) -> bool {
        match (self, required) {
            (Role::Admin, _) => true,
            (Role::User, Role::User) => true,
            _ => false,
        }
    }

    /// Parse role from string (case-insensitive).
    ///
    /// Accepts the `ROLE_` prefix used by stored role names (`ROLE_ADMIN`).
    pub fn from_str(s: &str) -> Option<Role> {
        let lower = s.trim().to_lowercase();
        let name = lower.strip_prefix("role_").unwrap_or(&lower);
        match name {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Const-generic discriminant used by [`RequireRole`](super::extractor::RequireRole).
    pub const fn from_discriminant(value: u8) -> Role {
        match value {
            0 => Role::User,
            // Unknown discriminants fall back to the most restrictive role.
            _ => Role::Admin,
        }
    }
}

impl Default for Role {
    /// Default role is User (least privilege for authenticated accounts).
    fn default() -> Self {
        Role::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}
