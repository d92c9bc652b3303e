// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the acting identity.
//!
//! The request gate has already validated the bearer token by the time a
//! handler runs, so these extractors only read the [`AuthenticatedUser`]
//! from the request extensions. They are the per-operation capability
//! checks layered on top of the URL rule table:
//!
//! ```rust,ignore
//! async fn create_poll(RequireRole(user): RequireRole<{ Role::User as u8 }>) -> impl IntoResponse {
//!     // only identities holding `user` (or `admin`) get here
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, AuthenticatedUser, Role};

/// Extractor for authenticated users.
///
/// Rejects with [`AuthError::Unauthenticated`] when the gate attached no
/// identity.
pub struct Auth(pub AuthenticatedUser);

impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Extractor that requires a specific role.
///
/// `R` is the role discriminant, e.g. `RequireRole<{ Role::Admin as u8 }>`.
pub struct RequireRole<const R: u8>(pub AuthenticatedUser);

impl<S: Send + Sync, const R: u8> FromRequestParts<S> for RequireRole<R> {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.has_role(Role::from_discriminant(R)) {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(RequireRole(user))
    }
}

/// Extractor that requires admin role.
pub struct AdminOnly(pub AuthenticatedUser);

impl<S: Send + Sync> FromRequestParts<S> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(user))
    }
}

/// Optional authentication extractor.
///
/// Yields `None` for anonymous requests instead of rejecting, for public
/// endpoints that personalise their answer when an identity is present.
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

impl<S: Send + Sync> FromRequestParts<S> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use uuid::Uuid;

    fn parts_with(user: Option<AuthenticatedUser>) -> Parts {
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        if let Some(user) = user {
            parts.extensions.insert(user);
        }
        parts
    }

    fn user(roles: Vec<Role>) -> AuthenticatedUser {
        AuthenticatedUser::new(Uuid::new_v4(), "alice", roles)
    }

    #[tokio::test]
    async fn auth_extractor_requires_identity() {
        let mut parts = parts_with(None);
        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn auth_extractor_reads_extensions() {
        let expected = user(vec![Role::User]);
        let mut parts = parts_with(Some(expected.clone()));
        let Auth(found) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found, expected);
    }

    #[tokio::test]
    async fn require_role_checks_privilege() {
        let mut parts = parts_with(Some(user(vec![Role::User])));
        let result = RequireRole::<{ Role::Admin as u8 }>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));

        let mut parts = parts_with(Some(user(vec![Role::Admin])));
        let result = RequireRole::<{ Role::User as u8 }>::from_request_parts(&mut parts, &()).await;
        assert!(result.is_ok());

        let mut parts = parts_with(None);
        let result = RequireRole::<{ Role::User as u8 }>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn admin_only_rejects_non_admin() {
        let mut parts = parts_with(Some(user(vec![Role::User])));
        let result = AdminOnly::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn optional_auth_returns_none_without_user() {
        let mut parts = parts_with(None);
        let OptionalAuth(found) = OptionalAuth::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(found.is_none());
    }
}
