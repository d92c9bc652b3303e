// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization middleware for Axum.
//!
//! Two stages run in front of every route, in this order:
//!
//! 1. [`authenticate`] (the request gate) resolves a bearer token into an
//!    [`AuthenticatedUser`] stored in the request extensions. It never
//!    rejects: a missing, malformed, forged or expired token simply leaves
//!    the request unauthenticated.
//! 2. [`authorize`] evaluates the [`RuleTable`](super::policy::RuleTable)
//!    and is the single entry point producing 401/403 responses.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/api/user/me", get(me))
//!     .layer(
//!         ServiceBuilder::new()
//!             .layer(from_fn_with_state(state.clone(), authenticate))
//!             .layer(from_fn_with_state(state.clone(), authorize)),
//!     );
//! ```

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{policy::Decision, AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Extract the bearer token from the `Authorization` header.
///
/// Returns `Ok(None)` when the header is absent.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(header) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = header.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)?;

    Ok(Some(token))
}

/// Request gate: attach the identity behind a valid bearer token.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = match bearer_token(request.headers()) {
        Ok(Some(token)) => match state.auth_config.tokens.validate(token) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!(
                    error_code = e.error_code(),
                    path = %request.uri().path(),
                    "bearer token rejected, continuing unauthenticated"
                );
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::debug!(error_code = e.error_code(), "unusable authorization header");
            None
        }
    };

    if let Some(user) = user {
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

/// Authorization policy: allow, or answer 401/403.
pub async fn authorize(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let user = request.extensions().get::<AuthenticatedUser>();
    let decision = state
        .auth_config
        .rules
        .evaluate(request.method(), request.uri().path(), user);

    match decision {
        Decision::Allow => next.run(request).await,
        Decision::Unauthenticated => {
            tracing::debug!(
                method = %request.method(),
                path = %request.uri().path(),
                "rejecting unauthenticated request"
            );
            AuthError::Unauthenticated.into_response()
        }
        Decision::Forbidden => {
            tracing::info!(
                method = %request.method(),
                path = %request.uri().path(),
                user_id = ?user.map(|u| u.user_id),
                "access denied"
            );
            AuthError::InsufficientPermissions.into_response()
        }
    }
}
