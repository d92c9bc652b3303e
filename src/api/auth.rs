// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sign-in and token refresh endpoints.

use axum::{extract::State, Json};

use crate::{
    auth::{Auth, AuthError},
    models::{SignInRequest, TokenResponse},
    state::AppState,
};

/// Exchange a username (or email) and password for an access token.
#[utoipa::path(
    post,
    path = "/api/auth/signin",
    request_body = SignInRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 401, description = "Invalid username/email or password"),
    )
)]
#[tracing::instrument(skip(state, request))]
pub async fn signin(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let user = state
        .auth_config
        .credentials
        .verify(&request.username_or_email, &request.password)
        .await?;

    let issued = state.auth_config.tokens.issue(&user)?;
    tracing::info!(user_id = %user.user_id, "signed in");

    Ok(Json(TokenResponse::new(issued, user)))
}

/// Issue a fresh token for the identity behind a still-valid one.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "New token", body = TokenResponse),
        (status = 401, description = "Missing, invalid or expired token"),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<TokenResponse>, AuthError> {
    let issued = state.auth_config.tokens.issue(&user)?;
    tracing::debug!(user_id = %user.user_id, "token refreshed");

    Ok(Json(TokenResponse::new(issued, user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{password::hash_password, AuthenticatedUser, Role};
    use crate::directory::{InMemoryUserDirectory, UserRecord};
    use chrono::Utc;
    use std::sync::Arc;
    use uuid::Uuid;

    fn state_with_alice() -> AppState {
        let directory = InMemoryUserDirectory::new();
        directory
            .insert(UserRecord {
                id: Uuid::new_v4(),
                name: "Alice".to_string(),
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: hash_password("s3cret-pass").unwrap(),
                roles: vec![Role::User],
                created_at: Utc::now(),
            })
            .unwrap();
        let default = AppState::default();
        AppState::new(Arc::new(directory), default.auth_config.tokens)
    }

    #[tokio::test]
    async fn signin_returns_token_for_identity() {
        let state = state_with_alice();
        let request = SignInRequest {
            username_or_email: "alice".to_string(),
            password: "s3cret-pass".to_string(),
        };

        let Json(response) = signin(State(state.clone()), Json(request)).await.unwrap();
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.user.username, "alice");

        let resolved = state.auth_config.tokens.validate(&response.access_token).unwrap();
        assert_eq!(resolved.user_id, response.user.id);
    }

    #[tokio::test]
    async fn signin_rejects_bad_password() {
        let state = state_with_alice();
        let request = SignInRequest {
            username_or_email: "alice".to_string(),
            password: "wrong".to_string(),
        };

        let err = signin(State(state), Json(request)).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn refresh_reissues_for_same_identity() {
        let state = AppState::default();
        let user = AuthenticatedUser::new(Uuid::new_v4(), "bob", vec![Role::Admin]);

        let Json(response) = refresh(State(state.clone()), Auth(user.clone())).await.unwrap();
        let resolved = state.auth_config.tokens.validate(&response.access_token).unwrap();
        assert_eq!(resolved.user_id, user.user_id);
        assert_eq!(resolved.roles, vec![Role::Admin]);
    }
}
