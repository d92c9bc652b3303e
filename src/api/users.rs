// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    auth::{AdminOnly, Auth},
    error::ApiError,
    models::{
        AdminUserView, AvailabilityResponse, EmailQuery, UserProfile, UserSummary, UsernameQuery,
    },
    state::AppState,
};

/// Get the identity acting on this request.
#[utoipa::path(
    get,
    path = "/api/user/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current identity", body = UserSummary),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn get_current_user(Auth(user): Auth) -> Json<UserSummary> {
    Json(user.into())
}

#[utoipa::path(
    get,
    path = "/api/user/checkUsernameAvailability",
    params(UsernameQuery),
    tag = "Users",
    responses((status = 200, body = AvailabilityResponse))
)]
pub async fn check_username_availability(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let taken = state.directory.username_exists(&query.username)?;
    Ok(Json(AvailabilityResponse { available: !taken }))
}

#[utoipa::path(
    get,
    path = "/api/user/checkEmailAvailability",
    params(EmailQuery),
    tag = "Users",
    responses((status = 200, body = AvailabilityResponse))
)]
pub async fn check_email_availability(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let taken = state.directory.email_exists(&query.email)?;
    Ok(Json(AvailabilityResponse { available: !taken }))
}

/// Public profile of an account.
#[utoipa::path(
    get,
    path = "/api/users/{username}",
    params(("username" = String, Path, description = "Login name")),
    tag = "Users",
    responses(
        (status = 200, body = UserProfile),
        (status = 404, description = "No such user"),
    )
)]
pub async fn get_user_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state
        .directory
        .find_by_username(&username)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user.into()))
}

/// All accounts. Administrators only.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, body = [AdminUserView]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an administrator"),
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AdminOnly(admin): AdminOnly,
) -> Result<Json<Vec<AdminUserView>>, ApiError> {
    tracing::debug!(admin_id = %admin.user_id, "listing users");
    let users = state.directory.list()?;
    Ok(Json(users.into_iter().map(AdminUserView::from).collect()))
}
