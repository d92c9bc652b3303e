// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::middleware::{authenticate, authorize},
    models::{
        AdminUserView, AvailabilityResponse, SignInRequest, TokenResponse, UserProfile,
        UserSummary,
    },
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod users;

/// Build the application router.
///
/// Request pipeline, outermost first: tracing, CORS (answers preflights),
/// request gate, authorization policy, handler.
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    let routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/api/auth/signin", post(auth::signin))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/user/me", get(users::get_current_user))
        .route(
            "/api/user/checkUsernameAvailability",
            get(users::check_username_availability),
        )
        .route(
            "/api/user/checkEmailAvailability",
            get(users::check_email_availability),
        )
        .route("/api/users/{username}", get(users::get_user_profile))
        .route("/api/admin/users", get(users::list_users))
        .with_state(state.clone());

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(from_fn_with_state(state.clone(), authorize))
        .layer(from_fn_with_state(state, authenticate))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// CORS policy: any origin when none are configured, otherwise the list.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::HEAD,
            Method::OPTIONS,
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}

async fn root() -> &'static str {
    "Polls API"
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signin,
        auth::refresh,
        users::get_current_user,
        users::check_username_availability,
        users::check_email_availability,
        users::get_user_profile,
        users::list_users,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            SignInRequest,
            TokenResponse,
            UserSummary,
            UserProfile,
            AdminUserView,
            AvailabilityResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Sign-in and token refresh"),
        (name = "Users", description = "Identity and account lookups"),
        (name = "Admin", description = "Administrator-only operations"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
