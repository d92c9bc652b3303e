// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Polls - Stateless Authentication Gate
//!
//! Bearer-token authentication and URL-level authorization in front of the
//! polling API. Identities sign in once with a password and afterwards every
//! request is authenticated from its signed, time-bounded token alone.
//!
//! ## Modules
//!
//! - `api` - HTTP router and handlers (Axum)
//! - `auth` - Credentials, tokens, request gate and rule table
//! - `clock` - UTC time source threaded through token handling
//! - `config` - Environment configuration
//! - `directory` - User lookup collaborator

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod state;
pub mod telemetry;
