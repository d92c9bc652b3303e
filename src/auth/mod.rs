// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Stateless bearer-token authentication for the Polls API.
//!
//! ## Auth Flow
//!
//! 1. Client signs in at `POST /api/auth/signin` with a username (or email)
//!    and password
//! 2. The credential verifier checks the password hash and the token service
//!    issues an HS512 JWT carrying the user id and roles
//! 3. Client sends `Authorization: Bearer <token>` on later requests
//! 4. The request gate verifies signature and expiry and attaches the
//!    identity; the rule table then allows, or answers 401/403
//!
//! ## Security
//!
//! - No server-side sessions; every request stands on its token alone
//! - Signature is verified before any claim is read
//! - Expiry is a hard boundary (no clock-skew leeway)
//! - Unknown user and wrong password are reported identically

pub mod claims;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod policy;
pub mod roles;
pub mod token;

pub use claims::AuthenticatedUser;
pub use credentials::CredentialVerifier;
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth, OptionalAuth, RequireRole};
pub use policy::{Access, Decision, Rule, RuleTable};
pub use roles::Role;
pub use token::{IssuedToken, TokenService};
