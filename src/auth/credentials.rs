// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Username/password verification for sign-in.

use std::sync::Arc;

use super::{password, AuthError, AuthenticatedUser};
use crate::directory::UserDirectory;

/// Checks a login (username or email) and password against the directory.
#[derive(Clone)]
pub struct CredentialVerifier {
    directory: Arc<dyn UserDirectory>,
}

impl CredentialVerifier {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Verify credentials and return the identity they belong to.
    ///
    /// Unknown users and wrong passwords both fail with
    /// [`AuthError::InvalidCredentials`].
    pub async fn verify(&self, login: &str, plaintext: &str) -> Result<AuthenticatedUser, AuthError> {
        let directory = Arc::clone(&self.directory);
        let login = login.to_string();
        let plaintext = plaintext.to_string();

        // Hashing is deliberately slow; keep it off the async workers.
        tokio::task::spawn_blocking(move || verify_blocking(directory.as_ref(), &login, &plaintext))
            .await
            .map_err(|e| AuthError::InternalError(format!("credential check panicked: {e}")))?
    }
}

fn verify_blocking(
    directory: &dyn UserDirectory,
    login: &str,
    plaintext: &str,
) -> Result<AuthenticatedUser, AuthError> {
    let record = directory.find_by_username_or_email(login).map_err(|e| {
        tracing::error!(error = %e, "user lookup failed during sign-in");
        AuthError::InternalError("user lookup failed".to_string())
    })?;

    let Some(record) = record else {
        password::verify_dummy(plaintext);
        tracing::debug!("sign-in rejected: unknown account");
        return Err(AuthError::InvalidCredentials);
    };

    match password::verify_password(plaintext, &record.password_hash) {
        Ok(true) => Ok(AuthenticatedUser::new(record.id, record.username, record.roles)),
        Ok(false) => {
            tracing::debug!(user_id = %record.id, "sign-in rejected: password mismatch");
            Err(AuthError::InvalidCredentials)
        }
        Err(e) => {
            tracing::warn!(user_id = %record.id, error = %e, "stored password hash is unusable");
            Err(AuthError::InvalidCredentials)
        }
    }
}
