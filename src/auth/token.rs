// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access token issuance and validation.
//!
//! Tokens are HS512-signed JWTs carrying [`TokenClaims`]. They are stateless:
//! validity is decided entirely by the signature and the `exp` claim, checked
//! against the injected [`Clock`] with no leeway.

use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{claims::TokenClaims, AuthError, AuthenticatedUser};
use crate::clock::{Clock, SystemClock};

const ALGORITHM: Algorithm = Algorithm::HS512;

/// A freshly minted token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies access tokens with the process-wide secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Create a service using wall-clock time.
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        Self::with_clock(secret, lifetime, Arc::new(SystemClock))
    }

    pub fn with_clock(secret: &[u8], lifetime: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetime,
            clock,
        }
    }

    /// Mint a token for an authenticated identity.
    ///
    /// Claims carry whole seconds, so the issue instant is truncated first and
    /// the reported `expires_at` is exactly the `exp` that validation enforces.
    pub fn issue(&self, user: &AuthenticatedUser) -> Result<IssuedToken, AuthError> {
        let issued_at = self.clock.now().trunc_subsecs(0);
        let expires_at = issued_at
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| AuthError::InternalError("token lifetime out of range".to_string()))?;

        let claims = TokenClaims {
            sub: user.user_id,
            username: user.username.clone(),
            roles: user.roles.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(format!("failed to sign token: {e}")))?;

        Ok(IssuedToken {
            token,
            issued_at,
            expires_at,
        })
    }

    /// Verify a token and resolve the identity it carries.
    ///
    /// The signature is checked before any claim is interpreted; expiry is a
    /// hard boundary (`now >= exp` fails).
    pub fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked below against our own clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data =
            decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })?;

        let claims = token_data.claims;
        if self.clock.now().timestamp() >= claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(AuthenticatedUser::from_claims(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::clock::FixedClock;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use chrono::TimeZone;
    use uuid::Uuid;

    const SECRET: &[u8] = b"test-secret-test-secret-test-secret-0123456789";
    fn lifetime() -> Duration {
        Duration::days(7)
    }

    fn setup() -> (TokenService, FixedClock, AuthenticatedUser) {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
        let service = TokenService::with_clock(SECRET, lifetime(), Arc::new(clock.clone()));
        let user = AuthenticatedUser::new(Uuid::new_v4(), "alice", vec![Role::User]);
        (service, clock, user)
    }

    #[test]
    fn issued_token_validates_before_expiry() {
        let (service, clock, user) = setup();
        let issued = service.issue(&user).unwrap();
        assert_eq!(issued.expires_at - issued.issued_at, Duration::days(7));

        clock.advance(Duration::days(7) - Duration::seconds(1));
        let resolved = service.validate(&issued.token).unwrap();
        assert_eq!(resolved.user_id, user.user_id);
        assert_eq!(resolved.username, "alice");
        assert_eq!(resolved.roles, vec![Role::User]);
        assert_eq!(resolved.expires_at, issued.expires_at.timestamp());
    }

    #[test]
    fn expiry_is_a_hard_boundary() {
        let (service, clock, user) = setup();
        let issued = service.issue(&user).unwrap();

        clock.advance(Duration::days(7));
        assert_eq!(service.validate(&issued.token), Err(AuthError::TokenExpired));

        clock.advance(Duration::days(30));
        assert_eq!(service.validate(&issued.token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn configured_lifetime_is_honoured() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
        let service = TokenService::with_clock(SECRET, Duration::seconds(60), Arc::new(clock.clone()));
        let user = AuthenticatedUser::new(Uuid::new_v4(), "alice", vec![]);
        let issued = service.issue(&user).unwrap();

        clock.advance(Duration::seconds(59));
        assert!(service.validate(&issued.token).is_ok());
        clock.advance(Duration::seconds(1));
        assert_eq!(service.validate(&issued.token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn reported_expiry_matches_enforced_expiry() {
        let start =
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::milliseconds(700);
        let clock = FixedClock::new(start);
        let service = TokenService::with_clock(SECRET, lifetime(), Arc::new(clock.clone()));
        let user = AuthenticatedUser::new(Uuid::new_v4(), "alice", vec![]);
        let issued = service.issue(&user).unwrap();

        assert_eq!(issued.expires_at.timestamp_subsec_millis(), 0);
        assert_eq!(issued.expires_at - issued.issued_at, lifetime());

        clock.set(issued.expires_at - Duration::milliseconds(300));
        let resolved = service.validate(&issued.token).unwrap();
        assert_eq!(resolved.expires_at, issued.expires_at.timestamp());

        clock.set(issued.expires_at);
        assert_eq!(service.validate(&issued.token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn foreign_secret_fails_signature() {
        let (service, clock, user) = setup();
        let other = TokenService::with_clock(
            b"another-secret-another-secret-another-secret",
            lifetime(),
            Arc::new(clock),
        );
        let forged = other.issue(&user).unwrap();
        assert_eq!(service.validate(&forged.token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn tampered_payload_fails_signature() {
        let (service, _clock, user) = setup();
        let issued = service.issue(&user).unwrap();
        let parts: Vec<&str> = issued.token.split('.').collect();

        let forged_claims = format!(
            r#"{{"sub":"{}","username":"alice","roles":["admin"],"iat":0,"exp":9999999999}}"#,
            user.user_id
        );
        let forged = format!(
            "{}.{}.{}",
            parts[0],
            URL_SAFE_NO_PAD.encode(forged_claims.as_bytes()),
            parts[2]
        );
        assert_eq!(service.validate(&forged), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn expired_forgery_reports_signature_not_expiry() {
        let (service, clock, user) = setup();
        let other = TokenService::with_clock(
            b"another-secret-another-secret-another-secret",
            Duration::seconds(1),
            Arc::new(clock.clone()),
        );
        let forged = other.issue(&user).unwrap();
        clock.advance(Duration::days(1));
        assert_eq!(service.validate(&forged.token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        let (service, _clock, _user) = setup();
        assert_eq!(service.validate("not-a-jwt"), Err(AuthError::MalformedToken));
        assert_eq!(service.validate(""), Err(AuthError::MalformedToken));
        assert_eq!(service.validate("a.b.c"), Err(AuthError::MalformedToken));
    }

    #[test]
    fn validation_is_idempotent() {
        let (service, _clock, user) = setup();
        let issued = service.issue(&user).unwrap();
        let first = service.validate(&issued.token).unwrap();
        let second = service.validate(&issued.token).unwrap();
        assert_eq!(first, second);
    }
}
