//! Signed access tokens carrying a user's id and role.

use super::models::{AccessTokenClaims, Actor};
use crate::errors::CoreResult;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

/// HMAC secret and lifetime for access tokens
#[derive(Clone)]
pub struct TokenKeys {
    secret: String,
    access_token_duration: Duration,
}

impl TokenKeys {
    pub fn new(secret: impl Into<String>, access_token_duration: Duration) -> Self {
        Self {
            secret: secret.into(),
            access_token_duration,
        }
    }

    /// Sign a token for `actor`. The admin override is never encoded; it is
    /// requested per call.
    ///
    /// Tokens come from the identity provider in production and the server
    /// only calls [`TokenKeys::verify`]. This is for tests and operator
    /// tooling that share the secret.
    pub fn issue(&self, actor: &Actor) -> CoreResult<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: actor.user_id,
            role: actor.role,
            exp: (now + self.access_token_duration).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// Check signature and expiry and return the claims
    ///
    /// # Errors
    ///
    /// * `CoreError::InvalidToken` - Bad signature, malformed or expired
    pub fn verify(&self, token: &str) -> CoreResult<AccessTokenClaims> {
        let data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("secret", &"<redacted>")
            .field("access_token_duration", &self.access_token_duration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        access::Role,
        errors::{CoreError, ErrorKind},
    };

    #[test]
    fn test_issue_then_verify() {
        let keys = TokenKeys::new("test_secret", Duration::minutes(15));
        let token = keys.issue(&Actor::new(42, Role::Referee)).unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, Role::Referee);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = TokenKeys::new("one", Duration::minutes(15))
            .issue(&Actor::new(1, Role::Admin))
            .unwrap();

        let err = TokenKeys::new("two", Duration::minutes(15))
            .verify(&token)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidToken(_)));
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.client_message(), "Authentication failed");
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Well past the default 60s leeway
        let keys = TokenKeys::new("test_secret", Duration::minutes(-10));
        let token = keys.issue(&Actor::new(1, Role::Player)).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let keys = TokenKeys::new("hunter2", Duration::minutes(1));
        assert!(!format!("{keys:?}").contains("hunter2"));
    }
}
