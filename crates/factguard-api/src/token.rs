use chrono::{Duration, Utc};
use factguard_types::api::TokenClaims;
use factguard_types::models::Role;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::middleware::Caller;

/// Session tokens live for one hour; there is no refresh or revocation.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token malformed")]
    Malformed,
    #[error("token signature mismatch")]
    BadSignature,
    #[error("token signing failed: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

/// Issues and checks HS256 session tokens with a secret injected at startup.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::seconds(TOKEN_TTL_SECS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn issue(&self, user_id: i64, role: Role) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Encode)
    }

    pub fn verify(&self, token: &str) -> Result<Caller, TokenError> {
        let claims = decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            })?
            .claims;

        let id = claims.sub.parse().map_err(|_| TokenError::Malformed)?;
        Ok(Caller {
            id,
            role: claims.role,
        })
    }
}
