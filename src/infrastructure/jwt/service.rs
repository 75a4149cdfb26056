use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

use super::claims::{unix_now, Claims, Subject};
use crate::domain::value_objects::{Role, TokenKind};
use crate::infrastructure::config::JwtConfig;

/// JWT-related errors
///
/// Validation failures collapse into three outcomes. Wrong token kind, bad
/// signature, foreign algorithm and malformed input are all `Invalid`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Token is not valid yet")]
    NotYetValid,

    #[error("Invalid token")]
    Invalid,

    #[error("Token encoding error: {0}")]
    Encoding(String),
}

/// Access and refresh token issued together at login or refresh
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

/// Token part of an `Authorization` header value
///
/// Only the exact `Bearer ` prefix followed by a non-empty token is accepted.
pub fn parse_bearer(value: &str) -> Option<&str> {
    value.strip_prefix("Bearer ").filter(|token| !token.is_empty())
}

/// Stateless issuer and validator of HS256 bearer credentials
///
/// Holds only the signing keys and the two lifetimes, all fixed at
/// construction, so one instance is shared by every request.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtService {
    /// Create new JWT service with secret and the two token lifetimes
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "nbf", "iat"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(&config.secret, config.access_ttl(), config.refresh_ttl())
    }

    /// Lifetime applied to newly issued tokens of `kind`
    pub fn lifetime(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Issue a token of `kind` for `subject`, valid from now
    pub fn issue(&self, kind: TokenKind, subject: &Subject) -> Result<String, TokenError> {
        let claims = Claims::issue(kind, subject, unix_now(), self.lifetime(kind));
        self.encode_claims(&claims)
    }

    pub fn issue_access(
        &self,
        user_id: i64,
        tenant_id: &str,
        email: &str,
        role: Role,
    ) -> Result<String, TokenError> {
        let subject = Subject::new(user_id, tenant_id).with_email(email).with_role(role);
        self.issue(TokenKind::Access, &subject)
    }

    pub fn issue_refresh(&self, user_id: i64, tenant_id: &str) -> Result<String, TokenError> {
        self.issue(TokenKind::Refresh, &Subject::new(user_id, tenant_id))
    }

    /// Issue an access token and a refresh token for the same subject
    pub fn issue_pair(&self, subject: &Subject) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue(TokenKind::Access, subject)?,
            refresh_token: self.issue(TokenKind::Refresh, subject)?,
            token_type: "Bearer",
            expires_in: self.access_ttl.as_secs(),
        })
    }

    /// Encode claims into JWT token
    pub fn encode_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            error!("Failed to encode JWT: {}", e);
            TokenError::Encoding(e.to_string())
        })
    }

    /// Verify signature, algorithm, time window and kind of `token`
    pub fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| {
                debug!("Failed to decode JWT: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::ImmatureSignature => TokenError::NotYetValid,
                    _ => TokenError::Invalid,
                }
            })?;

        if claims.token_type != expected {
            debug!(expected = %expected, actual = %claims.token_type, "Rejected JWT of wrong kind");
            return Err(TokenError::Invalid);
        }

        Ok(claims)
    }

    pub fn validate_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate(token, TokenKind::Access)
    }

    pub fn validate_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate(token, TokenKind::Refresh)
    }
}

impl fmt::Debug for JwtService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtService")
            .field("algorithm", &Algorithm::HS256)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}
