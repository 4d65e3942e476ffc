use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Validation, decode, encode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use taraba_core::{Identity, IdentityId, Role};
use thiserror::Error;

/// Which operation a token is valid for. Access and refresh tokens are
/// never interchangeable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    #[default]
    Access,
    Refresh,
}

impl TokenType {
    fn is_access(&self) -> bool {
        matches!(self, TokenType::Access)
    }
}

/// Signed claim set carried by both tokens. The type claim is implicit for
/// access tokens and explicit (`"refresh"`) for refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    #[serde(default, skip_serializing_if = "TokenType::is_access")]
    pub token_type: TokenType,
}

impl Claims {
    pub fn subject(&self) -> Result<IdentityId, TokenError> {
        IdentityId::parse(&self.sub).map_err(|_| TokenError::Malformed)
    }
}

#[derive(Clone)]
pub struct TokenConfig {
    pub signing_key: Secret<String>,
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

/// A freshly signed access + refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,
    #[error("Token has expired")]
    Expired,
    #[error("Token issuer mismatch")]
    WrongIssuer,
    #[error("Token audience mismatch")]
    WrongAudience,
    #[error("Token type mismatch")]
    WrongType,
    #[error("Insufficient role")]
    InsufficientRole,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Issues, verifies and rotates signed session tokens.
///
/// Pure over its inputs and the signing key: no shared mutable state, safe
/// at any concurrency. Expiry, issuer, audience, type and role are checked
/// here against the caller-supplied clock; signature validation is left to
/// the JWT library.
#[derive(Clone)]
pub struct TokenService {
    config: TokenConfig,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Sign a fresh access + refresh pair for `identity`.
    pub fn issue_pair(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let access = self.sign(identity, TokenType::Access, now, self.config.access_ttl)?;
        let refresh = self.sign(identity, TokenType::Refresh, now, self.config.refresh_ttl)?;
        Ok(TokenPair { access, refresh })
    }

    fn sign(
        &self,
        identity: &Identity,
        token_type: TokenType,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: identity.id().to_string(),
            role: identity.role(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            token_type,
        };

        encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.signing_key.expose_secret().as_bytes()),
        )
        .map_err(|e| TokenError::UnexpectedError(e.to_string()))
    }

    /// Verify a token's signature and claims against `now` and the
    /// configured issuer/audience. `required_role` gates admin-only callers.
    pub fn verify(
        &self,
        token: &str,
        expected_type: TokenType,
        required_role: Option<Role>,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        // Signature check only; time and claim checks below run against the
        // injected clock so each mismatch surfaces as its own variant.
        let mut validation = Validation::default();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.signing_key.expose_secret().as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| TokenError::Malformed)?;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        if claims.iss != self.config.issuer {
            return Err(TokenError::WrongIssuer);
        }
        if claims.aud != self.config.audience {
            return Err(TokenError::WrongAudience);
        }
        if claims.token_type != expected_type {
            return Err(TokenError::WrongType);
        }
        if let Some(required) = required_role {
            if required.is_admin() && !claims.role.is_admin() {
                return Err(TokenError::InsufficientRole);
            }
        }

        Ok(claims)
    }
}
