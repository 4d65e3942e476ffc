use chrono::{DateTime, Utc};
use taraba_core::{
    Clock, IdentityId, IdentityStore, IdentityStoreError, Password, PhoneNumber, Role,
};

use crate::{
    hashing::{CredentialHasher, HasherError},
    rate_limit::{RateLimitError, RateLimitKey, RateLimiter},
    tokens::{TokenPair, TokenService},
};

/// Successful admin authentication: the token pair plus a summary of the
/// authenticated identity.
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin {
    pub tokens: TokenPair,
    pub identity_id: IdentityId,
    pub phone_number: PhoneNumber,
    pub role: Role,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Error types for the admin login use case
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Too many attempts; retry after {retry_after_seconds} seconds")]
    Locked { retry_after_seconds: u64 },
    #[error("Invalid phone number or secret")]
    InvalidCredentials,
    #[error("Account is not verified")]
    Unverified,
    #[error("Service unavailable: {0}")]
    Dependency(String),
}

impl From<RateLimitError> for LoginError {
    fn from(error: RateLimitError) -> Self {
        let RateLimitError::Locked { retry_after } = error;
        LoginError::Locked {
            retry_after_seconds: retry_after.num_seconds().max(0) as u64,
        }
    }
}

/// Admin login use case - verifies credentials behind the rate limiter and
/// issues a session token pair.
///
/// An unknown phone number, a non-admin role and a wrong secret all surface
/// the identical `InvalidCredentials`, so callers cannot enumerate
/// accounts; the distinction goes to the log only.
pub struct AdminLoginUseCase<S, C>
where
    S: IdentityStore,
    C: Clock,
{
    identity_store: S,
    clock: C,
    rate_limiter: RateLimiter,
    hasher: CredentialHasher,
    token_service: TokenService,
}

impl<S, C> AdminLoginUseCase<S, C>
where
    S: IdentityStore,
    C: Clock,
{
    pub fn new(
        identity_store: S,
        clock: C,
        rate_limiter: RateLimiter,
        hasher: CredentialHasher,
        token_service: TokenService,
    ) -> Self {
        Self {
            identity_store,
            clock,
            rate_limiter,
            hasher,
            token_service,
        }
    }

    /// Execute the admin login use case
    ///
    /// # Arguments
    /// * `phone_number` - The admin's phone number
    /// * `secret` - The admin's secret
    /// * `source_address` - Optional request source, narrowing the limiter key
    ///
    /// # Returns
    /// AuthenticatedAdmin with a fresh token pair, or LoginError
    #[tracing::instrument(name = "AdminLoginUseCase::execute", skip(self, secret))]
    pub async fn execute(
        &self,
        phone_number: PhoneNumber,
        secret: Password,
        source_address: Option<String>,
    ) -> Result<AuthenticatedAdmin, LoginError> {
        let now = self.clock.now();
        let key = RateLimitKey::login(&phone_number, source_address);

        // The limiter runs before the expensive hash comparison.
        self.rate_limiter.check_allowed(&key, now)?;

        let identity = match self.identity_store.find_by_phone(&phone_number).await {
            Ok(identity) => identity,
            Err(IdentityStoreError::IdentityNotFound) => {
                tracing::warn!("login rejected: unknown phone number");
                self.rate_limiter.record_failure(key, now);
                return Err(LoginError::InvalidCredentials);
            }
            Err(e) => return Err(LoginError::Dependency(e.to_string())),
        };

        if !identity.role().is_admin() {
            tracing::warn!("login rejected: role mismatch");
            self.rate_limiter.record_failure(key, now);
            return Err(LoginError::InvalidCredentials);
        }

        let secret_matches = self
            .hasher
            .verify(&secret, identity.secret_hash())
            .await
            .map_err(|e| match e {
                HasherError::CorruptHash => {
                    tracing::error!("stored secret hash is corrupt");
                    LoginError::Dependency("stored credential is unreadable".to_string())
                }
                other => LoginError::Dependency(other.to_string()),
            })?;

        if !secret_matches {
            tracing::warn!("login rejected: secret mismatch");
            self.rate_limiter.record_failure(key, now);
            return Err(LoginError::InvalidCredentials);
        }

        // Only reported once the secret has verified, so it leaks nothing
        // to a guesser.
        if !identity.is_verified() {
            return Err(LoginError::Unverified);
        }

        self.rate_limiter.record_success(&key);

        self.identity_store
            .update_last_login(&identity.id(), now)
            .await
            .map_err(|e| LoginError::Dependency(e.to_string()))?;

        let tokens = self
            .token_service
            .issue_pair(&identity, now)
            .map_err(|e| LoginError::Dependency(e.to_string()))?;

        Ok(AuthenticatedAdmin {
            tokens,
            identity_id: identity.id(),
            phone_number: identity.phone_number().clone(),
            role: identity.role(),
            last_login_at: Some(now),
        })
    }
}
