use taraba_core::{Clock, IdentityStore, IdentityStoreError, PhoneNumber, VerificationCode};

use crate::{
    codes::{ConfirmCodeError as ManagerError, VerificationCodeManager},
    rate_limit::{RateLimitError, RateLimitKey, RateLimiter},
};

/// Error types for the confirm-verification-code use case
#[derive(Debug, thiserror::Error)]
pub enum ConfirmCodeError {
    #[error("Too many attempts; retry after {retry_after_seconds} seconds")]
    Locked { retry_after_seconds: u64 },
    #[error("Verification code must be exactly 6 digits")]
    MalformedCode,
    #[error("No pending verification code")]
    NoPendingCode,
    #[error("Verification code has expired")]
    Expired,
    #[error("Verification code does not match")]
    Mismatch,
    #[error("Service unavailable: {0}")]
    Dependency(String),
}

impl From<RateLimitError> for ConfirmCodeError {
    fn from(error: RateLimitError) -> Self {
        let RateLimitError::Locked { retry_after } = error;
        ConfirmCodeError::Locked {
            retry_after_seconds: retry_after.num_seconds().max(0) as u64,
        }
    }
}

/// Confirm-verification-code use case - validates a submitted code behind
/// its own rate limit and marks the identity verified.
///
/// `Expired` and `Mismatch` leave the flow retryable until the code's
/// lifetime or the confirmation budget runs out; only a mismatch consumes
/// budget, since that is the guessing channel. An unknown phone number
/// reads the same as having no pending code.
pub struct ConfirmVerificationCodeUseCase<S, C>
where
    S: IdentityStore,
    C: Clock,
{
    identity_store: S,
    clock: C,
    rate_limiter: RateLimiter,
    codes: VerificationCodeManager,
}

impl<S, C> ConfirmVerificationCodeUseCase<S, C>
where
    S: IdentityStore,
    C: Clock,
{
    pub fn new(
        identity_store: S,
        clock: C,
        rate_limiter: RateLimiter,
        codes: VerificationCodeManager,
    ) -> Self {
        Self {
            identity_store,
            clock,
            rate_limiter,
            codes,
        }
    }

    /// Execute the confirm-verification-code use case
    ///
    /// # Arguments
    /// * `phone_number` - The phone number being verified
    /// * `submitted_code` - The code as submitted by the caller
    ///
    /// # Returns
    /// Ok(()) once the identity is marked verified, or ConfirmCodeError
    #[tracing::instrument(
        name = "ConfirmVerificationCodeUseCase::execute",
        skip(self, submitted_code)
    )]
    pub async fn execute(
        &self,
        phone_number: PhoneNumber,
        submitted_code: &str,
    ) -> Result<(), ConfirmCodeError> {
        let now = self.clock.now();
        let key = RateLimitKey::code_confirm(&phone_number);

        self.rate_limiter.check_allowed(&key, now)?;

        // Format is validated before anything is compared.
        let code = VerificationCode::parse(submitted_code)
            .map_err(|_| ConfirmCodeError::MalformedCode)?;

        let identity = match self.identity_store.find_by_phone(&phone_number).await {
            Ok(identity) => identity,
            Err(IdentityStoreError::IdentityNotFound) => {
                return Err(ConfirmCodeError::NoPendingCode);
            }
            Err(e) => return Err(ConfirmCodeError::Dependency(e.to_string())),
        };

        match self
            .codes
            .confirm(&self.identity_store, &identity, &code, now)
            .await
        {
            Ok(()) => {
                self.rate_limiter.record_success(&key);
                Ok(())
            }
            Err(ManagerError::Mismatch) => {
                self.rate_limiter.record_failure(key, now);
                Err(ConfirmCodeError::Mismatch)
            }
            Err(ManagerError::NoPendingCode) => Err(ConfirmCodeError::NoPendingCode),
            Err(ManagerError::Expired) => Err(ConfirmCodeError::Expired),
            Err(ManagerError::Store(e)) => Err(ConfirmCodeError::Dependency(e.to_string())),
        }
    }
}
