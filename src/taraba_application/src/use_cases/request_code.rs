use taraba_core::{
    Clock, DispatchReceipt, IdentityStore, IdentityStoreError, MessageGateway, PhoneNumber,
};

use crate::{
    codes::VerificationCodeManager,
    rate_limit::{RateLimitError, RateLimitKey, RateLimiter},
};

/// Error types for the request-verification-code use case
#[derive(Debug, thiserror::Error)]
pub enum RequestCodeError {
    #[error("Too many attempts; retry after {retry_after_seconds} seconds")]
    Locked { retry_after_seconds: u64 },
    #[error("No account for that phone number")]
    NotFound,
    /// The code was stored and stays valid for its full lifetime; only the
    /// outbound message failed.
    #[error("Message dispatch failed: {0}")]
    Dispatch(String),
    #[error("Service unavailable: {0}")]
    Dependency(String),
}

impl From<RateLimitError> for RequestCodeError {
    fn from(error: RateLimitError) -> Self {
        let RateLimitError::Locked { retry_after } = error;
        RequestCodeError::Locked {
            retry_after_seconds: retry_after.num_seconds().max(0) as u64,
        }
    }
}

/// Request-verification-code use case - issues a one-time code and sends it
/// to the phone number over the message gateway.
///
/// The code is persisted before dispatch is attempted, and no lock is held
/// across the gateway call; a failed dispatch leaves the stored code intact
/// so a resend can reuse the same code window.
pub struct RequestVerificationCodeUseCase<S, G, C>
where
    S: IdentityStore,
    G: MessageGateway,
    C: Clock,
{
    identity_store: S,
    message_gateway: G,
    clock: C,
    rate_limiter: RateLimiter,
    codes: VerificationCodeManager,
}

impl<S, G, C> RequestVerificationCodeUseCase<S, G, C>
where
    S: IdentityStore,
    G: MessageGateway,
    C: Clock,
{
    pub fn new(
        identity_store: S,
        message_gateway: G,
        clock: C,
        rate_limiter: RateLimiter,
        codes: VerificationCodeManager,
    ) -> Self {
        Self {
            identity_store,
            message_gateway,
            clock,
            rate_limiter,
            codes,
        }
    }

    /// Execute the request-verification-code use case
    ///
    /// # Arguments
    /// * `phone_number` - The phone number to verify
    ///
    /// # Returns
    /// The provider receipt for the dispatched message, or RequestCodeError
    #[tracing::instrument(name = "RequestVerificationCodeUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        phone_number: PhoneNumber,
    ) -> Result<DispatchReceipt, RequestCodeError> {
        let now = self.clock.now();
        let key = RateLimitKey::code_issue(&phone_number);

        self.rate_limiter.check_allowed(&key, now)?;

        let identity = match self.identity_store.find_by_phone(&phone_number).await {
            Ok(identity) => identity,
            Err(IdentityStoreError::IdentityNotFound) => return Err(RequestCodeError::NotFound),
            Err(e) => return Err(RequestCodeError::Dependency(e.to_string())),
        };

        // Every issued code consumes issuance budget, whatever happens to
        // the dispatch afterwards.
        self.rate_limiter.record_failure(key, now);

        let code = self
            .codes
            .issue(&self.identity_store, &identity, now)
            .await
            .map_err(|e| RequestCodeError::Dependency(e.to_string()))?;

        let body = format!(
            "Your Taraba verification code is {}. It expires in {} minutes.",
            code.as_str(),
            self.codes.ttl().num_minutes(),
        );

        match self.message_gateway.send_sms(&phone_number, &body).await {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                tracing::error!(error = %e, "verification code dispatch failed");
                Err(RequestCodeError::Dispatch(e.to_string()))
            }
        }
    }
}
