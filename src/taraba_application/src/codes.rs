use chrono::{DateTime, Duration, Utc};
use taraba_core::{Identity, IdentityStore, IdentityStoreError, VerificationCode};
use thiserror::Error;

/// Lifetime of an issued verification code.
#[derive(Debug, Clone, Copy)]
pub struct CodeConfig {
    pub ttl: Duration,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(600),
        }
    }
}

#[derive(Debug, Error)]
pub enum IssueCodeError {
    #[error("Identity store error: {0}")]
    Store(#[from] IdentityStoreError),
}

#[derive(Debug, Error)]
pub enum ConfirmCodeError {
    #[error("No pending verification code")]
    NoPendingCode,
    #[error("Verification code has expired")]
    Expired,
    #[error("Verification code does not match")]
    Mismatch,
    #[error("Identity store error: {0}")]
    Store(IdentityStoreError),
}

/// Issues and validates short-lived one-time codes tied to a phone identity.
///
/// The code and its expiry live on the identity record and are stored and
/// consumed atomically through the identity store port, so a code is
/// single-use even under concurrent confirmation attempts.
#[derive(Debug, Clone)]
pub struct VerificationCodeManager {
    config: CodeConfig,
}

impl VerificationCodeManager {
    pub fn new(config: CodeConfig) -> Self {
        Self { config }
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Generate a fresh code, store it on the identity record with
    /// `expires_at = now + ttl`, and return it for dispatch.
    #[tracing::instrument(name = "VerificationCodeManager::issue", skip_all)]
    pub async fn issue<S: IdentityStore>(
        &self,
        store: &S,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<VerificationCode, IssueCodeError> {
        let code = VerificationCode::generate();
        let expires_at = now + self.config.ttl;

        store
            .set_pending_code(&identity.id(), code.clone(), expires_at)
            .await?;

        Ok(code)
    }

    /// Validate `submitted` against the pending code on `identity` and, on
    /// success, consume it and mark the record verified.
    ///
    /// `identity` is a snapshot; the final consume is compare-and-swap in
    /// the store, so a code replaced or already used since the snapshot was
    /// taken cannot succeed.
    #[tracing::instrument(name = "VerificationCodeManager::confirm", skip_all)]
    pub async fn confirm<S: IdentityStore>(
        &self,
        store: &S,
        identity: &Identity,
        submitted: &VerificationCode,
        now: DateTime<Utc>,
    ) -> Result<(), ConfirmCodeError> {
        let Some(pending) = identity.pending_code() else {
            return Err(ConfirmCodeError::NoPendingCode);
        };

        if now >= pending.expires_at {
            return Err(ConfirmCodeError::Expired);
        }

        if &pending.code != submitted {
            return Err(ConfirmCodeError::Mismatch);
        }

        store
            .clear_pending_code_and_mark_verified(&identity.id(), submitted)
            .await
            .map_err(|e| match e {
                IdentityStoreError::NoPendingCode => ConfirmCodeError::NoPendingCode,
                IdentityStoreError::PendingCodeMismatch => ConfirmCodeError::Mismatch,
                other => ConfirmCodeError::Store(other),
            })
    }
}
