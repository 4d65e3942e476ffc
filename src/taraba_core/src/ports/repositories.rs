use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{
    identity::{Identity, IdentityId},
    password::SecretHash,
    phone_number::PhoneNumber,
    verification_code::VerificationCode,
};

// IdentityStore port trait and errors
#[derive(Debug, Error)]
pub enum IdentityStoreError {
    #[error("Identity not found")]
    IdentityNotFound,
    #[error("Phone number already registered")]
    PhoneAlreadyRegistered,
    #[error("No pending verification code")]
    NoPendingCode,
    #[error("Pending verification code does not match")]
    PendingCodeMismatch,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl PartialEq for IdentityStoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::IdentityNotFound, Self::IdentityNotFound) => true,
            (Self::PhoneAlreadyRegistered, Self::PhoneAlreadyRegistered) => true,
            (Self::NoPendingCode, Self::NoPendingCode) => true,
            (Self::PendingCodeMismatch, Self::PendingCodeMismatch) => true,
            (Self::UnexpectedError(_), Self::UnexpectedError(_)) => true,
            _ => false,
        }
    }
}

/// Boundary to the persisted identity records.
///
/// Implementations must make `set_pending_code` and
/// `clear_pending_code_and_mark_verified` atomic with respect to each other
/// per identity: the clear is compare-and-consume, so of two racing confirm
/// attempts exactly one wins, and a code replaced by a concurrent issue can
/// no longer be consumed.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_phone(&self, phone: &PhoneNumber) -> Result<Identity, IdentityStoreError>;

    async fn find_by_id(&self, id: &IdentityId) -> Result<Identity, IdentityStoreError>;

    async fn create(&self, identity: Identity) -> Result<(), IdentityStoreError>;

    async fn update_secret_hash(
        &self,
        id: &IdentityId,
        hash: SecretHash,
    ) -> Result<(), IdentityStoreError>;

    async fn set_pending_code(
        &self,
        id: &IdentityId,
        code: VerificationCode,
        expires_at: DateTime<Utc>,
    ) -> Result<(), IdentityStoreError>;

    /// Clear the pending code and mark the record verified, but only if the
    /// stored code equals `code`. Fails with `NoPendingCode` when nothing is
    /// stored and `PendingCodeMismatch` when a different code is stored.
    async fn clear_pending_code_and_mark_verified(
        &self,
        id: &IdentityId,
        code: &VerificationCode,
    ) -> Result<(), IdentityStoreError>;

    async fn update_last_login(
        &self,
        id: &IdentityId,
        at: DateTime<Utc>,
    ) -> Result<(), IdentityStoreError>;
}
