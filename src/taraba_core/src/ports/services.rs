use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::phone_number::PhoneNumber;

// MessageGateway port trait and errors
#[derive(Debug, Error)]
pub enum MessageGatewayError {
    #[error("Message rejected by provider: {0}")]
    Rejected(String),
    #[error("Provider unreachable: {0}")]
    Unreachable(String),
}

/// Provider acknowledgement for a dispatched message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    pub provider_ref: String,
}

/// Boundary to outbound SMS delivery. Best-effort: retry and backoff are
/// owned by the implementation, not by callers.
#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn send_sms(
        &self,
        recipient: &PhoneNumber,
        body: &str,
    ) -> Result<DispatchReceipt, MessageGatewayError>;
}

/// Supplies current time. Injected everywhere time is compared, so expiry
/// and lockout logic is deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
