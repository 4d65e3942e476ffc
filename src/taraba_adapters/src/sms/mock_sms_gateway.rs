use std::sync::Arc;

use tokio::sync::RwLock;

use taraba_core::{DispatchReceipt, MessageGateway, MessageGatewayError, PhoneNumber};

/// A message captured by the mock gateway.
#[derive(Debug, Clone)]
pub struct SentSms {
    pub recipient: PhoneNumber,
    pub body: String,
}

/// Recording gateway for tests and local development. Messages are captured
/// instead of sent; `failing()` builds one that reports every dispatch as
/// unreachable.
#[derive(Debug, Clone, Default)]
pub struct MockSmsGateway {
    sent: Arc<RwLock<Vec<SentSms>>>,
    fail: bool,
}

impl MockSmsGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Arc::new(RwLock::new(Vec::new())),
            fail: true,
        }
    }

    /// All messages dispatched so far, oldest first.
    pub async fn sent(&self) -> Vec<SentSms> {
        self.sent.read().await.clone()
    }
}

#[async_trait::async_trait]
impl MessageGateway for MockSmsGateway {
    async fn send_sms(
        &self,
        recipient: &PhoneNumber,
        body: &str,
    ) -> Result<DispatchReceipt, MessageGatewayError> {
        if self.fail {
            return Err(MessageGatewayError::Unreachable(
                "mock gateway is configured to fail".to_string(),
            ));
        }

        let mut sent = self.sent.write().await;
        sent.push(SentSms {
            recipient: recipient.clone(),
            body: body.to_string(),
        });
        Ok(DispatchReceipt {
            provider_ref: format!("mock-{}", sent.len()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_sent_messages() {
        let gateway = MockSmsGateway::new();
        let phone = PhoneNumber::parse("+40722000000").unwrap();

        let receipt = gateway.send_sms(&phone, "hello").await.unwrap();
        assert_eq!(receipt.provider_ref, "mock-1");

        let sent = gateway.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, phone);
        assert_eq!(sent[0].body, "hello");
    }

    #[tokio::test]
    async fn test_failing_gateway_reports_unreachable() {
        let gateway = MockSmsGateway::failing();
        let phone = PhoneNumber::parse("+40722000000").unwrap();

        let result = gateway.send_sms(&phone, "hello").await;
        assert!(matches!(result, Err(MessageGatewayError::Unreachable(_))));
        assert!(gateway.sent().await.is_empty());
    }
}
