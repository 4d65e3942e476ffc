use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, Secret};

use taraba_core::{DispatchReceipt, MessageGateway, MessageGatewayError, PhoneNumber};

const SEND_PATH: &str = "/v1/messages";
const MAX_SEND_ATTEMPTS: u32 = 2;
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// SMS delivery over the provider's JSON API.
///
/// Delivery is best-effort: transport errors and provider 5xx responses get
/// one bounded retry with backoff; rejections (4xx) are surfaced
/// immediately. Callers treat the result as an observation, not a
/// guarantee.
pub struct HttpSmsGateway {
    http_client: Client,
    base_url: String,
    sender: String,
    api_token: Secret<String>,
}

impl HttpSmsGateway {
    pub fn new(
        base_url: String,
        sender: String,
        api_token: Secret<String>,
        http_client: Client,
    ) -> Self {
        Self {
            http_client,
            base_url,
            sender,
            api_token,
        }
    }

    async fn post_message(
        &self,
        url: Url,
        request_body: &SendSmsRequest<'_>,
    ) -> Result<DispatchReceipt, MessageGatewayError> {
        let response = self
            .http_client
            .post(url)
            .bearer_auth(self.api_token.expose_secret())
            .json(request_body)
            .send()
            .await
            .map_err(|e| MessageGatewayError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(MessageGatewayError::Unreachable(format!(
                "provider returned {status}"
            )));
        }
        if !status.is_success() {
            return Err(MessageGatewayError::Rejected(format!(
                "provider returned {status}"
            )));
        }

        let body: SendSmsResponse = response
            .json()
            .await
            .map_err(|e| MessageGatewayError::Rejected(e.to_string()))?;

        Ok(DispatchReceipt {
            provider_ref: body.id,
        })
    }
}

#[async_trait::async_trait]
impl MessageGateway for HttpSmsGateway {
    #[tracing::instrument(name = "Sending SMS", skip_all)]
    async fn send_sms(
        &self,
        recipient: &PhoneNumber,
        body: &str,
    ) -> Result<DispatchReceipt, MessageGatewayError> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| MessageGatewayError::Rejected(e.to_string()))?;
        let url = base
            .join(SEND_PATH)
            .map_err(|e| MessageGatewayError::Rejected(e.to_string()))?;

        let request_body = SendSmsRequest {
            from: &self.sender,
            to: recipient.as_str(),
            body,
        };

        let mut last_error = None;
        for attempt in 1..=MAX_SEND_ATTEMPTS {
            match self.post_message(url.clone(), &request_body).await {
                Ok(receipt) => return Ok(receipt),
                // Rejections are final; only transport-level failures retry.
                Err(e @ MessageGatewayError::Rejected(_)) => return Err(e),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "SMS dispatch attempt failed");
                    last_error = Some(e);
                    if attempt < MAX_SEND_ATTEMPTS {
                        tokio::time::sleep(RETRY_BACKOFF).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            MessageGatewayError::Unreachable("no dispatch attempt was made".to_string())
        }))
    }
}

#[derive(serde::Serialize, Debug)]
struct SendSmsRequest<'a> {
    from: &'a str,
    to: &'a str,
    body: &'a str,
}

#[derive(serde::Deserialize, Debug)]
struct SendSmsResponse {
    id: String,
}
