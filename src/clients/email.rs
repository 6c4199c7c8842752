use std::{sync::Arc, time::Duration};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    clients::circuit_breaker::CircuitBreaker,
    config::Config,
    error::{ProviderResponseError, is_retryable},
    models::retry::RetryConfig,
    utils::retry_with_backoff_when,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Delivers one rendered email. Implementations must be safe to share across
/// concurrent dispatches.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), Error>;
}

/// Mail provider reached over a JSON HTTP API.
pub struct HttpEmailTransport {
    http_client: Client,
    api_url: String,
    api_key: String,
    retry_config: RetryConfig,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl HttpEmailTransport {
    pub fn new(config: &Config, circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, Error> {
        Self::with_endpoint(
            &config.email_api_url,
            &config.email_api_key,
            Duration::from_millis(config.email_timeout_ms),
            config.retry_config(),
            circuit_breaker,
        )
    }

    pub fn with_endpoint(
        api_url: &str,
        api_key: &str,
        request_timeout: Duration,
        retry_config: RetryConfig,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| anyhow!("Failed to create email HTTP client: {}", e))?;

        info!(api_url, "Email transport initialized");

        Ok(Self {
            http_client,
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            retry_config,
            circuit_breaker,
        })
    }

    async fn send_with_retry_static(
        http_client: Client,
        api_url: String,
        api_key: String,
        retry_config: RetryConfig,
        email: OutboundEmail,
    ) -> Result<(), Error> {
        let (client, url, key, message) =
            (&http_client, api_url.as_str(), api_key.as_str(), &email);

        retry_with_backoff_when(&retry_config, "email_send", is_retryable, || {
            Self::send_once_static(client, url, key, message)
        })
        .await
    }

    async fn send_once_static(
        http_client: &Client,
        api_url: &str,
        api_key: &str,
        email: &OutboundEmail,
    ) -> Result<(), Error> {
        let response = http_client
            .post(api_url)
            .bearer_auth(api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(to = %email.to, "Email accepted by provider");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ProviderResponseError {
                provider: "Email provider",
                status,
                body,
            }
            .into())
        }
    }
}

#[async_trait]
impl EmailTransport for HttpEmailTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<(), Error> {
        debug!(to = %email.to, subject = %email.subject, "Sending email notification");

        let http_client = self.http_client.clone();
        let api_url = self.api_url.clone();
        let api_key = self.api_key.clone();
        let retry_config = self.retry_config.clone();
        let email = email.clone();

        self.circuit_breaker
            .call(|| {
                Self::send_with_retry_static(http_client, api_url, api_key, retry_config, email)
            })
            .await
    }
}
