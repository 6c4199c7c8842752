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

#[async_trait]
pub trait SmsTransport: Send + Sync {
    async fn send(&self, to_phone_number: &str, message: &str) -> Result<(), Error>;
}

#[derive(Debug, Clone, Serialize)]
struct SmsPayload {
    to: String,
    message: String,
    sms_type: &'static str,
}

/// SMS gateway reached over a JSON HTTP API. Messages go out as transactional.
pub struct HttpSmsTransport {
    http_client: Client,
    api_url: String,
    api_key: String,
    retry_config: RetryConfig,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl HttpSmsTransport {
    pub fn new(config: &Config, circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, Error> {
        Self::with_endpoint(
            &config.sms_api_url,
            &config.sms_api_key,
            Duration::from_millis(config.sms_timeout_ms),
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
            .map_err(|e| anyhow!("Failed to create SMS HTTP client: {}", e))?;

        info!(api_url, "SMS transport initialized");

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
        payload: SmsPayload,
    ) -> Result<(), Error> {
        let (client, url, key, body) = (&http_client, &api_url, &api_key, &payload);

        retry_with_backoff_when(&retry_config, "sms_send", is_retryable, || async move {
            let response = client
                .post(url.as_str())
                .bearer_auth(key)
                .json(body)
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                let error_text = response.text().await.unwrap_or_default();
                Err(Error::new(ProviderResponseError {
                    provider: "SMS gateway",
                    status,
                    body: error_text,
                }))
            }
        })
        .await
    }
}

#[async_trait]
impl SmsTransport for HttpSmsTransport {
    async fn send(&self, to_phone_number: &str, message: &str) -> Result<(), Error> {
        debug!(to = to_phone_number, "Sending SMS notification");

        let payload = SmsPayload {
            to: to_phone_number.to_string(),
            message: message.to_string(),
            sms_type: "Transactional",
        };

        let http_client = self.http_client.clone();
        let api_url = self.api_url.clone();
        let api_key = self.api_key.clone();
        let retry_config = self.retry_config.clone();

        self.circuit_breaker
            .call(|| {
                Self::send_with_retry_static(http_client, api_url, api_key, retry_config, payload)
            })
            .await
    }
}
