use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::models::{circuit_breaker::CircuitBreakerConfig, retry::RetryConfig};

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub from_email: String,

    pub email_api_url: String,
    pub email_api_key: String,
    #[serde(default = "default_email_timeout_ms")]
    pub email_timeout_ms: u64,

    pub sms_api_url: String,
    pub sms_api_key: String,
    #[serde(default = "default_sms_timeout_ms")]
    pub sms_timeout_ms: u64,

    pub circuit_breaker_failure_threshold: u32,
    pub circuit_breaker_timeout_seconds: u64,
    pub circuit_breaker_success_threshold: u32,

    pub max_retry_attempts: u32,
    pub initial_retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
    pub retry_backoff_multiplier: u64,

    #[serde(default = "default_bulk_concurrency")]
    pub bulk_concurrency: usize,

    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

/// Knobs the dispatcher itself needs, independent of how transports are built.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub from_email: String,
    pub email_timeout: Duration,
    pub sms_timeout: Duration,
    pub bulk_concurrency: usize,
}

impl DispatchSettings {
    pub fn new(from_email: impl Into<String>) -> Self {
        Self {
            from_email: from_email.into(),
            email_timeout: Duration::from_millis(default_email_timeout_ms()),
            sms_timeout: Duration::from_millis(default_sms_timeout_ms()),
            bulk_concurrency: default_bulk_concurrency(),
        }
    }
}

fn default_email_timeout_ms() -> u64 {
    10_000
}

fn default_sms_timeout_ms() -> u64 {
    5_000
}

fn default_bulk_concurrency() -> usize {
    8
}

fn default_server_port() -> u16 {
    8080
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;
        Ok(config)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_retry_attempts,
            initial_delay_ms: self.initial_retry_delay_ms,
            max_delay_ms: self.max_retry_delay_ms,
            backoff_multiplier: self.retry_backoff_multiplier,
        }
    }

    pub fn circuit_breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.circuit_breaker_failure_threshold,
            timeout_seconds: self.circuit_breaker_timeout_seconds,
            success_threshold: self.circuit_breaker_success_threshold,
        }
    }

    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            from_email: self.from_email.clone(),
            email_timeout: Duration::from_millis(self.email_timeout_ms),
            sms_timeout: Duration::from_millis(self.sms_timeout_ms),
            bulk_concurrency: self.bulk_concurrency.max(1),
        }
    }
}
