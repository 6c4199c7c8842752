use reqwest::StatusCode;
use thiserror::Error;

use crate::models::status::Channel;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Failed to send {channel} notification: {reason}")]
    Transport { channel: Channel, reason: String },

    #[error("{channel} transport timed out after {timeout_ms}ms")]
    Timeout { channel: Channel, timeout_ms: u64 },
}

impl NotificationError {
    pub fn validation(reason: impl Into<String>) -> Self {
        NotificationError::Validation(reason.into())
    }

    pub fn transport(channel: Channel, err: &anyhow::Error) -> Self {
        NotificationError::Transport {
            channel,
            reason: format!("{:#}", err),
        }
    }

    pub fn channel(&self) -> Option<Channel> {
        match self {
            NotificationError::Validation(_) => None,
            NotificationError::Transport { channel, .. }
            | NotificationError::Timeout { channel, .. } => Some(*channel),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, NotificationError::Validation(_))
    }
}

/// Non-success HTTP response from an email or SMS provider.
#[derive(Debug, Error)]
#[error("{provider} returned status {status}: {body}")]
pub struct ProviderResponseError {
    pub provider: &'static str,
    pub status: StatusCode,
    pub body: String,
}

impl ProviderResponseError {
    pub fn is_transient(&self) -> bool {
        self.status.is_server_error() || self.status == StatusCode::TOO_MANY_REQUESTS
    }
}

/// Connection failures and transient provider responses are retried. A
/// provider that rejected the request outright gets no second attempt.
pub fn is_retryable(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ProviderResponseError>()
        .is_none_or(ProviderResponseError::is_transient)
}
