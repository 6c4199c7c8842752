use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub checks: HashMap<String, TransportHealth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportHealth {
    pub status: HealthStatus,
    pub circuit_breaker: String,

    /// Email is the channel of record; SMS outages only degrade the service.
    pub authoritative: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransportHealth {
    pub fn healthy(circuit_state: String, authoritative: bool) -> Self {
        Self {
            status: HealthStatus::Healthy,
            circuit_breaker: circuit_state,
            authoritative,
            error: None,
        }
    }

    pub fn recovering(circuit_state: String, authoritative: bool) -> Self {
        Self {
            status: HealthStatus::Degraded,
            circuit_breaker: circuit_state,
            authoritative,
            error: Some("Circuit breaker in recovery mode".to_string()),
        }
    }

    pub fn circuit_open(circuit_state: String, authoritative: bool) -> Self {
        let status = if authoritative {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Degraded
        };

        Self {
            status,
            circuit_breaker: circuit_state,
            authoritative,
            error: Some("Circuit breaker is open".to_string()),
        }
    }
}
