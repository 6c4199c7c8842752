use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use tracing::debug;

use crate::{
    clients::circuit_breaker::CircuitBreaker,
    models::{
        circuit_breaker::CircuitState,
        health::{HealthCheckResponse, HealthStatus, TransportHealth},
    },
};

pub struct HealthChecker {
    email_breaker: Arc<CircuitBreaker>,
    sms_breaker: Arc<CircuitBreaker>,
}

impl HealthChecker {
    pub fn new(email_breaker: Arc<CircuitBreaker>, sms_breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            email_breaker,
            sms_breaker,
        }
    }

    pub fn check_all(&self) -> HealthCheckResponse {
        let mut checks = HashMap::new();

        checks.insert(
            "email_transport".to_string(),
            Self::check_circuit_breaker(&self.email_breaker, true),
        );
        checks.insert(
            "sms_transport".to_string(),
            Self::check_circuit_breaker(&self.sms_breaker, false),
        );

        HealthCheckResponse {
            status: determine_overall_status(&checks),
            timestamp: Utc::now(),
            checks,
        }
    }

    fn check_circuit_breaker(breaker: &CircuitBreaker, authoritative: bool) -> TransportHealth {
        let state = breaker.state();
        let state_str = state.as_str().to_string();

        debug!(
            service = breaker.service_name(),
            circuit_state = %state_str,
            "Circuit breaker state checked"
        );

        match state {
            CircuitState::Closed => TransportHealth::healthy(state_str, authoritative),
            CircuitState::HalfOpen => TransportHealth::recovering(state_str, authoritative),
            CircuitState::Open => TransportHealth::circuit_open(state_str, authoritative),
        }
    }
}

fn determine_overall_status(checks: &HashMap<String, TransportHealth>) -> HealthStatus {
    if checks
        .values()
        .any(|health| health.status == HealthStatus::Unhealthy)
    {
        HealthStatus::Unhealthy
    } else if checks
        .values()
        .any(|health| health.status == HealthStatus::Degraded)
    {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}
