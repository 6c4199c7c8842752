use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Error, Result, anyhow};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::models::circuit_breaker::{CircuitBreakerConfig, CircuitState};

struct BreakerState {
    state: CircuitState,
    failures: u32,
    successes: u32,
    opened_at: Option<Instant>,
}

/// In-process circuit breaker guarding one outbound transport.
///
/// Shared between the transport and the health checker. The lock is never held
/// across an await, so a plain mutex is enough.
pub struct CircuitBreaker {
    service_name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
}

/// Counts a call as failed if its future is dropped before it settles, as
/// happens when a caller's deadline elapses mid-request.
struct InFlight<'a> {
    breaker: &'a CircuitBreaker,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(
                service = %self.breaker.service_name,
                "Call abandoned before completing, recording failure"
            );
            self.breaker.record_failure();
        }
    }
}

impl CircuitBreaker {
    pub fn new(service_name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let service_name = service_name.into();
        info!(service = %service_name, "Circuit breaker initialized");

        Self {
            service_name,
            config,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failures: 0,
                successes: 0,
                opened_at: None,
            }),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub async fn call<F, Fut, T>(&self, operation: F) -> Result<T, Error>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, Error>>,
    {
        self.admit()?;

        let mut in_flight = InFlight {
            breaker: self,
            settled: false,
        };
        let outcome = operation().await;
        in_flight.settled = true;

        match outcome {
            Ok(result) => {
                self.record_success();
                Ok(result)
            }
            Err(e) => {
                self.record_failure();
                Err(e)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn admit(&self) -> Result<(), Error> {
        let mut inner = self.lock();
        let state = inner.state;

        match state {
            CircuitState::Open => {
                if self.should_attempt_reset(&inner) {
                    info!(service = %self.service_name, "Circuit breaker attempting reset");
                    inner.state = CircuitState::HalfOpen;
                    inner.successes = 0;
                    return Ok(());
                }
                warn!(service = %self.service_name, "Circuit breaker is open, rejecting request");
                Err(anyhow!("Circuit breaker is open for {}", self.service_name))
            }
            CircuitState::HalfOpen => {
                debug!(service = %self.service_name, "Circuit breaker in half-open state");
                Ok(())
            }
            CircuitState::Closed => Ok(()),
        }
    }

    fn record_success(&self) {
        let mut inner = self.lock();
        let state = inner.state;

        match state {
            CircuitState::HalfOpen => {
                inner.successes += 1;
                debug!(
                    service = %self.service_name,
                    successes = inner.successes,
                    threshold = self.config.success_threshold,
                    "Circuit breaker success recorded"
                );

                if inner.successes >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.failures = 0;
                    inner.successes = 0;
                    inner.opened_at = None;
                    info!(
                        service = %self.service_name,
                        "Circuit breaker closed after successful recovery"
                    );
                }
            }
            CircuitState::Closed => inner.failures = 0,
            CircuitState::Open => {}
        }
    }

    fn record_failure(&self) {
        let mut inner = self.lock();

        if inner.state == CircuitState::HalfOpen {
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
            warn!(
                service = %self.service_name,
                "Circuit breaker reopened after failed recovery attempt"
            );
            return;
        }

        inner.failures += 1;
        debug!(
            service = %self.service_name,
            failures = inner.failures,
            threshold = self.config.failure_threshold,
            "Circuit breaker failure recorded"
        );

        if inner.failures >= self.config.failure_threshold && inner.state == CircuitState::Closed {
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
            warn!(
                service = %self.service_name,
                failures = inner.failures,
                "Circuit breaker opened due to consecutive failures"
            );
        }
    }

    fn should_attempt_reset(&self, inner: &BreakerState) -> bool {
        inner
            .opened_at
            .map(|opened_at| opened_at.elapsed().as_secs() >= self.config.timeout_seconds)
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn breaker(timeout_seconds: u64) -> CircuitBreaker {
        CircuitBreaker::new(
            "test",
            CircuitBreakerConfig {
                failure_threshold: 2,
                timeout_seconds,
                success_threshold: 2,
            },
        )
    }

    async fn fail(breaker: &CircuitBreaker) -> Result<(), Error> {
        breaker.call(|| async { Err::<(), _>(anyhow!("boom")) }).await
    }

    async fn succeed(breaker: &CircuitBreaker) -> Result<(), Error> {
        breaker.call(|| async { Ok::<_, Error>(()) }).await
    }

    #[tokio::test]
    async fn test_opens_after_consecutive_failures() {
        let breaker = breaker(60);

        assert!(fail(&breaker).await.is_err());
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert!(fail(&breaker).await.is_err());
        assert_eq!(breaker.state(), CircuitState::Open);

        let rejected = succeed(&breaker).await.unwrap_err();
        assert!(rejected.to_string().contains("Circuit breaker is open"));
    }

    #[tokio::test]
    async fn test_success_resets_failure_count() {
        let breaker = breaker(60);

        assert!(fail(&breaker).await.is_err());
        assert!(succeed(&breaker).await.is_ok());
        assert!(fail(&breaker).await.is_err());
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_recovers_through_half_open() {
        let breaker = breaker(0);

        let _ = fail(&breaker).await;
        let _ = fail(&breaker).await;
        assert_eq!(breaker.state(), CircuitState::Open);

        assert!(succeed(&breaker).await.is_ok());
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        assert!(succeed(&breaker).await.is_ok());
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_failure_in_half_open_reopens() {
        let breaker = breaker(0);

        let _ = fail(&breaker).await;
        let _ = fail(&breaker).await;
        let _ = fail(&breaker).await;

        assert_eq!(breaker.state(), CircuitState::Open);
    }

    async fn hang(breaker: &CircuitBreaker) -> Result<(), Error> {
        breaker
            .call(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, Error>(())
            })
            .await
    }

    #[tokio::test]
    async fn test_abandoned_calls_count_as_failures() {
        let breaker = breaker(60);

        for _ in 0..2 {
            let elapsed = tokio::time::timeout(Duration::from_millis(20), hang(&breaker)).await;
            assert!(elapsed.is_err());
        }

        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn test_abandoned_call_in_half_open_reopens() {
        let breaker = breaker(0);

        let _ = fail(&breaker).await;
        let _ = fail(&breaker).await;
        assert_eq!(breaker.state(), CircuitState::Open);

        let elapsed = tokio::time::timeout(Duration::from_millis(20), hang(&breaker)).await;
        assert!(elapsed.is_err());

        assert_eq!(breaker.state(), CircuitState::Open);
    }
}
