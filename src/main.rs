use std::sync::Arc;

use anyhow::{Error, Result};
use notification_service::{
    api::{AppState, run_api_server},
    clients::{
        circuit_breaker::CircuitBreaker, email::HttpEmailTransport, health::HealthChecker,
        sms::HttpSmsTransport,
    },
    config::Config,
    dispatcher::Dispatcher,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;

    let email_breaker = Arc::new(CircuitBreaker::new("email", config.circuit_breaker_config()));
    let sms_breaker = Arc::new(CircuitBreaker::new("sms", config.circuit_breaker_config()));

    let email_transport = HttpEmailTransport::new(&config, Arc::clone(&email_breaker))?;
    let sms_transport = HttpSmsTransport::new(&config, Arc::clone(&sms_breaker))?;

    let state = Arc::new(AppState {
        dispatcher: Dispatcher::new(
            Arc::new(email_transport),
            Arc::new(sms_transport),
            config.dispatch_settings(),
        ),
        health_checker: HealthChecker::new(email_breaker, sms_breaker),
    });

    info!(
        from_email = %config.from_email,
        "Configuration validated, starting notification service"
    );

    run_api_server(config.server_port, state).await
}
