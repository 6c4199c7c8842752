use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use notification_service::{
    clients::{
        email::{EmailTransport, OutboundEmail},
        sms::SmsTransport,
    },
    config::DispatchSettings,
    dispatcher::Dispatcher,
    models::request::{NotificationRequest, RecipientRole},
};
use uuid::Uuid;

pub const FROM_EMAIL: &str = "noreply@dwell.test";

#[derive(Default)]
pub struct RecordingEmailTransport {
    pub sent: Mutex<Vec<OutboundEmail>>,
    failing_recipients: Vec<String>,
    delay: Option<Duration>,
}

impl RecordingEmailTransport {
    pub fn failing_for(recipients: &[&str]) -> Self {
        Self {
            failing_recipients: recipients.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailTransport for RecordingEmailTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.sent.lock().unwrap().push(email.clone());

        if self.failing_recipients.contains(&email.to) {
            return Err(anyhow!("mailbox unavailable for {}", email.to));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSmsTransport {
    pub sent: Mutex<Vec<(String, String)>>,
    fail: bool,
    delay: Option<Duration>,
}

impl RecordingSmsTransport {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsTransport for RecordingSmsTransport {
    async fn send(&self, to_phone_number: &str, message: &str) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.sent
            .lock()
            .unwrap()
            .push((to_phone_number.to_string(), message.to_string()));

        if self.fail {
            return Err(anyhow!("sms gateway rejected message"));
        }
        Ok(())
    }
}

pub fn settings() -> DispatchSettings {
    DispatchSettings {
        from_email: FROM_EMAIL.to_string(),
        email_timeout: Duration::from_millis(500),
        sms_timeout: Duration::from_millis(500),
        bulk_concurrency: 4,
    }
}

pub fn dispatcher(
    email: &Arc<RecordingEmailTransport>,
    sms: &Arc<RecordingSmsTransport>,
) -> Dispatcher {
    Dispatcher::new(email.clone(), sms.clone(), settings())
}

pub fn request(notification_type: &str, recipient_email: &str) -> NotificationRequest {
    NotificationRequest::new(
        notification_type,
        "Water leak",
        "Water is leaking from the ceiling",
        Uuid::new_v4().to_string(),
        Uuid::new_v4().to_string(),
        RecipientRole::Landlord,
        recipient_email,
    )
}
