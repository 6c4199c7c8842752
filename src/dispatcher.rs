//! Dispatch executor and bulk dispatcher.
//!
//! Every request is routed to a channel plan, rendered, and sent by email
//! first. Email is the channel of record: its failure (or timeout) fails the
//! request. SMS is attempted afterwards when the plan calls for it and a phone
//! number is present; its failure is logged and reported in the
//! `DispatchReport`, but never turns a sent notification into an error.

use std::{future::Future, sync::Arc, time::Duration};

use chrono::Utc;
use futures_util::{StreamExt, stream};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::{
    clients::{
        email::{EmailTransport, OutboundEmail},
        sms::SmsTransport,
    },
    config::DispatchSettings,
    error::NotificationError,
    models::{
        domain::{MaintenanceRequest, Payment, Recipient},
        request::{NotificationRequest, Priority},
        result::{
            BulkItemOutcome, BulkReport, ChannelOutcome, DispatchReport, NotificationResult,
            SkipReason,
        },
        status::Channel,
        validation::{normalize_phone, validate_request},
    },
    routing::{ChannelPlan, route},
    templates::TemplateRegistry,
};

pub struct Dispatcher {
    email_transport: Arc<dyn EmailTransport>,
    sms_transport: Arc<dyn SmsTransport>,
    templates: TemplateRegistry,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(
        email_transport: Arc<dyn EmailTransport>,
        sms_transport: Arc<dyn SmsTransport>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            email_transport,
            sms_transport,
            templates: TemplateRegistry::new(),
            settings,
        }
    }

    pub async fn dispatch(
        &self,
        request: &NotificationRequest,
    ) -> Result<NotificationResult, NotificationError> {
        Ok(self.dispatch_detailed(request).await?.result)
    }

    pub async fn dispatch_detailed(
        &self,
        request: &NotificationRequest,
    ) -> Result<DispatchReport, NotificationError> {
        validate_request(request)?;

        let plan = route(request.priority, &request.notification_type);
        let now = Utc::now();

        debug!(
            notification_type = %request.notification_type,
            recipient_id = %request.recipient_id,
            plan = plan.as_str(),
            "Dispatching notification"
        );

        let rendered = self.templates.resolve_email_template(request, now).render();
        let email = OutboundEmail {
            from: self.settings.from_email.clone(),
            to: request.recipient_email.trim().to_string(),
            subject: rendered.subject,
            html_body: rendered.html_body,
            text_body: rendered.text_body,
        };

        with_deadline(
            Channel::Email,
            self.settings.email_timeout,
            self.email_transport.send(&email),
        )
        .await
        .inspect_err(|e| {
            warn!(
                notification_type = %request.notification_type,
                recipient_id = %request.recipient_id,
                error = %e,
                "Email delivery failed"
            );
        })?;

        let sms = self.attempt_sms(request, plan, now).await;
        let result = NotificationResult::sent(Channel::Email);

        info!(
            notification_id = %result.id,
            notification_type = %request.notification_type,
            plan = plan.as_str(),
            sms_attempted = sms.was_attempted(),
            "Notification sent"
        );

        Ok(DispatchReport {
            result,
            plan,
            email: ChannelOutcome::Delivered,
            sms,
        })
    }

    async fn attempt_sms(
        &self,
        request: &NotificationRequest,
        plan: ChannelPlan,
        now: chrono::DateTime<Utc>,
    ) -> ChannelOutcome {
        if !plan.includes_sms() {
            return ChannelOutcome::NotPlanned;
        }

        let Some(phone) = request.sms_target() else {
            debug!(
                notification_type = %request.notification_type,
                recipient_id = %request.recipient_id,
                "No phone number on request, skipping SMS"
            );
            return ChannelOutcome::Skipped(SkipReason::NoPhoneNumber);
        };

        let phone = match normalize_phone(phone) {
            Ok(phone) => phone,
            Err(e) => {
                warn!(
                    notification_type = %request.notification_type,
                    recipient_id = %request.recipient_id,
                    error = %e,
                    "Unusable phone number, skipping SMS"
                );
                return ChannelOutcome::Skipped(SkipReason::InvalidPhoneNumber);
            }
        };

        let message = self.templates.resolve_sms_template(request, now).render();

        match with_deadline(
            Channel::Sms,
            self.settings.sms_timeout,
            self.sms_transport.send(&phone, &message),
        )
        .await
        {
            Ok(()) => ChannelOutcome::Delivered,
            Err(e) => {
                warn!(
                    notification_type = %request.notification_type,
                    recipient_id = %request.recipient_id,
                    plan = plan.as_str(),
                    error = %e,
                    "SMS delivery failed, continuing with email as channel of record"
                );
                ChannelOutcome::Failed(e.to_string())
            }
        }
    }

    /// Dispatches every request and returns the successful results in input
    /// order. Failed items are logged and left out.
    pub async fn dispatch_all(&self, requests: &[NotificationRequest]) -> Vec<NotificationResult> {
        self.dispatch_all_detailed(requests).await.into_results()
    }

    /// Dispatches every request with bounded concurrency. One failing item
    /// never aborts the batch; each item's outcome is kept at its input index.
    pub async fn dispatch_all_detailed(&self, requests: &[NotificationRequest]) -> BulkReport {
        let concurrency = self.settings.bulk_concurrency.max(1);

        let items: Vec<BulkItemOutcome> = stream::iter(requests.iter().cloned().enumerate())
            .map(|(index, request)| self.dispatch_item(index, request))
            .buffered(concurrency)
            .collect()
            .await;

        let report = BulkReport { items };

        info!(
            total = requests.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Bulk dispatch completed"
        );

        report
    }

    async fn dispatch_item(&self, index: usize, request: NotificationRequest) -> BulkItemOutcome {
        let outcome = self.dispatch_detailed(&request).await.map_err(|e| {
            warn!(
                index,
                notification_type = %request.notification_type,
                recipient_id = %request.recipient_id,
                error = %e,
                "Bulk item failed, continuing with remaining notifications"
            );
            e.to_string()
        });

        BulkItemOutcome { index, outcome }
    }

    pub async fn send_maintenance_notification(
        &self,
        maintenance: &MaintenanceRequest,
        recipient: &Recipient,
    ) -> Result<NotificationResult, NotificationError> {
        let mut request = NotificationRequest::new(
            "maintenance_request",
            maintenance.title.clone(),
            maintenance.description.clone(),
            maintenance.landlord_id.to_string(),
            recipient.id.to_string(),
            recipient.role,
            recipient.email.clone(),
        )
        .with_related_entity(maintenance.id.to_string(), "maintenance_request")
        .with_variable("category", maintenance.category.clone());

        request.priority = maintenance_priority(&maintenance.priority);
        request.recipient_phone = recipient.phone.clone();

        if let Some(property_name) = &maintenance.property_name {
            request = request.with_variable("property_name", property_name.clone());
        }

        self.dispatch(&request).await
    }

    pub async fn send_payment_notification(
        &self,
        payment: &Payment,
        recipient: &Recipient,
    ) -> Result<NotificationResult, NotificationError> {
        let amount = format!("{:.2}", payment.amount);

        let mut request = NotificationRequest::new(
            "payment_due",
            "Payment Due",
            format!("Payment of ${} is due for your property", amount),
            payment.landlord_id.to_string(),
            recipient.id.to_string(),
            recipient.role,
            recipient.email.clone(),
        )
        .with_priority(Priority::Medium)
        .with_related_entity(payment.id.to_string(), "payment")
        .with_variable("amount", amount)
        .with_variable("due_date", payment.due_date.format("%B %-d, %Y").to_string());

        request.recipient_phone = recipient.phone.clone();

        if let Some(property_name) = &payment.property_name {
            request = request.with_variable("property_name", property_name.clone());
        }

        self.dispatch(&request).await
    }
}

/// Maintenance records use "emergency" where notifications use "urgent".
fn maintenance_priority(raw: &str) -> Option<Priority> {
    match raw {
        "emergency" => Some(Priority::Urgent),
        other => other.parse().ok(),
    }
}

async fn with_deadline<F>(
    channel: Channel,
    deadline: Duration,
    send: F,
) -> Result<(), NotificationError>
where
    F: Future<Output = anyhow::Result<()>>,
{
    match timeout(deadline, send).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(NotificationError::transport(channel, &e)),
        Err(_) => Err(NotificationError::Timeout {
            channel,
            timeout_ms: deadline.as_millis() as u64,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maintenance_priority_mapping() {
        assert_eq!(maintenance_priority("emergency"), Some(Priority::Urgent));
        assert_eq!(maintenance_priority("high"), Some(Priority::High));
        assert_eq!(maintenance_priority("low"), Some(Priority::Low));
        assert_eq!(maintenance_priority("someday"), None);
        assert_eq!(maintenance_priority("Emergency"), None);
        assert_eq!(maintenance_priority("HIGH"), None);
    }

    #[tokio::test]
    async fn test_deadline_elapsed_is_timeout_error() {
        let err = with_deadline(Channel::Sms, Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        })
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            NotificationError::Timeout {
                channel: Channel::Sms,
                timeout_ms: 10
            }
        ));
    }

    #[tokio::test]
    async fn test_transport_error_keeps_channel() {
        let err = with_deadline(Channel::Email, Duration::from_secs(1), async {
            Err(anyhow::anyhow!("mailbox unavailable"))
        })
        .await
        .unwrap_err();

        assert_eq!(err.channel(), Some(Channel::Email));
        assert!(err.to_string().contains("mailbox unavailable"));
    }
}
