use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{
    request::NotificationRequest,
    template::{EmailLayout, EmailTemplate, SmsTemplate},
};

pub const DEFAULT_LANDLORD_NAME: &str = "Property Management";

const MAINTENANCE_REQUEST_EMAIL: EmailLayout = EmailLayout {
    subject: "New Maintenance Request - {{title}}",
    html_body: r#"<!DOCTYPE html>
<html>
<head>
<style>
body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
.container { max-width: 600px; margin: 0 auto; padding: 20px; }
.header { background-color: #f8f9fa; padding: 20px; border-radius: 5px; }
.content { padding: 20px; }
</style>
</head>
<body>
<div class="container">
<div class="header"><h2>Maintenance Request</h2></div>
<div class="content">
<p>Hello {{recipient_name}},</p>
<p>A new maintenance request has been submitted:</p>
<h3>{{title}}</h3>
<p>{{message}}</p>
<p><strong>Priority:</strong> {{priority}}</p>
<p><strong>Category:</strong> {{category}}</p>
<p><strong>Date:</strong> {{date}} at {{time}}</p>
<p>Please review and take appropriate action.</p>
</div>
</div>
</body>
</html>"#,
    text_body: "Maintenance Request

Hello {{recipient_name}},

A new maintenance request has been submitted:

{{title}}

{{message}}

Priority: {{priority}}
Category: {{category}}
Date: {{date}} at {{time}}

Please review and take appropriate action.",
};

const PAYMENT_DUE_EMAIL: EmailLayout = EmailLayout {
    subject: "Payment Due Reminder",
    html_body: r#"<!DOCTYPE html>
<html>
<head>
<style>
body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
.container { max-width: 600px; margin: 0 auto; padding: 20px; }
.header { background-color: #fff3cd; padding: 20px; border-radius: 5px; border: 1px solid #ffeaa7; }
.content { padding: 20px; }
.amount { font-size: 24px; font-weight: bold; color: #d63031; }
</style>
</head>
<body>
<div class="container">
<div class="header"><h2>Payment Due Reminder</h2></div>
<div class="content">
<p>Hello {{recipient_name}},</p>
<p>This is a friendly reminder that your payment is due:</p>
<p class="amount">Amount: ${{amount}}</p>
<p><strong>Due Date:</strong> {{due_date}}</p>
<p><strong>Property:</strong> {{property_name}}</p>
<p>Please ensure your payment is submitted on time to avoid any late fees.</p>
</div>
</div>
</body>
</html>"#,
    text_body: "Payment Due Reminder

Hello {{recipient_name}},

This is a friendly reminder that your payment is due:

Amount: ${{amount}}
Due Date: {{due_date}}
Property: {{property_name}}

Please ensure your payment is submitted on time to avoid any late fees.",
};

/// Fallback for any type without a dedicated layout. Only uses variables every
/// request provides.
pub const GENERIC_EMAIL: EmailLayout = EmailLayout {
    subject: "{{title}}",
    html_body: r#"<!DOCTYPE html>
<html>
<head>
<style>
body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
.container { max-width: 600px; margin: 0 auto; padding: 20px; }
.header { background-color: #f8f9fa; padding: 20px; border-radius: 5px; }
.content { padding: 20px; }
</style>
</head>
<body>
<div class="container">
<div class="header"><h2>{{title}}</h2></div>
<div class="content">
<p>Hello {{recipient_name}},</p>
<p>{{message}}</p>
<p>Date: {{date}} at {{time}}</p>
</div>
</div>
</body>
</html>"#,
    text_body: "{{title}}

Hello {{recipient_name}},

{{message}}

Date: {{date}} at {{time}}",
};

pub const GENERIC_SMS: &str = "{{title}}: {{message}}";

/// Lookup table from notification type to email and SMS layouts.
///
/// Matching is exact and case-sensitive; every miss (including the empty
/// string) resolves to the generic layouts.
pub struct TemplateRegistry {
    email: HashMap<&'static str, EmailLayout>,
    sms: HashMap<&'static str, &'static str>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        let email = HashMap::from([
            ("maintenance_request", MAINTENANCE_REQUEST_EMAIL),
            ("payment_due", PAYMENT_DUE_EMAIL),
        ]);

        let sms = HashMap::from([
            (
                "maintenance_emergency",
                "URGENT: Emergency maintenance request at {{property_name}}. Please respond immediately.",
            ),
            (
                "payment_overdue",
                "Payment overdue: ${{amount}} due for {{property_name}}. Please contact us immediately.",
            ),
        ]);

        Self { email, sms }
    }

    pub fn email_layout(&self, notification_type: &str) -> &EmailLayout {
        self.email.get(notification_type).unwrap_or(&GENERIC_EMAIL)
    }

    pub fn sms_layout(&self, notification_type: &str) -> &'static str {
        self.sms
            .get(notification_type)
            .copied()
            .unwrap_or(GENERIC_SMS)
    }

    pub fn resolve_email_template(
        &self,
        request: &NotificationRequest,
        now: DateTime<Utc>,
    ) -> EmailTemplate {
        let layout = self.email_layout(&request.notification_type);

        EmailTemplate {
            subject: layout.subject.to_string(),
            html_body: layout.html_body.to_string(),
            text_body: layout.text_body.to_string(),
            variables: template_variables(request, now),
        }
    }

    pub fn resolve_sms_template(
        &self,
        request: &NotificationRequest,
        now: DateTime<Utc>,
    ) -> SmsTemplate {
        SmsTemplate {
            message: self.sms_layout(&request.notification_type).to_string(),
            variables: template_variables(request, now),
        }
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Base variables derived from the request, with the caller's own variables
/// merged on top. Caller keys win on collision.
pub fn template_variables(
    request: &NotificationRequest,
    now: DateTime<Utc>,
) -> HashMap<String, String> {
    let mut variables = HashMap::from([
        ("title".to_string(), request.title.clone()),
        ("message".to_string(), request.message.clone()),
        (
            "recipient_name".to_string(),
            request.recipient_role.to_string(),
        ),
        (
            "landlord_name".to_string(),
            DEFAULT_LANDLORD_NAME.to_string(),
        ),
        ("date".to_string(), now.format("%B %-d, %Y").to_string()),
        ("time".to_string(), now.format("%-I:%M %p").to_string()),
    ]);

    if let Some(priority) = request.priority {
        variables.insert("priority".to_string(), priority.to_string());
    }

    variables.extend(
        request
            .variables
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );

    variables
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::{Priority, RecipientRole};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap()
    }

    fn request(notification_type: &str) -> NotificationRequest {
        NotificationRequest::new(
            notification_type,
            "Burst pipe",
            "Water in the basement",
            "5f0c1d3e-8a4b-4c7e-9a51-0d6a3f1e2b7c",
            "8d2e4f6a-1b3c-4d5e-8f7a-9b0c1d2e3f4a",
            RecipientRole::Tenant,
            "tenant@example.com",
        )
    }

    #[test]
    fn test_base_variables() {
        let variables = template_variables(&request("xyz"), fixed_now());

        assert_eq!(variables["title"], "Burst pipe");
        assert_eq!(variables["message"], "Water in the basement");
        assert_eq!(variables["recipient_name"], "tenant");
        assert_eq!(variables["landlord_name"], "Property Management");
        assert_eq!(variables["date"], "March 5, 2024");
        assert_eq!(variables["time"], "2:07 PM");
        assert!(!variables.contains_key("priority"));
    }

    #[test]
    fn test_caller_variables_override_base() {
        let request = request("payment_due")
            .with_priority(Priority::High)
            .with_variable("recipient_name", "Jordan")
            .with_variable("amount", "1200.00");

        let variables = template_variables(&request, fixed_now());
        assert_eq!(variables["recipient_name"], "Jordan");
        assert_eq!(variables["amount"], "1200.00");
        assert_eq!(variables["priority"], "high");
    }

    #[test]
    fn test_unknown_type_uses_generic_email() {
        let registry = TemplateRegistry::new();
        let rendered = registry
            .resolve_email_template(&request("xyz"), fixed_now())
            .render();

        assert_eq!(rendered.subject, "Burst pipe");
        assert!(rendered.text_body.contains("Hello tenant,"));
        assert!(rendered.text_body.contains("Water in the basement"));
        assert!(rendered.text_body.contains("March 5, 2024 at 2:07 PM"));
        assert!(!rendered.html_body.contains("{{"));
    }

    #[test]
    fn test_empty_type_uses_generic_templates() {
        let registry = TemplateRegistry::new();
        assert_eq!(*registry.email_layout(""), GENERIC_EMAIL);
        assert_eq!(registry.sms_layout(""), GENERIC_SMS);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = TemplateRegistry::new();
        assert_eq!(*registry.email_layout("Payment_Due"), GENERIC_EMAIL);
        assert_eq!(*registry.email_layout("payment_due"), PAYMENT_DUE_EMAIL);
    }

    #[test]
    fn test_maintenance_template_keeps_unsupplied_category() {
        let registry = TemplateRegistry::new();
        let request = request("maintenance_request").with_priority(Priority::Medium);
        let rendered = registry
            .resolve_email_template(&request, fixed_now())
            .render();

        assert_eq!(rendered.subject, "New Maintenance Request - Burst pipe");
        assert!(rendered.text_body.contains("Priority: medium"));
        assert!(rendered.text_body.contains("Category: {{category}}"));
    }

    #[test]
    fn test_sms_templates() {
        let registry = TemplateRegistry::new();

        let emergency = request("maintenance_emergency").with_variable("property_name", "Elm St");
        assert_eq!(
            registry.resolve_sms_template(&emergency, fixed_now()).render(),
            "URGENT: Emergency maintenance request at Elm St. Please respond immediately."
        );

        let generic = registry.resolve_sms_template(&request("lease_violation"), fixed_now());
        assert_eq!(generic.render(), "Burst pipe: Water in the basement");
    }

    #[test]
    fn test_templates_are_not_mutated_between_requests() {
        let registry = TemplateRegistry::new();
        let first = request("payment_due").with_variable("amount", "10.00");
        let second = request("payment_due");

        let _ = registry.resolve_email_template(&first, fixed_now()).render();
        let template = registry.resolve_email_template(&second, fixed_now());

        assert!(!template.variables.contains_key("amount"));
        assert!(template.render().text_body.contains("Amount: ${{amount}}"));
    }
}
