use serde::Serialize;

use crate::models::request::Priority;

/// Notification types severe enough to text the recipient at `high` priority.
pub const CRITICAL_TYPES: [&str; 5] = [
    "maintenance_emergency",
    "payment_overdue",
    "lease_violation",
    "property_damage",
    "security_breach",
];

/// Which channels a dispatch attempts. Email is always sent first and is the
/// channel of record; SMS failures never fail the dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelPlan {
    EmailOnly,
    EmailAndOpportunisticSms,
    EmailAndMandatorySms,
}

impl ChannelPlan {
    pub fn includes_sms(&self) -> bool {
        !matches!(self, ChannelPlan::EmailOnly)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelPlan::EmailOnly => "email_only",
            ChannelPlan::EmailAndOpportunisticSms => "email_and_opportunistic_sms",
            ChannelPlan::EmailAndMandatorySms => "email_and_mandatory_sms",
        }
    }
}

pub fn is_critical_type(notification_type: &str) -> bool {
    CRITICAL_TYPES.contains(&notification_type)
}

pub fn route(priority: Option<Priority>, notification_type: &str) -> ChannelPlan {
    match priority {
        Some(Priority::Urgent) => ChannelPlan::EmailAndMandatorySms,
        Some(Priority::High) if is_critical_type(notification_type) => {
            ChannelPlan::EmailAndOpportunisticSms
        }
        _ => ChannelPlan::EmailOnly,
    }
}
