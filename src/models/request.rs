use std::{
    collections::HashMap,
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientRole {
    Landlord,
    Tenant,
    Contractor,
}

impl RecipientRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientRole::Landlord => "landlord",
            RecipientRole::Tenant => "tenant",
            RecipientRole::Contractor => "contractor",
        }
    }
}

impl Display for RecipientRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(format!("Unknown priority '{}'", other)),
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A single logical notification event addressed to one recipient.
///
/// Consumed exactly once by the dispatcher, which produces exactly one
/// `NotificationResult` (or an error) for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub tenant_scope_id: String,
    pub recipient_id: String,
    pub recipient_role: RecipientRole,
    pub recipient_email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_entity_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_entity_type: Option<String>,

    /// Unrecognised values deserialize to `None` and route as email-only.
    #[serde(default, deserialize_with = "deserialize_priority")]
    pub priority: Option<Priority>,

    #[serde(default)]
    pub variables: HashMap<String, String>,
}

impl NotificationRequest {
    pub fn new(
        notification_type: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        tenant_scope_id: impl Into<String>,
        recipient_id: impl Into<String>,
        recipient_role: RecipientRole,
        recipient_email: impl Into<String>,
    ) -> Self {
        Self {
            notification_type: notification_type.into(),
            title: title.into(),
            message: message.into(),
            tenant_scope_id: tenant_scope_id.into(),
            recipient_id: recipient_id.into(),
            recipient_role,
            recipient_email: recipient_email.into(),
            recipient_phone: None,
            related_entity_id: None,
            related_entity_type: None,
            priority: None,
            variables: HashMap::new(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.recipient_phone = Some(phone.into());
        self
    }

    pub fn with_related_entity(
        mut self,
        entity_id: impl Into<String>,
        entity_type: impl Into<String>,
    ) -> Self {
        self.related_entity_id = Some(entity_id.into());
        self.related_entity_type = Some(entity_type.into());
        self
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// The phone number to text, if one was supplied and is not blank.
    pub fn sms_target(&self) -> Option<&str> {
        self.recipient_phone
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty())
    }
}

fn deserialize_priority<'de, D>(deserializer: D) -> Result<Option<Priority>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.parse().ok()))
}
