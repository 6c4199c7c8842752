use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::request::RecipientRole;

/// Who a domain-level notification goes to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub id: Uuid,
    pub role: RecipientRole,
    pub email: String,

    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    pub id: Uuid,
    pub landlord_id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub description: String,
    /// low, medium, high or emergency
    pub priority: String,
    pub category: String,

    #[serde(default)]
    pub property_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub landlord_id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub amount: f64,
    pub payment_type: String,
    pub due_date: DateTime<Utc>,

    #[serde(default)]
    pub property_name: Option<String>,
}
