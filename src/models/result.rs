use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    models::status::{Channel, NotificationStatus},
    routing::ChannelPlan,
};

/// The one authoritative outcome reported for a dispatched request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    pub id: Uuid,
    pub status: NotificationStatus,
    pub sent_at: DateTime<Utc>,
    pub channel: Channel,
}

impl NotificationResult {
    pub fn sent(channel: Channel) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: NotificationStatus::Sent,
            sent_at: Utc::now(),
            channel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoPhoneNumber,
    InvalidPhoneNumber,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "detail")]
pub enum ChannelOutcome {
    Delivered,
    Failed(String),
    Skipped(SkipReason),
    NotPlanned,
}

impl ChannelOutcome {
    pub fn was_attempted(&self) -> bool {
        matches!(self, ChannelOutcome::Delivered | ChannelOutcome::Failed(_))
    }
}

/// Full per-channel picture of one dispatch. `result` is what callers of the
/// plain API see; the channel outcomes keep best-effort failures observable.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub result: NotificationResult,
    pub plan: ChannelPlan,
    pub email: ChannelOutcome,
    pub sms: ChannelOutcome,
}

#[derive(Debug)]
pub struct BulkItemOutcome {
    pub index: usize,
    pub outcome: Result<DispatchReport, String>,
}

#[derive(Debug, Default)]
pub struct BulkReport {
    pub items: Vec<BulkItemOutcome>,
}

impl BulkReport {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|item| item.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    /// Successful results in input order.
    pub fn into_results(self) -> Vec<NotificationResult> {
        self.items
            .into_iter()
            .filter_map(|item| item.outcome.ok())
            .map(|report| report.result)
            .collect()
    }

    pub fn failures(&self) -> Vec<BulkFailure> {
        self.items
            .iter()
            .filter_map(|item| match &item.outcome {
                Ok(_) => None,
                Err(reason) => Some(BulkFailure {
                    index: item.index,
                    reason: reason.clone(),
                }),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkFailure {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSummary {
    pub results: Vec<NotificationResult>,
    pub failures: Vec<BulkFailure>,
}

impl From<BulkReport> for BulkSummary {
    fn from(report: BulkReport) -> Self {
        let failures = report.failures();
        Self {
            results: report.into_results(),
            failures,
        }
    }
}
