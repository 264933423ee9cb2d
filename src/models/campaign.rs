use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Sending,
    /// Cancellation requested; picked up by the send loop at the next batch
    /// boundary.
    Canceling,
    Canceled,
    Sent,
    Failed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Sending => "sending",
            CampaignStatus::Canceling => "canceling",
            CampaignStatus::Canceled => "canceled",
            CampaignStatus::Sent => "sent",
            CampaignStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub template_id: Uuid,
    #[serde(default)]
    pub contact_ids: Vec<Uuid>,
    #[serde(default)]
    pub from_email: Option<String>,
    #[serde(default)]
    pub from_name: Option<String>,
    #[serde(default)]
    pub reply_to: Option<String>,
    #[serde(default)]
    pub status: CampaignStatus,
    #[serde(default)]
    pub sent: usize,
    #[serde(default)]
    pub failed: usize,
    #[serde(default)]
    pub recipients: usize,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaign {
    pub name: String,
    pub template_id: Uuid,
    #[serde(default)]
    pub contact_ids: Vec<Uuid>,
    #[serde(default)]
    pub from_email: Option<String>,
    #[serde(default)]
    pub from_name: Option<String>,
    #[serde(default)]
    pub reply_to: Option<String>,
}

/// Outcome of one contact's send attempt. Results keep the contact-list
/// order even though sends inside a batch finish out of order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactSendResult {
    pub contact_id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ContactSendResult {
    pub fn failure(contact_id: Uuid, email: Option<String>, reason: &str) -> Self {
        ContactSendResult {
            contact_id,
            email,
            success: false,
            message_id: None,
            error: Some(reason.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SendReport {
    pub results: Vec<ContactSendResult>,
    pub sent: usize,
    pub failed: usize,
    pub recipients: usize,
}
