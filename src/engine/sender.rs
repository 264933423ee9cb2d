use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::time::sleep;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::db::document_store::{collections, DocumentStore};
use crate::engine::render::render_document;
use crate::engine::templating::substitute;
use crate::models::campaign::{Campaign, CampaignStatus, ContactSendResult, SendReport};
use crate::models::contact::Contact;
use crate::models::send_log::SendLogEntry;
use crate::models::template::Template;
use crate::services::smtp_mailer::{Mailer, OutgoingEmail};
use crate::state::AppState;

pub(crate) const SEND_BATCH_SIZE: usize = 10;
#[cfg(test)]
const BATCH_PAUSE: Duration = Duration::from_millis(5);
#[cfg(not(test))]
const BATCH_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum SenderError {
    #[error("campaign {0} not found")]
    CampaignNotFound(Uuid),
    #[error("template {0} not found")]
    TemplateNotFound(Uuid),
    #[error("campaign has no contacts")]
    EmptyContactList,
    #[error("no sender address configured")]
    MissingSender,
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct SenderIdentity {
    pub from_email: String,
    pub from_name: Option<String>,
    pub reply_to: String,
}

/// Explicit campaign override first, then the configured account default.
/// No usable from address is a validation failure before anything is sent.
/// Reply-to falls back to the resolved from address.
pub fn resolve_sender(campaign: &Campaign, config: &Config) -> Result<SenderIdentity, SenderError> {
    let present = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
    let from_email = present(&campaign.from_email)
        .or_else(|| config.smtp_from.clone())
        .ok_or(SenderError::MissingSender)?;
    let from_name = present(&campaign.from_name).or_else(|| config.smtp_from_name.clone());
    let reply_to = present(&campaign.reply_to).unwrap_or_else(|| from_email.clone());
    Ok(SenderIdentity {
        from_email,
        from_name,
        reply_to,
    })
}

/// Runs one campaign end to end: validate, render once, then deliver in
/// fixed-size batches with concurrent sends inside each batch. Results keep
/// contact-list order, one contact's failure never touches its siblings, and
/// this function is the only writer of the campaign's terminal status.
pub async fn run_campaign(state: AppState, campaign_id: Uuid) -> Result<SendReport, SenderError> {
    let mut campaign = load::<Campaign>(&state, collections::CAMPAIGNS, campaign_id)
        .await?
        .ok_or(SenderError::CampaignNotFound(campaign_id))?;

    let template =
        match load::<Template>(&state, collections::TEMPLATES, campaign.template_id).await? {
            Some(template) => template,
            None => {
                let template_id = campaign.template_id;
                fail_campaign(&state, &mut campaign, "template not found").await?;
                return Err(SenderError::TemplateNotFound(template_id));
            }
        };

    if campaign.contact_ids.is_empty() {
        fail_campaign(&state, &mut campaign, "campaign has no contacts").await?;
        return Err(SenderError::EmptyContactList);
    }

    let identity = match resolve_sender(&campaign, &state.config) {
        Ok(identity) => identity,
        Err(err) => {
            fail_campaign(&state, &mut campaign, "no sender address configured").await?;
            return Err(err);
        }
    };

    let mut slots = Vec::with_capacity(campaign.contact_ids.len());
    for contact_id in &campaign.contact_ids {
        let contact = load::<Contact>(&state, collections::CONTACTS, *contact_id).await?;
        slots.push((*contact_id, contact));
    }

    campaign.status = CampaignStatus::Sending;
    campaign.recipients = slots.len();
    campaign.error = None;
    campaign.updated_at = OffsetDateTime::now_utc();
    save(&state, collections::CAMPAIGNS, campaign.id, &campaign).await?;

    // Contact-independent, so rendered once for the whole campaign.
    let html = render_document(&template);
    let subject = template.subject.clone();

    info!(
        campaign_id = %campaign.id,
        template_id = %template.id,
        recipients = slots.len(),
        "campaign send started"
    );

    let mut results: Vec<ContactSendResult> = Vec::with_capacity(slots.len());
    let mut canceled = false;

    for (batch_index, batch) in slots.chunks(SEND_BATCH_SIZE).enumerate() {
        if batch_index > 0 {
            if cancel_requested(&state, campaign.id).await {
                canceled = true;
                break;
            }
            sleep(BATCH_PAUSE).await;
        }

        let mut handles = Vec::with_capacity(batch.len());
        for (contact_id, contact) in batch {
            let mailer = state.mailer.clone();
            let identity = identity.clone();
            let subject = subject.clone();
            let html = html.clone();
            let contact_id = *contact_id;
            let contact = contact.clone();
            handles.push((
                contact_id,
                tokio::spawn(async move {
                    send_one(mailer, identity, subject, html, contact_id, contact).await
                }),
            ));
        }

        // Awaiting in spawn order keeps results in contact-list order even
        // though sends inside the batch finish out of order.
        for (contact_id, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(err) => {
                    warn!(campaign_id = %campaign.id, contact_id = %contact_id, ?err, "send task panicked");
                    ContactSendResult::failure(contact_id, None, "send task failed")
                }
            };
            record_attempt(&state, campaign.id, &result).await;
            results.push(result);
        }
    }

    let sent = results.iter().filter(|r| r.success).count();
    let failed = results.len() - sent;
    let report = SendReport {
        sent,
        failed,
        recipients: slots.len(),
        results,
    };

    let mut final_campaign = load::<Campaign>(&state, collections::CAMPAIGNS, campaign.id)
        .await?
        .unwrap_or(campaign);
    final_campaign.status = if canceled {
        CampaignStatus::Canceled
    } else {
        CampaignStatus::Sent
    };
    final_campaign.sent = report.sent;
    final_campaign.failed = report.failed;
    final_campaign.recipients = report.recipients;
    final_campaign.error = None;
    final_campaign.updated_at = OffsetDateTime::now_utc();
    save(&state, collections::CAMPAIGNS, final_campaign.id, &final_campaign).await?;

    info!(
        campaign_id = %final_campaign.id,
        sent = report.sent,
        failed = report.failed,
        recipients = report.recipients,
        canceled,
        "campaign send finished"
    );

    Ok(report)
}

async fn send_one(
    mailer: Arc<dyn Mailer>,
    identity: SenderIdentity,
    subject: String,
    html: String,
    contact_id: Uuid,
    contact: Option<Contact>,
) -> ContactSendResult {
    let Some(contact) = contact else {
        return ContactSendResult::failure(contact_id, None, "contact not found");
    };
    let Some(email) = contact.sanitized_email().map(str::to_string) else {
        return ContactSendResult::failure(contact_id, None, "no email address");
    };

    let values = contact.placeholder_values();
    let message = OutgoingEmail {
        to: email.clone(),
        subject: substitute(&subject, &values),
        html: substitute(&html, &values),
        text: None,
        from: identity.from_email,
        from_name: identity.from_name,
        reply_to: Some(identity.reply_to),
        cc: Vec::new(),
        bcc: Vec::new(),
    };

    match mailer.send(&message).await {
        Ok(message_id) => ContactSendResult {
            contact_id,
            email: Some(email),
            success: true,
            message_id: Some(message_id),
            error: None,
        },
        Err(err) => {
            warn!(contact_id = %contact_id, error = %err, "contact send failed");
            ContactSendResult::failure(contact_id, Some(email), &err.to_string())
        }
    }
}

/// Polled at batch boundaries only; an in-flight batch always finishes.
async fn cancel_requested(state: &AppState, campaign_id: Uuid) -> bool {
    match load::<Campaign>(state, collections::CAMPAIGNS, campaign_id).await {
        Ok(Some(campaign)) => campaign.status == CampaignStatus::Canceling,
        Ok(None) => true,
        Err(err) => {
            warn!(campaign_id = %campaign_id, ?err, "failed to poll campaign status");
            false
        }
    }
}

async fn fail_campaign(
    state: &AppState,
    campaign: &mut Campaign,
    reason: &str,
) -> Result<(), SenderError> {
    campaign.status = CampaignStatus::Failed;
    campaign.error = Some(reason.to_string());
    campaign.updated_at = OffsetDateTime::now_utc();
    save(state, collections::CAMPAIGNS, campaign.id, campaign).await
}

async fn record_attempt(state: &AppState, campaign_id: Uuid, result: &ContactSendResult) {
    let entry = SendLogEntry {
        id: Uuid::new_v4(),
        campaign_id,
        contact_id: result.contact_id,
        email: result.email.clone(),
        success: result.success,
        message_id: result.message_id.clone(),
        error: result.error.clone(),
        sent_at: OffsetDateTime::now_utc(),
    };
    match serde_json::to_value(&entry) {
        Ok(doc) => {
            if let Err(err) = state
                .store
                .put(collections::SEND_LOGS, Some(entry.id), doc)
                .await
            {
                warn!(
                    campaign_id = %campaign_id,
                    contact_id = %entry.contact_id,
                    ?err,
                    "failed to append send log entry"
                );
            }
        }
        Err(err) => warn!(?err, "failed to serialize send log entry"),
    }
}

async fn load<T: DeserializeOwned>(
    state: &AppState,
    collection: &str,
    id: Uuid,
) -> Result<Option<T>, SenderError> {
    let Some(doc) = state.store.get(collection, id).await? else {
        return Ok(None);
    };
    // A document that no longer parses behaves like a missing one.
    Ok(serde_json::from_value(doc).ok())
}

async fn save<T: Serialize>(
    state: &AppState,
    collection: &str,
    id: Uuid,
    value: &T,
) -> Result<(), SenderError> {
    let doc = serde_json::to_value(value)?;
    state.store.put(collection, Some(id), doc).await?;
    Ok(())
}
