use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use time::OffsetDateTime;
use tracing::{error, warn};
use uuid::Uuid;

use crate::db::document_store::{collections, DocumentStore};
use crate::engine::sender::{resolve_sender, run_campaign};
use crate::models::campaign::{Campaign, CampaignStatus, CreateCampaign};
use crate::models::send_log::SendLogEntry;
use crate::responses::JsonResponse;
use crate::state::AppState;

pub async fn list_campaigns(State(state): State<AppState>) -> Response {
    match state.store.list(collections::CAMPAIGNS, None).await {
        Ok(docs) => {
            let campaigns: Vec<Campaign> = docs
                .into_iter()
                .filter_map(|doc| serde_json::from_value(doc).ok())
                .collect();
            (
                StatusCode::OK,
                Json(json!({ "success": true, "campaigns": campaigns })),
            )
                .into_response()
        }
        Err(err) => {
            error!(?err, "failed to list campaigns");
            JsonResponse::server_error("Failed to list campaigns").into_response()
        }
    }
}

pub async fn create_campaign(
    State(state): State<AppState>,
    Json(payload): Json<CreateCampaign>,
) -> Response {
    if payload.name.trim().is_empty() {
        return JsonResponse::bad_request("Campaign name is required").into_response();
    }
    match state.store.get(collections::TEMPLATES, payload.template_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return JsonResponse::bad_request("Unknown template reference").into_response()
        }
        Err(err) => {
            error!(?err, "failed to check template");
            return JsonResponse::server_error("Failed to create campaign").into_response();
        }
    }

    let now = OffsetDateTime::now_utc();
    let campaign = Campaign {
        id: Uuid::new_v4(),
        name: payload.name,
        template_id: payload.template_id,
        contact_ids: payload.contact_ids,
        from_email: payload.from_email,
        from_name: payload.from_name,
        reply_to: payload.reply_to,
        status: CampaignStatus::Draft,
        sent: 0,
        failed: 0,
        recipients: 0,
        error: None,
        created_at: now,
        updated_at: now,
    };

    match put_campaign(&state, &campaign).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({ "success": true, "campaign": campaign })),
        )
            .into_response(),
        Err(err) => {
            error!(?err, "failed to save campaign");
            JsonResponse::server_error("Failed to create campaign").into_response()
        }
    }
}

pub async fn get_campaign(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match load_campaign(&state, id).await {
        Ok(Some(campaign)) => (
            StatusCode::OK,
            Json(json!({ "success": true, "campaign": campaign })),
        )
            .into_response(),
        Ok(None) => JsonResponse::not_found("Campaign not found").into_response(),
        Err(err) => {
            error!(campaign_id = %id, ?err, "failed to load campaign");
            JsonResponse::server_error("Failed to load campaign").into_response()
        }
    }
}

/// Validates up front, then hands the campaign to a background send task.
/// Per-contact outcomes land in the send log; final counts on the campaign.
pub async fn send_campaign(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let campaign = match load_campaign(&state, id).await {
        Ok(Some(campaign)) => campaign,
        Ok(None) => return JsonResponse::not_found("Campaign not found").into_response(),
        Err(err) => {
            error!(campaign_id = %id, ?err, "failed to load campaign");
            return JsonResponse::server_error("Failed to send campaign").into_response();
        }
    };

    if matches!(
        campaign.status,
        CampaignStatus::Sending | CampaignStatus::Canceling
    ) {
        return JsonResponse::conflict("Campaign is already sending").into_response();
    }
    if campaign.contact_ids.is_empty() {
        return JsonResponse::bad_request("Campaign has no contacts").into_response();
    }
    match state.store.get(collections::TEMPLATES, campaign.template_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return JsonResponse::bad_request("Unknown template reference").into_response()
        }
        Err(err) => {
            error!(campaign_id = %id, ?err, "failed to check template");
            return JsonResponse::server_error("Failed to send campaign").into_response();
        }
    }
    if resolve_sender(&campaign, &state.config).is_err() {
        return JsonResponse::bad_request("No sender address configured").into_response();
    }

    let task_state = state.clone();
    tokio::spawn(async move {
        if let Err(err) = run_campaign(task_state, id).await {
            warn!(campaign_id = %id, ?err, "campaign run failed");
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({ "success": true, "status": CampaignStatus::Sending })),
    )
        .into_response()
}

/// Marks the campaign canceling; the send loop notices at the next batch
/// boundary and lets the in-flight batch finish.
pub async fn cancel_campaign(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let mut campaign = match load_campaign(&state, id).await {
        Ok(Some(campaign)) => campaign,
        Ok(None) => return JsonResponse::not_found("Campaign not found").into_response(),
        Err(err) => {
            error!(campaign_id = %id, ?err, "failed to load campaign");
            return JsonResponse::server_error("Failed to cancel campaign").into_response();
        }
    };

    if campaign.status != CampaignStatus::Sending {
        return JsonResponse::bad_request("Campaign is not sending").into_response();
    }

    campaign.status = CampaignStatus::Canceling;
    campaign.updated_at = OffsetDateTime::now_utc();
    match put_campaign(&state, &campaign).await {
        Ok(()) => JsonResponse::success("Cancellation requested").into_response(),
        Err(err) => {
            error!(campaign_id = %id, ?err, "failed to cancel campaign");
            JsonResponse::server_error("Failed to cancel campaign").into_response()
        }
    }
}

pub async fn campaign_log(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state
        .store
        .list(collections::SEND_LOGS, Some(&json!({ "campaignId": id })))
        .await
    {
        Ok(docs) => {
            let entries: Vec<SendLogEntry> = docs
                .into_iter()
                .filter_map(|doc| serde_json::from_value(doc).ok())
                .collect();
            (
                StatusCode::OK,
                Json(json!({ "success": true, "entries": entries })),
            )
                .into_response()
        }
        Err(err) => {
            error!(campaign_id = %id, ?err, "failed to list send log");
            JsonResponse::server_error("Failed to list send log").into_response()
        }
    }
}

async fn load_campaign(state: &AppState, id: Uuid) -> Result<Option<Campaign>, sqlx::Error> {
    Ok(state
        .store
        .get(collections::CAMPAIGNS, id)
        .await?
        .and_then(|doc| serde_json::from_value(doc).ok()))
}

async fn put_campaign(state: &AppState, campaign: &Campaign) -> Result<(), sqlx::Error> {
    let doc = serde_json::to_value(campaign)
        .map_err(|err| sqlx::Error::Protocol(err.to_string()))?;
    state
        .store
        .put(collections::CAMPAIGNS, Some(campaign.id), doc)
        .await?;
    Ok(())
}
