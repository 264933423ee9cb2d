use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use time::OffsetDateTime;
use tracing::error;
use uuid::Uuid;

use crate::db::document_store::{collections, DocumentStore};
use crate::models::contact::{Contact, CreateContact};
use crate::responses::JsonResponse;
use crate::state::AppState;

fn is_valid_email_address(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.contains(' ') {
        return false;
    }
    let mut parts = trimmed.split('@');
    let local = parts.next().unwrap_or("");
    let domain = match parts.next() {
        Some(d) => d,
        None => return false,
    };
    if parts.next().is_some() {
        return false;
    }
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }
    domain.contains('.')
}

pub async fn list_contacts(State(state): State<AppState>) -> Response {
    match state.store.list(collections::CONTACTS, None).await {
        Ok(docs) => {
            let contacts: Vec<Contact> = docs
                .into_iter()
                .filter_map(|doc| serde_json::from_value(doc).ok())
                .collect();
            (
                StatusCode::OK,
                Json(json!({ "success": true, "contacts": contacts })),
            )
                .into_response()
        }
        Err(err) => {
            error!(?err, "failed to list contacts");
            JsonResponse::server_error("Failed to list contacts").into_response()
        }
    }
}

pub async fn create_contact(
    State(state): State<AppState>,
    Json(payload): Json<CreateContact>,
) -> Response {
    let email = payload
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string);
    if let Some(email) = email.as_deref() {
        if !is_valid_email_address(email) {
            return JsonResponse::bad_request("Invalid email address").into_response();
        }
    }

    let now = OffsetDateTime::now_utc();
    let contact = Contact {
        id: Uuid::new_v4(),
        email,
        first_name: payload.first_name,
        last_name: payload.last_name,
        company: payload.company,
        position: payload.position,
        created_at: now,
        updated_at: now,
    };

    let doc = match serde_json::to_value(&contact) {
        Ok(doc) => doc,
        Err(err) => {
            error!(?err, "failed to serialize contact");
            return JsonResponse::server_error("Failed to save contact").into_response();
        }
    };
    match state.store.put(collections::CONTACTS, Some(contact.id), doc).await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(json!({ "success": true, "contact": contact })),
        )
            .into_response(),
        Err(err) => {
            error!(?err, "failed to save contact");
            JsonResponse::server_error("Failed to save contact").into_response()
        }
    }
}

pub async fn delete_contact(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.store.delete(collections::CONTACTS, id).await {
        Ok(true) => JsonResponse::success("Contact deleted").into_response(),
        Ok(false) => JsonResponse::not_found("Contact not found").into_response(),
        Err(err) => {
            error!(contact_id = %id, ?err, "failed to delete contact");
            JsonResponse::server_error("Failed to delete contact").into_response()
        }
    }
}
