use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;
use tracing::error;
use uuid::Uuid;

use crate::db::document_store::{collections, DocumentStore};
use crate::engine::render::render_document;
use crate::engine::templating::substitute;
use crate::models::template::{CreateTemplate, Template};
use crate::responses::JsonResponse;
use crate::state::AppState;

pub async fn list_templates(State(state): State<AppState>) -> Response {
    match state.store.list(collections::TEMPLATES, None).await {
        Ok(docs) => {
            let templates: Vec<Template> = docs
                .into_iter()
                .filter_map(|doc| serde_json::from_value(doc).ok())
                .collect();
            (
                StatusCode::OK,
                Json(json!({ "success": true, "templates": templates })),
            )
                .into_response()
        }
        Err(err) => {
            error!(?err, "failed to list templates");
            JsonResponse::server_error("Failed to list templates").into_response()
        }
    }
}

pub async fn create_template(
    State(state): State<AppState>,
    Json(payload): Json<CreateTemplate>,
) -> Response {
    if let Err(reason) = payload.validate() {
        return JsonResponse::bad_request(&reason).into_response();
    }

    let now = OffsetDateTime::now_utc();
    let template = Template {
        id: Uuid::new_v4(),
        name: payload.name,
        subject: payload.subject,
        components: payload.components,
        page_style: payload.page_style,
        created_at: now,
        updated_at: now,
    };

    match put_template(&state, &template).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({ "success": true, "template": template })),
        )
            .into_response(),
        Err(err) => {
            error!(?err, "failed to save template");
            JsonResponse::server_error("Failed to save template").into_response()
        }
    }
}

pub async fn get_template(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match load_template(&state, id).await {
        Ok(Some(template)) => (
            StatusCode::OK,
            Json(json!({ "success": true, "template": template })),
        )
            .into_response(),
        Ok(None) => JsonResponse::not_found("Template not found").into_response(),
        Err(err) => {
            error!(template_id = %id, ?err, "failed to load template");
            JsonResponse::server_error("Failed to load template").into_response()
        }
    }
}

pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateTemplate>,
) -> Response {
    if let Err(reason) = payload.validate() {
        return JsonResponse::bad_request(&reason).into_response();
    }

    let existing = match load_template(&state, id).await {
        Ok(Some(existing)) => existing,
        Ok(None) => return JsonResponse::not_found("Template not found").into_response(),
        Err(err) => {
            error!(template_id = %id, ?err, "failed to load template");
            return JsonResponse::server_error("Failed to update template").into_response();
        }
    };

    // Whole-aggregate replacement; only identity and creation time survive.
    let template = Template {
        id,
        name: payload.name,
        subject: payload.subject,
        components: payload.components,
        page_style: payload.page_style,
        created_at: existing.created_at,
        updated_at: OffsetDateTime::now_utc(),
    };

    match put_template(&state, &template).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "template": template })),
        )
            .into_response(),
        Err(err) => {
            error!(template_id = %id, ?err, "failed to save template");
            JsonResponse::server_error("Failed to update template").into_response()
        }
    }
}

pub async fn delete_template(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.store.delete(collections::TEMPLATES, id).await {
        Ok(true) => JsonResponse::success("Template deleted").into_response(),
        Ok(false) => JsonResponse::not_found("Template not found").into_response(),
        Err(err) => {
            error!(template_id = %id, ?err, "failed to delete template");
            JsonResponse::server_error("Failed to delete template").into_response()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewRequest {
    /// Sample placeholder values; tokens without one stay visible.
    #[serde(default)]
    pub values: HashMap<String, String>,
}

pub async fn preview_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PreviewRequest>,
) -> Response {
    let template = match load_template(&state, id).await {
        Ok(Some(template)) => template,
        Ok(None) => return JsonResponse::not_found("Template not found").into_response(),
        Err(err) => {
            error!(template_id = %id, ?err, "failed to load template");
            return JsonResponse::server_error("Failed to preview template").into_response();
        }
    };

    let html = substitute(&render_document(&template), &payload.values);
    let subject = substitute(&template.subject, &payload.values);
    (
        StatusCode::OK,
        Json(json!({ "success": true, "subject": subject, "html": html })),
    )
        .into_response()
}

async fn load_template(state: &AppState, id: Uuid) -> Result<Option<Template>, sqlx::Error> {
    Ok(state
        .store
        .get(collections::TEMPLATES, id)
        .await?
        .and_then(|doc| serde_json::from_value(doc).ok()))
}

async fn put_template(state: &AppState, template: &Template) -> Result<(), sqlx::Error> {
    let doc = serde_json::to_value(template)
        .map_err(|err| sqlx::Error::Protocol(err.to_string()))?;
    state
        .store
        .put(collections::TEMPLATES, Some(template.id), doc)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::memory_store::MemoryDocumentStore;
    use crate::routes::api_router;
    use crate::services::smtp_mailer::MockMailer;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::Router;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        api_router(AppState {
            store: Arc::new(MemoryDocumentStore::new()),
            mailer: Arc::new(MockMailer::default()),
            config: Arc::new(Config::default()),
        })
    }

    async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn create_and_preview_template() {
        let app = app();
        let (status, created) = send_json(
            &app,
            "POST",
            "/api/templates",
            json!({
                "name": "Intro",
                "subject": "Hi {{firstName}}",
                "components": [
                    { "type": "text", "id": "t1", "content": "Hello {{firstName}}" }
                ]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["template"]["id"].as_str().unwrap().to_string();

        let (status, preview) = send_json(
            &app,
            "POST",
            &format!("/api/templates/{}/preview", id),
            json!({ "values": { "firstName": "Ada" } }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(preview["subject"], "Hi Ada");
        assert!(preview["html"].as_str().unwrap().contains("Hello Ada"));
    }

    #[tokio::test]
    async fn create_rejects_duplicate_component_ids() {
        let app = app();
        let (status, body) = send_json(
            &app,
            "POST",
            "/api/templates",
            json!({
                "name": "Broken",
                "components": [
                    { "type": "text", "id": "dup", "content": "a" },
                    { "type": "text", "id": "dup", "content": "b" }
                ]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn unknown_template_is_not_found() {
        let app = app();
        let (status, _) = send_json(
            &app,
            "POST",
            &format!("/api/templates/{}/preview", Uuid::new_v4()),
            json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
