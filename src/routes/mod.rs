use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

pub mod campaigns;
pub mod contacts;
pub mod templates;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/templates",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/api/templates/{id}",
            get(templates::get_template)
                .put(templates::update_template)
                .delete(templates::delete_template),
        )
        .route("/api/templates/{id}/preview", post(templates::preview_template))
        .route(
            "/api/contacts",
            get(contacts::list_contacts).post(contacts::create_contact),
        )
        .route("/api/contacts/{id}", delete(contacts::delete_contact))
        .route(
            "/api/campaigns",
            get(campaigns::list_campaigns).post(campaigns::create_campaign),
        )
        .route("/api/campaigns/{id}", get(campaigns::get_campaign))
        .route("/api/campaigns/{id}/send", post(campaigns::send_campaign))
        .route("/api/campaigns/{id}/cancel", post(campaigns::cancel_campaign))
        .route("/api/campaigns/{id}/log", get(campaigns::campaign_log))
        .with_state(state)
}
