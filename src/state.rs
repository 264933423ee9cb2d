use crate::config::Config;
use crate::db::document_store::DocumentStore;
use crate::services::smtp_mailer::Mailer;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<Config>,
}
