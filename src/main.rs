use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use coldwire_backend::config::Config;
use coldwire_backend::db::document_store::DocumentStore;
use coldwire_backend::db::postgres_document_store::PostgresDocumentStore;
use coldwire_backend::routes::api_router;
use coldwire_backend::services::smtp_mailer::{Mailer, SmtpMailer};
use coldwire_backend::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    let store = Arc::new(PostgresDocumentStore { pool }) as Arc<dyn DocumentStore>;
    let mailer =
        Arc::new(SmtpMailer::new().expect("SMTP configuration is incomplete")) as Arc<dyn Mailer>;

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_origin
                .parse::<HeaderValue>()
                .expect("FRONTEND_ORIGIN must be a valid origin"),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE]);

    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        store,
        mailer,
        config: Arc::new(config),
    };

    let app = api_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind listen address");
    info!(addr = %bind_addr, "coldwire backend listening");
    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
