//! Crawlchat - chat frontend for the crawler command API
//!
//! A Rust backend implementing the conversation store and command
//! interpreter behind a small JSON/SSE API.

mod api;
mod chat;
mod runtime;
mod service;
mod session;
mod store;

use api::{create_router, AppState};
use runtime::spawn_chat;
use service::{HttpCommandService, LoggingService, ServiceConfig};
use session::{SessionStore, SqliteSessionStore};
use store::ConversationStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crawlchat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let db_path = std::env::var("CRAWLCHAT_DB_PATH").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        format!("{home}/.crawlchat/session.db")
    });

    let port: u16 = std::env::var("CRAWLCHAT_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5001);

    // Ensure database directory exists
    if let Some(parent) = PathBuf::from(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Open session storage and restore any persisted state
    tracing::info!(path = %db_path, "Opening session database");
    let sessions = Arc::new(SqliteSessionStore::open(&db_path)?);
    let initial_session = sessions.load().await?;
    let persisted = sessions.load_conversation().await?.unwrap_or_default();
    let store = ConversationStore::restore(persisted);

    // Command service client
    let service_config = ServiceConfig::from_env();
    tracing::info!(endpoint = %service_config.base_url, "Command service configured");
    let service = Arc::new(LoggingService::new(Arc::new(HttpCommandService::new(
        &service_config,
    ))));

    // Start the chat runtime
    let chat = spawn_chat(
        store.clone(),
        sessions.clone(),
        service,
        initial_session,
    );

    // Create application state and router
    let state = AppState::new(store, chat, sessions);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(compression),
    );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Crawlchat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
