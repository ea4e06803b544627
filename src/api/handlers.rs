//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    ChatRequest, ConversationResponse, ErrorResponse, SessionResponse, SuccessResponse,
};
use super::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Input submission
        .route("/api/chat", post(submit_chat))
        // Conversation snapshot
        .route("/api/conversation", get(get_conversation))
        // Real-time store mutations
        .route("/api/conversation/stream", get(stream_conversation))
        // Persisted session state
        .route("/api/session", get(get_session))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

async fn submit_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.chat.submit(req.text).await.map_err(AppError::Internal)?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn get_conversation(State(state): State<AppState>) -> Json<ConversationResponse> {
    Json(ConversationResponse {
        messages: state.store.snapshot(),
    })
}

async fn stream_conversation(State(state): State<AppState>) -> impl IntoResponse {
    sse_stream(state.store.snapshot(), state.store.subscribe())
}

async fn get_session(State(state): State<AppState>) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .sessions
        .load()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(SessionResponse { session }))
}

async fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Handler-level error that renders as a JSON payload
#[derive(Debug)]
enum AppError {
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}
