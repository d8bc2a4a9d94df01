//! HTTP API for the chat assistant
//!
//! One inbound operation: the UI posts the full ordered message list and gets
//! back an assistant reply plus an optional structured weather payload.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::SkycastError;
use crate::models::{ConversationTurn, NormalizedWeather};
use crate::orchestrator::TurnOrchestrator;

pub type SharedOrchestrator = Arc<TurnOrchestrator>;

/// Request body for `POST /api/chat`
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ConversationTurn>,
}

/// Response body for `POST /api/chat`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_data: Option<NormalizedWeather>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub version: &'static str,
}

pub fn router(orchestrator: SharedOrchestrator) -> Router {
    Router::new()
        .route("/chat", post(post_chat))
        .route("/health", get(get_health))
        .with_state(orchestrator)
}

async fn post_chat(
    State(orchestrator): State<SharedOrchestrator>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    match orchestrator.handle_turn(&request.messages).await {
        Ok(result) => Ok(Json(ChatResponse {
            role: "assistant".to_string(),
            content: result.reply_text,
            weather_data: result.weather,
        })),
        Err(err) => {
            let status = match &err {
                SkycastError::Validation { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            // The UI only ever sees the paraphrased message
            Err((
                status,
                Json(ErrorResponse {
                    error: err.user_message(),
                }),
            ))
        }
    }
}

async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "skycast",
        version: env!("CARGO_PKG_VERSION"),
    })
}
