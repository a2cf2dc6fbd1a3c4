//! `POST /api/chat`: the customer chat endpoint.

use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use pitcrew_agent::SupportError;
use pitcrew_core::intent::IntentSet;
use pitcrew_core::message::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{Instrument, error, info, info_span, warn};

use crate::SharedState;

/// Error text for every server-side failure. Details stay in the logs.
pub const INTERNAL_ERROR: &str = "Failed to process chat";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Option<Value>,
}

impl ChatRequest {
    /// The conversation carried by the body. A missing, `null` or non-array
    /// `messages` field reads as an empty conversation.
    pub fn conversation(self) -> Result<Vec<Message>, serde_json::Error> {
        match self.messages {
            Some(items @ Value::Array(_)) => serde_json::from_value(items),
            _ => Ok(Vec::new()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub intents: IntentSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

/// Extra metadata returned in development mode.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub context_length: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

pub(crate) async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected chat body");
        api_error(StatusCode::BAD_REQUEST, rejection.body_text())
    })?;
    let messages = request.conversation().map_err(|e| {
        warn!(error = %e, "Rejected chat messages");
        api_error(StatusCode::BAD_REQUEST, e.to_string())
    })?;

    let request_id = uuid::Uuid::new_v4();
    let span = info_span!("chat", %request_id, turns = messages.len());

    async move {
        info!("Chat request received");

        let reply = state
            .agent
            .handle(&messages)
            .await
            .map_err(|e| match e {
                SupportError::EmptyConversation | SupportError::LastTurnNotUser => {
                    api_error(StatusCode::BAD_REQUEST, e.to_string())
                }
                SupportError::Internal(inner) => {
                    error!(error = %inner, "Chat processing failed");
                    api_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
                }
            })?;

        let debug = state.environment.is_development().then_some(DebugInfo {
            context_length: reply.context_length,
        });

        Ok(Json(ChatResponse {
            response: reply.response,
            intents: reply.intents,
            debug,
        }))
    }
    .instrument(span)
    .await
}
