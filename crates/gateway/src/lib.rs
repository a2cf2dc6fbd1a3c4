//! HTTP gateway for Pitcrew.
//!
//! Exposes the chat endpoint used by the storefront widget plus a health
//! check. Every request runs the full support pipeline; the only state shared
//! between requests is the immutable [`AppState`].
//!
//! Layers applied, outermost first:
//! - HTTP trace logging
//! - CORS for the configured storefront origins
//! - Request body size limit (1 MB)
//! - Panic recovery (a panicking handler becomes a 500)

pub mod chat;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use pitcrew_agent::SupportAgent;
use pitcrew_config::{AppConfig, Environment};
use pitcrew_knowledge::FsKnowledgeSource;
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

pub use chat::{ChatRequest, ChatResponse, DebugInfo, ErrorResponse, INTERNAL_ERROR};

/// Request body limit.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state for the gateway.
pub struct AppState {
    pub agent: Arc<SupportAgent>,
    pub environment: Environment,
    pub allowed_origins: Vec<String>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(agent: Arc<SupportAgent>, config: &AppConfig) -> Self {
        Self {
            agent,
            environment: config.environment,
            allowed_origins: config.gateway.allowed_origins.clone(),
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<AppState>;

/// Build the Axum router with all gateway routes and layers.
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.allowed_origins);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/chat", post(chat::chat_handler))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: INTERNAL_ERROR.into(),
        }),
    )
        .into_response()
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    for candidate in pitcrew_providers::candidates(&config.backend) {
        info!(name = candidate.name, url = %candidate.base_url, "Model backend candidate");
    }

    let knowledge = Arc::new(FsKnowledgeSource::from_config(&config));
    let provider = Arc::new(pitcrew_providers::build_chain(&config.backend));
    let agent = Arc::new(SupportAgent::from_config(&config, knowledge, provider));
    let state = Arc::new(AppState::new(agent, &config));

    let app = build_router(state);

    info!(
        addr = %addr,
        environment = %config.environment,
        knowledge = %config.knowledge.root.display(),
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: i64,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}
