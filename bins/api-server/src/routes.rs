use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use llm_gateway::CommandInterpreter;
use swap_core::schema::raw_command_schema;
use swap_core::types::{FieldError, RawCommandInput, SwapCommand};

/// Fixed prompt used by the connectivity check.
const GREETING_PROMPT: &str = "Say hello and confirm you can hear us.";

#[derive(Clone)]
pub struct AppState {
    /// None when the LLM configuration was absent or invalid at startup;
    /// requests then fail with a 500 instead of the process refusing to
    /// boot.
    pub llm: Option<Arc<dyn CommandInterpreter>>,
}

impl AppState {
    pub fn new(llm: Option<Arc<dyn CommandInterpreter>>) -> Self {
        Self { llm }
    }

    fn interpreter(&self) -> Result<Arc<dyn CommandInterpreter>, ApiError> {
        self.llm
            .clone()
            .ok_or_else(|| ApiError::Internal("LLM client is not configured".to_string()))
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// The request payload failed schema checks; caller's fault.
    InvalidInput(Vec<FieldError>),
    /// Anything upstream or internal, collapsed to a 500 carrying the
    /// stringified cause.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidInput(details) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid input", "details": details })),
            )
                .into_response(),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TestResponse {
    pub message: String,
    pub result: String,
}

#[derive(Debug, Serialize)]
pub struct SwapResponse {
    pub message: String,
    pub result: SwapCommand,
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/test", get(llm_test))
        .route("/swap", post(parse_swap))
}

async fn llm_test(State(state): State<AppState>) -> Result<Json<TestResponse>, ApiError> {
    info!("received llm connectivity test request");

    let llm = state.interpreter()?;
    let result = llm.chat_completion(GREETING_PROMPT).await.map_err(|err| {
        warn!(error = %err, "llm connectivity test failed");
        ApiError::Internal(err.to_string())
    })?;

    Ok(Json(TestResponse {
        message: "LLM connectivity test succeeded".to_string(),
        result,
    }))
}

async fn parse_swap(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SwapResponse>, ApiError> {
    // Malformed JSON surfaces as a 500 carrying the parse error; schema
    // violations below are itemized 400s.
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|err| ApiError::Internal(format!("invalid JSON body: {err}")))?;

    raw_command_schema().validate(&payload).map_err(|details| {
        info!(violations = details.len(), "rejected swap command input");
        ApiError::InvalidInput(details)
    })?;

    let input: RawCommandInput =
        serde_json::from_value(payload).map_err(|err| ApiError::Internal(err.to_string()))?;
    let command = input.command.trim();

    info!(command_chars = command.chars().count(), "parsing swap command");

    let llm = state.interpreter()?;
    let result = llm.parse_swap_command(command).await.map_err(|err| {
        warn!(error = %err, "swap command parsing failed");
        ApiError::Internal(err.to_string())
    })?;

    Ok(Json(SwapResponse {
        message: "Swap command parsed".to_string(),
        result,
    }))
}
