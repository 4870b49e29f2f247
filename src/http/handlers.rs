//! Axum HTTP handlers for the web server
//!
//! Provides the primary Model Context Protocol endpoint, and general metadata endpoints.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::http::MCP_PATH;
use crate::mcp::rpc::{is_json_rpc_error, json_rpc_error, INVALID_REQUEST, PARSE_ERROR};
use crate::mcp::server::handle_json_rpc_value;
use crate::mcp::session::SESSION_HEADER;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DiscoveryResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub mcp_endpoint: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn discovery() -> Json<DiscoveryResponse> {
    Json(DiscoveryResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        mcp_endpoint: MCP_PATH,
    })
}

fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn unknown_session(id: &str) -> AppError {
    AppError::not_found(
        "unknown_session",
        "unknown or closed session",
        json!({ "session_id": id }),
    )
}

fn is_initialize(payload: &Value) -> bool {
    payload.get("method").and_then(Value::as_str) == Some("initialize")
}

pub async fn mcp_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(id) = session_id(&headers) {
        if !state.sessions.contains(id) {
            return unknown_session(id).into_response();
        }
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(_) => {
            return (
                StatusCode::OK,
                Json(json_rpc_error(None, PARSE_ERROR, "Parse error")),
            )
                .into_response()
        }
    };

    if let Some(batch) = payload.as_array() {
        if batch.is_empty() {
            return (
                StatusCode::OK,
                Json(vec![json_rpc_error(None, INVALID_REQUEST, "Invalid Request")]),
            )
                .into_response();
        }

        let mut responses = Vec::new();
        for item in batch {
            if let Some(response) = handle_json_rpc_value(&state, item.clone()).await {
                responses.push(response);
            }
        }

        if responses.is_empty() {
            return StatusCode::NO_CONTENT.into_response();
        }

        return (StatusCode::OK, Json(Value::Array(responses))).into_response();
    }

    let opens_session = is_initialize(&payload) && session_id(&headers).is_none();
    match handle_json_rpc_value(&state, payload).await {
        Some(response) if opens_session && !is_json_rpc_error(&response) => {
            let id = state.sessions.open();
            info!(session_id = %id, "mcp session opened");
            let mut http_response = (StatusCode::OK, Json(response)).into_response();
            if let Ok(value) = HeaderValue::from_str(&id) {
                http_response.headers_mut().insert(SESSION_HEADER, value);
            }
            http_response
        }
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Ends the session named by the session header.
pub async fn close_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(id) = session_id(&headers) else {
        return AppError::bad_request("missing_session", "missing mcp-session-id header")
            .into_response();
    };

    if !state.sessions.close(id) {
        return unknown_session(id).into_response();
    }

    info!(session_id = %id, "mcp session closed");
    StatusCode::NO_CONTENT.into_response()
}

/// No server-initiated event stream is offered.
pub async fn event_stream() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST, DELETE")],
    )
        .into_response()
}
