//! Model Context Protocol client over streamable HTTP
//!
//! A `Session` performs the `initialize` handshake on open, issues one JSON-RPC call at a
//! time, and releases its server session on `close`.

pub mod driver;

use std::sync::atomic::{AtomicI64, Ordering};

use reqwest::header::ACCEPT;
use rust_mcp_sdk::schema::{
    CallToolResult, ListPromptsResult, ListResourcesResult, ListToolsResult, Prompt, Resource,
    Tool,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::catalog::{FetchResult, SearchResultPage};
use crate::mcp::{server::SUPPORTED_PROTOCOL_VERSION, session::SESSION_HEADER};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("remote error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("tool {name} failed: {message}")]
    Tool { name: String, message: String },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("malformed response: missing result")]
    MissingResult,
    #[error("tool {0} returned no structured content")]
    MissingStructuredContent(String),
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

pub struct Session {
    http: reqwest::Client,
    endpoint: String,
    session_id: Option<String>,
    next_id: AtomicI64,
}

impl Session {
    pub async fn open(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        let mut session = Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            session_id: None,
            next_id: AtomicI64::new(1),
        };

        let initialize = session.envelope(
            "initialize",
            json!({
                "protocolVersion": SUPPORTED_PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        );
        let response = session.post(&initialize).await?;
        let session_id = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let result = decode_response(response.json::<Value>().await?)?;
        session.session_id = session_id;

        debug!(
            endpoint = %session.endpoint,
            session_id = session.session_id.as_deref().unwrap_or("-"),
            server = %result["serverInfo"]["name"],
            "mcp session initialized"
        );

        if let Err(err) = session.notify("notifications/initialized").await {
            if let Err(close_err) = session.close().await {
                warn!(error = %close_err, "failed to close session after handshake error");
            }
            return Err(err);
        }

        Ok(session)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        self.request("ping", json!({})).await.map(|_| ())
    }

    pub async fn list_tools(&self) -> Result<Vec<Tool>, ClientError> {
        let result: ListToolsResult = self.request_as("tools/list", json!({})).await?;
        Ok(result.tools)
    }

    pub async fn list_resources(&self) -> Result<Vec<Resource>, ClientError> {
        let result: ListResourcesResult = self.request_as("resources/list", json!({})).await?;
        Ok(result.resources)
    }

    pub async fn list_prompts(&self) -> Result<Vec<Prompt>, ClientError> {
        let result: ListPromptsResult = self.request_as("prompts/list", json!({})).await?;
        Ok(result.prompts)
    }

    /// A result flagged `isError` is surfaced as `ClientError::Tool`.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<CallToolResult, ClientError> {
        let result = self
            .request("tools/call", json!({ "name": name, "arguments": arguments }))
            .await?;

        if result.get("isError").and_then(Value::as_bool) == Some(true) {
            return Err(ClientError::Tool {
                name: name.to_string(),
                message: text_content(&result),
            });
        }

        Ok(serde_json::from_value(result)?)
    }

    pub async fn search(&self, query: &str) -> Result<SearchResultPage, ClientError> {
        self.call_structured("search", json!({ "query": query })).await
    }

    pub async fn fetch(&self, id: &str) -> Result<FetchResult, ClientError> {
        self.call_structured("fetch", json!({ "id": id })).await
    }

    /// Ends the server-side session. Sessions opened against a stateless server have
    /// nothing to release.
    pub async fn close(self) -> Result<(), ClientError> {
        let Some(session_id) = self.session_id.as_deref() else {
            return Ok(());
        };

        let response = self
            .http
            .delete(&self.endpoint)
            .header(SESSION_HEADER, session_id)
            .send()
            .await?;
        check_status(response).await?;

        debug!(session_id = %session_id, "mcp session closed");
        Ok(())
    }

    async fn call_structured<T: DeserializeOwned>(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<T, ClientError> {
        let result = self.call_tool(name, arguments).await?;
        let content = result
            .structured_content
            .ok_or_else(|| ClientError::MissingStructuredContent(name.to_string()))?;

        Ok(serde_json::from_value(Value::Object(content))?)
    }

    async fn request_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, ClientError> {
        let result = self.request(method, params).await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let message = self.envelope(method, params);
        let response = self.post(&message).await?;
        decode_response(response.json::<Value>().await?)
    }

    async fn notify(&self, method: &str) -> Result<(), ClientError> {
        let message = json!({ "jsonrpc": "2.0", "method": method });
        self.post(&message).await.map(|_| ())
    }

    fn envelope(&self, method: &str, params: Value) -> Value {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        })
    }

    async fn post(&self, message: &Value) -> Result<reqwest::Response, ClientError> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .header(ACCEPT, "application/json, text/event-stream")
            .json(message);
        if let Some(session_id) = &self.session_id {
            request = request.header(SESSION_HEADER, session_id);
        }

        check_status(request.send().await?).await
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Extracts `result` from a JSON-RPC response, turning an `error` member into
/// `ClientError::Rpc`. The structured `data.message` wins over the generic message.
pub fn decode_response(mut response: Value) -> Result<Value, ClientError> {
    if let Some(error) = response.get("error") {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = error
            .get("data")
            .and_then(|data| data.get("message"))
            .or_else(|| error.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(ClientError::Rpc { code, message });
    }

    match response.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(ClientError::MissingResult),
    }
}

fn text_content(result: &Value) -> String {
    result
        .get("content")
        .and_then(Value::as_array)
        .map(|blocks| {
            blocks
                .iter()
                .filter_map(|block| block.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}
