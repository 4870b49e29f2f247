//! JSON-RPC envelopes and error mapping
//!
//! Builds response payloads with the `rust-mcp-sdk` schema types and maps `AppError`
//! onto JSON-RPC error objects.

use rust_mcp_sdk::schema::{
    JsonrpcErrorResponse, JsonrpcResultResponse, RequestId, Result as McpResult, RpcError,
};
use serde_json::{json, Value};

use crate::errors::AppError;

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

pub fn is_json_rpc_error(value: &Value) -> bool {
    value.get("error").is_some()
}

pub fn app_error_to_json_rpc(id: Option<Value>, err: AppError) -> Value {
    match err {
        AppError::BadRequest { code, message } => json_rpc_error_with_data(
            id,
            INVALID_PARAMS,
            "Invalid params",
            Some(json!({
                "code": code,
                "message": message,
                "details": {}
            })),
        ),
        AppError::NotFound {
            code,
            message,
            details,
        } => json_rpc_error_with_data(
            id,
            INVALID_PARAMS,
            "Invalid params",
            Some(json!({
                "code": code,
                "message": message,
                "details": details
            })),
        ),
        AppError::Internal { message, .. } => {
            tracing::error!(error = %message, "mcp call failed with internal error");
            json_rpc_error(id, INTERNAL_ERROR, "Internal error")
        }
    }
}

pub fn json_rpc_error(id: Option<Value>, code: i32, message: &str) -> Value {
    json_rpc_error_with_data(id, code, message, None)
}

pub fn json_rpc_error_with_data(
    id: Option<Value>,
    code: i32,
    message: &str,
    data: Option<Value>,
) -> Value {
    let error = RpcError {
        code: i64::from(code),
        data,
        message: message.to_string(),
    };

    match id.as_ref().and_then(value_to_request_id) {
        Some(request_id) => {
            let response = JsonrpcErrorResponse::new(error, Some(request_id));
            serde_json::to_value(response).unwrap_or_else(|_| fallback_error(id, code, message))
        }
        None => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": error
        }),
    }
}

pub fn json_rpc_result(id: Option<Value>, result: Value) -> Value {
    if let Some(request_id) = id.as_ref().and_then(value_to_request_id) {
        let extra = result.as_object().cloned();
        let response = JsonrpcResultResponse::new(request_id, McpResult { meta: None, extra });
        if let Ok(value) = serde_json::to_value(response) {
            return value;
        }
    }

    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

/// Serializes a schema value for a result payload, mapping failures to an internal error.
pub fn to_result_value<T: serde::Serialize>(id: Option<Value>, value: &T) -> Value {
    match serde_json::to_value(value) {
        Ok(result) => json_rpc_result(id, result),
        Err(err) => app_error_to_json_rpc(id, AppError::internal(err.to_string())),
    }
}

pub fn value_to_request_id(value: &Value) -> Option<RequestId> {
    if let Some(string_id) = value.as_str() {
        return Some(RequestId::String(string_id.to_string()));
    }

    value.as_i64().map(RequestId::Integer)
}

pub fn request_id_to_value(id: RequestId) -> Value {
    match id {
        RequestId::String(value) => Value::String(value),
        RequestId::Integer(value) => Value::Number(value.into()),
    }
}

fn fallback_error(id: Option<Value>, code: i32, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_invalid_params_with_details() {
        let value = app_error_to_json_rpc(
            Some(json!(4)),
            AppError::not_found("unknown_id", "unknown id", json!({ "id": "x" })),
        );

        assert_eq!(value["id"], 4);
        assert_eq!(value["error"]["code"], INVALID_PARAMS);
        assert_eq!(value["error"]["data"]["code"], "unknown_id");
        assert_eq!(value["error"]["data"]["message"], "unknown id");
        assert_eq!(value["error"]["data"]["details"]["id"], "x");
    }

    #[test]
    fn internal_error_hides_message() {
        let value = app_error_to_json_rpc(Some(json!("a")), AppError::internal("boom"));

        assert_eq!(value["id"], "a");
        assert_eq!(value["error"]["code"], INTERNAL_ERROR);
        assert!(value["error"].get("data").map_or(true, Value::is_null));
    }

    #[test]
    fn error_without_id_keeps_null_id() {
        let value = json_rpc_error(None, PARSE_ERROR, "Parse error");

        assert!(value["id"].is_null());
        assert_eq!(value["error"]["code"], PARSE_ERROR);
    }

    #[test]
    fn result_wraps_payload() {
        let value = json_rpc_result(Some(json!(9)), json!({ "tools": [] }));

        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 9);
        assert!(value["result"]["tools"].is_array());
    }
}
