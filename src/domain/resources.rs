//! Model Context Protocol static resource providers
//!
//! Exposes the loaded order records as a single JSON resource.

use rust_mcp_sdk::schema::{
    ReadResourceContent, ReadResourceRequestParams, ReadResourceResult, Resource,
    TextResourceContents,
};
use serde_json::{json, Value};

use crate::mcp::rpc::{
    app_error_to_json_rpc, json_rpc_error, json_rpc_error_with_data, to_result_value,
    INVALID_PARAMS, METHOD_NOT_FOUND,
};
use crate::{errors::AppError, AppState};

pub const RECORDS_RESOURCE_URI: &str = "resource://records/all";

pub fn build_resources_list() -> Vec<Resource> {
    vec![Resource {
        annotations: None,
        description: Some("All cupcake order records loaded at startup".to_string()),
        icons: vec![],
        meta: None,
        mime_type: Some("application/json".to_string()),
        name: "Order Records".to_string(),
        size: None,
        title: None,
        uri: RECORDS_RESOURCE_URI.to_string(),
    }]
}

pub async fn handle_resources_read(
    state: &AppState,
    id: Option<Value>,
    params: Option<Value>,
) -> Value {
    let Some(raw_params) = params else {
        return json_rpc_error(id, INVALID_PARAMS, "Invalid params");
    };

    let resource_read: ReadResourceRequestParams = match serde_json::from_value(raw_params) {
        Ok(value) => value,
        Err(_) => return json_rpc_error(id, INVALID_PARAMS, "Invalid params"),
    };

    match resource_read.uri.as_str() {
        RECORDS_RESOURCE_URI => {
            let text = match serde_json::to_string(&json!({ "records": state.store.records() }))
            {
                Ok(text) => text,
                Err(err) => return app_error_to_json_rpc(id, AppError::internal(err.to_string())),
            };

            let result = ReadResourceResult {
                contents: vec![ReadResourceContent::from(TextResourceContents {
                    meta: None,
                    mime_type: Some("application/json".to_string()),
                    text,
                    uri: RECORDS_RESOURCE_URI.to_string(),
                })],
                meta: None,
            };

            to_result_value(id, &result)
        }
        _ => json_rpc_error_with_data(
            id,
            METHOD_NOT_FOUND,
            "Method not found",
            Some(json!({
                "code": "resource_not_found",
                "message": "unknown resource uri",
                "details": {
                    "uri": resource_read.uri,
                },
            })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::{Record, RecordStore};

    fn state() -> AppState {
        let store = RecordStore::from_records(vec![Record {
            id: "31".to_string(),
            title: "Lemon Drizzle Sampler".to_string(),
            text: "Six lemon cupcakes".to_string(),
            url: None,
            metadata: None,
        }])
        .expect("valid store");
        AppState::new(Arc::new(store))
    }

    #[tokio::test]
    async fn reads_all_records_as_json_text() {
        let response = handle_resources_read(
            &state(),
            Some(json!(1)),
            Some(json!({ "uri": RECORDS_RESOURCE_URI })),
        )
        .await;

        let contents = &response["result"]["contents"][0];
        assert_eq!(contents["uri"], RECORDS_RESOURCE_URI);
        let body: Value =
            serde_json::from_str(contents["text"].as_str().expect("text content")).expect("json");
        assert_eq!(body["records"][0]["id"], "31");
    }

    #[tokio::test]
    async fn unknown_uri_is_method_not_found() {
        let response = handle_resources_read(
            &state(),
            Some(json!(2)),
            Some(json!({ "uri": "resource://records/missing" })),
        )
        .await;

        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(response["error"]["data"]["code"], "resource_not_found");
    }
}
