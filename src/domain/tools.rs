//! Interactive tools exposed via Model Context Protocol
//!
//! Provides the `search` and `fetch` tools over the shared `RecordStore`.

use rust_mcp_sdk::{
    macros,
    schema::{CallToolRequestParams, CallToolResult, ContentBlock, TextContent, Tool},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::catalog::{fetch, search};
use crate::mcp::rpc::{
    app_error_to_json_rpc, json_rpc_error, json_rpc_error_with_data, to_result_value,
    INVALID_PARAMS, METHOD_NOT_FOUND,
};
use crate::{errors::AppError, AppState};

#[macros::mcp_tool(
    name = "search",
    description = "Search for cupcake orders – keyword match. Returns a page of matching orders."
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct SearchTool {
    pub query: String,
}

#[macros::mcp_tool(
    name = "fetch",
    description = "Fetch a cupcake order by ID. Returns every field of the order."
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct FetchTool {
    pub id: String,
}

pub fn build_tools_list() -> Vec<Tool> {
    vec![SearchTool::tool(), FetchTool::tool()]
}

fn structured_result<T: Serialize>(
    summary: String,
    payload: &T,
) -> Result<CallToolResult, AppError> {
    let structured_content = match serde_json::to_value(payload) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(err) => return Err(AppError::internal(err.to_string())),
    };

    Ok(CallToolResult {
        content: vec![ContentBlock::from(TextContent::new(summary, None, None))],
        is_error: None,
        meta: None,
        structured_content: Some(structured_content),
    })
}

pub async fn handle_tools_call(
    state: &AppState,
    id: Option<Value>,
    params: Option<Value>,
) -> Value {
    let Some(raw_params) = params else {
        return json_rpc_error(id, INVALID_PARAMS, "Invalid params");
    };

    let tool_call: CallToolRequestParams = match serde_json::from_value(raw_params) {
        Ok(value) => value,
        Err(_) => return json_rpc_error(id, INVALID_PARAMS, "Invalid params"),
    };
    let arguments = json!(tool_call.arguments.unwrap_or_default());

    let outcome = match tool_call.name.as_str() {
        "search" => {
            let Ok(args) = serde_json::from_value::<SearchTool>(arguments) else {
                return json_rpc_error(id, INVALID_PARAMS, "Invalid params");
            };

            let page = search(&state.store, &args.query);
            structured_result(format!("Found {} matching orders", page.results.len()), &page)
        }
        "fetch" => {
            let Ok(args) = serde_json::from_value::<FetchTool>(arguments) else {
                return json_rpc_error(id, INVALID_PARAMS, "Invalid params");
            };

            fetch(&state.store, &args.id).and_then(|order| {
                structured_result(format!("Order {}: {}", order.id, order.title), &order)
            })
        }
        _ => {
            return json_rpc_error_with_data(
                id,
                METHOD_NOT_FOUND,
                "Method not found",
                Some(json!({
                    "code": "tool_not_found",
                    "message": "unknown tool name",
                    "details": {
                        "name": tool_call.name,
                    },
                })),
            )
        }
    };

    match outcome {
        Ok(result) => to_result_value(id, &result),
        Err(err) => app_error_to_json_rpc(id, err),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::{Record, RecordStore};

    fn state() -> AppState {
        let store = RecordStore::from_records(vec![Record {
            id: "47".to_string(),
            title: "Chocolate Cupcake Order".to_string(),
            text: "Two dozen chocolate cupcakes".to_string(),
            url: None,
            metadata: Some([("flavor".to_string(), "chocolate".to_string())].into()),
        }])
        .expect("valid store");
        AppState::new(Arc::new(store))
    }

    #[test]
    fn lists_search_and_fetch() {
        let names = build_tools_list()
            .into_iter()
            .map(|tool| tool.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["search", "fetch"]);
    }

    #[tokio::test]
    async fn search_returns_structured_page() {
        let response = handle_tools_call(
            &state(),
            Some(json!(1)),
            Some(json!({ "name": "search", "arguments": { "query": "Cupcakes" } })),
        )
        .await;

        let results = &response["result"]["structuredContent"]["results"];
        assert_eq!(results[0]["id"], "47");
        assert_eq!(results[0]["title"], "Chocolate Cupcake Order");
        assert!(results[0].get("url").is_none());
    }

    #[tokio::test]
    async fn fetch_unknown_id_is_an_error() {
        let response = handle_tools_call(
            &state(),
            Some(json!(2)),
            Some(json!({ "name": "fetch", "arguments": { "id": "nonexistent" } })),
        )
        .await;

        assert!(response.get("result").is_none());
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
        assert_eq!(response["error"]["data"]["code"], "unknown_id");
    }

    #[tokio::test]
    async fn missing_argument_is_invalid_params() {
        let response = handle_tools_call(
            &state(),
            Some(json!(3)),
            Some(json!({ "name": "search", "arguments": {} })),
        )
        .await;

        assert_eq!(response["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn unknown_tool_is_method_not_found() {
        let response = handle_tools_call(
            &state(),
            Some(json!(4)),
            Some(json!({ "name": "delete", "arguments": {} })),
        )
        .await;

        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(response["error"]["data"]["details"]["name"], "delete");
    }
}
