//! Sequential demo run against the order server
//!
//! Opens a session, lists capabilities, runs one search and one fetch, and prints the
//! results. The session is closed whether or not the calls succeed.

use std::io::Write;

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{ClientError, Session};
use crate::domain::catalog::FetchResult;

pub const SEARCH_QUERY: &str = "cupcakes";
pub const FETCH_ID: &str = "47";

pub async fn run<W: Write>(endpoint: &str, out: &mut W) -> Result<(), ClientError> {
    let session = Session::open(endpoint).await?;
    let outcome = exercise(&session, out).await;

    let closed = session.close().await;
    if let (Err(_), Err(close_err)) = (&outcome, &closed) {
        warn!(error = %close_err, "failed to close session after error");
    }

    outcome.and(closed)
}

async fn exercise<W: Write>(session: &Session, out: &mut W) -> Result<(), ClientError> {
    session.ping().await?;

    let tools = session.list_tools().await?;
    let resources = session.list_resources().await?;
    let prompts = session.list_prompts().await?;
    debug!(
        tools = tools.len(),
        resources = resources.len(),
        prompts = prompts.len(),
        "server capabilities listed"
    );

    writeln!(out, "=============")?;
    let page = session.search(SEARCH_QUERY).await?;
    for result in &page.results {
        writeln!(out, "- {} {}", result.id, result.title)?;
    }

    let order = session.fetch(FETCH_ID).await?;
    for (field, value) in order_fields(&order) {
        writeln!(out, "- {field}: {value}")?;
    }
    writeln!(out, "result: {}", order.title)?;

    Ok(())
}

/// Every field of an order in declaration order; absent optionals render as `null`.
pub fn order_fields(order: &FetchResult) -> Vec<(&'static str, String)> {
    let metadata = order
        .metadata
        .as_ref()
        .and_then(|metadata| serde_json::to_value(metadata).ok())
        .unwrap_or(Value::Null);

    vec![
        ("id", order.id.clone()),
        ("title", order.title.clone()),
        ("text", order.text.clone()),
        ("url", order.url.clone().unwrap_or_else(|| "null".to_string())),
        ("metadata", metadata.to_string()),
    ]
}

/// Prints a failed run as a single message; the caller exits normally either way.
pub fn report<W: Write>(outcome: Result<(), ClientError>, out: &mut W) {
    if let Err(err) = outcome {
        if writeln!(out, "Connection failed: {err}").is_err() {
            warn!(error = %err, "connection failed");
        }
    }
}
