//! HTTP Transport layer for the Model Context Protocol
//!
//! Provides the external API routing, including the `/mcp` endpoint and metadata endpoints.

pub mod handlers;

pub const MCP_PATH: &str = "/mcp";
