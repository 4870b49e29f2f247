//! Order catalog and its Model Context Protocol surface
//!
//! Provides keyword search and id lookup over the record store, exposed as MCP tools
//! and resources.

pub mod catalog;
pub mod resources;
pub mod tools;
