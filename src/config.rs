//! Fixed server configuration
//!
//! Host, port, and records file location for the local order server.

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::http::MCP_PATH;

pub const BIND_ADDR: &str = "127.0.0.1";
pub const BIND_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub bind_port: u16,
    pub records_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Config {
    /// Fixed local configuration; nothing is read from flags or the environment.
    pub fn new() -> Result<Self, ConfigError> {
        let config = Self {
            bind_addr: BIND_ADDR.to_string(),
            bind_port: BIND_PORT,
            records_path: Path::new(env!("CARGO_MANIFEST_DIR"))
                .join("data")
                .join("records.json"),
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }

    pub fn endpoint_url(&self) -> String {
        format!("http://{}:{}{}", self.bind_addr, self.bind_port, MCP_PATH)
    }
}
