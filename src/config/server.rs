//! Server configuration types.
//!
//! Address and port of the HTTP front. Default values are sourced from
//! `crate::constants`.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SERVER_ADDRESS, DEFAULT_SERVER_PORT};

fn default_address() -> String {
    DEFAULT_SERVER_ADDRESS.to_string()
}

fn default_port() -> u16 {
    DEFAULT_SERVER_PORT
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Socket address to bind, e.g. "0.0.0.0:8080"
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}
