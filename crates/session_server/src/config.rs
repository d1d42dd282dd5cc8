//! Server configuration types and defaults.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Configuration structure for the session server.
///
/// Contains the parameters needed to configure server behavior: network
/// binding and connection limits. There is deliberately no move clock or
/// per-connection timeout; a silent client simply never gets a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The socket address to bind the server to
    pub bind_address: SocketAddr,

    /// Maximum number of concurrent connections allowed
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080"
                .parse()
                .expect("Invalid default bind address"),
            max_connections: 64,
        }
    }
}
