//! Utility functions and helper methods for the session server.

use crate::{config::ServerConfig, server::ChessServer};

/// Creates a new session server with default configuration.
///
/// This is a convenience function for quickly setting up a server
/// with sensible defaults for development and testing.
///
/// # Example
///
/// ```rust
/// use session_server::create_server;
///
/// let server = create_server();
/// ```
pub fn create_server() -> ChessServer {
    ChessServer::new(ServerConfig::default())
}

/// Creates a new session server with custom configuration.
///
/// # Example
///
/// ```rust
/// use session_server::{create_server_with_config, ServerConfig};
///
/// let config = ServerConfig {
///     bind_address: "0.0.0.0:9000".parse().unwrap(),
///     ..Default::default()
/// };
///
/// let server = create_server_with_config(config);
/// ```
pub fn create_server_with_config(config: ServerConfig) -> ChessServer {
    ChessServer::new(config)
}
