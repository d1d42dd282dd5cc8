//! Client connection representation.

use std::net::SocketAddr;
use std::time::SystemTime;

/// Represents an individual client connection to the server.
///
/// Tracks the essential information about a connected client. Seat bindings
/// are not stored here; they live in the session registry, keyed by
/// connection ID.
#[derive(Debug)]
pub struct ClientConnection {
    /// The remote network address of the client
    pub remote_addr: SocketAddr,

    /// When this connection was established
    pub connected_at: SystemTime,
}

impl ClientConnection {
    /// Creates a new client connection with the specified remote address.
    pub fn new(remote_addr: SocketAddr) -> Self {
        Self {
            remote_addr,
            connected_at: SystemTime::now(),
        }
    }
}
