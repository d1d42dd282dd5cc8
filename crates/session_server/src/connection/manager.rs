//! Connection manager for tracking and managing client connections.
//!
//! This module provides the central management system for all client
//! connections, handling connection lifecycle and event delivery. It is the
//! broadcaster of the session: unicast goes to exactly one connection,
//! broadcast fans out to every live connection.

use super::{client::ClientConnection, ConnectionId};
use session_protocol::ServerEvent;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::info;

/// Central manager for all client connections.
///
/// The `ConnectionManager` tracks active connections, assigns unique IDs,
/// and provides unicast and broadcast delivery. It uses async-safe data
/// structures to handle concurrent access from multiple connection handlers.
///
/// # Architecture
///
/// * Uses `RwLock<HashMap>` for thread-safe connection storage
/// * Implements atomic connection ID generation
/// * Provides a broadcast channel for outgoing messages; each connection
///   handler subscribes and drains messages addressed to its connection
#[derive(Debug)]
pub struct ConnectionManager {
    /// Map of connection ID to client connection information
    connections: Arc<RwLock<HashMap<ConnectionId, ClientConnection>>>,

    /// Atomic counter for generating unique connection IDs
    next_id: Arc<std::sync::atomic::AtomicUsize>,

    /// Broadcast sender for outgoing messages to specific connections
    sender: broadcast::Sender<(ConnectionId, Vec<u8>)>,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    ///
    /// Initializes the internal data structures and broadcast channel with
    /// a reasonable buffer size for message queuing.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1000);
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(std::sync::atomic::AtomicUsize::new(1)),
            sender,
        }
    }

    /// Adds a new connection and returns its unique ID.
    pub async fn add_connection(&self, remote_addr: SocketAddr) -> ConnectionId {
        let connection_id = self
            .next_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let connection = ClientConnection::new(remote_addr);
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, connection);
        info!("🔗 Connection {} from {}", connection_id, remote_addr);
        connection_id
    }

    /// Removes a connection from the manager.
    ///
    /// This should be called when a client disconnects. Seat release is the
    /// coordinator's job and happens separately.
    pub async fn remove_connection(&self, connection_id: ConnectionId) {
        let mut connections = self.connections.write().await;
        if let Some(connection) = connections.remove(&connection_id) {
            info!(
                "❌ Connection {} from {} disconnected",
                connection_id, connection.remote_addr
            );
        }
    }

    /// The number of currently tracked connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Sends raw bytes to a specific connection.
    ///
    /// Queues the message for delivery through the internal broadcast
    /// channel; the connection's outgoing task picks it up.
    pub async fn send_to_connection(&self, connection_id: ConnectionId, message: Vec<u8>) {
        if let Err(e) = self.sender.send((connection_id, message)) {
            tracing::error!(
                "Failed to send message to connection {}: {:?}",
                connection_id,
                e
            );
        }
    }

    /// Broadcasts raw bytes to all currently connected clients.
    ///
    /// # Returns
    ///
    /// The number of connections that the message was queued for.
    pub async fn broadcast_to_all(&self, message: Vec<u8>) -> usize {
        let connections = self.connections.read().await;
        let connection_count = connections.len();

        for &connection_id in connections.keys() {
            if let Err(e) = self.sender.send((connection_id, message.clone())) {
                tracing::error!(
                    "Failed to broadcast message to connection {}: {:?}",
                    connection_id,
                    e
                );
            }
        }

        tracing::debug!("📡 Broadcasted message to {} connections", connection_count);
        connection_count
    }

    /// Sends a protocol event to a specific connection.
    pub async fn send_event(&self, connection_id: ConnectionId, event: &ServerEvent) {
        match serde_json::to_vec(event) {
            Ok(bytes) => self.send_to_connection(connection_id, bytes).await,
            Err(e) => tracing::error!("Failed to serialize event: {}", e),
        }
    }

    /// Broadcasts a protocol event to all currently connected clients.
    ///
    /// # Returns
    ///
    /// The number of connections that the event was queued for.
    pub async fn broadcast_event(&self, event: &ServerEvent) -> usize {
        match serde_json::to_vec(event) {
            Ok(bytes) => self.broadcast_to_all(bytes).await,
            Err(e) => {
                tracing::error!("Failed to serialize event: {}", e);
                0
            }
        }
    }

    /// Creates a new receiver for outgoing messages.
    ///
    /// Each connection handler should call this to get a receiver for
    /// messages targeted to their specific connection. Subscribe before
    /// triggering any event addressed to the connection; messages sent
    /// before subscribing are not observed.
    pub fn subscribe(&self) -> broadcast::Receiver<(ConnectionId, Vec<u8>)> {
        self.sender.subscribe()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
