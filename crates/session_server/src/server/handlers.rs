//! Connection handling logic for WebSocket clients.
//!
//! This module contains the core connection handling logic that manages
//! the lifecycle of individual client connections, including WebSocket
//! handshaking, message processing, and cleanup.

use crate::{
    connection::ConnectionManager, error::ServerError, game::GameCoordinator,
    messaging::route_client_message,
};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, trace};

/// Handles a single client connection from establishment to cleanup.
///
/// # Connection Flow
///
/// 1. Perform WebSocket handshake
/// 2. Register connection with the connection manager
/// 3. Subscribe to outgoing messages, then let the coordinator assign a
///    role and notify the client (subscription first, so the role event is
///    not missed)
/// 4. Run the incoming and outgoing tasks until the connection ends
/// 5. Release the seat and remove the connection
///
/// # Message Handling
///
/// The function runs two concurrent tasks:
///
/// * **Incoming task**: routes text frames to the session, answers pings,
///   stops on close or error
/// * **Outgoing task**: drains the broadcast channel for messages addressed
///   to this connection and writes them to the socket
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    connection_manager: Arc<ConnectionManager>,
    coordinator: Arc<GameCoordinator>,
) -> Result<(), ServerError> {
    // Perform WebSocket handshake
    let ws_stream = accept_async(stream)
        .await
        .map_err(|e| ServerError::Network(format!("WebSocket handshake failed: {e}")))?;

    let (ws_sender, mut ws_receiver) = ws_stream.split();
    let ws_sender = Arc::new(tokio::sync::Mutex::new(ws_sender));
    let connection_id = connection_manager.add_connection(addr).await;

    // Subscribe before seat assignment: the role event is queued on this
    // channel and must not be emitted before anyone is listening.
    let mut message_receiver = connection_manager.subscribe();

    coordinator.register_connection(connection_id).await;

    let ws_sender_incoming = ws_sender.clone();
    let ws_sender_outgoing = ws_sender.clone();

    // Incoming message task - routes raw frames to the session
    let incoming_task = {
        let coordinator = coordinator.clone();

        async move {
            while let Some(msg) = ws_receiver.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if let Err(e) =
                            route_client_message(&text, connection_id, &coordinator).await
                        {
                            trace!("❌ Message routing error: {}", e);
                        }
                    }
                    Ok(Message::Close(_)) => {
                        debug!("🔌 Client {} requested close", connection_id);
                        break;
                    }
                    Ok(Message::Ping(data)) => {
                        let mut ws_sender = ws_sender_incoming.lock().await;
                        let _ = ws_sender.send(Message::Pong(data)).await;
                    }
                    Err(e) => {
                        error!("WebSocket error for connection {}: {}", connection_id, e);
                        break;
                    }
                    _ => {}
                }
            }
        }
    };

    // Outgoing message task
    let outgoing_task = {
        let ws_sender = ws_sender_outgoing;
        async move {
            while let Ok((target_connection_id, message)) = message_receiver.recv().await {
                if target_connection_id == connection_id {
                    let message_text = String::from_utf8_lossy(&message);
                    let mut ws_sender = ws_sender.lock().await;
                    if let Err(e) = ws_sender
                        .send(Message::Text(message_text.to_string().into()))
                        .await
                    {
                        error!("Failed to send message: {}", e);
                        break;
                    }
                }
            }
        }
    };

    // Run both tasks concurrently until one completes
    tokio::select! {
        _ = incoming_task => {},
        _ = outgoing_task => {},
    }

    // Free the seat (if any) for the next new connection, then drop the
    // connection itself. Remaining participants are not notified.
    coordinator.release_connection(connection_id).await;
    connection_manager.remove_connection(connection_id).await;
    Ok(())
}
