//! Message routing logic for dispatching client messages to the session.
//!
//! This module handles the parsing and routing of incoming client frames.
//! Frames that do not parse as a known client event never reach the
//! session; the error is surfaced to the connection handler, which logs and
//! drops it.

use crate::{connection::ConnectionId, error::ServerError, game::GameCoordinator};
use session_protocol::ClientEvent;
use tracing::debug;

/// Routes a raw client frame to the game coordinator.
///
/// # Arguments
///
/// * `text` - The raw message text from the client (expected to be JSON)
/// * `connection_id` - The unique identifier for the client connection
/// * `coordinator` - The session coordinator that processes submissions
///
/// # Returns
///
/// `Ok(())` if the message was successfully routed, or a `ServerError` if
/// parsing failed.
///
/// # Example Message Format
///
/// ```json
/// {
///   "event": "move",
///   "data": { "from": "e2", "to": "e4", "promotion": "q" }
/// }
/// ```
pub async fn route_client_message(
    text: &str,
    connection_id: ConnectionId,
    coordinator: &GameCoordinator,
) -> Result<(), ServerError> {
    let message: ClientEvent =
        serde_json::from_str(text).map_err(|e| ServerError::Network(format!("Invalid JSON: {e}")))?;

    match message {
        ClientEvent::Move(request) => {
            debug!(
                "📨 Routing move {}{} from connection {}",
                request.from, request.to, connection_id
            );
            coordinator.submit_move(connection_id, request).await;
        }
    }

    Ok(())
}
