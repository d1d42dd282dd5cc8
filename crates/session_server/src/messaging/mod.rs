//! Inbound message routing from client connections to the session core.

mod router;

pub use router::route_client_message;
