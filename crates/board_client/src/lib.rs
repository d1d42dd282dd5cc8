//! Client-side state for the chess session.
//!
//! The server is the source of truth; a client only mirrors it. This crate
//! holds the reconciliation algorithm — a local board projection updated
//! from broadcast moves and authoritative snapshots — and a terminal client
//! binary that exercises it against a running server.

pub mod projection;

pub use projection::BoardProjection;
