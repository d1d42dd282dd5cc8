//! Core session server implementation.
//!
//! This module contains the main `ChessServer` struct and its
//! implementation, providing the central orchestration of all server
//! components: the connection manager, the game coordinator, and the
//! accept loop.

use crate::{
    config::ServerConfig,
    connection::ConnectionManager,
    error::ServerError,
    game::GameCoordinator,
    server::{handlers::handle_connection, shutdown::ShutdownState},
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// The core session server structure.
///
/// `ChessServer` hosts exactly one game session for its lifetime. It binds
/// the listener, accepts WebSocket connections, and hands each one to a
/// connection handler wired to the shared coordinator. All game semantics
/// (seat assignment, move gating, rules validation, broadcasting) live in
/// the coordinator; this type is infrastructure only.
pub struct ChessServer {
    /// Server configuration settings
    config: ServerConfig,

    /// Manager for client connections and event delivery
    connection_manager: Arc<ConnectionManager>,

    /// The single game session coordinator
    coordinator: Arc<GameCoordinator>,

    /// Channel for coordinating server shutdown
    shutdown_sender: broadcast::Sender<()>,
}

impl ChessServer {
    /// Creates a new session server with the specified configuration.
    ///
    /// Initializes the connection manager and a coordinator holding a fresh
    /// game at the starting position. The server is ready to start after
    /// construction.
    pub fn new(config: ServerConfig) -> Self {
        let connection_manager = Arc::new(ConnectionManager::new());
        let coordinator = Arc::new(GameCoordinator::new(connection_manager.clone()));
        let (shutdown_sender, _) = broadcast::channel(1);

        Self {
            config,
            connection_manager,
            coordinator,
            shutdown_sender,
        }
    }

    /// Starts the server and begins accepting connections with graceful
    /// shutdown support.
    ///
    /// Runs until the provided shutdown state is initiated or an internal
    /// shutdown signal is received.
    pub async fn start_with_shutdown_state(
        &self,
        shutdown_state: ShutdownState,
    ) -> Result<(), ServerError> {
        self.start_internal(Some(shutdown_state)).await
    }

    /// Starts the server and begins accepting connections.
    ///
    /// Runs until [`shutdown`](ChessServer::shutdown) is called.
    pub async fn start(&self) -> Result<(), ServerError> {
        self.start_internal(None).await
    }

    /// Internal method for starting the server with optional shutdown state.
    async fn start_internal(&self, shutdown_state: Option<ShutdownState>) -> Result<(), ServerError> {
        info!("🚀 Starting chess session server on {}", self.config.bind_address);

        let listener = tokio::net::TcpListener::bind(self.config.bind_address)
            .await
            .map_err(|e| ServerError::Network(format!("Failed to bind listener: {e}")))?;
        info!("✅ Listener bound on {}", self.config.bind_address);

        let mut shutdown_receiver = self.shutdown_sender.subscribe();

        let accept_loop = {
            let connection_manager = self.connection_manager.clone();
            let coordinator = self.coordinator.clone();
            let max_connections = self.config.max_connections;

            async move {
                loop {
                    // Check if shutdown has been initiated
                    if let Some(ref shutdown_state) = shutdown_state {
                        if shutdown_state.is_shutdown_initiated() {
                            info!("🛑 Accept loop stopping - shutdown initiated");
                            break;
                        }
                    }

                    match listener.accept().await {
                        Ok((stream, addr)) => {
                            if connection_manager.connection_count().await >= max_connections {
                                warn!("Refusing connection from {}: server full", addr);
                                drop(stream);
                                continue;
                            }

                            let connection_manager = connection_manager.clone();
                            let coordinator = coordinator.clone();

                            // Spawn individual connection handler
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(
                                    stream,
                                    addr,
                                    connection_manager,
                                    coordinator,
                                )
                                .await
                                {
                                    error!("Connection error: {:?}", e);
                                }
                            });
                        }
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                            break;
                        }
                    }
                }
            }
        };

        // Run until shutdown is initiated or internal shutdown signal
        tokio::select! {
            _ = accept_loop => {}
            _ = shutdown_receiver.recv() => {
                info!("Internal shutdown signal received");
            }
        }

        info!("Server stopped");
        Ok(())
    }

    /// Initiates server shutdown.
    ///
    /// Signals the accept loop to stop taking new connections.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        info!("🛑 Shutting down server...");
        let _ = self.shutdown_sender.send(());
        Ok(())
    }

    /// Gets a reference to the connection manager.
    pub fn connection_manager(&self) -> Arc<ConnectionManager> {
        self.connection_manager.clone()
    }

    /// Gets a reference to the game coordinator.
    pub fn coordinator(&self) -> Arc<GameCoordinator> {
        self.coordinator.clone()
    }
}
