//! Main application logic and lifecycle management.
//!
//! This module contains the core `Application` struct that orchestrates
//! server startup, signal handling, and graceful shutdown.

use crate::{
    cli::CliArgs,
    config::AppConfig,
    logging::display_banner,
    signals::{setup_signal_handlers, setup_signal_handlers_silent},
};
use session_server::{ChessServer, ShutdownState};
use tracing::{error, info, warn};

/// Main application struct.
///
/// The `Application` manages the complete lifecycle of the Kingside server:
/// configuration loading, server initialization, signal handling, and
/// graceful shutdown.
pub struct Application {
    /// Loaded application configuration
    config: AppConfig,
    /// Session server instance
    server: ChessServer,
}

impl Application {
    /// Creates a new application instance.
    ///
    /// Loads configuration, applies CLI overrides, validates settings, and
    /// initializes the session server.
    ///
    /// # Process
    ///
    /// 1. Load configuration from file (creating default if missing)
    /// 2. Apply command-line argument overrides
    /// 3. Validate merged configuration
    /// 4. Display startup banner
    /// 5. Initialize the session server
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        // Apply CLI overrides
        if let Some(bind_address) = args.bind_address {
            config.server.bind_address = bind_address;
        }

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        // Validate configuration
        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        }
        info!("✅ Configuration loaded and validated successfully");

        // Display banner after logging is setup
        display_banner();

        let server_config = config.to_server_config()?;
        let server = ChessServer::new(server_config);

        info!("🚀 Kingside Chess Server v1.0.0");
        info!("📂 Config: {}", args.config_path.display());

        Ok(Self { config, server })
    }

    /// Runs the application until a shutdown signal arrives.
    ///
    /// Starts the server in the background, waits for SIGINT/SIGTERM, then
    /// performs a graceful shutdown with a timeout. A second signal during
    /// shutdown exits immediately.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        info!("🌟 Starting Kingside Chess Server Application");

        self.log_configuration_summary();

        let config = self.config.clone();

        // Create shutdown state for coordinated shutdown
        let shutdown_state = ShutdownState::new();
        let shutdown_state_for_server = shutdown_state.clone();

        // Start server in background
        let server_handle = {
            let server = self.server;
            tokio::spawn(async move {
                match server.start_with_shutdown_state(shutdown_state_for_server).await {
                    Ok(()) => {
                        info!("✅ Server completed successfully");
                    }
                    Err(e) => {
                        error!("❌ Server error: {:?}", e);
                        std::process::exit(1);
                    }
                }
            })
        };

        // Display ready message
        info!("✅ Kingside Server is now running!");
        info!(
            "♟️ Ready to seat players on {}",
            config.server.bind_address
        );
        info!("🛑 Press Ctrl+C to gracefully shutdown");

        // Wait for shutdown signal
        let signal_shutdown_state = setup_signal_handlers().await?;

        // A second signal during shutdown exits without further ceremony
        tokio::spawn(async move {
            if let Err(e) = setup_signal_handlers_silent().await {
                error!("Failed to set up second shutdown signal handler: {e}");
                return;
            }

            warn!("Shutdown handler received again! I'll make this quick.");
            std::process::exit(1);
        });

        // Transfer shutdown state to our server's shutdown state
        if signal_shutdown_state.is_shutdown_initiated() {
            shutdown_state.initiate_shutdown();
        }

        info!("🛑 Shutdown signal received, beginning graceful shutdown...");

        // Stop the accept loop and wait for the server task to wind down
        server_handle.abort();
        info!("⏳ Waiting for server task to complete gracefully...");
        if let Err(e) =
            tokio::time::timeout(tokio::time::Duration::from_secs(8), server_handle).await
        {
            warn!(
                "⏰ Server task did not complete within timeout, proceeding with cleanup: {:?}",
                e
            );
        } else {
            info!("✅ Server task completed gracefully");
        }

        // Give time for connection cleanup
        info!("⏳ Waiting for connections to close...");
        tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;

        info!("✅ Kingside Chess Server shutdown complete");
        info!("👋 Thank you for using Kingside!");

        Ok(())
    }

    /// Logs the configuration summary at startup.
    fn log_configuration_summary(&self) {
        info!("📋 Configuration Summary:");
        info!("  🌐 Bind address: {}", self.config.server.bind_address);
        info!(
            "  👥 Max connections: {}",
            self.config.server.max_connections
        );
        info!("  📝 Log level: {}", self.config.logging.level);
    }
}
