//! Core daemon process — startup, shutdown, and task wiring.
//!
//! The daemon owns two tasks: the notification-socket acceptor and the
//! overlay session. Decoded events flow from the acceptor to the session
//! by ownership transfer over an mpsc channel, so all session and
//! presenter state is mutated from exactly one task.

use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use volhud_config::AppConfig;

use crate::ipc::server::{self, ServerError};
use crate::presenter::Presenter;
use crate::session::{run_session, OverlaySession, Timings};
use crate::wire::WireFormat;

/// Shutdown signal sent via broadcast channel.
#[derive(Debug, Clone)]
pub struct ShutdownSignal;

/// The volhud daemon.
pub struct Daemon {
    config: AppConfig,
    shutdown_tx: broadcast::Sender<ShutdownSignal>,
    _shutdown_rx: broadcast::Receiver<ShutdownSignal>,
}

impl Daemon {
    /// Create a new daemon instance with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);
        Self {
            config,
            shutdown_tx,
            _shutdown_rx,
        }
    }

    /// Run the daemon until a shutdown signal or Ctrl-C is received.
    ///
    /// Fatal socket-setup failures (bind, listen) terminate the daemon
    /// with an error; everything after startup is resilient to bad
    /// client input.
    pub async fn run<P: Presenter + 'static>(&self, presenter: P) -> Result<(), DaemonError> {
        let socket_path = self.config.resolve_socket_path();
        let format = WireFormat::from_config(&self.config.wire.format).ok_or_else(|| {
            DaemonError::Startup(format!("unknown wire format {:?}", self.config.wire.format))
        })?;

        info!(
            path = %socket_path.display(),
            format = %format.as_str(),
            "volhud daemon starting"
        );

        let (event_tx, event_rx) = mpsc::channel(64);

        let session = OverlaySession::new(presenter, Timings::from_config(&self.config.overlay));
        let session_task = tokio::spawn(run_session(
            session,
            event_rx,
            self.shutdown_tx.subscribe(),
        ));

        let server_shutdown = self.shutdown_tx.subscribe();
        let mut server_task = tokio::spawn(async move {
            server::serve(&socket_path, format, event_tx, server_shutdown).await
        });

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let server_result = tokio::select! {
            res = &mut server_task => res,
            _ = shutdown_rx.recv() => server_task.await,
            _ = tokio::signal::ctrl_c() => {
                warn!("Ctrl-C received, initiating graceful shutdown");
                let _ = self.shutdown_tx.send(ShutdownSignal);
                server_task.await
            }
        };
        server_result.map_err(|e| DaemonError::Startup(format!("server task failed: {e}")))??;

        session_task
            .await
            .map_err(|e| DaemonError::Startup(format!("session task failed: {e}")))?;

        info!("Daemon stopped");
        Ok(())
    }

    /// Request a graceful shutdown of the daemon.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(ShutdownSignal);
    }

    /// Subscribe to the daemon's shutdown channel.
    pub fn shutdown_subscriber(&self) -> broadcast::Receiver<ShutdownSignal> {
        self.shutdown_tx.subscribe()
    }

    /// Get a reference to the daemon's configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Errors from the daemon runtime.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("daemon startup failed: {0}")]
    Startup(String),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
