//! Daemon test harness.
//!
//! Spins up a full [`Daemon`] on a temporary socket with a
//! [`RecordingPresenter`] attached, for end-to-end tests that drive the
//! real transport.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::task::JoinHandle;

use volhud_config::AppConfig;
use volhud_core::daemon::{Daemon, DaemonError};
use volhud_core::ipc::client::NotifyClient;
use volhud_core::wire::WireFormat;

use crate::presenter::RecordingPresenter;

/// A test-scoped daemon bound to a socket in an owned temp directory.
///
/// The temp directory is deleted automatically when this value is
/// dropped, guaranteeing cleanup even on panic. Note that a
/// `VOLUME_OVERLAY_SOCKET` environment override in the test process
/// would defeat the temp socket path.
pub struct TestDaemon {
    pub daemon: Arc<Daemon>,
    pub socket_path: PathBuf,
    pub recorder: RecordingPresenter,
    handle: JoinHandle<Result<(), DaemonError>>,
    _temp_dir: TempDir,
}

impl TestDaemon {
    /// Start a daemon with default config on a fresh temp socket.
    pub async fn start() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    /// Start a daemon with the given config; the socket path is replaced
    /// with a temp path.
    pub async fn with_config(mut config: AppConfig) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let socket_path = temp_dir.path().join("volhud-test.sock");
        config.socket.path = Some(socket_path.to_string_lossy().into_owned());

        let recorder = RecordingPresenter::new();
        let daemon = Arc::new(Daemon::new(config));

        let run_daemon = Arc::clone(&daemon);
        let run_recorder = recorder.clone();
        let handle = tokio::spawn(async move { run_daemon.run(run_recorder).await });

        // Give the daemon time to bind
        tokio::time::sleep(Duration::from_millis(100)).await;

        Self {
            daemon,
            socket_path,
            recorder,
            handle,
            _temp_dir: temp_dir,
        }
    }

    /// A notify client targeting this daemon's socket.
    pub fn client(&self, format: WireFormat) -> NotifyClient {
        NotifyClient::new(&self.socket_path, format)
    }

    /// Shut the daemon down and wait for it to exit.
    pub async fn stop(self) -> Result<(), DaemonError> {
        self.daemon.shutdown();
        self.handle.await.expect("daemon task panicked")
    }
}
