//! IPC client — delivers one volume event to the daemon.
//!
//! A notify invocation is short-lived: connect, write the encoded event,
//! optionally read the acknowledgement, exit. Sends are fire-and-forget
//! with a single attempt; every failure is fatal to the invocation and
//! surfaced to the caller, never retried.

use std::path::PathBuf;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tracing::debug;

use crate::event::VolumeEvent;
use crate::wire::{self, WireFormat};

/// Bounds how long a hung daemon can block the client, per operation.
pub const IO_TIMEOUT: Duration = Duration::from_secs(1);

/// Errors from a notify send. All are fatal to the one invocation.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error(
        "cannot reach the volhud daemon at {path} (is `volhud start` running?): {source}"
    )]
    DaemonUnreachable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to send complete message: {0}")]
    WriteIncomplete(#[source] std::io::Error),

    #[error("daemon rejected the event: {0}")]
    ServerRejected(String),
}

/// Client for posting volume events to the daemon's notification socket.
pub struct NotifyClient {
    socket_path: PathBuf,
    format: WireFormat,
}

impl NotifyClient {
    /// Create a client targeting the given socket path and wire format.
    pub fn new(socket_path: impl Into<PathBuf>, format: WireFormat) -> Self {
        Self {
            socket_path: socket_path.into(),
            format,
        }
    }

    /// Deliver one event.
    ///
    /// The write side is shut down after the message so the daemon sees
    /// the message boundary. A successful write counts as success; the
    /// acknowledgement read is opportunistic, except that an explicit
    /// `ERROR`-prefixed response is surfaced as
    /// [`SendError::ServerRejected`].
    pub async fn send(&self, event: &VolumeEvent) -> Result<(), SendError> {
        let connect = tokio::time::timeout(IO_TIMEOUT, UnixStream::connect(&self.socket_path));
        let mut stream = match connect.await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(SendError::DaemonUnreachable {
                    path: self.socket_path.clone(),
                    source,
                });
            }
            Err(_) => {
                return Err(SendError::DaemonUnreachable {
                    path: self.socket_path.clone(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        "connect timed out",
                    ),
                });
            }
        };

        let payload = wire::encode(event, self.format);
        let write = async {
            stream.write_all(&payload).await?;
            stream.shutdown().await
        };
        tokio::time::timeout(IO_TIMEOUT, write)
            .await
            .map_err(|_| {
                SendError::WriteIncomplete(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "write timed out",
                ))
            })?
            .map_err(SendError::WriteIncomplete)?;

        debug!(
            device = %event.device_name,
            path = %self.socket_path.display(),
            "event sent"
        );

        // Opportunistic ack read; timeouts and read errors are not
        // failures, a server-reported error is.
        let mut response = [0u8; 256];
        if let Ok(Ok(n)) = tokio::time::timeout(IO_TIMEOUT, stream.read(&mut response)).await {
            let response = String::from_utf8_lossy(&response[..n]);
            if let Some(reason) = response.strip_prefix("ERROR") {
                let reason = reason.trim_start_matches(':').trim();
                return Err(SendError::ServerRejected(reason.to_string()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::ShutdownSignal;
    use crate::event::{MuteState, VolumeState};
    use crate::ipc::server;
    use pretty_assertions::assert_eq;
    use tokio::sync::{broadcast, mpsc};

    #[tokio::test]
    async fn test_send_to_missing_socket_is_unreachable() {
        let client = NotifyClient::new("/tmp/volhud-nonexistent.sock", WireFormat::Lines);
        let result = client.send(&VolumeEvent::new("Speakers")).await;
        assert!(matches!(result, Err(SendError::DaemonUnreachable { .. })));
    }

    #[tokio::test]
    async fn test_integration_send_and_decode() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("volhud-client-it.sock");

        let (event_tx, mut event_rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let server_path = path.clone();
        let server_handle = tokio::spawn(async move {
            server::serve(&server_path, WireFormat::Lines, event_tx, shutdown_rx).await
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut event = VolumeEvent::new("MacBook Pro Speakers");
        event.volume = VolumeState::Level(0.75);
        event.muted = MuteState::Unmuted;

        let client = NotifyClient::new(&path, WireFormat::Lines);
        client.send(&event).await.unwrap();

        let received = event_rx.recv().await.unwrap();
        assert_eq!(received, event);

        shutdown_tx.send(ShutdownSignal).unwrap();
        server_handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_integration_json_format_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("volhud-client-json.sock");

        let (event_tx, mut event_rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let server_path = path.clone();
        let server_handle = tokio::spawn(async move {
            server::serve(&server_path, WireFormat::Json, event_tx, shutdown_rx).await
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut event = VolumeEvent::new("Studio Display");
        event.volume = VolumeState::Unsupported;

        let client = NotifyClient::new(&path, WireFormat::Json);
        client.send(&event).await.unwrap();

        let received = event_rx.recv().await.unwrap();
        assert_eq!(received, event);

        shutdown_tx.send(ShutdownSignal).unwrap();
        server_handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_integration_server_rejection_is_surfaced() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("volhud-client-rej.sock");

        let (event_tx, _event_rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let server_path = path.clone();
        let server_handle = tokio::spawn(async move {
            server::serve(&server_path, WireFormat::Lines, event_tx, shutdown_rx).await
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Daemon expects line format; a JSON client misconfiguration is
        // rejected because the payload has no name line.
        let client = NotifyClient::new(&path, WireFormat::Json);
        let result = client.send(&VolumeEvent::new("Speakers")).await;
        assert!(matches!(result, Err(SendError::ServerRejected(_))));

        shutdown_tx.send(ShutdownSignal).unwrap();
        server_handle.await.unwrap().unwrap();
    }
}
