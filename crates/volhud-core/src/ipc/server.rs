//! IPC server — accepts notification connections on a Unix domain socket.
//!
//! One listening socket at a well-known filesystem path, one background
//! accept loop. Each connection carries exactly one message; the server
//! reads it (bounded in size and time), acknowledges, closes, and hands
//! the decoded event to the session channel before accepting the next
//! connection. Undecodable messages are logged and dropped — they must
//! never crash or stall the daemon.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixSocket, UnixStream};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::daemon::ShutdownSignal;
use crate::event::VolumeEvent;
use crate::wire::{self, WireFormat, MAX_MESSAGE_BYTES};

/// Listen backlog for the notification socket.
pub const SOCKET_BACKLOG: u32 = 5;

/// How long a connected client may take to deliver its message. A
/// connected-but-silent client must not stall notifications behind it;
/// hitting the deadline counts as a decode failure.
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Errors from starting the notification socket. Both are fatal to
/// daemon startup.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind notification socket at {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to listen on notification socket at {path}: {source}")]
    Listen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serve notification connections on the given socket path until the
/// shutdown signal is received.
///
/// Removes any stale socket file before binding and removes the socket
/// file again on exit. The socket is made world-writable: this is local
/// IPC with no authentication, and any local process may post events.
pub async fn serve(
    socket_path: &Path,
    format: WireFormat,
    events: mpsc::Sender<VolumeEvent>,
    mut shutdown_rx: broadcast::Receiver<ShutdownSignal>,
) -> Result<(), ServerError> {
    // Remove stale socket file if it exists
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }

    // Ensure parent directory exists
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let socket = UnixSocket::new_stream().map_err(|e| ServerError::Bind {
        path: socket_path.to_path_buf(),
        source: e,
    })?;
    socket.bind(socket_path).map_err(|e| ServerError::Bind {
        path: socket_path.to_path_buf(),
        source: e,
    })?;
    let listener = socket.listen(SOCKET_BACKLOG).map_err(|e| ServerError::Listen {
        path: socket_path.to_path_buf(),
        source: e,
    })?;

    let _ = std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o666));

    info!(
        path = %socket_path.display(),
        format = %format.as_str(),
        "notification socket listening"
    );

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("notification socket shutting down");
                break;
            }
            accepted = listener.accept() => match accepted {
                // One client is fully served before the next accept.
                Ok((stream, _addr)) => handle_connection(stream, format, &events).await,
                Err(e) => warn!(error = %e, "accept failed"),
            }
        }
    }

    // Clean up socket file
    std::fs::remove_file(socket_path).ok();
    Ok(())
}

/// Read, decode, acknowledge, and dispatch one client connection.
async fn handle_connection(
    mut stream: UnixStream,
    format: WireFormat,
    events: &mpsc::Sender<VolumeEvent>,
) {
    let payload = match tokio::time::timeout(READ_TIMEOUT, read_message(&mut stream)).await {
        Ok(Ok(payload)) => payload,
        Ok(Err(e)) => {
            warn!(error = %e, "client read failed");
            return;
        }
        Err(_) => {
            warn!("client did not deliver a message within the read deadline");
            let _ = stream.write_all(b"ERROR: read timed out").await;
            return;
        }
    };

    match wire::decode(&payload, format) {
        Ok(event) => {
            debug!(device = %event.device_name, "event accepted");
            let _ = stream.write_all(b"OK").await;
            if events.send(event).await.is_err() {
                warn!("session channel closed, dropping event");
            }
        }
        Err(e) => {
            warn!(error = %e, "discarding undecodable message");
            let _ = stream.write_all(format!("ERROR: {e}").as_bytes()).await;
        }
    }
}

/// Read until the client closes its write side, the buffer cap is hit,
/// or an IO error occurs. Oversized messages are truncated, not
/// rejected; the codec tolerates the corrupted trailing line.
async fn read_message(stream: &mut UnixStream) -> std::io::Result<Vec<u8>> {
    let mut buf = vec![0u8; MAX_MESSAGE_BYTES];
    let mut filled = 0;
    while filled < buf.len() {
        let n = stream.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buf.truncate(filled);
    Ok(buf)
}
