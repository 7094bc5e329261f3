#![deny(unsafe_code)]

//! volhud core daemon runtime.
//!
//! Provides the volume-event wire codec, the Unix-socket notification
//! transport (server and client sides), and the overlay session state
//! machine that decides when the HUD appears, updates, and fades away.
//! Rendering is delegated to a [`Presenter`] implementation; the daemon
//! never touches the windowing layer directly.

/// Core daemon process — startup, shutdown, and task wiring.
pub mod daemon;
/// Volume-change event model.
pub mod event;
/// Unix domain socket transport (server and client).
pub mod ipc;
/// Presenter seam and the shipped logging presenter.
pub mod presenter;
/// Overlay session state machine and its driver task.
pub mod session;
/// Wire codec — canonical line format plus the JSON variant.
pub mod wire;

pub use daemon::{Daemon, DaemonError, ShutdownSignal};
pub use event::{DeviceType, MuteState, VolumeEvent, VolumeState};
pub use ipc::{NotifyClient, SendError, ServerError};
pub use presenter::{LogPresenter, OverlayData, Presenter};
pub use session::{OverlaySession, Timings, Visibility};
pub use wire::{DecodeError, WireFormat, MAX_MESSAGE_BYTES};
