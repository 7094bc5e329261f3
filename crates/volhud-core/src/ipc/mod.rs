//! Daemon IPC — Unix domain socket transport for volume notifications.
//!
//! Short-lived clients connect, write one encoded [`VolumeEvent`], read an
//! optional acknowledgement, and disconnect. The daemon accepts strictly
//! serially and forwards decoded events to the overlay session.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐      Unix socket      ┌──────────────┐
//! │ notify client│──────────────────────▶│   Acceptor   │
//! └──────────────┘  one event per conn   └──────┬───────┘
//!                                               │ mpsc
//!                                        ┌──────▼───────┐
//!                                        │   Overlay    │
//!                                        │   Session    │
//!                                        └──────────────┘
//! ```
//!
//! [`VolumeEvent`]: crate::event::VolumeEvent

pub mod client;
pub mod server;

pub use client::{NotifyClient, SendError};
pub use server::{serve, ServerError};
