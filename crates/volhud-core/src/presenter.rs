//! Presenter seam between the session state machine and the rendering layer.
//!
//! The native HUD (window creation, vector icons, blur, animation curves)
//! lives outside this crate; the session only talks to a [`Presenter`].
//! [`LogPresenter`] is the shipped implementation — it narrates the same
//! calls through `tracing` so the daemon is fully runnable headless.

use crate::event::{DeviceType, MuteState, VolumeEvent, VolumeState};

/// Read-only snapshot handed to the presenter for each render.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayData {
    pub device_name: String,
    pub device_type: DeviceType,
    /// The single line shown next to the icon, e.g. `Speakers — 75%`.
    pub message: String,
    /// Bar fill fraction. `None` when volume is unsupported or the event
    /// carries a device error; the bar renders full in its dimmed style.
    pub level: Option<f32>,
    pub muted: bool,
}

impl OverlayData {
    /// Build a presenter snapshot from a decoded event.
    pub fn from_event(event: &VolumeEvent) -> Self {
        let level = match (&event.error, event.volume) {
            (Some(_), _) | (None, VolumeState::Unsupported) => None,
            (None, VolumeState::Level(level)) => Some(level),
        };
        Self {
            device_name: event.device_name.clone(),
            device_type: event.device_type,
            message: event.display_message(),
            level,
            muted: event.muted == MuteState::Muted,
        }
    }
}

/// The rendering collaborator driven by the overlay session.
///
/// Implementations own alpha state. `update` while a fade-out is running
/// must resume the fade-in from the current alpha, never from zero.
pub trait Presenter: Send {
    /// Position the overlay on the pointer's display and fade it in from
    /// fully hidden.
    fn show(&mut self, data: &OverlayData);

    /// Replace the visible content in place, without repositioning.
    fn update(&mut self, data: &OverlayData);

    /// Begin the fade-out animation.
    fn begin_hide(&mut self);

    /// Unmap the overlay after the fade-out has completed.
    fn hide(&mut self);
}

/// Presenter that narrates overlay activity through `tracing`.
///
/// The real HUD centers horizontally and sits `bottom_inset` points above
/// the bottom edge of whichever display holds the pointer; this one just
/// logs that placement.
#[derive(Debug)]
pub struct LogPresenter {
    bottom_inset: u32,
}

impl LogPresenter {
    pub fn new(bottom_inset: u32) -> Self {
        Self { bottom_inset }
    }
}

impl Default for LogPresenter {
    fn default() -> Self {
        Self::new(80)
    }
}

impl Presenter for LogPresenter {
    fn show(&mut self, data: &OverlayData) {
        tracing::info!(
            device = %data.device_name,
            message = %data.message,
            bottom_inset = self.bottom_inset,
            "overlay show"
        );
    }

    fn update(&mut self, data: &OverlayData) {
        tracing::info!(device = %data.device_name, message = %data.message, "overlay update");
    }

    fn begin_hide(&mut self) {
        tracing::debug!("overlay fading out");
    }

    fn hide(&mut self) {
        tracing::info!("overlay hidden");
    }
}
