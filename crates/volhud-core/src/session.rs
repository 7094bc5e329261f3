//! Overlay session state machine.
//!
//! Single-instance daemon state deciding, for each decoded event, whether
//! to open a new presentation, replace the visible one, or extend its
//! auto-hide timer. Transitions are explicit and driven by one pending
//! deadline (fade-in end, hide, or fade-out end) instead of nested
//! animation-completion callbacks.
//!
//! All mutation happens on the session task that [`run_session`] owns;
//! the acceptor hands events over by value through an mpsc channel.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tracing::{debug, info};

use volhud_config::OverlayConfig;

use crate::daemon::ShutdownSignal;
use crate::event::VolumeEvent;
use crate::presenter::{OverlayData, Presenter};

/// Fade and hide durations for the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub fade_in: Duration,
    pub fade_out: Duration,
    pub hide_delay: Duration,
}

impl Timings {
    /// Build timings from the overlay config section.
    pub fn from_config(config: &OverlayConfig) -> Self {
        Self {
            fade_in: Duration::from_millis(config.fade_in_ms),
            fade_out: Duration::from_millis(config.fade_out_ms),
            hide_delay: Duration::from_millis(config.hide_delay_ms),
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            fade_in: Duration::from_millis(150),
            fade_out: Duration::from_millis(300),
            hide_delay: Duration::from_millis(2000),
        }
    }
}

/// Overlay visibility lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Hidden,
    FadingIn,
    Visible,
    FadingOut,
}

/// What the single pending deadline means when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeadlineKind {
    FadeInDone,
    HideElapsed,
    FadeOutDone,
}

/// The daemon's one overlay session.
///
/// Owns the current event and visibility exclusively; the presenter only
/// receives read-only snapshots.
pub struct OverlaySession<P> {
    presenter: P,
    timings: Timings,
    visibility: Visibility,
    current: Option<VolumeEvent>,
    deadline: Option<(Instant, DeadlineKind)>,
}

impl<P: Presenter> OverlaySession<P> {
    pub fn new(presenter: P, timings: Timings) -> Self {
        Self {
            presenter,
            timings,
            visibility: Visibility::Hidden,
            current: None,
            deadline: None,
        }
    }

    /// Current visibility state.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// The event currently being presented, if any.
    pub fn current(&self) -> Option<&VolumeEvent> {
        self.current.as_ref()
    }

    /// When the pending deadline (if any) is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline.map(|(at, _)| at)
    }

    /// Apply a newly decoded event.
    ///
    /// Any pending hide timer is cancelled first, so the hide delay is
    /// always measured from the most recent event. A fade-out in progress
    /// is interrupted back into a fade-in; the presenter resumes from its
    /// current alpha, so rapid successive events never flicker to zero.
    pub fn on_event(&mut self, event: VolumeEvent, now: Instant) {
        let data = OverlayData::from_event(&event);
        debug!(device = %event.device_name, state = ?self.visibility, "session event");

        match self.visibility {
            Visibility::Hidden => {
                self.presenter.show(&data);
                self.visibility = Visibility::FadingIn;
                self.deadline = Some((now + self.timings.fade_in, DeadlineKind::FadeInDone));
            }
            Visibility::FadingIn => {
                // Content changes in place; the running fade-in deadline
                // stands.
                self.presenter.update(&data);
            }
            Visibility::Visible => {
                self.presenter.update(&data);
                self.deadline = Some((now + self.timings.hide_delay, DeadlineKind::HideElapsed));
            }
            Visibility::FadingOut => {
                self.presenter.update(&data);
                self.visibility = Visibility::FadingIn;
                self.deadline = Some((now + self.timings.fade_in, DeadlineKind::FadeInDone));
            }
        }

        self.current = Some(event);
    }

    /// Fire the pending deadline.
    pub fn on_deadline(&mut self, now: Instant) {
        let Some((_, kind)) = self.deadline.take() else {
            return;
        };
        match kind {
            DeadlineKind::FadeInDone => {
                self.visibility = Visibility::Visible;
                self.deadline = Some((now + self.timings.hide_delay, DeadlineKind::HideElapsed));
            }
            DeadlineKind::HideElapsed => {
                debug!("hide delay elapsed, fading out");
                self.visibility = Visibility::FadingOut;
                self.presenter.begin_hide();
                self.deadline = Some((now + self.timings.fade_out, DeadlineKind::FadeOutDone));
            }
            DeadlineKind::FadeOutDone => {
                self.visibility = Visibility::Hidden;
                self.presenter.hide();
                self.current = None;
            }
        }
    }
}

/// Drive an [`OverlaySession`] until shutdown or until the event channel
/// closes.
pub async fn run_session<P: Presenter>(
    mut session: OverlaySession<P>,
    mut events: mpsc::Receiver<VolumeEvent>,
    mut shutdown: broadcast::Receiver<ShutdownSignal>,
) {
    info!("overlay session started");
    loop {
        let deadline = session.next_deadline();
        let timer = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = shutdown.recv() => break,
            event = events.recv() => match event {
                Some(event) => session.on_event(event, Instant::now()),
                None => break,
            },
            _ = timer => session.on_deadline(Instant::now()),
        }
    }
    info!("overlay session stopped");
}
