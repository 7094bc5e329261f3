//! A presenter that records every call for later assertions.

use std::sync::{Arc, Mutex};

use volhud_core::presenter::{OverlayData, Presenter};

/// One recorded presenter invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterCall {
    Show(OverlayData),
    Update(OverlayData),
    BeginHide,
    Hide,
}

/// Presenter stand-in for tests.
///
/// Cloning shares the underlying call log: hand one clone to the session
/// and keep another to inspect what it was told to do.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    calls: Arc<Mutex<Vec<PresenterCall>>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded calls, in order.
    pub fn calls(&self) -> Vec<PresenterCall> {
        self.calls.lock().expect("presenter log poisoned").clone()
    }

    /// Number of `hide` (unmap) calls recorded.
    pub fn hide_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, PresenterCall::Hide))
            .count()
    }

    fn record(&self, call: PresenterCall) {
        self.calls.lock().expect("presenter log poisoned").push(call);
    }
}

impl Presenter for RecordingPresenter {
    fn show(&mut self, data: &OverlayData) {
        self.record(PresenterCall::Show(data.clone()));
    }

    fn update(&mut self, data: &OverlayData) {
        self.record(PresenterCall::Update(data.clone()));
    }

    fn begin_hide(&mut self) {
        self.record(PresenterCall::BeginHide);
    }

    fn hide(&mut self) {
        self.record(PresenterCall::Hide);
    }
}
