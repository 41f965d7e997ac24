//! Dialog surface that records every call, for tests and headless runs.

use super::{DialogBody, DialogSurface, FocusTarget};
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Render(String),
    ShowError(String),
    HideError,
    Accept {
        label: String,
        hidden: bool,
        enabled: bool,
    },
    CancelVisible(bool),
    Busy(bool),
    Focus(FocusTarget),
    Notify(String),
    Close,
}

#[derive(Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().clone()
    }

    pub fn notifications(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Notify(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::ShowError(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: SurfaceEvent) {
        self.events.lock().push(event);
    }
}

impl DialogSurface for RecordingSurface {
    fn render_body(&self, body: &DialogBody) {
        self.record(SurfaceEvent::Render(body.content.clone()));
    }

    fn show_error(&self, text: &str) {
        self.record(SurfaceEvent::ShowError(text.to_string()));
    }

    fn hide_error(&self) {
        self.record(SurfaceEvent::HideError);
    }

    fn set_accept(&self, label: &str, hidden: bool, enabled: bool) {
        self.record(SurfaceEvent::Accept {
            label: label.to_string(),
            hidden,
            enabled,
        });
    }

    fn set_cancel_visible(&self, visible: bool) {
        self.record(SurfaceEvent::CancelVisible(visible));
    }

    fn set_busy(&self, busy: bool) {
        self.record(SurfaceEvent::Busy(busy));
    }

    fn focus(&self, target: &FocusTarget) {
        self.record(SurfaceEvent::Focus(target.clone()));
    }

    fn notify(&self, text: &str) {
        self.record(SurfaceEvent::Notify(text.to_string()));
    }

    fn close(&self) {
        self.record(SurfaceEvent::Close);
    }
}
