//! Terminal rendering of the modal dialog.
//!
//! Dialog output goes to stderr so command results on stdout stay pipeable.
//! Accept/Cancel controls are drawn by the prompts themselves; the surface only
//! traces their state.

use crate::modal::{DialogBody, DialogSurface, FocusTarget};
use crate::theme::Theme;
use owo_colors::OwoColorize;
use tracing::trace;

pub struct TerminalSurface {
    theme: Theme,
}

impl TerminalSurface {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }
}

impl DialogSurface for TerminalSurface {
    fn render_body(&self, body: &DialogBody) {
        eprintln!("\n{}", self.theme.accent(&body.content));
    }

    fn show_error(&self, text: &str) {
        for line in text.lines() {
            eprintln!("{} {}", "error:".red().bold(), line);
        }
    }

    fn hide_error(&self) {
        trace!("Dialog error cleared");
    }

    fn set_accept(&self, label: &str, hidden: bool, enabled: bool) {
        trace!(label, hidden, enabled, "Accept control updated");
    }

    fn set_cancel_visible(&self, visible: bool) {
        trace!(visible, "Cancel control updated");
    }

    fn set_busy(&self, busy: bool) {
        if busy {
            eprintln!("{}", self.theme.muted("Working..."));
        }
    }

    fn focus(&self, target: &FocusTarget) {
        trace!(?target, "Dialog focus moved");
    }

    fn notify(&self, text: &str) {
        eprintln!("{}", text.green());
    }

    fn close(&self) {
        trace!("Dialog closed");
    }
}
