//! Modal Session Controller
//!
//! Owns the single dialog a front-end shows at a time. Each `open` starts a new
//! session: it force-closes whatever was showing, installs the session's body and
//! callbacks, resets the accept and cancel controls and moves focus into the dialog.
//! Confirm, cancel and Escape are routed to the session's callbacks; without a
//! callback the controller closes the dialog itself.
//!
//! Rendering is delegated to a [`DialogSurface`]; the controller only tracks state.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

#[cfg(any(test, feature = "test-util"))]
pub mod recording;

pub const DEFAULT_ACCEPT_LABEL: &str = "Save changes";

/// Lifecycle of a modal session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Idle,
    Open,
    Closed,
}

/// Result of a confirm callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Close the dialog
    Accepted,
    /// Keep the dialog open, optionally showing the reason as an error
    Rejected(Option<String>),
}

impl ConfirmOutcome {
    pub fn rejected(reason: impl Into<String>) -> Self {
        ConfirmOutcome::Rejected(Some(reason.into()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Char(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusTarget {
    Control(String),
    /// The dialog itself, when the body has nothing focusable
    Root,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub id: String,
    pub focusable: bool,
}

/// Content of a dialog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogBody {
    pub content: String,
    pub controls: Vec<Control>,
}

impl DialogBody {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            controls: Vec::new(),
        }
    }

    pub fn with_control(mut self, id: impl Into<String>, focusable: bool) -> Self {
        self.controls.push(Control {
            id: id.into(),
            focusable,
        });
        self
    }

    pub fn first_focusable(&self) -> Option<&Control> {
        self.controls.iter().find(|control| control.focusable)
    }
}

pub type ConfirmCallback = Box<dyn FnMut(&ModalController) -> ConfirmOutcome + Send>;
pub type ActionCallback = Box<dyn FnMut(&ModalController) + Send>;

/// Options for one modal session
pub struct ModalConfig {
    pub body: DialogBody,
    pub accept_label: String,
    pub accept_hidden: bool,
    pub on_confirm: Option<ConfirmCallback>,
    pub on_cancel: Option<ActionCallback>,
    pub on_close: Option<ActionCallback>,
}

impl ModalConfig {
    pub fn new(body: DialogBody) -> Self {
        Self {
            body,
            accept_label: DEFAULT_ACCEPT_LABEL.to_string(),
            accept_hidden: false,
            on_confirm: None,
            on_cancel: None,
            on_close: None,
        }
    }

    /// Informational dialog: accept control hidden, no callbacks.
    pub fn alert(body: DialogBody) -> Self {
        Self::new(body).accept_hidden(true)
    }

    pub fn accept_label(mut self, label: impl Into<String>) -> Self {
        self.accept_label = label.into();
        self
    }

    pub fn accept_hidden(mut self, hidden: bool) -> Self {
        self.accept_hidden = hidden;
        self
    }

    pub fn on_confirm<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&ModalController) -> ConfirmOutcome + Send + 'static,
    {
        self.on_confirm = Some(Box::new(callback));
        self
    }

    pub fn on_cancel<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&ModalController) + Send + 'static,
    {
        self.on_cancel = Some(Box::new(callback));
        self
    }

    pub fn on_close<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&ModalController) + Send + 'static,
    {
        self.on_close = Some(Box::new(callback));
        self
    }
}

/// Rendering side of a dialog
pub trait DialogSurface: Send + Sync {
    fn render_body(&self, body: &DialogBody);
    fn show_error(&self, text: &str);
    fn hide_error(&self);
    fn set_accept(&self, label: &str, hidden: bool, enabled: bool);
    fn set_cancel_visible(&self, visible: bool);
    fn set_busy(&self, busy: bool);
    fn focus(&self, target: &FocusTarget);
    /// Transient message outside the dialog
    fn notify(&self, text: &str);
    fn close(&self);
}

struct Session {
    state: ModalState,
    generation: u64,
    body: DialogBody,
    accept_label: String,
    accept_hidden: bool,
    accept_enabled: bool,
    cancel_visible: bool,
    busy: bool,
    escape_attached: bool,
    error: Option<String>,
    focus: Option<FocusTarget>,
    on_confirm: Option<ConfirmCallback>,
    on_cancel: Option<ActionCallback>,
    on_close: Option<ActionCallback>,
}

impl Session {
    fn idle() -> Self {
        Self {
            state: ModalState::Idle,
            generation: 0,
            body: DialogBody::default(),
            accept_label: DEFAULT_ACCEPT_LABEL.to_string(),
            accept_hidden: false,
            accept_enabled: true,
            cancel_visible: true,
            busy: false,
            escape_attached: false,
            error: None,
            focus: None,
            on_confirm: None,
            on_cancel: None,
            on_close: None,
        }
    }
}

/// Handle to the modal session controller. Clones share the same session.
#[derive(Clone)]
pub struct ModalController {
    session: Arc<Mutex<Session>>,
    surface: Arc<dyn DialogSurface>,
}

impl ModalController {
    pub fn new(surface: Arc<dyn DialogSurface>) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::idle())),
            surface,
        }
    }

    /// Start a new session, replacing any session that is open.
    pub fn open(&self, config: ModalConfig) {
        let mut session = self.session.lock();
        if session.state == ModalState::Open {
            debug!(generation = session.generation, "Replacing open modal session");
            close_session(&mut session, self.surface.as_ref());
        }

        session.generation += 1;
        session.body = config.body;
        session.accept_label = config.accept_label;
        session.accept_hidden = config.accept_hidden;
        session.on_confirm = config.on_confirm;
        session.on_cancel = config.on_cancel;
        session.on_close = config.on_close;

        self.surface.render_body(&session.body);

        session.error = None;
        self.surface.hide_error();

        session.accept_enabled = true;
        session.cancel_visible = true;
        session.busy = false;
        self.surface
            .set_accept(&session.accept_label, session.accept_hidden, true);
        self.surface.set_cancel_visible(true);
        self.surface.set_busy(false);

        session.state = ModalState::Open;
        session.escape_attached = true;

        let focus = session
            .body
            .first_focusable()
            .map(|control| FocusTarget::Control(control.id.clone()))
            .unwrap_or(FocusTarget::Root);
        self.surface.focus(&focus);
        session.focus = Some(focus);

        debug!(generation = session.generation, "Modal session opened");
    }

    /// User pressed the accept control.
    ///
    /// Ignored unless a session is open with the accept control enabled. Without a
    /// confirm callback the dialog closes unconditionally.
    pub fn confirm(&self) -> ConfirmOutcome {
        let (generation, callback) = {
            let mut session = self.session.lock();
            if session.state != ModalState::Open {
                debug!(generation = session.generation, "Confirm ignored without an open session");
                return ConfirmOutcome::Rejected(None);
            }
            if !session.accept_enabled {
                debug!(generation = session.generation, "Confirm ignored while accept is disabled");
                return ConfirmOutcome::Rejected(None);
            }
            (session.generation, session.on_confirm.take())
        };

        let outcome = match callback {
            None => ConfirmOutcome::Accepted,
            Some(mut callback) => {
                let outcome = callback(self);
                self.restore(generation, |session| &mut session.on_confirm, callback);
                outcome
            }
        };

        let mut session = self.session.lock();
        if session.generation != generation {
            return outcome;
        }
        match &outcome {
            ConfirmOutcome::Accepted => close_session(&mut session, self.surface.as_ref()),
            ConfirmOutcome::Rejected(Some(reason)) => {
                session.error = Some(reason.clone());
                self.surface.show_error(reason);
            }
            ConfirmOutcome::Rejected(None) => {}
        }
        outcome
    }

    /// User pressed the cancel control. Ignored unless a session is open.
    pub fn cancel(&self) {
        let (generation, callback) = {
            let mut session = self.session.lock();
            if session.state != ModalState::Open {
                return;
            }
            (session.generation, session.on_cancel.take())
        };
        match callback {
            Some(mut callback) => {
                callback(self);
                self.restore(generation, |session| &mut session.on_cancel, callback);
            }
            None => self.force_close(),
        }
    }

    /// Keyboard input while the dialog is shown. Only Escape is handled, and only while
    /// the session's Escape listener is attached.
    pub fn handle_key(&self, key: Key) {
        if key != Key::Escape {
            return;
        }
        let (generation, callback) = {
            let mut session = self.session.lock();
            if !session.escape_attached {
                return;
            }
            (session.generation, session.on_close.take())
        };
        match callback {
            Some(mut callback) => {
                callback(self);
                self.restore(generation, |session| &mut session.on_close, callback);
            }
            None => self.force_close(),
        }
    }

    /// Close the dialog, detach the Escape listener, hide the error and re-enable the
    /// accept control. Idempotent.
    pub fn force_close(&self) {
        let mut session = self.session.lock();
        close_session(&mut session, self.surface.as_ref());
    }

    /// Disable accept, hide cancel and show the busy indicator.
    pub fn lock(&self) {
        let mut session = self.session.lock();
        session.accept_enabled = false;
        session.cancel_visible = false;
        session.busy = true;
        self.surface
            .set_accept(&session.accept_label, session.accept_hidden, false);
        self.surface.set_cancel_visible(false);
        self.surface.set_busy(true);
    }

    pub fn unlock(&self) {
        let mut session = self.session.lock();
        session.accept_enabled = true;
        session.cancel_visible = true;
        session.busy = false;
        self.surface
            .set_accept(&session.accept_label, session.accept_hidden, true);
        self.surface.set_cancel_visible(true);
        self.surface.set_busy(false);
    }

    pub fn show_error(&self, text: &str) {
        let mut session = self.session.lock();
        session.error = Some(text.to_string());
        self.surface.show_error(text);
    }

    pub fn hide_error(&self) {
        let mut session = self.session.lock();
        session.error = None;
        self.surface.hide_error();
    }

    pub fn notify(&self, text: &str) {
        self.surface.notify(text);
    }

    pub fn state(&self) -> ModalState {
        self.session.lock().state
    }

    pub fn is_open(&self) -> bool {
        self.state() == ModalState::Open
    }

    pub fn generation(&self) -> u64 {
        self.session.lock().generation
    }

    pub fn accept_label(&self) -> String {
        self.session.lock().accept_label.clone()
    }

    pub fn accept_hidden(&self) -> bool {
        self.session.lock().accept_hidden
    }

    pub fn accept_enabled(&self) -> bool {
        self.session.lock().accept_enabled
    }

    pub fn cancel_visible(&self) -> bool {
        self.session.lock().cancel_visible
    }

    pub fn is_busy(&self) -> bool {
        self.session.lock().busy
    }

    pub fn escape_attached(&self) -> bool {
        self.session.lock().escape_attached
    }

    pub fn error(&self) -> Option<String> {
        self.session.lock().error.clone()
    }

    pub fn last_focus(&self) -> Option<FocusTarget> {
        self.session.lock().focus.clone()
    }

    // Callbacks run without the session lock held so they can drive the controller.
    // Put the callback back unless a new session replaced it meanwhile.
    fn restore<C>(&self, generation: u64, slot: fn(&mut Session) -> &mut Option<C>, callback: C) {
        let mut session = self.session.lock();
        if session.generation == generation {
            let slot = slot(&mut *session);
            if slot.is_none() {
                *slot = Some(callback);
            }
        }
    }
}

fn close_session(session: &mut Session, surface: &dyn DialogSurface) {
    let was_open = session.state == ModalState::Open;
    session.state = ModalState::Closed;
    session.escape_attached = false;
    session.error = None;
    session.accept_enabled = true;
    session.accept_hidden = false;
    surface.hide_error();
    surface.set_accept(&session.accept_label, false, true);
    if was_open {
        surface.close();
        debug!(generation = session.generation, "Modal session closed");
    }
}
