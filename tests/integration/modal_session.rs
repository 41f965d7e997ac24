//! Integration tests for the modal session controller
//!
//! Tests cover:
//! - Session lifecycle and surface updates
//! - Confirm outcomes (accept, reject with and without reason)
//! - Escape and cancel handling
//! - Sessions replaced from inside a callback

use drui::modal::recording::{RecordingSurface, SurfaceEvent};
use drui::modal::{
    ConfirmOutcome, DialogBody, FocusTarget, Key, ModalConfig, ModalController, ModalState,
    DEFAULT_ACCEPT_LABEL,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn controller() -> (ModalController, Arc<RecordingSurface>) {
    let surface = Arc::new(RecordingSurface::new());
    (ModalController::new(surface.clone()), surface)
}

#[test]
fn test_open_renders_and_focuses_first_control() {
    let (modal, surface) = controller();
    let body = DialogBody::text("Pick tags")
        .with_control("label", false)
        .with_control("deleted_tags", true);

    modal.open(ModalConfig::new(body));

    assert_eq!(modal.state(), ModalState::Open);
    assert_eq!(modal.accept_label(), DEFAULT_ACCEPT_LABEL);
    assert!(modal.escape_attached());
    assert_eq!(
        modal.last_focus(),
        Some(FocusTarget::Control("deleted_tags".to_string()))
    );
    let events = surface.events();
    assert_eq!(events[0], SurfaceEvent::Render("Pick tags".to_string()));
    assert!(events.contains(&SurfaceEvent::Focus(FocusTarget::Control(
        "deleted_tags".to_string()
    ))));
}

#[test]
fn test_alert_without_callbacks_closes_on_confirm() {
    let (modal, surface) = controller();
    modal.open(ModalConfig::alert(DialogBody::text("Heads up")));

    assert!(modal.accept_hidden());
    assert_eq!(modal.last_focus(), Some(FocusTarget::Root));
    assert_eq!(modal.confirm(), ConfirmOutcome::Accepted);
    assert_eq!(modal.state(), ModalState::Closed);
    assert_eq!(surface.events().last(), Some(&SurfaceEvent::Close));
}

#[test]
fn test_rejection_keeps_dialog_open_until_accepted() {
    let (modal, surface) = controller();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    modal.open(ModalConfig::new(DialogBody::text("Name")).on_confirm(move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            ConfirmOutcome::rejected("Name is required")
        } else {
            ConfirmOutcome::Accepted
        }
    }));

    assert_eq!(modal.confirm(), ConfirmOutcome::rejected("Name is required"));
    assert!(modal.is_open());
    assert_eq!(modal.error().as_deref(), Some("Name is required"));
    assert_eq!(surface.errors(), vec!["Name is required"]);

    assert_eq!(modal.confirm(), ConfirmOutcome::Accepted);
    assert_eq!(modal.state(), ModalState::Closed);
    assert_eq!(modal.error(), None);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_silent_rejection_changes_nothing() {
    let (modal, surface) = controller();
    modal.open(ModalConfig::new(DialogBody::text("Busy")).on_confirm(|_| ConfirmOutcome::Rejected(None)));

    assert_eq!(modal.confirm(), ConfirmOutcome::Rejected(None));
    assert!(modal.is_open());
    assert!(surface.errors().is_empty());
}

#[test]
fn test_locked_dialog_ignores_confirm() {
    let (modal, _) = controller();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    modal.open(ModalConfig::new(DialogBody::text("Delete")).on_confirm(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        ConfirmOutcome::Accepted
    }));

    modal.lock();
    assert!(modal.is_busy());
    assert!(!modal.cancel_visible());
    assert_eq!(modal.confirm(), ConfirmOutcome::Rejected(None));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    modal.unlock();
    assert_eq!(modal.confirm(), ConfirmOutcome::Accepted);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_escape_runs_close_callback_once() {
    let (modal, _) = controller();
    let closes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&closes);
    modal.open(ModalConfig::new(DialogBody::text("Esc me")).on_close(move |modal| {
        counter.fetch_add(1, Ordering::SeqCst);
        modal.force_close();
    }));

    modal.handle_key(Key::Enter);
    assert!(modal.is_open());

    modal.handle_key(Key::Escape);
    modal.handle_key(Key::Escape);
    assert_eq!(modal.state(), ModalState::Closed);
    assert!(!modal.escape_attached());
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_cancel_without_callback_closes() {
    let (modal, _) = controller();
    modal.open(ModalConfig::new(DialogBody::text("Plain")));
    modal.cancel();
    assert_eq!(modal.state(), ModalState::Closed);
}

#[test]
fn test_session_replaced_inside_confirm_is_left_alone() {
    let (modal, _) = controller();
    modal.open(ModalConfig::new(DialogBody::text("Step 1")).on_confirm(|modal| {
        modal.open(ModalConfig::new(DialogBody::text("Step 2")).accept_label("Finish"));
        ConfirmOutcome::Accepted
    }));
    let first = modal.generation();

    assert_eq!(modal.confirm(), ConfirmOutcome::Accepted);

    assert!(modal.is_open());
    assert_eq!(modal.generation(), first + 1);
    assert_eq!(modal.accept_label(), "Finish");

    // Step 2 has no confirm callback: accepting closes it.
    assert_eq!(modal.confirm(), ConfirmOutcome::Accepted);
    assert_eq!(modal.state(), ModalState::Closed);
}

#[test]
fn test_force_close_is_idempotent() {
    let (modal, surface) = controller();
    modal.force_close();
    assert!(!surface.events().contains(&SurfaceEvent::Close));

    modal.open(ModalConfig::new(DialogBody::text("x")));
    modal.force_close();
    modal.force_close();
    let closes = surface
        .events()
        .iter()
        .filter(|event| **event == SurfaceEvent::Close)
        .count();
    assert_eq!(closes, 1);
}
