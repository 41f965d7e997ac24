//! Integration tests for the batch delete flow
//!
//! Tests cover:
//! - The dialog staying locked until the last DELETE completes
//! - Aggregated failure messages
//! - Success notice and close
//! - Cancel and Escape clearing the selection

use super::test_utils::{settle, strings, wait_until};
use drui::flow::{DeleteTagsFlow, DELETE_FINISHED_MESSAGE, EMPTY_SELECTION_MESSAGE};
use drui::modal::recording::RecordingSurface;
use drui::modal::{ConfirmOutcome, DialogBody, Key, ModalController, ModalState};
use drui::selection::{SelectionWidget, TagTable};
use drui::transport::mock::ScriptedTransport;
use drui::transport::tag_target;
use parking_lot::Mutex;
use std::sync::Arc;

struct Harness {
    flow: DeleteTagsFlow<TagTable>,
    modal: ModalController,
    table: Arc<Mutex<TagTable>>,
    surface: Arc<RecordingSurface>,
}

fn harness(tags: &[&str], concurrency: usize, transport: Arc<ScriptedTransport>) -> Harness {
    let surface = Arc::new(RecordingSurface::new());
    let modal = ModalController::new(surface.clone());
    let table = Arc::new(Mutex::new(TagTable::new(strings(tags))));
    let flow = DeleteTagsFlow::new("web/api", transport, concurrency, Arc::clone(&table));
    flow.open(
        &modal,
        DialogBody::text("Select image web/api tags:").with_control("deleted_tags", true),
    );
    Harness {
        flow,
        modal,
        table,
        surface,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dialog_unlocks_after_last_completion_with_one_error() {
    let failing = tag_target("web/api", "1.1");
    let transport = Arc::new(ScriptedTransport::gated().script(&failing, 404, "Not found"));
    let h = harness(&["1.0", "1.1", "1.2"], 5, transport.clone());
    h.table.lock().select(["1.0", "1.1", "1.2"]);

    assert_eq!(h.modal.confirm(), ConfirmOutcome::Rejected(None));
    assert!(h.modal.is_busy());
    assert!(!h.modal.accept_enabled());
    assert!(h.flow.in_flight());

    transport.wait_for_dispatches(3).await;
    assert_eq!(transport.peak_in_flight(), 3);

    assert!(transport.release(&tag_target("web/api", "1.0")));
    wait_until(|| transport.completed() == 1).await;
    assert!(transport.release(&failing));
    wait_until(|| transport.completed() == 2).await;
    settle().await;
    assert!(h.modal.is_busy(), "still locked while a request is in flight");
    assert!(h.surface.errors().is_empty());

    assert!(transport.release(&tag_target("web/api", "1.2")));
    let report = h.flow.finish().await.unwrap();

    assert_eq!(report.deleted, vec!["1.0", "1.2"]);
    assert_eq!(report.failure_lines(), vec!["1.1: Not found"]);
    assert!(!h.modal.is_busy());
    assert!(h.modal.accept_enabled());
    assert!(h.modal.is_open());
    assert_eq!(h.surface.errors(), vec!["1.1: Not found"]);
    assert!(h.surface.notifications().is_empty());
}

#[tokio::test]
async fn test_all_deleted_closes_with_notice() {
    let transport = Arc::new(ScriptedTransport::immediate());
    let h = harness(&["1.0", "1.1", "latest"], 2, transport.clone());
    h.table.lock().select(["1.0", "latest"]);

    h.modal.confirm();
    let report = h.flow.finish().await.unwrap();

    assert!(report.is_success());
    assert_eq!(h.modal.state(), ModalState::Closed);
    assert_eq!(h.surface.notifications(), vec![DELETE_FINISHED_MESSAGE]);
    assert_eq!(
        transport.dispatched(),
        vec!["/_/web/api/tags/1.0", "/_/web/api/tags/latest"]
    );
}

#[tokio::test]
async fn test_multiple_failures_join_in_completion_order() {
    let transport = Arc::new(
        ScriptedTransport::immediate()
            .script(tag_target("web/api", "a"), 401, "Unauthorized")
            .script(tag_target("web/api", "b"), 405, "Method Not Allowed"),
    );
    let h = harness(&["a", "b"], 1, transport);
    h.table.lock().select(["a", "b"]);

    h.modal.confirm();
    let report = h.flow.finish().await.unwrap();

    assert_eq!(report.failed.len(), 2);
    assert_eq!(
        h.modal.error().as_deref(),
        Some("a: Unauthorized\nb: Method Not Allowed")
    );
}

#[tokio::test]
async fn test_empty_selection_shows_message() {
    let transport = Arc::new(ScriptedTransport::immediate());
    let h = harness(&["1.0"], 5, transport.clone());

    assert_eq!(
        h.modal.confirm(),
        ConfirmOutcome::rejected(EMPTY_SELECTION_MESSAGE)
    );
    assert_eq!(h.surface.errors(), vec![EMPTY_SELECTION_MESSAGE]);
    assert!(transport.dispatched().is_empty());
}

#[tokio::test]
async fn test_cancel_and_escape_clear_selection() {
    let transport = Arc::new(ScriptedTransport::immediate());
    let h = harness(&["1.0", "1.1"], 5, transport.clone());
    h.table.lock().select(["1.1"]);

    h.modal.cancel();
    assert_eq!(h.modal.state(), ModalState::Closed);
    assert!(h.table.lock().selected().is_empty());
    assert!(h.table.lock().saved_state().is_empty());

    h.flow.open(&h.modal, DialogBody::text("again"));
    h.table.lock().select(["1.0"]);
    h.modal.handle_key(Key::Escape);
    assert_eq!(h.modal.state(), ModalState::Closed);
    assert!(h.table.lock().selected().is_empty());
    assert!(transport.dispatched().is_empty());
}
