//! Batch delete flow
//!
//! Wires the modal session controller to the task queue: confirming the dialog locks
//! it and issues one DELETE per selected tag with bounded concurrency. When the last
//! request completes the dialog is unlocked and either shows the aggregated failures
//! or is closed with a "Delete finished." notice.

use crate::error::QueueError;
use crate::modal::{ConfirmOutcome, DialogBody, ModalConfig, ModalController};
use crate::queue::{Completion, DescriptorSource, QueueHandle, TaskQueue};
use crate::selection::SelectionWidget;
use crate::transport::{tag_target, RequestDescriptor, Transport, TransportResponse};
use parking_lot::Mutex;
use reqwest::Method;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub const EMPTY_SELECTION_MESSAGE: &str = "Please select some tags.";
pub const DELETE_FINISHED_MESSAGE: &str = "Delete finished.";
pub const DEFAULT_DELETE_CONCURRENCY: usize = 5;

/// Outcome of one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub image: String,
    pub deleted: Vec<String>,
    pub failed: Vec<Completion>,
}

impl BatchReport {
    fn from_completions(image: &str, completions: Vec<Completion>) -> Self {
        let (deleted, failed): (Vec<_>, Vec<_>) = completions
            .into_iter()
            .partition(|completion| completion.response.is_success());
        Self {
            image: image.to_string(),
            deleted: deleted.into_iter().map(|completion| completion.item).collect(),
            failed,
        }
    }

    pub fn total(&self) -> usize {
        self.deleted.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// One "tag: message" line per failure.
    pub fn failure_lines(&self) -> Vec<String> {
        self.failed
            .iter()
            .map(|completion| failure_line(&completion.item, &completion.response))
            .collect()
    }
}

fn failure_line(tag: &str, response: &TransportResponse) -> String {
    format!("{}: {}", tag, response.body)
}

struct FlowInner<S> {
    image: String,
    transport: Arc<dyn Transport>,
    concurrency: usize,
    selection: Arc<Mutex<S>>,
    batch: Mutex<Option<QueueHandle>>,
    // Cleared by the last completion hook, before the dialog is unlocked.
    running: Arc<AtomicBool>,
}

/// Delete-tags dialog for one image
pub struct DeleteTagsFlow<S> {
    inner: Arc<FlowInner<S>>,
}

impl<S> Clone for DeleteTagsFlow<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> DeleteTagsFlow<S>
where
    S: SelectionWidget + Send + 'static,
{
    pub fn new(
        image: impl Into<String>,
        transport: Arc<dyn Transport>,
        concurrency: usize,
        selection: Arc<Mutex<S>>,
    ) -> Self {
        Self {
            inner: Arc::new(FlowInner {
                image: image.into(),
                transport,
                concurrency,
                selection,
                batch: Mutex::new(None),
                running: Arc::new(AtomicBool::new(false)),
            }),
        }
    }

    pub fn image(&self) -> &str {
        &self.inner.image
    }

    /// Session options for the delete dialog. Cancel and Escape both clear the
    /// selection before closing.
    pub fn dialog(&self, body: DialogBody) -> ModalConfig {
        let confirm = self.clone();
        let cancel = self.clone();
        let close = self.clone();
        ModalConfig::new(body)
            .accept_label("Delete")
            .on_confirm(move |modal| confirm.submit(modal))
            .on_cancel(move |modal| cancel.dismiss(modal))
            .on_close(move |modal| close.dismiss(modal))
    }

    pub fn open(&self, modal: &ModalController, body: DialogBody) {
        modal.open(self.dialog(body));
    }

    /// Confirm handler: start deleting the selected tags.
    ///
    /// Always keeps the dialog open. The completion of the last request decides
    /// whether it closes.
    pub fn submit(&self, modal: &ModalController) -> ConfirmOutcome {
        let tags = self.inner.selection.lock().selected();
        if tags.is_empty() {
            return ConfirmOutcome::rejected(EMPTY_SELECTION_MESSAGE);
        }
        if self.inner.running.swap(true, Ordering::AcqRel) {
            warn!(image = %self.inner.image, "Delete batch already running");
            return ConfirmOutcome::Rejected(None);
        }

        let queue = match self.build_queue(modal, tags.clone()) {
            Ok(queue) => queue,
            Err(e) => {
                self.inner.running.store(false, Ordering::Release);
                return ConfirmOutcome::rejected(e.to_string());
            }
        };

        info!(
            image = %self.inner.image,
            tags = tags.len(),
            concurrency = self.inner.concurrency,
            "Deleting tags"
        );
        modal.lock();
        *self.inner.batch.lock() = Some(queue.spawn());
        ConfirmOutcome::Rejected(None)
    }

    /// Cancel / Escape handler
    pub fn dismiss(&self, modal: &ModalController) {
        {
            let mut selection = self.inner.selection.lock();
            selection.clear_selection();
            selection.save_state();
        }
        modal.force_close();
    }

    /// True from submit until the last request of the batch has completed.
    pub fn in_flight(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// Wait for the most recent batch that has not been collected yet.
    pub async fn finish(&self) -> Option<BatchReport> {
        let handle = self.inner.batch.lock().take()?;
        let completions = handle.wait().await;
        Some(BatchReport::from_completions(&self.inner.image, completions))
    }

    fn build_queue(&self, modal: &ModalController, tags: Vec<String>) -> Result<TaskQueue, QueueError> {
        let remaining = Arc::new(AtomicUsize::new(tags.len()));
        let errors = Arc::new(Mutex::new(Vec::new()));
        let image = self.inner.image.clone();
        let running = Arc::clone(&self.inner.running);
        let modal = modal.clone();

        let source = DescriptorSource::factory(move |tag| {
            let remaining = Arc::clone(&remaining);
            let errors = Arc::clone(&errors);
            let running = Arc::clone(&running);
            let modal = modal.clone();
            let tag_name = tag.to_string();
            RequestDescriptor::new(tag_target(&image, tag), Method::DELETE)
                .with_payload(json!({ "format": "json" }))
                .on_complete(move |response| {
                    if !response.is_success() {
                        warn!(tag = %tag_name, status = response.status, "Tag deletion failed");
                        errors.lock().push(failure_line(&tag_name, response));
                    }
                    if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                        running.store(false, Ordering::Release);
                        finish_batch(&modal, &errors.lock());
                    }
                })
        });

        TaskQueue::new(tags, source, self.inner.concurrency, Arc::clone(&self.inner.transport))
    }
}

fn finish_batch(modal: &ModalController, errors: &[String]) {
    modal.unlock();
    if errors.is_empty() {
        modal.notify(DELETE_FINISHED_MESSAGE);
        modal.force_close();
    } else {
        modal.show_error(&errors.join("\n"));
    }
}
