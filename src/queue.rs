//! Bounded Concurrency Task Queue
//!
//! Drains an ordered list of item identifiers, issuing one transport request per item
//! while never keeping more than `concurrency_limit` requests in flight. Items are
//! dispatched in input order; completions arrive in whatever order the transport
//! produces them. Each request's completion hook fires exactly once, after which the
//! freed slot goes to the next pending item.

use crate::error::QueueError;
use crate::transport::{RequestDescriptor, Transport, TransportResponse};
use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Builds the request descriptor for one item.
pub type DescriptorFactory = Arc<dyn Fn(&str) -> RequestDescriptor + Send + Sync>;

/// Where per-item request descriptors come from.
#[derive(Clone)]
pub enum DescriptorSource {
    /// The same descriptor is reused for every item
    Static(RequestDescriptor),
    /// Invoked lazily, at dispatch time, once per item
    Factory(DescriptorFactory),
}

impl DescriptorSource {
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&str) -> RequestDescriptor + Send + Sync + 'static,
    {
        DescriptorSource::Factory(Arc::new(factory))
    }

    fn resolve(&self, item: &str) -> RequestDescriptor {
        match self {
            DescriptorSource::Static(descriptor) => descriptor.clone(),
            DescriptorSource::Factory(factory) => factory(item),
        }
    }
}

/// Queue counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Items not yet dispatched
    pub pending: usize,
    /// Requests dispatched but not completed
    pub active: usize,
    /// Requests whose completion hook has run
    pub completed: usize,
}

/// One finished request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub item: String,
    pub response: TransportResponse,
}

/// Task queue for one batch of items
pub struct TaskQueue {
    items: Vec<String>,
    source: DescriptorSource,
    concurrency_limit: usize,
    transport: Arc<dyn Transport>,
    stats: Arc<RwLock<QueueStats>>,
}

impl TaskQueue {
    /// Create a queue. A concurrency limit of zero would never dispatch anything and is
    /// rejected.
    pub fn new(
        items: Vec<String>,
        source: DescriptorSource,
        concurrency_limit: usize,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, QueueError> {
        if concurrency_limit == 0 {
            return Err(QueueError::InvalidConcurrency(concurrency_limit));
        }
        let stats = QueueStats {
            pending: items.len(),
            ..QueueStats::default()
        };
        Ok(Self {
            items,
            source,
            concurrency_limit,
            transport,
            stats: Arc::new(RwLock::new(stats)),
        })
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    pub fn stats(&self) -> QueueStats {
        *self.stats.read()
    }

    /// Drain the queue. Resolves once every item has completed, with completions in
    /// input order.
    ///
    /// Requests are driven from this future rather than spawned, so each request is
    /// issued in input order as soon as a slot frees. A panic inside a completion hook
    /// or descriptor factory unwinds out of `run` at once and drops the requests still
    /// in flight.
    pub async fn run(self) -> Vec<Completion> {
        let TaskQueue {
            items,
            source,
            concurrency_limit,
            transport,
            stats,
        } = self;

        let total = items.len();
        debug!(total, concurrency_limit, "Task queue started");

        let mut pending = items.into_iter().enumerate();
        let mut in_flight = FuturesUnordered::new();
        let mut finished: Vec<Option<Completion>> = vec![None; total];

        loop {
            while in_flight.len() < concurrency_limit {
                let Some((index, item)) = pending.next() else {
                    break;
                };
                let descriptor = source.resolve(&item);
                {
                    let mut stats = stats.write();
                    stats.pending -= 1;
                    stats.active += 1;
                }
                debug!(
                    item = %item,
                    index,
                    target = %descriptor.target,
                    verb = %descriptor.verb,
                    "Dispatching queued request"
                );
                in_flight.push(issue(
                    index,
                    item,
                    descriptor,
                    Arc::clone(&transport),
                    Arc::clone(&stats),
                ));
            }

            match in_flight.next().await {
                Some((index, completion)) => finished[index] = Some(completion),
                None => break,
            }
        }

        let completions: Vec<Completion> = finished.into_iter().flatten().collect();
        debug!(completed = completions.len(), "Task queue drained");
        completions
    }

    /// Run the queue on the runtime and return a handle to it.
    pub fn spawn(self) -> QueueHandle {
        let stats = Arc::clone(&self.stats);
        QueueHandle {
            handle: tokio::spawn(self.run()),
            stats,
        }
    }
}

/// Send one request, then run its hook and free its slot.
async fn issue(
    index: usize,
    item: String,
    descriptor: RequestDescriptor,
    transport: Arc<dyn Transport>,
    stats: Arc<RwLock<QueueStats>>,
) -> (usize, Completion) {
    let RequestDescriptor {
        target,
        verb,
        payload,
        on_complete,
    } = descriptor;

    let response = transport.send(&target, &verb, payload.as_ref()).await;
    debug!(item = %item, status = response.status, "Queued request completed");

    if let Some(hook) = on_complete {
        hook(&response);
    }

    {
        let mut stats = stats.write();
        stats.active -= 1;
        stats.completed += 1;
    }

    (index, Completion { item, response })
}

/// Handle to a spawned queue run
pub struct QueueHandle {
    handle: JoinHandle<Vec<Completion>>,
    stats: Arc<RwLock<QueueStats>>,
}

impl QueueHandle {
    pub fn stats(&self) -> QueueStats {
        *self.stats.read()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the run to drain.
    pub async fn wait(self) -> Vec<Completion> {
        match self.handle.await {
            Ok(completions) => completions,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                error!(error = %e, "Task queue run was cancelled");
                Vec::new()
            }
        }
    }
}
