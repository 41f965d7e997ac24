//! Scripted transport for tests.
//!
//! Records dispatch order and tracks how many requests are in flight. In gated mode
//! each request waits until the test releases it, so completion order is chosen by
//! the test rather than by the scheduler.

use super::{Transport, TransportResponse};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, Notify};

#[derive(Default)]
struct ScriptState {
    dispatched: Vec<String>,
    in_flight: usize,
    peak_in_flight: usize,
    completed: usize,
    scripted: HashMap<String, TransportResponse>,
    gates: HashMap<String, oneshot::Sender<TransportResponse>>,
}

/// Transport double that answers from a script.
#[derive(Clone)]
pub struct ScriptedTransport {
    state: Arc<Mutex<ScriptState>>,
    dispatch_signal: Arc<Notify>,
    gated: bool,
}

impl ScriptedTransport {
    /// Every request completes right away (after one scheduler yield).
    pub fn immediate() -> Self {
        Self::with_mode(false)
    }

    /// Every request waits for `release` / `release_with`.
    pub fn gated() -> Self {
        Self::with_mode(true)
    }

    fn with_mode(gated: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState::default())),
            dispatch_signal: Arc::new(Notify::new()),
            gated,
        }
    }

    /// Answer requests for `target` with the given status and body.
    pub fn script(self, target: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.state
            .lock()
            .scripted
            .insert(target.into(), TransportResponse::new(status, body));
        self
    }

    /// Release a gated request with its scripted (or default 200) response.
    /// Returns false when no request for `target` is waiting.
    pub fn release(&self, target: &str) -> bool {
        let response = self.scripted_response(target);
        self.release_with(target, response)
    }

    pub fn release_with(&self, target: &str, response: TransportResponse) -> bool {
        let gate = self.state.lock().gates.remove(target);
        match gate {
            Some(sender) => sender.send(response).is_ok(),
            None => false,
        }
    }

    /// Wait until at least `count` requests have been dispatched.
    pub async fn wait_for_dispatches(&self, count: usize) {
        loop {
            let notified = self.dispatch_signal.notified();
            if self.state.lock().dispatched.len() >= count {
                return;
            }
            notified.await;
        }
    }

    pub fn dispatched(&self) -> Vec<String> {
        self.state.lock().dispatched.clone()
    }

    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    pub fn peak_in_flight(&self) -> usize {
        self.state.lock().peak_in_flight
    }

    pub fn completed(&self) -> usize {
        self.state.lock().completed
    }

    fn scripted_response(&self, target: &str) -> TransportResponse {
        self.state
            .lock()
            .scripted
            .get(target)
            .cloned()
            .unwrap_or_else(|| TransportResponse::ok(format!("{} done", target)))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, target: &str, _verb: &Method, _payload: Option<&Value>) -> TransportResponse {
        let gate = {
            let mut state = self.state.lock();
            state.dispatched.push(target.to_string());
            state.in_flight += 1;
            state.peak_in_flight = state.peak_in_flight.max(state.in_flight);
            if self.gated {
                let (sender, receiver) = oneshot::channel();
                state.gates.insert(target.to_string(), sender);
                Some(receiver)
            } else {
                None
            }
        };
        self.dispatch_signal.notify_waiters();

        let response = match gate {
            Some(receiver) => match receiver.await {
                Ok(response) => response,
                Err(_) => TransportResponse::new(503, "gate dropped"),
            },
            None => {
                tokio::task::yield_now().await;
                self.scripted_response(target)
            }
        };

        let mut state = self.state.lock();
        state.in_flight -= 1;
        state.completed += 1;
        response
    }
}
