//! Integration tests for the bounded concurrency task queue
//!
//! Tests cover:
//! - Dispatch order and the in-flight ceiling
//! - Refilling freed slots from the pending items
//! - Completion hooks firing once, in completion order
//! - Lazy descriptor factories

use super::test_utils::{settle, strings, wait_until};
use drui::queue::{DescriptorSource, QueueStats, TaskQueue};
use drui::transport::mock::ScriptedTransport;
use drui::transport::{RequestDescriptor, TransportResponse};
use parking_lot::Mutex;
use reqwest::Method;
use std::sync::Arc;

fn recording_factory(hooks: Arc<Mutex<Vec<String>>>) -> DescriptorSource {
    DescriptorSource::factory(move |item| {
        let hooks = Arc::clone(&hooks);
        let name = item.to_string();
        RequestDescriptor::new(item, Method::DELETE).on_complete(move |_| hooks.lock().push(name.clone()))
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slots_refill_in_input_order() {
    let transport = Arc::new(ScriptedTransport::gated());
    let hooks = Arc::new(Mutex::new(Vec::new()));
    let queue = TaskQueue::new(
        strings(&["a", "b", "c", "d", "e"]),
        recording_factory(Arc::clone(&hooks)),
        2,
        transport.clone(),
    )
    .unwrap();
    let handle = queue.spawn();

    transport.wait_for_dispatches(2).await;
    settle().await;
    assert_eq!(transport.dispatched(), vec!["a", "b"]);
    assert_eq!(
        handle.stats(),
        QueueStats {
            pending: 3,
            active: 2,
            completed: 0
        }
    );

    assert!(transport.release("a"));
    transport.wait_for_dispatches(3).await;
    settle().await;
    assert_eq!(transport.dispatched(), vec!["a", "b", "c"]);
    assert_eq!(transport.in_flight(), 2);

    assert!(transport.release("b"));
    transport.wait_for_dispatches(4).await;
    assert!(transport.release("c"));
    transport.wait_for_dispatches(5).await;
    assert_eq!(transport.dispatched(), vec!["a", "b", "c", "d", "e"]);

    assert!(transport.release("e"));
    wait_until(|| hooks.lock().len() == 4).await;
    assert!(transport.release("d"));
    let completions = handle.wait().await;

    let items: Vec<&str> = completions.iter().map(|c| c.item.as_str()).collect();
    assert_eq!(items, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(hooks.lock().clone(), vec!["a", "b", "c", "e", "d"]);
    assert_eq!(transport.peak_in_flight(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_limit_above_item_count_dispatches_everything() {
    let transport = Arc::new(ScriptedTransport::gated());
    let queue = TaskQueue::new(
        strings(&["x", "y", "z"]),
        DescriptorSource::factory(|item| RequestDescriptor::new(item, Method::DELETE)),
        5,
        transport.clone(),
    )
    .unwrap();
    let handle = queue.spawn();

    transport.wait_for_dispatches(3).await;
    assert_eq!(transport.in_flight(), 3);
    assert_eq!(handle.stats().pending, 0);

    for item in ["z", "x", "y"] {
        assert!(transport.release(item));
    }
    let completions = handle.wait().await;
    assert_eq!(completions.len(), 3);
    assert!(completions.iter().all(|c| c.response.is_success()));
}

#[tokio::test]
async fn test_failures_are_reported_not_retried() {
    let transport = Arc::new(ScriptedTransport::immediate().script("b", 500, "boom"));
    let hooks = Arc::new(Mutex::new(Vec::new()));
    let queue = TaskQueue::new(
        strings(&["a", "b", "c"]),
        recording_factory(Arc::clone(&hooks)),
        1,
        transport.clone(),
    )
    .unwrap();

    let completions = queue.run().await;

    assert_eq!(completions[1].response, TransportResponse::new(500, "boom"));
    assert_eq!(transport.dispatched(), vec!["a", "b", "c"]);
    assert_eq!(hooks.lock().len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_factory_runs_at_dispatch_time() {
    let transport = Arc::new(ScriptedTransport::gated());
    let built = Arc::new(Mutex::new(Vec::new()));
    let source = {
        let built = Arc::clone(&built);
        DescriptorSource::factory(move |item| {
            built.lock().push(item.to_string());
            RequestDescriptor::new(item, Method::DELETE)
        })
    };
    let handle = TaskQueue::new(strings(&["p", "q"]), source, 1, transport.clone())
        .unwrap()
        .spawn();

    transport.wait_for_dispatches(1).await;
    settle().await;
    assert_eq!(built.lock().clone(), vec!["p"]);

    assert!(transport.release("p"));
    wait_until(|| built.lock().len() == 2).await;
    transport.wait_for_dispatches(2).await;
    assert!(transport.release("q"));

    handle.wait().await;
    assert_eq!(transport.in_flight(), 0);
    assert_eq!(transport.completed(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_dispatch_follows_input_order_on_worker_pool() {
    let items: Vec<String> = (0..8).map(|i| format!("i{}", i)).collect();
    for _ in 0..50 {
        let transport = Arc::new(ScriptedTransport::immediate());
        let queue = TaskQueue::new(
            items.clone(),
            DescriptorSource::factory(|item| RequestDescriptor::new(item, Method::DELETE)),
            8,
            transport.clone(),
        )
        .unwrap();

        let completions = queue.spawn().wait().await;

        assert_eq!(transport.dispatched(), items);
        assert_eq!(completions.len(), 8);
    }
}
