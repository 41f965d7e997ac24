//! Property-based tests for the task queue's in-flight ceiling

use drui::queue::{DescriptorSource, TaskQueue};
use drui::transport::mock::ScriptedTransport;
use drui::transport::RequestDescriptor;
use parking_lot::Mutex;
use proptest::prelude::*;
use reqwest::Method;
use std::collections::HashMap;
use std::sync::Arc;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap()
}

/// Never more than min(limit, items) requests in flight, every hook fires exactly
/// once, and results come back in input order.
#[test]
fn test_in_flight_never_exceeds_limit() {
    let mut runner = proptest::test_runner::TestRunner::new(ProptestConfig::with_cases(64));

    runner
        .run(&(0usize..40, 1usize..8), |(count, limit)| {
            let items: Vec<String> = (0..count).map(|i| format!("tag-{}", i)).collect();
            let transport = Arc::new(ScriptedTransport::immediate());
            let hooks: Arc<Mutex<HashMap<String, usize>>> = Arc::new(Mutex::new(HashMap::new()));

            let source = {
                let hooks = Arc::clone(&hooks);
                DescriptorSource::factory(move |item| {
                    let hooks = Arc::clone(&hooks);
                    let name = item.to_string();
                    RequestDescriptor::new(item, Method::DELETE).on_complete(move |_| {
                        *hooks.lock().entry(name.clone()).or_insert(0) += 1;
                    })
                })
            };
            let queue = TaskQueue::new(items.clone(), source, limit, transport.clone()).unwrap();
            let completions = runtime().block_on(queue.run());

            prop_assert!(transport.peak_in_flight() <= limit.min(count));
            prop_assert_eq!(transport.dispatched(), items.clone());
            prop_assert_eq!(
                completions.iter().map(|c| c.item.clone()).collect::<Vec<_>>(),
                items.clone()
            );
            let hooks = hooks.lock();
            prop_assert_eq!(hooks.len(), count);
            prop_assert!(hooks.values().all(|fired| *fired == 1));
            Ok(())
        })
        .unwrap();
}

/// A static descriptor is shared by every item; its hook fires once per item.
#[test]
fn test_static_descriptor_hook_fires_per_item() {
    let mut runner = proptest::test_runner::TestRunner::new(ProptestConfig::with_cases(32));

    runner
        .run(&(1usize..20, 1usize..6), |(count, limit)| {
            let items: Vec<String> = (0..count).map(|i| i.to_string()).collect();
            let transport = Arc::new(ScriptedTransport::immediate());
            let fired = Arc::new(Mutex::new(0usize));
            let descriptor = {
                let fired = Arc::clone(&fired);
                RequestDescriptor::new("/_/shared", Method::GET)
                    .on_complete(move |_| *fired.lock() += 1)
            };

            let queue = TaskQueue::new(
                items,
                DescriptorSource::Static(descriptor),
                limit,
                transport.clone(),
            )
            .unwrap();
            runtime().block_on(queue.run());

            prop_assert_eq!(*fired.lock(), count);
            prop_assert!(transport.dispatched().iter().all(|target| target == "/_/shared"));
            Ok(())
        })
        .unwrap();
}
