//! DRUI: Docker Registry UI
//!
//! Terminal front-end for browsing and managing images stored in a Docker Registry
//! (HTTP API v2). Besides the listing and inspection commands, it provides the batch
//! tag deletion flow: a modal session controller locked while a bounded-concurrency
//! task queue drains the selected tags against the registry.

pub mod cli;
pub mod config;
pub mod error;
pub mod flow;
pub mod format;
pub mod logging;
pub mod modal;
pub mod queue;
pub mod registry;
pub mod selection;
pub mod store;
pub mod theme;
pub mod transport;
