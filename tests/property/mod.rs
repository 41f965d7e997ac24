//! Property-based tests for the task queue

mod concurrency_ceiling;
mod tag_ordering;
