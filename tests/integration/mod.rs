//! Integration tests for the DRUI registry front-end

mod batch_delete;
mod cli_commands;
mod modal_session;
mod task_queue;
mod test_utils;
