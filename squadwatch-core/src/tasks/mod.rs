// File: src/tasks/mod.rs

pub mod chat_publish;
pub mod link_resolution;
pub mod status_snapshot;

pub use chat_publish::spawn_chat_publish_task;
pub use link_resolution::{run_link_cycle, spawn_link_resolution_task};
pub use status_snapshot::{run_snapshot_cycle, spawn_status_snapshot_task};
