// File: src/discord/mod.rs

pub mod api;
pub mod publisher;
pub mod render;

pub use api::{ChannelApi, TwilightChannelApi};
pub use publisher::{ChatPublisher, CycleOutcome, PublisherSettings};
