// File: squadwatch-common/src/models/mod.rs
pub mod server;
pub mod identity;
pub mod link;
pub mod snapshot;
pub mod message;

pub use server::MonitoredServer;
pub use identity::{IdentityProfile, LobbyCandidate, PresenceRoster, Visibility};
pub use link::ResolvedLink;
pub use snapshot::{SlotStatus, StatusSnapshot};
pub use message::{ChannelMessage, PublishedMessage, StatusEmbed, StatusEmbedField};
