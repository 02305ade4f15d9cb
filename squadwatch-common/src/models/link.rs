/// Steam app the synthesized lobby links point at (Squad).
pub const APP_ID: &str = "393380";

/// Scheme prefix every published join target must carry.
pub const LOBBY_LINK_PREFIX: &str = "steam://joinlobby/";

/// The resolution pipeline's per-slot output. `None` means "no confident
/// resolution this cycle" and serializes as an empty line in the links file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    pub slot: usize,
    pub join_target: Option<String>,
}

impl ResolvedLink {
    pub fn empty(slot: usize) -> Self {
        Self {
            slot,
            join_target: None,
        }
    }

    pub fn resolved(slot: usize, join_target: impl Into<String>) -> Self {
        Self {
            slot,
            join_target: Some(join_target.into()),
        }
    }
}

/// Synthesizes the join target for a lobby seen through one public profile.
pub fn join_target(lobby_group: &str, identity_id: &str) -> String {
    format!("{LOBBY_LINK_PREFIX}{APP_ID}/{lobby_group}/{identity_id}")
}

/// Whether a line read back from the links file is a usable join target.
pub fn is_valid_join_target(link: &str) -> bool {
    link.starts_with(LOBBY_LINK_PREFIX)
}
