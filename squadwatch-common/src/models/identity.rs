use serde::{Deserialize, Serialize};

/// Profile visibility as reported by the identity API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Restricted,
    Unknown,
}

/// One resolved identity: visibility plus the optional lobby grouping token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProfile {
    pub id: String,
    pub visibility: Visibility,
    pub lobby_group: Option<String>,
}

/// Presence tokens for one server, in first-seen order.
///
/// The order is load-bearing: the lobby voter walks it front to back and the
/// earliest candidate wins ties, so this stays a ranked sequence rather than
/// a set. Duplicates are rejected on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceRoster {
    tokens: Vec<String>,
}

impl PresenceRoster {
    pub fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Appends a token unless it was already observed. Returns whether the
    /// token was newly added.
    pub fn push_unique(&mut self, token: impl Into<String>) -> bool {
        let token = token.into();
        if self.tokens.iter().any(|t| *t == token) {
            return false;
        }
        self.tokens.push(token);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl FromIterator<String> for PresenceRoster {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut roster = Self::new();
        for token in iter {
            roster.push_unique(token);
        }
        roster
    }
}

/// A joinable lobby seen through one public profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbyCandidate {
    pub identity_id: String,
    pub lobby_group: String,
    pub join_target: String,
}
