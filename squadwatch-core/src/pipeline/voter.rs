//! Lobby vote: pick the one join target most of the observed crowd is in.
//!
//! Presence lists carry decoys and stale sessions, so a single profile is
//! never trusted. Instead, public profiles carrying a lobby token are
//! collected in observed order up to a bounded sample, and the lobby with
//! the plurality of members wins. Ties resolve to the first group that
//! reaches the maximum while scanning candidates in order, which keeps the
//! vote deterministic and biased toward earlier-observed identities.

use std::collections::HashMap;

use squadwatch_common::models::{
    link, IdentityProfile, LobbyCandidate, PresenceRoster, Visibility,
};

pub const DEFAULT_SAMPLE_SIZE: usize = 20;

pub fn clamp_sample_size(requested: usize) -> usize {
    requested.clamp(1, 100)
}

/// Runs the vote. Returns `None` when no public profile with a lobby token
/// is present — the caller publishes an empty link for that cycle.
pub fn pick_lobby(
    roster: &PresenceRoster,
    profiles: &[IdentityProfile],
    sample_cap: usize,
) -> Option<LobbyCandidate> {
    let sample_cap = clamp_sample_size(sample_cap);
    let by_id: HashMap<&str, &IdentityProfile> =
        profiles.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut candidates: Vec<LobbyCandidate> = Vec::new();
    for token in roster.iter() {
        let Some(profile) = by_id.get(token) else {
            continue;
        };
        if profile.visibility != Visibility::Public {
            continue;
        }
        let Some(lobby_group) = &profile.lobby_group else {
            continue;
        };
        candidates.push(LobbyCandidate {
            identity_id: profile.id.clone(),
            lobby_group: lobby_group.clone(),
            join_target: link::join_target(lobby_group, &profile.id),
        });
        if candidates.len() >= sample_cap {
            break;
        }
    }

    if candidates.is_empty() {
        return None;
    }

    let mut tally: HashMap<&str, u32> = HashMap::new();
    for candidate in &candidates {
        *tally.entry(candidate.lobby_group.as_str()).or_insert(0) += 1;
    }

    // Strictly-greater replacement: the first candidate whose group reaches
    // the running maximum wins, so equal tallies resolve to the earliest.
    let mut best = &candidates[0];
    let mut best_count = tally[best.lobby_group.as_str()];
    for candidate in &candidates[1..] {
        let count = tally[candidate.lobby_group.as_str()];
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    Some(best.clone())
}
