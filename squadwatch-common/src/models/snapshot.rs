use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hard capacity cap used when clamping reported counters.
pub const MAX_PLAYERS: u32 = 100;

/// Aggregate counters for one slot. All payload fields are optional; a slot
/// whose fetch failed (or whose id is blank) carries nulls across the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotStatus {
    pub idx: usize,
    pub players: Option<u32>,
    pub queue: Option<u32>,
    pub map: Option<String>,
    pub playtime_sec: Option<u64>,
}

impl SlotStatus {
    pub fn unavailable(idx: usize) -> Self {
        Self {
            idx,
            players: None,
            queue: None,
            map: None,
            playtime_sec: None,
        }
    }
}

/// The whole-fleet snapshot written once per cycle, in the document shape
/// the dashboard polls (`updatedAt` + one `results` entry per slot).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub updated_at: DateTime<Utc>,
    pub results: Vec<SlotStatus>,
}

/// Coerces a reported counter into the valid range. Non-finite input becomes
/// `None`; anything else is clamped to `[0, MAX_PLAYERS]`.
pub fn clamp_counter(value: f64) -> Option<u32> {
    if !value.is_finite() {
        return None;
    }
    Some(value.clamp(0.0, MAX_PLAYERS as f64) as u32)
}
