//! Durable status snapshot, the JSON document the dashboard polls.

use std::path::Path;

use tracing::{error, warn};

use squadwatch_common::models::snapshot::{SlotStatus, StatusSnapshot};

use crate::publish::replace_file;
use crate::Error;

pub async fn write_snapshot_file(path: &Path, snapshot: &StatusSnapshot) -> Result<(), Error> {
    let mut content = serde_json::to_string_pretty(snapshot)?;
    content.push('\n');
    replace_file(path, &content).inspect_err(|e| {
        error!("failed to write snapshot file {}: {e}", path.display());
    })
}

/// Reads the snapshot back, normalized to exactly `slots` rows by `idx`.
/// Missing rows, a malformed document, or an unreadable file all degrade to
/// all-null rows so the publisher renders placeholders instead of failing.
pub async fn read_snapshot_file(path: &Path, slots: usize) -> Vec<SlotStatus> {
    let parsed: Option<StatusSnapshot> = match tokio::fs::read_to_string(path).await {
        Ok(text) => serde_json::from_str(&text)
            .inspect_err(|e| warn!("malformed snapshot file {}: {e}", path.display()))
            .ok(),
        Err(e) => {
            warn!("failed to read snapshot file {}: {e}", path.display());
            None
        }
    };

    let results = parsed.map(|s| s.results).unwrap_or_default();
    (0..slots)
        .map(|idx| {
            results
                .iter()
                .find(|row| row.idx == idx)
                .cloned()
                .unwrap_or_else(|| SlotStatus::unavailable(idx))
        })
        .collect()
}
