//! Monitored-server roster file.
//!
//! One external id per line, fixed slot order. `#` lines are comments,
//! leading blank lines (header spacing) are dropped, and interior blanks
//! are kept so individual slots can be disabled. The list is truncated or
//! padded to exactly the configured slot count.

use std::path::Path;

use tracing::{error, info};

use squadwatch_common::models::MonitoredServer;

pub fn parse_roster(text: &str, slots: usize) -> Vec<MonitoredServer> {
    let mut lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .collect();

    while lines.first().is_some_and(|line| line.is_empty()) {
        lines.remove(0);
    }
    lines.truncate(slots);
    while lines.len() < slots {
        lines.push("");
    }

    lines
        .into_iter()
        .enumerate()
        .map(|(slot, id)| MonitoredServer::new(slot, id))
        .collect()
}

/// Reads the roster fresh for one cycle. A missing or unreadable file is
/// logged and degrades to all-disabled slots rather than aborting the cycle.
pub async fn read_roster(path: &Path, slots: usize) -> Vec<MonitoredServer> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => {
            let servers = parse_roster(&text, slots);
            info!(
                "parsed {} roster entries from {}",
                servers.iter().filter(|s| s.is_enabled()).count(),
                path.display()
            );
            servers
        }
        Err(e) => {
            error!("failed to read roster file {}: {e}", path.display());
            (0..slots).map(|slot| MonitoredServer::new(slot, "")).collect()
        }
    }
}
