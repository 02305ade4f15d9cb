//! Status snapshotter: aggregate counters per slot, one document per cycle.
//!
//! Runs on its own schedule, independent of link resolution. A per-slot
//! fetch failure yields an all-null row for that slot; the snapshot itself
//! is always complete and carries a fresh timestamp.

use chrono::Utc;
use tracing::warn;

use squadwatch_common::models::snapshot::{clamp_counter, SlotStatus, StatusSnapshot};
use squadwatch_common::models::MonitoredServer;

use crate::sources::monitoring::{MonitoringClient, ServerAttributes};

pub struct StatusSnapshotter {
    monitoring: MonitoringClient,
}

impl StatusSnapshotter {
    pub fn new(monitoring: MonitoringClient) -> Self {
        Self { monitoring }
    }

    pub async fn snapshot_cycle(&self, servers: &[MonitoredServer]) -> StatusSnapshot {
        let mut results = Vec::with_capacity(servers.len());
        for server in servers {
            if !server.is_enabled() {
                results.push(SlotStatus::unavailable(server.slot));
                continue;
            }
            match self.monitoring.fetch_status(&server.external_id).await {
                Ok(attrs) => results.push(slot_status(server.slot, &attrs)),
                Err(e) => {
                    warn!(
                        "slot {} ({}): status fetch failed: {e}",
                        server.slot, server.external_id
                    );
                    results.push(SlotStatus::unavailable(server.slot));
                }
            }
        }
        StatusSnapshot {
            updated_at: Utc::now(),
            results,
        }
    }
}

fn slot_status(idx: usize, attrs: &ServerAttributes) -> SlotStatus {
    SlotStatus {
        idx,
        players: attrs.players.and_then(clamp_counter),
        queue: attrs.queue.and_then(clamp_counter),
        map: attrs.map.clone(),
        playtime_sec: attrs
            .playtime_sec
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as u64),
    }
}
