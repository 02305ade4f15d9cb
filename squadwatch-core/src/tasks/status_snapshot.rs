//! Scheduled status-snapshot loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::error;

use crate::pipeline::StatusSnapshotter;
use crate::publish::snapshot_file::write_snapshot_file;
use crate::sources::roster;
use crate::Error;

pub async fn run_snapshot_cycle(
    snapshotter: &StatusSnapshotter,
    roster_path: &Path,
    snapshot_path: &Path,
    slots: usize,
) -> Result<(), Error> {
    let servers = roster::read_roster(roster_path, slots).await;
    let snapshot = snapshotter.snapshot_cycle(&servers).await;
    write_snapshot_file(snapshot_path, &snapshot).await
}

pub fn spawn_status_snapshot_task(
    snapshotter: Arc<StatusSnapshotter>,
    roster_path: PathBuf,
    snapshot_path: PathBuf,
    slots: usize,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) =
                run_snapshot_cycle(&snapshotter, &roster_path, &snapshot_path, slots).await
            {
                error!("status snapshot cycle failed: {e}");
            }
        }
    })
}
