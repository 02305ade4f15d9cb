//! Scheduled link-resolution loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::error;

use crate::pipeline::LinkResolver;
use crate::publish::links::write_links_file;
use crate::sources::roster;
use crate::Error;

/// One full resolution cycle: fresh roster read, sequential per-slot
/// resolution, atomic link-set replace. Durable-write failure is the only
/// error that escapes; the scheduler logs it and the next tick retries.
pub async fn run_link_cycle(
    resolver: &LinkResolver,
    roster_path: &Path,
    links_path: &Path,
    slots: usize,
) -> Result<(), Error> {
    let servers = roster::read_roster(roster_path, slots).await;
    let links = resolver.resolve_cycle(&servers).await;
    write_links_file(links_path, &links).await
}

/// Spawns the resolution loop. One cycle at a time; ticks that land while a
/// cycle is still running are skipped, not queued.
pub fn spawn_link_resolution_task(
    resolver: Arc<LinkResolver>,
    roster_path: PathBuf,
    links_path: PathBuf,
    slots: usize,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = run_link_cycle(&resolver, &roster_path, &links_path, slots).await {
                error!("link resolution cycle failed: {e}");
            }
        }
    })
}
