//! Idempotent status publisher.
//!
//! Per cycle: delete the messages remembered from the previous cycle, run
//! the deep sweep when due, read the durable snapshot and link files, then
//! send one fresh embed per slot. The remembered set is in-memory only; the
//! deep sweep is what recovers the channel after a restart, by deleting
//! every embed-carrying message this bot authored in recent history.
//!
//! At most one cycle runs at a time. The running flag is the only mutable
//! state shared across cycles and is released by a drop guard on every exit
//! path.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use squadwatch_common::models::PublishedMessage;

use crate::discord::api::ChannelApi;
use crate::discord::render::render_status_embed;
use crate::publish::links::read_links_file;
use crate::publish::snapshot_file::read_snapshot_file;
use crate::retry::{is_transient, RetryPolicy};
use crate::Error;

const SWEEP_FETCH_LIMIT: u16 = 100;

#[derive(Debug, Clone)]
pub struct PublisherSettings {
    pub slots: usize,
    pub links_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub join_base: String,
    pub title_prefix: String,
    /// Minimum spacing between deep sweeps.
    pub sweep_interval: Duration,
    /// Delay between successive destructive channel operations.
    pub pacing_delay: Duration,
    pub message_retry: RetryPolicy,
    pub channel_retry: RetryPolicy,
}

impl PublisherSettings {
    pub fn new(
        slots: usize,
        links_path: impl Into<PathBuf>,
        snapshot_path: impl Into<PathBuf>,
        join_base: impl Into<String>,
    ) -> Self {
        Self {
            slots,
            links_path: links_path.into(),
            snapshot_path: snapshot_path.into(),
            join_base: join_base.into(),
            title_prefix: "Server".to_string(),
            sweep_interval: Duration::from_secs(600),
            pacing_delay: Duration::from_millis(300),
            message_retry: RetryPolicy::new(3, Duration::from_millis(500)),
            channel_retry: RetryPolicy::new(5, Duration::from_millis(500)),
        }
    }
}

/// What a publish cycle did. A cycle that found another one still running
/// is skipped entirely, never queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed,
    Skipped,
}

struct PublisherState {
    posted: Vec<PublishedMessage>,
    last_sweep: Option<Instant>,
}

pub struct ChatPublisher {
    api: Arc<dyn ChannelApi>,
    bot_user_id: u64,
    settings: PublisherSettings,
    state: Mutex<PublisherState>,
    running: AtomicBool,
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ChatPublisher {
    /// Validates connectivity (with the channel-level retry policy) and
    /// builds the publisher. The remembered message set starts empty; the
    /// first deep sweep picks up anything a previous process left behind.
    pub async fn connect(
        api: Arc<dyn ChannelApi>,
        settings: PublisherSettings,
    ) -> Result<Self, Error> {
        let bot_user_id = settings
            .channel_retry
            .run("chat login", is_transient, || api.current_user_id())
            .await?;
        info!("chat publisher connected as user {bot_user_id}");
        Ok(Self {
            api,
            bot_user_id,
            settings,
            state: Mutex::new(PublisherState {
                posted: Vec::new(),
                last_sweep: None,
            }),
            running: AtomicBool::new(false),
        })
    }

    /// The currently-live message set, in slot order.
    pub async fn published(&self) -> Vec<PublishedMessage> {
        self.state.lock().await.posted.clone()
    }

    pub async fn run_cycle(&self) -> Result<CycleOutcome, Error> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("skipping publish cycle: previous run still in progress");
            return Ok(CycleOutcome::Skipped);
        }
        let _guard = RunningGuard(&self.running);

        let mut state = self.state.lock().await;

        // Replace-by-id: drop everything we remember posting last cycle.
        let remembered: Vec<PublishedMessage> = state.posted.drain(..).collect();
        for message in remembered {
            self.delete_best_effort(message.message_id).await;
        }

        let sweep_due = state
            .last_sweep
            .is_none_or(|at| at.elapsed() >= self.settings.sweep_interval);
        if sweep_due {
            if let Err(e) = self.deep_sweep().await {
                warn!("deep sweep failed: {e}");
            }
            state.last_sweep = Some(Instant::now());
        }

        let statuses = read_snapshot_file(&self.settings.snapshot_path, self.settings.slots).await;
        let links = read_links_file(&self.settings.links_path, self.settings.slots).await;

        for (slot, status) in statuses.iter().enumerate() {
            let embed = render_status_embed(
                slot,
                status,
                links[slot].as_deref(),
                &self.settings.join_base,
                &self.settings.title_prefix,
            );
            let sent = self
                .settings
                .message_retry
                .run("send status message", is_transient, || {
                    self.api.send_status_embed(&embed)
                })
                .await;
            match sent {
                Ok(message_id) => state.posted.push(PublishedMessage { slot, message_id }),
                Err(e) => error!("slot {slot}: failed to send status message: {e}"),
            }
            self.pace().await;
        }

        Ok(CycleOutcome::Completed)
    }

    /// Deletes every embed-carrying message this bot authored in recent
    /// channel history. This is the restart-recovery path: remembered ids
    /// die with the process, the channel does not.
    async fn deep_sweep(&self) -> Result<(), Error> {
        let messages = self
            .settings
            .channel_retry
            .run("fetch channel history", is_transient, || {
                self.api.recent_messages(SWEEP_FETCH_LIMIT)
            })
            .await?;

        let stale: Vec<u64> = messages
            .into_iter()
            .filter(|m| m.author_id == self.bot_user_id && m.has_embeds)
            .map(|m| m.id)
            .collect();
        if !stale.is_empty() {
            info!("deep sweep: deleting {} stale status messages", stale.len());
        }
        for message_id in stale {
            self.delete_best_effort(message_id).await;
        }
        Ok(())
    }

    /// A missing or already-deleted message is not an error.
    async fn delete_best_effort(&self, message_id: u64) {
        let deleted = self
            .settings
            .message_retry
            .run("delete status message", is_transient, || {
                self.api.delete_message(message_id)
            })
            .await;
        if let Err(e) = deleted {
            debug!("message {message_id} already gone or undeletable: {e}");
        }
        self.pace().await;
    }

    async fn pace(&self) {
        if !self.settings.pacing_delay.is_zero() {
            sleep(self.settings.pacing_delay).await;
        }
    }
}
