// squadwatch-core/tests/publisher_tests.rs
//
// Exercises the chat publisher's idempotent-publish contract against an
// in-memory channel: at most one live bot message per slot, restart
// recovery through the deep sweep, and the single-cycle-at-a-time guard.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use squadwatch_common::models::{ChannelMessage, ResolvedLink, StatusEmbed};
use squadwatch_core::discord::{ChatPublisher, ChannelApi, CycleOutcome, PublisherSettings};
use squadwatch_core::publish::links::write_links_file;
use squadwatch_core::Error;

const BOT_ID: u64 = 42;
const OTHER_USER: u64 = 7;

/// In-memory stand-in for the channel. Deleting a missing message fails the
/// way the real API does, sends can be slowed down to provoke overlap.
struct MockChannel {
    messages: Mutex<Vec<ChannelMessage>>,
    next_id: AtomicU64,
    send_delay: Duration,
}

impl MockChannel {
    fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            send_delay: Duration::ZERO,
        }
    }

    fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    fn seed(&self, author_id: u64, has_embeds: bool) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.messages.lock().unwrap().push(ChannelMessage {
            id,
            author_id,
            has_embeds,
        });
        id
    }

    fn live(&self) -> Vec<ChannelMessage> {
        self.messages.lock().unwrap().clone()
    }

    fn live_bot_embeds(&self) -> usize {
        self.live()
            .iter()
            .filter(|m| m.author_id == BOT_ID && m.has_embeds)
            .count()
    }
}

#[async_trait]
impl ChannelApi for MockChannel {
    async fn current_user_id(&self) -> Result<u64, Error> {
        Ok(BOT_ID)
    }

    async fn recent_messages(&self, limit: u16) -> Result<Vec<ChannelMessage>, Error> {
        let mut messages = self.live();
        messages.reverse();
        messages.truncate(limit as usize);
        Ok(messages)
    }

    async fn delete_message(&self, message_id: u64) -> Result<(), Error> {
        let mut messages = self.messages.lock().unwrap();
        let before = messages.len();
        messages.retain(|m| m.id != message_id);
        if messages.len() == before {
            return Err(Error::Platform("Unknown Message".into()));
        }
        Ok(())
    }

    async fn send_status_embed(&self, _embed: &StatusEmbed) -> Result<u64, Error> {
        if !self.send_delay.is_zero() {
            tokio::time::sleep(self.send_delay).await;
        }
        Ok(self.seed(BOT_ID, true))
    }
}

fn settings(dir: &TempDir, slots: usize) -> PublisherSettings {
    let mut settings = PublisherSettings::new(
        slots,
        dir.path().join("links.txt"),
        dir.path().join("players.json"),
        "http://example.net",
    );
    settings.pacing_delay = Duration::ZERO;
    settings
}

async fn seed_files(dir: &TempDir, slots: usize) {
    let links: Vec<ResolvedLink> = (0..slots)
        .map(|slot| {
            if slot % 2 == 0 {
                ResolvedLink::resolved(slot, format!("steam://joinlobby/393380/{slot}/1"))
            } else {
                ResolvedLink::empty(slot)
            }
        })
        .collect();
    write_links_file(&dir.path().join("links.txt"), &links)
        .await
        .unwrap();
}

#[tokio::test]
async fn each_cycle_replaces_the_previous_message_set() {
    let dir = TempDir::new().unwrap();
    seed_files(&dir, 4).await;
    let channel = Arc::new(MockChannel::new());
    let publisher = ChatPublisher::connect(channel.clone(), settings(&dir, 4))
        .await
        .unwrap();

    assert_eq!(publisher.run_cycle().await.unwrap(), CycleOutcome::Completed);
    let first: Vec<u64> = publisher.published().await.iter().map(|m| m.message_id).collect();
    assert_eq!(first.len(), 4);
    assert_eq!(channel.live_bot_embeds(), 4);

    assert_eq!(publisher.run_cycle().await.unwrap(), CycleOutcome::Completed);
    let second: Vec<u64> = publisher.published().await.iter().map(|m| m.message_id).collect();
    assert_eq!(second.len(), 4);
    assert_eq!(
        channel.live_bot_embeds(),
        4,
        "old messages must be deleted, never accumulated"
    );
    assert!(first.iter().all(|id| !second.contains(id)));

    // One message per slot, slot order.
    let slots: Vec<usize> = publisher.published().await.iter().map(|m| m.slot).collect();
    assert_eq!(slots, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn deep_sweep_recovers_after_a_restart() {
    let dir = TempDir::new().unwrap();
    seed_files(&dir, 2).await;
    let channel = Arc::new(MockChannel::new());

    // Leftovers from a crashed process: three stale status embeds, plus a
    // human message and a bot message without embeds that must survive.
    channel.seed(BOT_ID, true);
    channel.seed(BOT_ID, true);
    channel.seed(BOT_ID, true);
    let human = channel.seed(OTHER_USER, true);
    let plain_bot = channel.seed(BOT_ID, false);

    let publisher = ChatPublisher::connect(channel.clone(), settings(&dir, 2))
        .await
        .unwrap();
    publisher.run_cycle().await.unwrap();

    assert_eq!(channel.live_bot_embeds(), 2, "only this cycle's messages remain");
    let live: Vec<u64> = channel.live().iter().map(|m| m.id).collect();
    assert!(live.contains(&human));
    assert!(live.contains(&plain_bot));
}

#[tokio::test]
async fn sweep_is_throttled_between_cycles() {
    let dir = TempDir::new().unwrap();
    seed_files(&dir, 1).await;
    let channel = Arc::new(MockChannel::new());
    let mut settings = settings(&dir, 1);
    settings.sweep_interval = Duration::from_secs(3600);

    let publisher = ChatPublisher::connect(channel.clone(), settings)
        .await
        .unwrap();
    publisher.run_cycle().await.unwrap();

    // A stale embed appearing between cycles is the sweep's job, and the
    // sweep is not due again for an hour.
    channel.seed(BOT_ID, true);
    publisher.run_cycle().await.unwrap();
    assert_eq!(channel.live_bot_embeds(), 2);
}

#[tokio::test]
async fn overlapping_cycles_are_skipped_not_queued() {
    let dir = TempDir::new().unwrap();
    seed_files(&dir, 2).await;
    let channel = Arc::new(MockChannel::new().with_send_delay(Duration::from_millis(200)));
    let publisher = Arc::new(
        ChatPublisher::connect(channel.clone(), settings(&dir, 2))
            .await
            .unwrap(),
    );

    let slow = {
        let publisher = publisher.clone();
        tokio::spawn(async move { publisher.run_cycle().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(publisher.run_cycle().await.unwrap(), CycleOutcome::Skipped);
    assert_eq!(slow.await.unwrap().unwrap(), CycleOutcome::Completed);

    // The guard is released once the slow cycle finishes.
    assert_eq!(publisher.run_cycle().await.unwrap(), CycleOutcome::Completed);
}

#[tokio::test]
async fn missing_durable_files_still_publish_placeholder_embeds() {
    let dir = TempDir::new().unwrap();
    let channel = Arc::new(MockChannel::new());
    let publisher = ChatPublisher::connect(channel.clone(), settings(&dir, 3))
        .await
        .unwrap();

    publisher.run_cycle().await.unwrap();
    assert_eq!(channel.live_bot_embeds(), 3);
}
