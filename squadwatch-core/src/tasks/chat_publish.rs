//! Scheduled chat-publish loop.
//!
//! The publisher carries its own running-flag guard, so this loop only has
//! to tick it; an overlapping tick comes back as a skipped cycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::error;

use crate::discord::ChatPublisher;

pub fn spawn_chat_publish_task(publisher: Arc<ChatPublisher>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = publisher.run_cycle().await {
                error!("chat publish cycle failed: {e}");
            }
        }
    })
}
