//! Shared retry discipline for upstream calls.
//!
//! One policy object carries the attempt cap and base delay; the transient
//! classifier is passed explicitly so call sites state which failures they
//! consider retryable. Backoff doubles per attempt from the base delay.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::Error;

/// Failure signatures treated as likely-to-succeed-on-retry when they show
/// up in stringified platform errors.
const TRANSIENT_SIGNATURES: &[&str] = &[
    "timed out",
    "timeout",
    "connection reset",
    "reset by peer",
    "connection refused",
    "dns error",
    "temporary failure in name resolution",
    "broken pipe",
    "socket",
];

/// Classifier used by every upstream call site: network-level faults retry,
/// data-level faults (bad status, bad body) do not.
pub fn is_transient(err: &Error) -> bool {
    match err {
        Error::Http(e) => e.is_timeout() || e.is_connect(),
        Error::Transport(_) => true,
        Error::Platform(msg) => {
            let msg = msg.to_ascii_lowercase();
            TRANSIENT_SIGNATURES.iter().any(|sig| msg.contains(sig))
        }
        _ => false,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Runs `op` until it succeeds, fails non-transiently, or the attempt
    /// cap is exhausted. The exhausted-retries error propagates unchanged.
    pub async fn run<T, F, Fut>(
        &self,
        label: &str,
        classify: fn(&Error) -> bool,
        mut op: F,
    ) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < max_attempts && classify(&e) => {
                    let delay = self.base_delay * 2u32.saturating_pow(attempt - 1);
                    warn!(
                        "{label}: attempt {attempt}/{max_attempts} failed ({e}), retrying in {delay:?}"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
