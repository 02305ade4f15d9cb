//! Identity API client (Steam player summaries).
//!
//! Lookups are batched at the API's 100-id limit with a polite delay
//! between chunks. A chunk failure aborts the whole lookup: voting on
//! partial identity data risks publishing a wrong join target, so the
//! caller skips that server's link update for the cycle instead.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::sleep;
use tracing::debug;

use squadwatch_common::models::{IdentityProfile, PresenceRoster, Visibility};

use crate::http::HttpClient;
use crate::retry::{is_transient, RetryPolicy};
use crate::Error;

pub const BATCH_LIMIT: usize = 100;

const CHUNK_DELAY: Duration = Duration::from_millis(200);
const FETCH_RETRY: RetryPolicy = RetryPolicy::new(3, Duration::from_millis(500));

pub const DEFAULT_BASE_URL: &str =
    "https://api.steampowered.com/ISteamUser/GetPlayerSummaries/v0002/";

pub struct IdentityClient {
    http: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
    chunk_delay: Duration,
}

impl IdentityClient {
    pub fn new(http: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: FETCH_RETRY,
            chunk_delay: CHUNK_DELAY,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Resolves profiles for as many tokens as the API answers. Tokens the
    /// API stays silent on are simply absent from the result.
    pub async fn resolve_profiles(
        &self,
        roster: &PresenceRoster,
    ) -> Result<Vec<IdentityProfile>, Error> {
        let tokens: Vec<&str> = roster.iter().collect();
        let mut profiles = Vec::new();

        for (i, chunk) in tokens.chunks(BATCH_LIMIT).enumerate() {
            if i > 0 {
                sleep(self.chunk_delay).await;
            }
            let url = format!(
                "{}?key={}&steamids={}",
                self.base_url,
                urlencoding::encode(&self.api_key),
                chunk.join(",")
            );
            let http = self.http.clone();
            let body = self
                .retry
                .run("identity API", is_transient, || {
                    let mut headers = HashMap::new();
                    headers.insert("Accept".to_string(), "application/json".to_string());
                    http.get(url.clone(), headers)
                })
                .await?;

            let parsed: SummariesDocument = serde_json::from_str(&body)?;
            for player in parsed.response.players {
                if let Some(profile) = player.into_profile() {
                    profiles.push(profile);
                }
            }
        }

        debug!(
            "resolved {} of {} identity profiles",
            profiles.len(),
            tokens.len()
        );
        Ok(profiles)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SummariesDocument {
    response: SummariesResponse,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SummariesResponse {
    players: Vec<PlayerSummaryJson>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PlayerSummaryJson {
    steamid: Option<String>,
    communityvisibilitystate: Option<i64>,
    lobbysteamid: Option<String>,
}

impl PlayerSummaryJson {
    fn into_profile(self) -> Option<IdentityProfile> {
        let id = self.steamid.filter(|id| !id.is_empty())?;
        let visibility = match self.communityvisibilitystate {
            Some(3) => Visibility::Public,
            Some(_) => Visibility::Restricted,
            None => Visibility::Unknown,
        };
        Some(IdentityProfile {
            id,
            visibility,
            lobby_group: self.lobbysteamid.filter(|l| !l.is_empty()),
        })
    }
}
