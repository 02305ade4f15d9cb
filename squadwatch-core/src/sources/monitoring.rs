//! Monitoring API client (BattleMetrics-shaped).
//!
//! Two reads per server: the aggregate attribute document and the presence
//! roster (`?include=player,identifier`). Responses are loosely typed
//! upstream, so every record here defaults missing fields and every access
//! coerces to `None` instead of assuming shape.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use squadwatch_common::models::PresenceRoster;

use crate::http::HttpClient;
use crate::retry::{is_transient, RetryPolicy};
use crate::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.battlemetrics.com";

const FETCH_RETRY: RetryPolicy = RetryPolicy::new(3, Duration::from_millis(500));

/// Aggregate counters as reported upstream, still unclamped. The snapshot
/// pipeline owns the clamp-to-range rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerAttributes {
    pub players: Option<f64>,
    pub queue: Option<f64>,
    pub map: Option<String>,
    pub playtime_sec: Option<f64>,
}

pub struct MonitoringClient {
    http: Arc<dyn HttpClient>,
    token: Option<String>,
    base_url: String,
    retry: RetryPolicy,
}

impl MonitoringClient {
    pub fn new(http: Arc<dyn HttpClient>, token: Option<String>) -> Self {
        Self {
            http,
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: FETCH_RETRY,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        if let Some(token) = &self.token {
            headers.insert("Authorization".to_string(), format!("Bearer {token}"));
        }
        headers
    }

    async fn get_json(&self, url: String) -> Result<String, Error> {
        let http = self.http.clone();
        let headers = self.headers();
        self.retry
            .run("monitoring API", is_transient, || {
                http.get(url.clone(), headers.clone())
            })
            .await
    }

    /// Fetches the aggregate attribute document for one server.
    pub async fn fetch_status(&self, server_id: &str) -> Result<ServerAttributes, Error> {
        let url = format!(
            "{}/servers/{}",
            self.base_url,
            urlencoding::encode(server_id)
        );
        let body = self.get_json(url).await?;
        let doc: ServerDocument = serde_json::from_str(&body)?;
        Ok(doc.attributes())
    }

    /// Fetches the presence roster for one server: Steam64 ids of everyone
    /// currently connected, in first-seen order, one identifier per player.
    pub async fn fetch_presence(&self, server_id: &str) -> Result<PresenceRoster, Error> {
        let url = format!(
            "{}/servers/{}?include=player,identifier",
            self.base_url,
            urlencoding::encode(server_id)
        );
        let body = self.get_json(url).await?;
        let doc: ServerDocument = serde_json::from_str(&body)?;
        Ok(doc.presence_roster())
    }
}

/// Presence collection boundary: failures and shape violations are logged
/// and degrade to an empty roster so one bad server never aborts the cycle
/// for its siblings.
pub async fn collect_presence(client: &MonitoringClient, server_id: &str) -> PresenceRoster {
    if server_id.is_empty() {
        return PresenceRoster::new();
    }
    match client.fetch_presence(server_id).await {
        Ok(roster) => roster,
        Err(e) => {
            warn!("presence fetch failed for server {server_id}: {e}");
            PresenceRoster::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Wire records. Everything is optional-with-default; the upstream document
// mixes entry kinds in one `included` array.
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServerDocument {
    data: Option<ServerData>,
    included: Vec<IncludedEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServerData {
    attributes: ServerAttributesJson,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServerAttributesJson {
    players: Option<f64>,
    details: DetailsJson,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DetailsJson {
    map: Option<String>,
    #[serde(rename = "squad_publicQueue")]
    public_queue: Option<f64>,
    #[serde(rename = "squad_playTime")]
    play_time: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IncludedEntry {
    #[serde(rename = "type")]
    kind: String,
    id: String,
    attributes: IncludedAttributes,
    relationships: IncludedRelationships,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IncludedAttributes {
    #[serde(rename = "type")]
    kind: Option<String>,
    identifier: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IncludedRelationships {
    player: Option<RelationshipData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RelationshipData {
    data: Option<RelationshipRef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RelationshipRef {
    id: String,
}

impl ServerDocument {
    fn attributes(&self) -> ServerAttributes {
        let Some(data) = &self.data else {
            return ServerAttributes::default();
        };
        let attrs = &data.attributes;
        ServerAttributes {
            players: attrs.players,
            queue: attrs.details.public_queue,
            map: attrs
                .details
                .map
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
            playtime_sec: attrs.details.play_time,
        }
    }

    fn presence_roster(&self) -> PresenceRoster {
        let players: Vec<&IncludedEntry> = self
            .included
            .iter()
            .filter(|entry| entry.kind == "player")
            .collect();
        let identifiers: Vec<&IncludedEntry> = self
            .included
            .iter()
            .filter(|entry| entry.kind == "identifier")
            .collect();

        let mut roster = PresenceRoster::new();
        for player in players {
            let owned = identifiers.iter().filter(|ident| {
                ident
                    .relationships
                    .player
                    .as_ref()
                    .and_then(|rel| rel.data.as_ref())
                    .is_some_and(|data| data.id == player.id)
            });
            // Take the first identifier per player that yields a Steam64 id.
            for ident in owned {
                if let Some(steam64) = extract_steam64(&ident.attributes) {
                    roster.push_unique(steam64);
                    break;
                }
            }
        }
        roster
    }
}

/// A Steam64 id is a run of at least 17 digits: either the whole identifier
/// value, or embedded in a steam-typed identifier.
fn extract_steam64(attrs: &IncludedAttributes) -> Option<String> {
    let value = attrs.identifier.as_deref()?;
    if value.len() >= 17 && value.chars().all(|c| c.is_ascii_digit()) {
        return Some(value.to_string());
    }
    let kind = attrs.kind.as_deref().unwrap_or("").to_ascii_lowercase();
    if kind.contains("steam") {
        return longest_digit_run(value).filter(|run| run.len() >= 17);
    }
    None
}

fn longest_digit_run(value: &str) -> Option<String> {
    let mut best: Option<&str> = None;
    let mut start = None;
    for (i, c) in value.char_indices() {
        if c.is_ascii_digit() {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start.take() {
            let run = &value[s..i];
            if best.is_none_or(|b| run.len() > b.len()) {
                best = Some(run);
            }
        }
    }
    if let Some(s) = start {
        let run = &value[s..];
        if best.is_none_or(|b| run.len() > b.len()) {
            best = Some(run);
        }
    }
    best.map(str::to_string)
}
