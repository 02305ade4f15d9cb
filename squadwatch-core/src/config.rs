//! Environment configuration for the pipeline and the Discord publisher.
//!
//! Everything is read from the process environment (a `.env` file is loaded
//! by the server binary before this runs). Optional values carry documented
//! defaults; required values are validated per run mode and reported
//! together so an operator sees every missing key at once.

use std::env;

use crate::pipeline::voter::{clamp_sample_size, DEFAULT_SAMPLE_SIZE};
use crate::Error;

const DEFAULT_JOIN_BASE: &str = "http://212.22.93.230:8080";

/// Configuration shared by the resolution and snapshot pipelines.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bearer token for the monitoring API. Optional; unauthenticated
    /// requests are allowed but rate-limited harder.
    pub monitoring_token: Option<String>,
    /// Identity API key; required for link resolution.
    pub steam_api_key: Option<String>,
    /// Voter sample cap, clamped to [1, 100].
    pub lobby_sample_size: usize,
    /// Base URL for the join redirect pages, trailing slash stripped.
    pub join_base: String,
    pub proxy_url: Option<String>,
    pub prefer_ipv4: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let lobby_sample_size = env_first(&["LOBBY_SAMPLE_SIZE", "LINKS_SAMPLE_SIZE"])
            .and_then(|v| v.parse::<usize>().ok())
            .map(clamp_sample_size)
            .unwrap_or(DEFAULT_SAMPLE_SIZE);

        let join_base = env_first(&["DISCORD_JOIN_BASE"])
            .unwrap_or_else(|| DEFAULT_JOIN_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            monitoring_token: env_first(&["BM_TOKEN", "BATTLEMETRICS_TOKEN"]),
            steam_api_key: env_first(&["STEAM_API_KEY", "STEAM_KEY"]),
            lobby_sample_size,
            join_base,
            proxy_url: env_first(&["HTTP_PROXY_URL"]),
            prefer_ipv4: env_flag("PREFER_IPV4"),
        }
    }

    /// Link resolution needs the identity API key.
    pub fn require_steam_api_key(&self) -> Result<&str, Error> {
        self.steam_api_key
            .as_deref()
            .ok_or_else(|| missing_keys(&["STEAM_API_KEY"]))
    }
}

/// Credentials and target for the Discord publisher.
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub token: String,
    pub channel_id: u64,
}

impl DiscordConfig {
    pub fn from_env() -> Result<Self, Error> {
        let token = env_first(&["DISCORD_TOKEN"]);
        let channel = env_first(&["DISCORD_CHANNEL_ID"]);

        let mut missing = Vec::new();
        if token.is_none() {
            missing.push("DISCORD_TOKEN");
        }
        if channel.is_none() {
            missing.push("DISCORD_CHANNEL_ID");
        }
        let (Some(token), Some(channel)) = (token, channel) else {
            return Err(missing_keys(&missing));
        };

        let channel_id = channel
            .parse::<u64>()
            .map_err(|_| Error::Config(format!("DISCORD_CHANNEL_ID is not a valid id: '{channel}'")))?;

        Ok(Self { token, channel_id })
    }
}

fn missing_keys(keys: &[&str]) -> Error {
    Error::Config(format!("missing required environment keys: {}", keys.join(", ")))
}

/// First non-empty value among the given environment keys.
fn env_first(keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Ok(value) = env::var(key) {
            let value = value.trim().to_string();
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

fn env_flag(key: &str) -> bool {
    matches!(
        env::var(key).ok().as_deref().map(str::trim),
        Some("1") | Some("true") | Some("yes")
    )
}
