//! Status embed rendering.
//!
//! One embed per slot. Unknown values render as em-dash placeholders, never
//! as zeros that would read as a dead-but-reporting server. The join
//! affordance routes through the site's redirect pages; the raw lobby link
//! never appears in the message.

use squadwatch_common::models::snapshot::{SlotStatus, MAX_PLAYERS};
use squadwatch_common::models::{StatusEmbed, StatusEmbedField};

pub const COLOR_JOINABLE: u32 = 0x10B981;
pub const COLOR_UNAVAILABLE: u32 = 0xEF4444;

const JOIN_LABEL: &str = "Join";
const FOOTER_TEXT: &str = "Updated every minute";

pub fn format_playtime(playtime_sec: Option<u64>) -> String {
    match playtime_sec {
        Some(sec) => format!("{}:{:02}", sec / 3600, (sec % 3600) / 60),
        None => "—:—".to_string(),
    }
}

pub fn render_status_embed(
    slot: usize,
    status: &SlotStatus,
    link: Option<&str>,
    join_base: &str,
    title_prefix: &str,
) -> StatusEmbed {
    let joinable = link.is_some();

    let online = match status.players {
        Some(players) => format!("**{players}/{MAX_PLAYERS}**"),
        None => format!("**—/{MAX_PLAYERS}**"),
    };
    let queue = match status.queue {
        Some(queue) => format!("**{queue}**"),
        None => "**—**".to_string(),
    };
    let map = status.map.clone().unwrap_or_else(|| "—".to_string());

    let join_url = joinable.then(|| format!("{join_base}/s{}c/", slot + 1));
    let description = match &join_url {
        Some(url) => format!("[{JOIN_LABEL}]({url})"),
        None => format!("`{JOIN_LABEL}`"),
    };

    StatusEmbed {
        title: format!("{title_prefix} {}", slot + 1),
        description,
        url: join_url,
        color: if joinable {
            COLOR_JOINABLE
        } else {
            COLOR_UNAVAILABLE
        },
        fields: vec![
            StatusEmbedField {
                name: "👥 Online".to_string(),
                value: online,
                inline: true,
            },
            StatusEmbedField {
                name: "⏳ Queue".to_string(),
                value: queue,
                inline: true,
            },
            StatusEmbedField {
                name: "🗺️ Map".to_string(),
                value: map,
                inline: false,
            },
            StatusEmbedField {
                name: "⏱️ Time".to_string(),
                value: format_playtime(status.playtime_sec),
                inline: true,
            },
        ],
        footer_text: FOOTER_TEXT.to_string(),
    }
}
