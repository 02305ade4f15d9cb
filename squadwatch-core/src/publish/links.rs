//! Durable link set: one line per slot in slot order, empty line for an
//! unresolved slot. The file is replaced atomically once per cycle.

use std::path::Path;

use tracing::{error, info, warn};

use squadwatch_common::models::{link, ResolvedLink};

use crate::publish::replace_file;
use crate::Error;

pub fn render_links(links: &[ResolvedLink]) -> String {
    let mut out = String::new();
    for entry in links {
        if let Some(target) = &entry.join_target {
            out.push_str(target.trim());
        }
        out.push('\n');
    }
    out
}

/// Writes the full link set. A failure here is fatal to the cycle and is
/// surfaced to the scheduler; the next tick retries naturally.
pub async fn write_links_file(path: &Path, links: &[ResolvedLink]) -> Result<(), Error> {
    let content = render_links(links);
    match replace_file(path, &content) {
        Ok(()) => {
            info!("wrote {} link entries to {}", links.len(), path.display());
            Ok(())
        }
        Err(e) => {
            error!("failed to write links file {}: {e}", path.display());
            Err(e)
        }
    }
}

/// Reads the link set back for the publisher side. Lines that do not carry
/// the lobby scheme prefix are treated as unresolved; a missing file means
/// every slot is unresolved.
pub async fn read_links_file(path: &Path, slots: usize) -> Vec<Option<String>> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) => {
            warn!("failed to read links file {}: {e}", path.display());
            return vec![None; slots];
        }
    };
    let mut lines = text.lines().map(str::trim);
    (0..slots)
        .map(|_| {
            lines
                .next()
                .filter(|line| link::is_valid_join_target(line))
                .map(str::to_string)
        })
        .collect()
}
