/// One monitored game server, pinned to a fixed dashboard slot.
///
/// The slot is the stable ordinal every downstream artifact (links file,
/// snapshot file, Discord message order) is keyed by. The external id is the
/// monitoring API's server id; an empty id means the slot is intentionally
/// disabled and must still appear in every per-slot output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoredServer {
    pub slot: usize,
    pub external_id: String,
}

impl MonitoredServer {
    pub fn new(slot: usize, external_id: impl Into<String>) -> Self {
        Self {
            slot,
            external_id: external_id.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.external_id.is_empty()
    }
}
