//! Per-cycle link resolution: presence roster → identity profiles → vote.
//!
//! Servers are walked sequentially to stay inside third-party rate limits.
//! A failure while resolving one slot downgrades that slot to an empty link
//! and never touches its siblings; the output always carries exactly one
//! entry per configured slot, in slot order.

use tracing::{info, warn};

use squadwatch_common::models::{LobbyCandidate, MonitoredServer, ResolvedLink};

use crate::pipeline::voter;
use crate::sources::identity::IdentityClient;
use crate::sources::monitoring::{collect_presence, MonitoringClient};
use crate::Error;

pub struct LinkResolver {
    monitoring: MonitoringClient,
    identity: IdentityClient,
    sample_size: usize,
}

impl LinkResolver {
    pub fn new(monitoring: MonitoringClient, identity: IdentityClient, sample_size: usize) -> Self {
        Self {
            monitoring,
            identity,
            sample_size: voter::clamp_sample_size(sample_size),
        }
    }

    /// Resolves the whole fleet once. Infallible by construction: per-slot
    /// failures become empty links.
    pub async fn resolve_cycle(&self, servers: &[MonitoredServer]) -> Vec<ResolvedLink> {
        let mut links = Vec::with_capacity(servers.len());
        for server in servers {
            if !server.is_enabled() {
                links.push(ResolvedLink::empty(server.slot));
                continue;
            }
            match self.resolve_server(server).await {
                Ok(Some(candidate)) => {
                    info!(
                        "slot {} => {} (lobby {})",
                        server.slot, candidate.join_target, candidate.lobby_group
                    );
                    links.push(ResolvedLink::resolved(server.slot, candidate.join_target));
                }
                Ok(None) => {
                    info!(
                        "slot {}: no public profile with a lobby token this cycle",
                        server.slot
                    );
                    links.push(ResolvedLink::empty(server.slot));
                }
                Err(e) => {
                    warn!(
                        "slot {} ({}): resolution failed, keeping link empty: {e}",
                        server.slot, server.external_id
                    );
                    links.push(ResolvedLink::empty(server.slot));
                }
            }
        }
        links
    }

    async fn resolve_server(
        &self,
        server: &MonitoredServer,
    ) -> Result<Option<LobbyCandidate>, Error> {
        let roster = collect_presence(&self.monitoring, &server.external_id).await;
        if roster.is_empty() {
            return Ok(None);
        }
        // Identity errors propagate: voting on partial profile data is how
        // wrong join targets get published.
        let profiles = self.identity.resolve_profiles(&roster).await?;
        Ok(voter::pick_lobby(&roster, &profiles, self.sample_size))
    }
}
