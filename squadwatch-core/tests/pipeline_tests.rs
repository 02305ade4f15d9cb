// squadwatch-core/tests/pipeline_tests.rs
//
// Drives the resolution and snapshot pipelines against a scripted HTTP
// client, no real network involved.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use squadwatch_common::models::MonitoredServer;
use squadwatch_core::pipeline::{LinkResolver, StatusSnapshotter};
use squadwatch_core::sources::{IdentityClient, MonitoringClient};
use squadwatch_core::{Error, HttpClient, RetryPolicy};

/// One scripted response. Errors are rebuilt per call since `Error` is not
/// `Clone`.
#[derive(Clone)]
enum Script {
    Body(String),
    Transient(String),
    Fatal(String),
}

impl Script {
    fn materialize(&self) -> Result<String, Error> {
        match self {
            Script::Body(body) => Ok(body.clone()),
            Script::Transient(msg) => Err(Error::Transport(msg.clone())),
            Script::Fatal(msg) => Err(Error::Platform(msg.clone())),
        }
    }
}

/// Routes by URL substring; a route's responses are consumed in order and
/// the last one repeats.
#[derive(Default)]
struct ScriptedHttp {
    routes: Mutex<Vec<(String, VecDeque<Script>)>>,
}

impl ScriptedHttp {
    fn route(&self, needle: &str, script: Script) {
        let mut routes = self.routes.lock().unwrap();
        if let Some((_, queue)) = routes.iter_mut().find(|(n, _)| n == needle) {
            queue.push_back(script);
        } else {
            routes.push((needle.to_string(), VecDeque::from([script])));
        }
    }
}

#[async_trait]
impl HttpClient for ScriptedHttp {
    async fn get(&self, url: String, _headers: HashMap<String, String>) -> Result<String, Error> {
        let mut routes = self.routes.lock().unwrap();
        for (needle, queue) in routes.iter_mut() {
            if url.contains(needle.as_str()) {
                let script = if queue.len() > 1 {
                    queue.pop_front().unwrap()
                } else {
                    queue.front().cloned().expect("empty route")
                };
                return script.materialize();
            }
        }
        Err(Error::Platform(format!("unscripted URL: {url}")))
    }
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(1))
}

fn presence_doc(player_steam_ids: &[&str]) -> String {
    let mut included = Vec::new();
    for (i, steam_id) in player_steam_ids.iter().enumerate() {
        included.push(serde_json::json!({
            "type": "player",
            "id": format!("p{i}"),
        }));
        included.push(serde_json::json!({
            "type": "identifier",
            "id": format!("ident{i}"),
            "attributes": { "type": "steamID", "identifier": steam_id },
            "relationships": { "player": { "data": { "type": "player", "id": format!("p{i}") } } },
        }));
    }
    serde_json::json!({
        "data": { "attributes": { "players": player_steam_ids.len() } },
        "included": included,
    })
    .to_string()
}

fn summaries_doc(players: &[(&str, i64, Option<&str>)]) -> String {
    let players: Vec<_> = players
        .iter()
        .map(|(id, visibility, lobby)| {
            let mut obj = serde_json::json!({
                "steamid": id,
                "communityvisibilitystate": visibility,
            });
            if let Some(lobby) = lobby {
                obj["lobbysteamid"] = serde_json::json!(lobby);
            }
            obj
        })
        .collect();
    serde_json::json!({ "response": { "players": players } }).to_string()
}

fn servers(ids: &[&str]) -> Vec<MonitoredServer> {
    ids.iter()
        .enumerate()
        .map(|(slot, id)| MonitoredServer::new(slot, *id))
        .collect()
}

fn resolver(http: Arc<ScriptedHttp>) -> LinkResolver {
    let monitoring = MonitoringClient::new(http.clone(), None).with_retry_policy(fast_retry());
    let identity = IdentityClient::new(http, "test-key")
        .with_retry_policy(fast_retry())
        .with_chunk_delay(Duration::from_millis(1));
    LinkResolver::new(monitoring, identity, 20)
}

const S1: &str = "76561198000000001";
const S2: &str = "76561198000000002";
const S3: &str = "76561198000000003";
const S4: &str = "76561198000000004";
const S5: &str = "76561198000000005";

#[tokio::test]
async fn resolves_exactly_one_link_per_slot_despite_failures() {
    let http = Arc::new(ScriptedHttp::default());
    // Slot 1 is healthy, slot 2's identity lookup fails hard.
    http.route("servers/AAA", Script::Body(presence_doc(&[S1, S2])));
    http.route("servers/BBB", Script::Body(presence_doc(&[S3])));
    http.route(
        &format!("steamids={S1}"),
        Script::Body(summaries_doc(&[
            (S1, 3, Some("L1")),
            (S2, 3, Some("L1")),
        ])),
    );
    http.route(
        &format!("steamids={S3}"),
        Script::Fatal("Steam HTTP 500".into()),
    );

    let links = resolver(http)
        .resolve_cycle(&servers(&["", "AAA", "BBB"]))
        .await;

    assert_eq!(links.len(), 3);
    assert_eq!(links[0].slot, 0);
    assert_eq!(links[0].join_target, None);
    assert_eq!(
        links[1].join_target.as_deref(),
        Some(format!("steam://joinlobby/393380/L1/{S1}").as_str())
    );
    assert_eq!(links[2].join_target, None);
}

#[tokio::test]
async fn all_restricted_profiles_leave_the_link_empty() {
    let http = Arc::new(ScriptedHttp::default());
    http.route(
        "servers/AAA",
        Script::Body(presence_doc(&[S1, S2, S3, S4, S5])),
    );
    // Only three of five tokens answered, all restricted.
    http.route(
        "steamids=",
        Script::Body(summaries_doc(&[
            (S1, 1, None),
            (S2, 1, Some("L1")),
            (S3, 2, None),
        ])),
    );

    let links = resolver(http).resolve_cycle(&servers(&["AAA"])).await;
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].join_target, None);
}

#[tokio::test]
async fn presence_fetch_retries_through_transient_faults() {
    let http = Arc::new(ScriptedHttp::default());
    http.route("servers/AAA", Script::Transient("request timed out".into()));
    http.route("servers/AAA", Script::Transient("connection reset".into()));
    http.route("servers/AAA", Script::Body(presence_doc(&[S1])));
    http.route(
        "steamids=",
        Script::Body(summaries_doc(&[(S1, 3, Some("L9"))])),
    );

    let links = resolver(http).resolve_cycle(&servers(&["AAA"])).await;
    assert_eq!(
        links[0].join_target.as_deref(),
        Some(format!("steam://joinlobby/393380/L9/{S1}").as_str())
    );
}

#[tokio::test]
async fn presence_failure_degrades_to_empty_without_aborting() {
    let http = Arc::new(ScriptedHttp::default());
    http.route("servers/AAA", Script::Fatal("HTTP 429".into()));
    http.route("servers/BBB", Script::Body(presence_doc(&[S2])));
    http.route(
        "steamids=",
        Script::Body(summaries_doc(&[(S2, 3, Some("L2"))])),
    );

    let links = resolver(http).resolve_cycle(&servers(&["AAA", "BBB"])).await;
    assert_eq!(links[0].join_target, None);
    assert!(links[1].join_target.is_some());
}

#[tokio::test]
async fn malformed_presence_body_degrades_to_empty() {
    let http = Arc::new(ScriptedHttp::default());
    http.route("servers/AAA", Script::Body("<html>maintenance</html>".into()));

    let links = resolver(http).resolve_cycle(&servers(&["AAA"])).await;
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].join_target, None);
}

fn status_doc(players: f64, queue: f64, map: &str, playtime: f64) -> String {
    serde_json::json!({
        "data": { "attributes": {
            "players": players,
            "details": {
                "map": map,
                "squad_publicQueue": queue,
                "squad_playTime": playtime,
            },
        } },
    })
    .to_string()
}

#[tokio::test]
async fn snapshot_clamps_counters_and_isolates_failures() {
    let http = Arc::new(ScriptedHttp::default());
    http.route("servers/AAA", Script::Body(status_doc(250.0, -4.0, "Narva", 4000.0)));
    http.route("servers/BBB", Script::Fatal("HTTP 500".into()));

    let monitoring = MonitoringClient::new(http, None).with_retry_policy(fast_retry());
    let snapshot = StatusSnapshotter::new(monitoring)
        .snapshot_cycle(&servers(&["AAA", "BBB", ""]))
        .await;

    assert_eq!(snapshot.results.len(), 3);

    let healthy = &snapshot.results[0];
    assert_eq!(healthy.players, Some(100));
    assert_eq!(healthy.queue, Some(0));
    assert_eq!(healthy.map.as_deref(), Some("Narva"));
    assert_eq!(healthy.playtime_sec, Some(4000));

    let failed = &snapshot.results[1];
    assert_eq!(failed.players, None);
    assert_eq!(failed.queue, None);
    assert_eq!(failed.map, None);
    assert_eq!(failed.playtime_sec, None);

    let disabled = &snapshot.results[2];
    assert_eq!(disabled.players, None);
}
