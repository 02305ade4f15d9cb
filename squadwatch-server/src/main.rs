use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use squadwatch_core::config::{AppConfig, DiscordConfig};
use squadwatch_core::discord::{ChatPublisher, PublisherSettings, TwilightChannelApi};
use squadwatch_core::pipeline::{LinkResolver, StatusSnapshotter};
use squadwatch_core::sources::{IdentityClient, MonitoringClient};
use squadwatch_core::tasks::{
    run_link_cycle, run_snapshot_cycle, spawn_chat_publish_task, spawn_link_resolution_task,
    spawn_status_snapshot_task,
};
use squadwatch_core::{DefaultHttpClient, Error, HttpClient};

/// The chat loop runs on a fixed cadence, matching the embed footer.
const CHAT_PUBLISH_PERIOD: Duration = Duration::from_secs(60);

#[derive(Parser, Debug, Clone)]
#[command(name = "squadwatch")]
#[command(author, version, about = "Game-server lobby resolver and status publisher")]
struct Args {
    /// Mode: "run" (all loops + Discord publisher), "resolve-once", or
    /// "snapshot-once" (single cron-style cycle, no Discord).
    #[arg(long, default_value = "run")]
    mode: String,

    /// Monitored-server roster file, one external id per slot line.
    #[arg(long, default_value = "bm-servers.txt")]
    servers_file: PathBuf,

    /// Durable link-set file consumed by the dashboard and the publisher.
    #[arg(long, default_value = "links.txt")]
    links_file: PathBuf,

    /// Durable status-snapshot file.
    #[arg(long, default_value = "players.json")]
    players_file: PathBuf,

    /// Number of monitored slots.
    #[arg(long, default_value_t = 4)]
    slots: usize,

    /// Link-resolution period in seconds.
    #[arg(long, default_value_t = 60)]
    resolve_interval_secs: u64,

    /// Status-snapshot period in seconds.
    #[arg(long, default_value_t = 60)]
    snapshot_interval_secs: u64,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("squadwatch=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

fn fatal_config(e: Error) -> ! {
    error!("startup configuration fault: {e}");
    std::process::exit(1);
}

fn build_resolver(http: Arc<dyn HttpClient>, config: &AppConfig) -> LinkResolver {
    let steam_key = match config.require_steam_api_key() {
        Ok(key) => key.to_string(),
        Err(e) => fatal_config(e),
    };
    let monitoring = MonitoringClient::new(http.clone(), config.monitoring_token.clone());
    let identity = IdentityClient::new(http, steam_key);
    LinkResolver::new(monitoring, identity, config.lobby_sample_size)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();
    let args = Args::parse();
    let config = AppConfig::from_env();
    info!(
        "squadwatch starting. mode={}, slots={}, sample_size={}",
        args.mode, args.slots, config.lobby_sample_size
    );

    let http: Arc<dyn HttpClient> =
        match DefaultHttpClient::with_network(config.proxy_url.as_deref(), config.prefer_ipv4) {
            Ok(client) => Arc::new(client),
            Err(e) => fatal_config(e),
        };

    match args.mode.as_str() {
        "resolve-once" => {
            let resolver = build_resolver(http, &config);
            run_link_cycle(&resolver, &args.servers_file, &args.links_file, args.slots).await?;
        }
        "snapshot-once" => {
            let monitoring = MonitoringClient::new(http, config.monitoring_token.clone());
            let snapshotter = StatusSnapshotter::new(monitoring);
            run_snapshot_cycle(&snapshotter, &args.servers_file, &args.players_file, args.slots)
                .await?;
        }
        "run" => {
            run_all(args, config, http).await?;
        }
        other => {
            error!("Invalid mode '{}'. Use run, resolve-once or snapshot-once.", other);
            std::process::exit(1);
        }
    }
    Ok(())
}

async fn run_all(args: Args, config: AppConfig, http: Arc<dyn HttpClient>) -> anyhow::Result<()> {
    let discord = match DiscordConfig::from_env() {
        Ok(discord) => discord,
        Err(e) => fatal_config(e),
    };

    let resolver = Arc::new(build_resolver(http.clone(), &config));
    let snapshotter = Arc::new(StatusSnapshotter::new(MonitoringClient::new(
        http,
        config.monitoring_token.clone(),
    )));

    let api = Arc::new(TwilightChannelApi::new(discord.token, discord.channel_id));
    let settings = PublisherSettings::new(
        args.slots,
        args.links_file.clone(),
        args.players_file.clone(),
        config.join_base.clone(),
    );
    let publisher = match ChatPublisher::connect(api, settings).await {
        Ok(publisher) => Arc::new(publisher),
        Err(e) => {
            error!("Discord login failed: {e}");
            std::process::exit(1);
        }
    };

    let resolve_task = spawn_link_resolution_task(
        resolver,
        args.servers_file.clone(),
        args.links_file.clone(),
        args.slots,
        Duration::from_secs(args.resolve_interval_secs.max(1)),
    );
    let snapshot_task = spawn_status_snapshot_task(
        snapshotter,
        args.servers_file.clone(),
        args.players_file.clone(),
        args.slots,
        Duration::from_secs(args.snapshot_interval_secs.max(1)),
    );
    let publish_task = spawn_chat_publish_task(publisher, CHAT_PUBLISH_PERIOD);

    info!("all loops running; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    resolve_task.abort();
    snapshot_task.abort();
    publish_task.abort();
    Ok(())
}
