mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rivals_api::{Api, ApiConfig, GameMode, MatchHistoryOptions};
use tracing::level_filters::LevelFilter;
use tracing::{Level, debug};
use tracing_subscriber::EnvFilter;

use crate::output::{OutputFormat, print};

#[derive(Parser)]
#[command(
    name = "rivals",
    about = "Query Marvel Rivals player, hero and patch data",
    version,
    author,
    long_about = "A command-line client for the Marvel Rivals stats API and the tracking service. \
                  Requests are cached, rate limited per route and validated before they are printed."
)]
struct Cli {
    /// Set the logging level, overridden by `RUST_LOG`
    #[arg(short, long, value_enum, default_value = "info", global = true)]
    log_level: LogLevel,

    /// Output format
    #[arg(short = 'o', long, value_enum, global = true, default_value = "pretty")]
    format: OutputFormat,

    /// Stats API keys, used round-robin
    #[arg(long = "api-key", env = "RIVALS_API_KEYS", value_delimiter = ',', global = true)]
    api_keys: Vec<String>,

    /// Tracking service keys
    #[arg(long = "tracker-key", env = "RIVALS_TRACKER_API_KEYS", value_delimiter = ',', global = true)]
    tracker_keys: Vec<String>,

    /// Serve every domain from one root, e.g. a local proxy
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Season used when a command does not name one
    #[arg(long, env = "RIVALS_DEFAULT_SEASON", global = true)]
    default_season: Option<String>,

    /// Share the response cache through Redis
    #[cfg(feature = "redis")]
    #[arg(long, env = "RIVALS_REDIS_URL", global = true)]
    redis_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Player profile by name or numeric id
    Player {
        name_or_id: String,
        #[arg(long)]
        season: Option<String>,
    },

    /// One page of a player's match history
    MatchHistory {
        name_or_id: String,
        #[arg(long)]
        season: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        game_mode: Option<u32>,
    },

    /// Career overview assembled from the tracking service
    Career {
        name: String,
        #[arg(long, default_value = "both")]
        mode: GameMode,
        #[arg(long)]
        season: Option<String>,
    },

    /// Player name suggestions
    Search { query: String },

    /// Hero list
    Heroes {
        /// Read hero metadata from the tracking service
        #[arg(long)]
        tracker: bool,
    },

    /// Single hero with abilities
    Hero { name_or_id: String },

    /// Top players of one hero
    Leaderboard {
        hero_id: String,
        #[arg(long)]
        platform: Option<String>,
    },

    /// Patch notes, or one patch by id
    PatchNotes {
        #[arg(long)]
        id: Option<String>,
    },

    /// Map catalogue
    Maps {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
}

fn config(cli: &Cli) -> ApiConfig {
    let mut config = ApiConfig::from_env();
    if !cli.api_keys.is_empty() {
        config.api_keys.clone_from(&cli.api_keys);
    }
    if !cli.tracker_keys.is_empty() {
        config.tracker_api_keys.clone_from(&cli.tracker_keys);
    }
    if let Some(base) = &cli.base_url {
        config = config.with_base_url(base);
    }
    if let Some(season) = &cli.default_season {
        config = config.with_default_season(season.clone());
    }
    config
}

#[cfg(feature = "redis")]
async fn build_api(cli: &Cli, config: ApiConfig) -> anyhow::Result<Api> {
    use rivals_api::rivals_cache::RedisCache;
    use std::sync::Arc;

    match &cli.redis_url {
        Some(url) => {
            let cache = RedisCache::connect(url, "rivals")
                .await
                .context("Failed to connect to Redis")?;
            Ok(Api::with_cache(config, Arc::new(cache))?)
        }
        None => Ok(Api::new(config)?),
    }
}

#[cfg(not(feature = "redis"))]
#[allow(clippy::unused_async)]
async fn build_api(_cli: &Cli, config: ApiConfig) -> anyhow::Result<Api> {
    Ok(Api::new(config)?)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let api = build_api(&cli, config(&cli))
        .await
        .context("Invalid client configuration")?;
    let format = cli.format;

    match cli.command {
        Commands::Player { name_or_id, season } => {
            let player = api.get_player(&name_or_id, season.as_deref()).await?;
            print("player", player.as_ref(), format)?;
        }
        Commands::MatchHistory {
            name_or_id,
            season,
            page,
            limit,
            game_mode,
        } => {
            let options = MatchHistoryOptions {
                season,
                page,
                limit,
                game_mode,
            };
            let history = api.get_match_history(&name_or_id, &options).await?;
            print("match history", history.as_ref(), format)?;
        }
        Commands::Career { name, mode, season } => {
            let player = api
                .get_player_career_data(&name, mode, season.as_deref())
                .await?;
            print("career", player.as_ref(), format)?;
        }
        Commands::Search { query } => {
            let users = api.autocomplete_player_names(&query).await?;
            print("player", users.as_ref(), format)?;
        }
        Commands::Heroes { tracker } => {
            let heroes = if tracker {
                api.get_tracker_heroes().await?
            } else {
                api.get_heroes().await?
            };
            print("hero list", heroes.as_ref(), format)?;
        }
        Commands::Hero { name_or_id } => {
            let hero = api.get_hero(&name_or_id).await?;
            print("hero", hero.as_ref(), format)?;
        }
        Commands::Leaderboard { hero_id, platform } => {
            let board = api
                .get_hero_leaderboard(&hero_id, platform.as_deref())
                .await?;
            print("leaderboard", board.as_ref(), format)?;
        }
        Commands::PatchNotes { id: Some(id) } => {
            let patch = api.get_patch_note(&id).await?;
            print("patch note", patch.as_ref(), format)?;
        }
        Commands::PatchNotes { id: None } => {
            let notes = api.get_patch_notes().await?;
            print("patch notes", notes.as_ref(), format)?;
        }
        Commands::Maps { page, limit } => {
            let maps = api.get_maps(page, limit).await?;
            print("maps", maps.as_ref(), format)?;
        }
    }

    for (route, quota) in api.routes() {
        debug!(route = %route, limit = ?quota.limit, remaining = ?quota.remaining, "Route quota");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = LevelFilter::from_level(cli.log_level.into());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    run(cli).await
}
