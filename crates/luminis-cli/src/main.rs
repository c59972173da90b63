//! Luminis client binary.
//!
//! Resolves a match preset, loads the map's navigation cache when there is one, connects to the
//! match server and plays until it says END.

mod bot;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use luminis_client::{default_player_index, preset_path, ClientConfig, MatchPreset, Session};
use luminis_game::World;
use luminis_nav::NavigationTable;

use crate::bot::CaptureBot;

#[derive(Parser)]
#[command(name = "luminis")]
#[command(about = "Play a Luminis match against the match server", version)]
struct Cli {
    /// Match preset name, resolved as <root>/MatchPresets/<name>.json
    #[arg(short = 'c', long = "config")]
    preset: String,

    /// Local player identity
    #[arg(short = 'u', long = "uuid")]
    player_uuid: String,

    /// Player index; defaults to 0 for Red and 1 for Blue
    #[arg(short = 'd', long = "index")]
    player_index: Option<u32>,

    /// Game root holding MatchPresets/ and Maps/
    #[arg(long)]
    root: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let logger = fmt().with_env_filter(filter).with_target(false);
    if cli.json_logs {
        logger.json().init();
    } else {
        logger.init();
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let Some(player_index) = cli
        .player_index
        .or_else(|| default_player_index(&cli.player_uuid))
    else {
        bail!(
            "player uuid {:?} is neither Red nor Blue and no player index (-d) was given",
            cli.player_uuid
        );
    };

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let preset = MatchPreset::load(&preset_path(&root, &cli.preset))?;
    let config = ClientConfig::from_preset(preset, cli.player_uuid);
    tracing::info!(
        player = %config.player_uuid,
        player_index,
        map = %config.map_name,
        max_response_time_ms = config.max_response_time_ms,
        "Welcome {}",
        config.player_uuid
    );

    let navigation = load_navigation(&config.navigation_cache_path(&root));

    let mut bot = CaptureBot::default();
    let mut session = Session::connect(config, move |world: &World| bot.decide(world))
        .await
        .context("Failed to connect to match server")?;
    if let Some(table) = navigation {
        session = session.with_navigation(table);
    }

    let summary = session.run().await?;
    tracing::info!(
        turns = summary.turns,
        timeouts = summary.timeouts,
        "Disconnected"
    );
    Ok(())
}

/// A missing or unreadable cache only costs speed.
fn load_navigation(path: &Path) -> Option<Arc<NavigationTable>> {
    if !path.is_file() {
        tracing::warn!(
            path = %path.display(),
            "Could not find map navigation data; path-finding may be slow"
        );
        return None;
    }
    match NavigationTable::load(path) {
        Ok(table) => Some(Arc::new(table)),
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "Could not load map navigation data; path-finding may be slow"
            );
            None
        }
    }
}
