use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lol_recap::{cache, export, fetch, pipeline, riot_api::RiotClient};

#[derive(Parser, Debug)]
#[command(name = "lol-recap", about = "Match history charts for a League of Legends player", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a player's recent matches and write the per-player cache file
    Fetch {
        #[command(flatten)]
        player: PlayerArgs,

        /// How many recent matches to pull
        #[arg(long, default_value_t = 20)]
        count: usize,

        /// Directory for per-player cache files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// Derive the chart tables from a cached player and export them as CSV
    Charts {
        #[command(flatten)]
        player: PlayerArgs,

        /// How many recent matches to pull when fetching
        #[arg(long, default_value_t = 20)]
        count: usize,

        /// Directory for per-player cache files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Directory for the exported chart CSVs
        #[arg(long, default_value = "charts")]
        out_dir: PathBuf,

        /// Re-fetch from the Riot API even if a cache file exists
        #[arg(long)]
        refresh: bool,
    },
}

#[derive(clap::Args, Debug)]
struct PlayerArgs {
    /// Riot game name (e.g., Summoner name)
    #[arg(long = "game-name")]
    game_name: String,

    /// Riot tag line (e.g., region tag)
    #[arg(long = "tag-line")]
    tag_line: String,

    /// Continental routing value for account/match lookups
    #[arg(long, default_value = "americas")]
    routing: String,

    /// Platform server for summoner lookups
    #[arg(long, default_value = "na1")]
    platform: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Cli::parse();

    match args.command {
        Command::Fetch {
            player,
            count,
            data_dir,
        } => {
            let path = refresh_cache(&player, count, &data_dir)?;
            info!("wrote {}", path.display());
        }
        Command::Charts {
            player,
            count,
            data_dir,
            out_dir,
            refresh,
        } => {
            let path = cache::cache_path(&data_dir, &player.game_name, &player.tag_line);
            if refresh || !path.exists() {
                refresh_cache(&player, count, &data_dir)?;
            }

            let store = cache::load_store(&path)?;
            let derivers = pipeline::default_derivers();

            let results = match pipeline::run_pipeline(&store, &derivers) {
                Ok(results) => results,
                Err(err) => {
                    eprintln!(
                        "Match data for {}#{} is invalid: {}. Try refreshing with --refresh.",
                        player.game_name, player.tag_line, err
                    );
                    std::process::exit(1);
                }
            };

            for result in &results {
                let chart_path = export::write_chart_csv(&out_dir, result)?;
                info!(
                    chart = result.name,
                    rows = result.table.rows.len(),
                    skipped = result.skipped,
                    "wrote {}",
                    chart_path.display()
                );
            }
        }
    }

    Ok(())
}

fn refresh_cache(player: &PlayerArgs, count: usize, data_dir: &PathBuf) -> anyhow::Result<PathBuf> {
    let client = RiotClient::new(&player.routing, &player.platform)?;
    let doc = fetch::build_store(&client, &player.game_name, &player.tag_line, count)?;
    let path = cache::cache_path(data_dir, &player.game_name, &player.tag_line);
    cache::write_store(&path, &doc)?;
    Ok(path)
}
