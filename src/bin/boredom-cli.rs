use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

use boredom_buster::client::{
    render_failure, render_history, render_inspiration, render_search, BoredomClient,
};
use boredom_buster::history::History;
use boredom_buster::models::ActivityType;

#[derive(Parser)]
#[command(author, version, about = "Boredom Buster terminal client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base URL of a running Boredom Buster server
    #[arg(
        long,
        env = "BOREDOM_BUSTER_SERVER",
        default_value = "http://localhost:3000"
    )]
    server: String,

    /// Where recent results are kept between runs
    #[arg(
        long,
        value_name = "FILE",
        env = "BOREDOM_BUSTER_HISTORY_FILE",
        default_value = "./data/history.json"
    )]
    history_file: PathBuf,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 15)]
    timeout: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch an activity, a piece of advice and a quote
    Inspire {
        /// Activity category
        #[arg(short = 't', long = "type", value_parser = parse_activity_type)]
        kind: Option<ActivityType>,

        /// Number of participants (1-8)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=8))]
        participants: Option<u8>,
    },

    /// Search advice by keyword
    Search {
        #[arg(required = true)]
        keyword: String,
    },

    /// Show the most recent results
    History {
        /// Forget all saved results
        #[arg(long)]
        clear: bool,
    },
}

fn parse_activity_type(raw: &str) -> Result<ActivityType, String> {
    raw.parse().map_err(|_| {
        let allowed: Vec<&str> = ActivityType::ALL.iter().map(|kind| kind.as_str()).collect();
        format!("must be one of: {}", allowed.join(", "))
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let client = BoredomClient::new(&cli.server, Duration::from_secs(cli.timeout));

    match cli.command {
        Some(Commands::Inspire { kind, participants }) => {
            inspire(&client, &cli.history_file, kind, participants)
        }
        None => inspire(&client, &cli.history_file, None, None),
        Some(Commands::Search { keyword }) => {
            let result = client
                .search_advice(&keyword)
                .context("Could not search advice")?;
            print!("{}", render_search(&keyword, &result));
            Ok(())
        }
        Some(Commands::History { clear }) => {
            let history = if clear {
                let empty = History::new();
                empty.save(&cli.history_file)?;
                empty
            } else {
                History::load(&cli.history_file)?
            };
            print!("{}", render_history(&history));
            Ok(())
        }
    }
}

fn inspire(
    client: &BoredomClient,
    history_file: &Path,
    kind: Option<ActivityType>,
    participants: Option<u8>,
) -> Result<()> {
    let mut history = History::load(history_file)?;

    match client.fetch_inspiration(kind, participants) {
        Ok(result) => {
            print!("{}", render_inspiration(&result));
            history.record(&result);
            history
                .save(history_file)
                .with_context(|| format!("Failed to save history to {}", history_file.display()))?;
            Ok(())
        }
        Err(e) => {
            print!("{}", render_failure());
            Err(e).context("Could not fetch inspiration. Try again!")
        }
    }
}
