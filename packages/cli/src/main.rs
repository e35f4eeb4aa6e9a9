#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for comparing prefecture population trends.
//!
//! Without a subcommand, starts an interactive session: pick prefectures
//! from a region-grouped checklist, switch the population category, and
//! view the merged year table. Subcommands expose the same flow for
//! scripting.
//!
//! Uses `indicatif-log-bridge` (via [`resas_chart_cli_utils::init_logger`])
//! so log lines and request spinners never fight for the terminal.

mod interactive;
mod progress;
mod render;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use resas_chart_api::{ApiConfig, ResasClient};
use resas_chart_chart::group_by_region;
use resas_chart_population_models::PopulationCategory;
use resas_chart_region_models::PrefCode;
use resas_chart_session::{Session, SessionView, WritePolicy};

#[derive(Parser)]
#[command(name = "resas_chart", about = "Prefecture population trend comparison")]
struct Cli {
    /// Provider origin (overrides `RESAS_API_BASE_URL`)
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Per-request timeout in seconds. Requests are unbounded by default.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// Discard responses to superseded requests instead of letting the
    /// last response to arrive win
    #[arg(long, global = true)]
    discard_stale: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List prefectures grouped by region
    Prefectures {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List population categories
    Categories,
    /// Fetch and print the merged population table
    Chart {
        /// Comma-separated prefecture codes (e.g. "13,27")
        #[arg(long, value_delimiter = ',')]
        prefs: Vec<PrefCode>,
        /// Select every prefecture
        #[arg(long, conflicts_with = "prefs")]
        all: bool,
        /// Population category: total, youth, working-age, elderly
        #[arg(long, default_value = "total")]
        category: PopulationCategory,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = resas_chart_cli_utils::init_logger();
    let cli = Cli::parse();

    if let Some(Commands::Categories) = cli.command {
        for category in PopulationCategory::ALL {
            println!("{:<12} {} ({})", category, category.label_ja(), category.label());
        }
        return Ok(());
    }

    let mut config = ApiConfig::from_env().with_timeout(cli.timeout_secs.map(Duration::from_secs));
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url);
    }

    let policy = if cli.discard_stale {
        WritePolicy::LatestRequestWins
    } else {
        WritePolicy::LastWriteWins
    };

    let client = ResasClient::new(config)?;
    log::debug!(
        "Using provider at {} (timeout: {:?})",
        client.config().base_url,
        client.config().timeout
    );
    let mut session = Session::with_policy(Arc::new(client), policy);
    progress::settle(&mut session, &multi, "Loading prefectures").await;

    if let SessionView::Failed(message) = session.view() {
        eprintln!("Error: {message}");
        std::process::exit(1);
    }

    match cli.command {
        None => interactive::run(session, &multi).await?,
        Some(Commands::Categories) => {}
        Some(Commands::Prefectures { json }) => {
            let groups = group_by_region(session.prefectures());
            if json {
                println!("{}", serde_json::to_string_pretty(&groups)?);
            } else {
                print!("{}", render::directory(&groups));
            }
        }
        Some(Commands::Chart {
            prefs,
            all,
            category,
            json,
        }) => {
            session.change_category(category);
            if all {
                session.select_all();
            } else {
                for code in prefs.into_iter().collect::<BTreeSet<_>>() {
                    session.toggle(code);
                }
            }

            progress::settle(&mut session, &multi, "Fetching population data").await;

            let view = session.view();
            match (&view, json) {
                (SessionView::Ready(chart), true) => {
                    println!("{}", serde_json::to_string_pretty(chart)?);
                }
                _ => println!("{}", render::view(&view, session.category())),
            }
        }
    }

    Ok(())
}
