mod archive;
mod arrays;
mod compose;
mod config;
mod core;
mod models;
mod providers;
mod report;
mod rotation;
mod util;

use crate::config::BotConfig;
use crate::core::runtime::{Runtime, LOG_FILE};
use crate::models::Visibility;
use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::{info, Level};

#[derive(Parser)]
#[command(
    name = "as-a-treat",
    about = "Generate a string in the format \"{folx} can have {treats}, as a treat\" and post it to fedi"
)]
struct Args {
    /// Generate output, but do not post it
    #[arg(short = 'd', long)]
    dry_run: bool,

    /// Count the number of possible outputs and exit
    #[arg(short = 'c', long)]
    count: bool,

    /// Find the most interacted with post in the last COUNT statuses, save
    /// to a file, and exit
    #[arg(long, value_name = "COUNT")]
    most_interacted: Option<usize>,

    /// Return the total number of statuses posted by the bot and exit
    #[arg(long)]
    status_count: bool,

    /// Update the bot's bio with the number of possible combinations
    #[arg(short = 'u', long)]
    update_bio: bool,

    /// Post visibility
    #[arg(long, default_value = "unlisted")]
    visibility: Visibility,

    /// Disable logging
    #[arg(long)]
    no_log: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn init_logging(no_log: bool, verbose: bool) -> Result<()> {
    let level = if no_log {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(LOG_FILE)
        .with_context(|| format!("open log file {LOG_FILE}"))?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn count_combinations() {
    let num_folx = arrays::FOLX.len();
    let num_treats = arrays::TREATS.len();
    let combinations = util::group_thousands(arrays::combination_count());
    let output = format!(
        "There are {num_folx} folx and {num_treats} treats, resulting in {combinations} possible combinations."
    );
    info!("{output}");
    println!("{output}");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(e) = dotenv() {
        // Fine when the environment is already set up
        eprintln!("Error loading .env file: {}", e);
    }

    init_logging(args.no_log, args.verbose)?;

    if args.count {
        count_combinations();
        return Ok(());
    }

    let config = BotConfig::from_env()?;
    let runtime = Runtime::new(config);

    if args.update_bio {
        runtime.update_bio(args.dry_run).await?;
        return Ok(());
    }

    if args.status_count {
        println!("{}", runtime.status_count().await?);
        return Ok(());
    }

    if let Some(over_count) = args.most_interacted {
        runtime.most_interacted(over_count).await?;
        return Ok(());
    }

    if let Err(e) = runtime.post_treat(args.dry_run, args.visibility).await {
        tracing::error!("{e:#}");
        return Err(e);
    }
    runtime.run_periodic_archive(args.dry_run).await;
    runtime.upload_logs();

    Ok(())
}
