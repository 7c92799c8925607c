//! CareBot terminal front end.
//!
//! Loads configuration, builds the application context, and runs the
//! command loop over stdin or a script file.
//!
//! Usage:
//!   cargo run -p carebot-cli
//!   cargo run -p carebot-cli -- --script rounds.txt --seed 42 --verbose

mod console;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use carebot_engine::AppContext;
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use crate::console::{spawn_printer, Console};

/// CareBot - caregiving bot simulation
#[derive(Parser, Debug)]
#[command(name = "carebot")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults to ./carebot.toml if present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Read commands from a script instead of stdin
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Seed for deterministic drift (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config =
        settings::load_settings(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(seed) = args.seed {
        config.drift.seed = Some(seed);
    }

    let ctx = AppContext::new(config).context("Failed to start bot")?;
    ctx.start();

    let (out, printer) = spawn_printer(tokio::io::stdout());
    let console = Console::new(ctx.clone(), out);

    let read = match &args.script {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            console.run(BufReader::new(file)).await
        }
        None => console.run(BufReader::new(tokio::io::stdin())).await,
    };
    read.context("Failed to read commands")?;

    drop(console);
    ctx.shutdown();
    printer
        .await
        .context("Output task panicked")?
        .context("Failed to write output")?;
    Ok(())
}
