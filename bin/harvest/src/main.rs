mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use harvest_core::logging::init_tracing;
use harvest_core::{Config, Paths};

#[derive(Parser)]
#[command(name = "harvest")]
#[command(about = "Declarative HTML data extraction", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.harvest/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract from a local HTML file
    Query {
        /// HTML file to read
        file: PathBuf,

        /// CSS selector
        selector: String,

        /// Print inner HTML instead of inner text
        #[arg(long)]
        html: bool,

        /// Return every match instead of the first
        #[arg(long)]
        all: bool,

        /// Print the number of matches
        #[arg(long, conflicts_with_all = ["all", "exists"])]
        count: bool,

        /// Print whether anything matches
        #[arg(long, conflicts_with = "all")]
        exists: bool,
    },

    /// Extract from the page open in a running Chrome
    Attach {
        /// CSS selector
        selector: String,

        /// Remote debugging port (overrides config cdp.debugPort)
        #[arg(short, long)]
        port: Option<u16>,

        /// Wait until the matched element carries this class
        #[arg(long)]
        wait_class: Option<String>,

        /// Wait timeout in milliseconds (overrides config wait.defaultTimeoutMs)
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&Paths::new())?,
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    init_tracing(&config.logging)?;

    match cli.command {
        Commands::Query {
            file,
            selector,
            html,
            all,
            count,
            exists,
        } => {
            let mode = commands::query::Mode::from_flags(html, all, count, exists);
            commands::query::run(&config, &file, &selector, mode).await?;
        }
        Commands::Attach {
            selector,
            port,
            wait_class,
            timeout,
        } => {
            commands::attach::run(&config, &selector, port, wait_class, timeout).await?;
        }
    }

    Ok(())
}
