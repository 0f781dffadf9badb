//! PortWatch CLI - Watch and kill localhost TCP listeners
//!
//! A command-line front end for the portwatch engine: one-shot listings,
//! batch kills and a live view that prints whenever the list changes.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use portwatch_core::{Config, ConfigStore};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "portwatch")]
#[command(author, version, about = "Watch and kill localhost TCP listeners")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List localhost TCP ports
    #[command(alias = "ls")]
    List {
        /// Filter by port number
        #[arg(short, long)]
        port: Option<u16>,

        /// Filter by process name, port or PID
        #[arg(short = 'n', long)]
        name: Option<String>,
    },

    /// Force kill the processes on one or more ports
    Kill {
        /// Port numbers to free
        #[arg(required = true, num_args = 1..)]
        ports: Vec<u16>,
    },

    /// Print the port list every time it changes
    Watch {
        /// Seconds between scans (defaults to the configured interval)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the scan interval in seconds
    SetInterval { secs: u64 },
    /// Set the lsof program path
    SetLsof { path: String },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("portwatch=debug,portwatch_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load the user's config, falling back to defaults when it is unreadable.
async fn load_config(store: &ConfigStore) -> Config {
    match store.load().await {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, path = %store.path().display(), "Using default configuration");
            Config::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = ConfigStore::new()?;

    match cli.command {
        Some(Commands::List { port, name }) => {
            let config = load_config(&store).await;
            commands::list::run(&config, port, name, cli.json).await?;
        }
        Some(Commands::Kill { ports }) => {
            let config = load_config(&store).await;
            commands::kill::run(&config, &ports, cli.json).await?;
        }
        Some(Commands::Watch { interval }) => {
            let config = load_config(&store).await;
            commands::watch::run(&config, interval, cli.json).await?;
        }
        Some(Commands::Config { action }) => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => commands::config::show(&store, cli.json).await?,
            ConfigAction::SetInterval { secs } => {
                commands::config::set_interval(&store, secs).await?
            }
            ConfigAction::SetLsof { path } => commands::config::set_lsof(&store, path).await?,
        },
        None => {
            let config = load_config(&store).await;
            commands::list::run(&config, None, None, cli.json).await?;
        }
    }

    Ok(())
}
