//! # postview
//!
//! Browse posts from a JSON API through an offline-first local cache.
//!
//! ## Commands
//!
//! - `list`: Show every post once the startup refresh has finished
//! - `show`: Show a single post
//! - `refresh`: Fetch from the remote and update the cache
//! - `watch`: Print every state change until Ctrl-C
//! - `clear`: Remove every cached post
//!
//! ## Example
//!
//! ```bash
//! # Fill the cache and show it
//! postview list
//!
//! # Show cached data without touching the network
//! postview list --offline
//!
//! # Follow one post
//! postview watch 3
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use post_types::PostId;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{clear, list, refresh, show, watch};
use config::Config;

/// Browse posts through an offline-first local cache.
#[derive(Parser, Debug)]
#[command(name = "postview")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory holding the cache database and postview.toml
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (default: postview.toml in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show every post
    List {
        /// Skip the network; every refresh fails as if offline
        #[arg(long)]
        offline: bool,
    },

    /// Show a single post
    Show {
        /// Post id
        id: PostId,

        /// Skip the network; every refresh fails as if offline
        #[arg(long)]
        offline: bool,
    },

    /// Fetch from the remote and update the cache
    Refresh {
        /// Only refresh this post
        id: Option<PostId>,
    },

    /// Print every state change until Ctrl-C
    Watch {
        /// Watch a single post instead of the list
        id: Option<PostId>,

        /// Skip the network; every refresh fails as if offline
        #[arg(long)]
        offline: bool,
    },

    /// Remove every cached post
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;

    let config = Config::load(cli.config.as_deref(), &data_dir)?;
    init_logging(&config.log.level);

    match cli.command {
        Commands::List { offline } => {
            let repo = commands::open_repository(&config, &data_dir, offline).await?;
            list::run(repo).await?;
        }
        Commands::Show { id, offline } => {
            let repo = commands::open_repository(&config, &data_dir, offline).await?;
            show::run(repo, id).await?;
        }
        Commands::Refresh { id } => {
            let repo = commands::open_repository(&config, &data_dir, false).await?;
            refresh::run(&repo, id).await?;
        }
        Commands::Watch { id, offline } => {
            let repo = commands::open_repository(&config, &data_dir, offline).await?;
            watch::run(repo, id).await?;
        }
        Commands::Clear => {
            let repo = commands::open_repository(&config, &data_dir, true).await?;
            clear::run(&repo).await?;
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the configured level.
fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

/// Get the default data directory for postview.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "ydun", "postview")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
