//! Tournament registration server.
//!
//! Usage:
//!   inscriptions serve   --config config.toml     # serve the form, submit and ranking
//!   inscriptions serve   --memory                 # same, backed by an in-memory store
//!   inscriptions check   --config config.toml     # print resolved settings
//!   inscriptions ranking --config config.toml     # print the ranking table
//!
//! Store credentials come from SUPABASE_URL / SUPABASE_KEY (or the
//! `[store]` section of the config file).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use inscriptions::api::{self, AppState};
use inscriptions::config::Config;
use inscriptions::ranking;
use inscriptions::store::memory::MemoryStore;
use inscriptions::store::{Backend, StoreLayout};

#[derive(Parser)]
#[command(name = "inscriptions", about = "Tournament registration server", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the registration page and API.
    Serve {
        /// Path to an optional TOML configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the configured port.
        #[arg(short, long)]
        port: Option<u16>,
        /// Keep photos and rows in memory instead of the hosted store.
        #[arg(long)]
        memory: bool,
    },
    /// Print the resolved configuration and exit.
    Check {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the current ranking.
    Ranking {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, port, memory } => {
            run_serve(config, port, memory).await;
        }
        Command::Check { config } => {
            run_check(config);
        }
        Command::Ranking { config } => {
            if let Err(e) = run_ranking(config).await {
                eprintln!("Error: {e:#}");
                std::process::exit(1);
            }
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Config {
    match Config::load(path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to load config");
            std::process::exit(1);
        }
    }
}

async fn run_serve(config_path: Option<PathBuf>, port: Option<u16>, memory: bool) {
    let mut cfg = load_config(config_path);
    if let Some(port) = port {
        cfg.server.port = port;
    }

    let backend = if memory {
        let store = MemoryStore::new(format!("http://localhost:{}", cfg.server.port));
        Backend::in_memory(Arc::new(store), StoreLayout::from(&cfg.store))
    } else {
        match Backend::from_config(&cfg) {
            Ok(b) => b,
            Err(e) => {
                error!(error = %e, "Failed to create store client");
                std::process::exit(1);
            }
        }
    };

    match &backend {
        Backend::Ready(stores) => info!(
            bucket = stores.layout.photo_bucket,
            inscriptions = stores.layout.inscriptions_table,
            players = stores.layout.players_table,
            memory,
            "Store ready"
        ),
        Backend::Unavailable { reason } => warn!(
            reason,
            "Store not configured; only the registration page will work"
        ),
    }

    let state = Arc::new(AppState::new(&cfg, backend));
    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received CTRL+C, shutting down…"),
            Err(e) => error!(error = %e, "Signal error"),
        }
    };

    if let Err(e) = api::start_server(state, cfg.server.port, shutdown).await {
        error!(error = %e, "HTTP server error");
        std::process::exit(1);
    }
}

fn run_check(config_path: Option<PathBuf>) {
    let cfg = load_config(config_path);

    println!("=== Registration server ===");
    println!("Port        : {}", cfg.server.port);
    println!("Upload limit: {} MB", cfg.server.max_upload_mb);
    println!("Page title  : {}", cfg.page.title);
    match cfg.credentials() {
        Some(c) => {
            println!("Store URL   : {}", c.url);
            println!("Store key   : {}", mask(&c.key));
        }
        None => println!("Store       : NOT CONFIGURED (data endpoints will answer 500)"),
    }
    println!("Bucket      : {}", cfg.store.photo_bucket);
    println!("Inscriptions: {}", cfg.store.inscriptions_table);
    println!("Players     : {}", cfg.store.players_table);
}

async fn run_ranking(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let cfg = Config::load(config_path.as_deref()).context("loading config")?;
    let backend = Backend::from_config(&cfg).context("creating store client")?;
    let stores = backend.stores().context("store not configured")?;
    let players = ranking::fetch_players(stores)
        .await
        .context("reading ranking")?;

    println!("{:>4}  {:<30} {:<20} {:<15} {:>8}", "#", "Name", "Club", "Category", "Rating");
    for (pos, p) in players.iter().enumerate() {
        println!(
            "{:>4}  {:<30} {:<20} {:<15} {:>8}",
            pos + 1,
            p.name.as_deref().unwrap_or("-"),
            p.club.as_deref().unwrap_or("-"),
            p.category.as_deref().unwrap_or("-"),
            p.rating.map(|r| format!("{r:.0}")).unwrap_or_else(|| "-".into()),
        );
    }
    Ok(())
}

fn mask(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{visible}… ({} chars)", key.chars().count())
}
