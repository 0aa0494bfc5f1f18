// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! linkrelay - relays links through two chat responders and republishes
//! the resolved artifact.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use linkrelay_config::{ConfigError, RelayConfig};

/// linkrelay - relays links through two chat responders.
#[derive(Parser, Debug)]
#[command(name = "linkrelay", version, about, long_about = None)]
struct Cli {
    /// Load this file (plus LINKRELAY_* overrides) instead of the standard hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the relay until SIGINT or SIGTERM.
    Serve,
    /// Load and validate the configuration, then print the effective settings.
    CheckConfig,
}

fn load(path: Option<&PathBuf>) -> Result<RelayConfig, Vec<ConfigError>> {
    match path {
        Some(path) => linkrelay_config::load_and_validate_path(path),
        None => linkrelay_config::load_and_validate(),
    }
}

fn print_summary(config: &RelayConfig) {
    let peer = |p: Option<i64>| p.map_or_else(|| "unset".to_string(), |id| id.to_string());
    println!("linkrelay: config OK ({})", config.daemon.name);
    println!("  first responder:  {}", peer(config.responders.first));
    println!("  second responder: {}", peer(config.responders.second));
    println!("  destination:      {}", peer(config.publish.destination));
    println!("  sources:          {:?}", config.intake.sources);
    println!("  sentinel phrase:  {:?}", config.responders.sentinel_phrase);
    println!(
        "  timeouts:         resolution {}s, recency window {}s, publish grace {}s",
        config.timeouts.resolution_secs,
        config.timeouts.recency_window_secs,
        config.timeouts.publish_grace_secs,
    );
    if let Some(ttl) = config.timeouts.queue_ttl_secs {
        println!("  queue ttl:        {ttl}s");
    }
    match config.thumbnails.dir.as_deref() {
        Some(dir) => println!("  thumbnails:       {dir}"),
        None => println!("  thumbnails:       in memory"),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("linkrelay: use --help for available commands");
        return;
    };

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            linkrelay_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match command {
        Commands::Serve => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Commands::CheckConfig => print_summary(&config),
    }
}
