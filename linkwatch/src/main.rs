// Copyright 2024 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::Context;
use clap::{Parser, Subcommand};
use linkwatch::{Config, MonitorManager};
use rustfs_topology::ChainSnapshot;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Linkwatch: locate fiber cuts along an ordered chain of network nodes
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "linkwatch.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Monitor the chain until interrupted (default)
    Run,
    /// Validate the configuration file
    Validate,
    /// Run a single monitoring cycle and print the chain state (alerts are not sent)
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_monitor(&cli.config).await,
        Commands::Validate => validate_config(&cli.config),
        Commands::Check => check_once(&cli.config).await,
    }
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    Config::load(path).with_context(|| format!("Failed to load configuration '{}'", path.display()))
}

async fn run_monitor(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let mut manager = MonitorManager::initialize(&config)?;

    info!("Starting fiber monitor");
    manager.start()?;

    tokio::signal::ctrl_c().await.context("Failed to listen for shutdown signal")?;
    manager.shutdown();
    Ok(())
}

fn validate_config(path: &Path) -> anyhow::Result<()> {
    let config = load_config(path)?;
    match config.validate() {
        Ok(chain) => {
            info!("Configuration '{}' is valid.", path.display());
            for node in chain.nodes() {
                info!("  #{} {} ({})", node.position, node.name, node.address);
            }
            for (name, e) in config.invalid_targets() {
                warn!("  {} will always read as down: {}", name, e);
            }
            if config.telegram.is_simulation() {
                warn!("Telegram token not set; alerts will only be logged");
            }
            Ok(())
        }
        Err(e) => {
            error!("Configuration '{}' is INVALID: {}", path.display(), e);
            Err(anyhow::anyhow!("Invalid config"))
        }
    }
}

async fn check_once(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let mut manager = MonitorManager::initialize_log_only(&config)?;

    let events = manager.run_once().await?;
    if let Some(snapshot) = manager.snapshot() {
        print_snapshot(&snapshot, &config.monitor.origin_name);
    }
    for event in &events {
        println!("{}", event.message());
    }
    Ok(())
}

fn print_snapshot(snapshot: &ChainSnapshot, origin: &str) {
    let cut_at = snapshot
        .cut
        .as_ref()
        .and_then(|cut| snapshot.nodes.iter().position(|n| n.address == cut.node_address));

    println!("{origin}");
    for (index, node) in snapshot.nodes.iter().enumerate() {
        // Past the cut nothing was probed
        let state = match cut_at {
            Some(cut) if index > cut => "?",
            _ if node.is_up => "UP",
            _ => "DOWN",
        };
        println!("  └─ [{state:>4}] {} ({})", node.name, node.address);
    }
    match &snapshot.cut {
        Some(cut) => println!("Cut: {cut}"),
        None => println!("No cut detected"),
    }
}
