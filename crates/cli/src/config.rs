//! Command-line configuration.
//!
//! Ring parameters come from, in increasing priority: built-in defaults, an
//! optional JSON file (`--config`), and individual flags.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use corelib::{PartitionerKind, RingConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::Command;

#[derive(Parser, Debug)]
#[command(
    name = "ring-migrate",
    version,
    about = "Consistent hash ring with virtual nodes and data migration"
)]
pub struct CliConfig {
    /// Path to a JSON ring config (`total_space`, `replicas`, `partitioner`).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Size of the hash space.
    #[arg(long, global = true)]
    pub total_space: Option<u32>,

    /// Virtual nodes per physical node.
    #[arg(long, global = true)]
    pub replicas: Option<u32>,

    /// Key hash: sha256, blake3, xxh3 or sip.
    #[arg(long, global = true)]
    pub partitioner: Option<PartitionerKind>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Resolve the effective ring configuration.
    pub fn ring_config(&self) -> Result<RingConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("failed to parse {}", path.display()))?
            }
            None => RingConfig::default(),
        };
        if let Some(total_space) = self.total_space {
            config.total_space = total_space;
        }
        if let Some(replicas) = self.replicas {
            config.replicas = replicas;
        }
        if let Some(partitioner) = self.partitioner {
            config.partitioner = partitioner;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn run(self) -> Result<()> {
        setup_tracing(&self.log_level);
        let ring_config = self.ring_config()?;
        debug!(?ring_config, "effective ring configuration");

        let result = self.command.execute(ring_config)?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print!("{}", result);
        }
        Ok(())
    }
}

/// Respects `RUST_LOG` if set, otherwise uses `level`.
fn setup_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
