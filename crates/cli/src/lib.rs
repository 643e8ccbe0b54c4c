//! Command-line driver for the migrating hash ring.
//!
//! - `demo`: join nodes, write items, remove nodes, verify every item
//! - `lookup`: resolve keys against a ring built from `--node` flags
//! - `ranges`: print the arcs and ownership share of each node

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
