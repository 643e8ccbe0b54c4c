//! CLI subcommands.

use std::fmt;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Subcommand;
use corelib::{HashRing, InMemoryStore, NodeId, RingConfig, StoreStats};
use serde::Serialize;
use tracing::info;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Join nodes, write items, remove nodes, and check every item is still
    /// readable through the ring.
    Demo {
        /// Nodes to add (`10.0.0.1` .. `10.0.0.N`).
        #[arg(long, default_value_t = 60)]
        nodes: usize,
        /// Items to write (`key-i` -> `value-i`).
        #[arg(long, default_value_t = 100_000)]
        items: usize,
        /// Nodes to remove afterwards, picked by resolving item keys.
        #[arg(long, default_value_t = 25)]
        remove: usize,
    },
    /// Show which node owns each key.
    Lookup {
        /// Ring members, in join order.
        #[arg(short, long = "node", required = true)]
        nodes: Vec<String>,
        /// Keys to resolve.
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Show the arcs each node owns.
    Ranges {
        /// Ring members, in join order.
        #[arg(short, long = "node", required = true)]
        nodes: Vec<String>,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum CommandResult {
    Demo(DemoSummary),
    Lookup { owners: Vec<KeyOwner> },
    Ranges { nodes: Vec<NodeRanges> },
}

#[derive(Debug, Serialize)]
pub struct DemoSummary {
    pub nodes_added: usize,
    pub items_written: usize,
    pub moved_on_join: usize,
    pub nodes_removed: Vec<NodeId>,
    pub moved_on_leave: usize,
    pub items_verified: usize,
    pub stats: StoreStats,
}

#[derive(Debug, Serialize)]
pub struct KeyOwner {
    pub key: String,
    pub position: u32,
    pub node: NodeId,
}

#[derive(Debug, Serialize)]
pub struct NodeRanges {
    pub node: NodeId,
    /// Share of the hash space owned.
    pub ownership: f64,
    /// `(start, end]` arcs.
    pub ranges: Vec<(u32, u32)>,
}

impl Command {
    pub fn execute(self, config: RingConfig) -> Result<CommandResult> {
        match self {
            Command::Demo {
                nodes,
                items,
                remove,
            } => demo(config, nodes, items, remove).map(CommandResult::Demo),
            Command::Lookup { nodes, keys } => {
                let ring = ring_with(config, &nodes)?;
                let owners = keys
                    .into_iter()
                    .map(|key| {
                        let node = ring.try_resolve(&key)?;
                        let position = ring.hash_position(&key).value();
                        Ok(KeyOwner {
                            key,
                            position,
                            node,
                        })
                    })
                    .collect::<Result<_>>()?;
                Ok(CommandResult::Lookup { owners })
            }
            Command::Ranges { nodes } => {
                let ring = ring_with(config, &nodes)?;
                let topology = ring.topology();
                let ownership = topology.ownership();
                let nodes = ring
                    .nodes()
                    .into_iter()
                    .map(|node| NodeRanges {
                        ownership: ownership.get(&node).copied().unwrap_or(0.0),
                        ranges: topology
                            .ranges_for(&node)
                            .iter()
                            .map(|r| (r.start.value(), r.end.value()))
                            .collect(),
                        node,
                    })
                    .collect();
                Ok(CommandResult::Ranges { nodes })
            }
        }
    }
}

fn ring_with(config: RingConfig, nodes: &[String]) -> Result<HashRing<InMemoryStore<String>>> {
    let ring = HashRing::new(config, Arc::new(InMemoryStore::new()))?;
    for node in nodes {
        ring.add(node.as_str())?;
    }
    Ok(ring)
}

fn demo(config: RingConfig, nodes: usize, items: usize, remove: usize) -> Result<DemoSummary> {
    let ring = HashRing::new(config, Arc::new(InMemoryStore::new()))?;
    let mut moved_on_join = 0;
    for i in 1..=nodes {
        moved_on_join += ring.add(format!("10.0.0.{}", i))?.moved;
    }
    info!(nodes, vnodes = ring.vnode_count(), "nodes added");

    for i in 1..=items {
        ring.put(&format!("key-{}", i), format!("value-{}", i))?;
    }
    info!(items, "items written");

    // Pick victims by resolving spread-out keys; never drain the last node.
    let mut nodes_removed = Vec::with_capacity(remove);
    let mut moved_on_leave = 0;
    for round in 0..remove {
        if ring.node_count() <= 1 || items == 0 {
            break;
        }
        let key = format!("key-{}", round * 7919 % items + 1);
        let victim = ring.try_resolve(&key)?;
        moved_on_leave += ring.remove(&victim)?.moved;
        info!(node = %victim, "node removed");
        nodes_removed.push(victim);
    }

    let mut items_verified = 0;
    for i in 1..=items {
        let key = format!("key-{}", i);
        let expected = format!("value-{}", i);
        match ring.get(&key) {
            Ok(value) if value == expected => items_verified += 1,
            Ok(value) => bail!("{} holds {:?}, expected {:?}", key, value, expected),
            Err(err) => bail!("{} unreadable after migration: {}", key, err),
        }
    }

    Ok(DemoSummary {
        nodes_added: nodes,
        items_written: items,
        moved_on_join,
        nodes_removed,
        moved_on_leave,
        items_verified,
        stats: ring.store().stats(),
    })
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Demo(summary) => {
                writeln!(f, "nodes added:     {}", summary.nodes_added)?;
                writeln!(f, "items written:   {}", summary.items_written)?;
                writeln!(f, "moved on join:   {}", summary.moved_on_join)?;
                writeln!(f, "nodes removed:   {}", summary.nodes_removed.len())?;
                for node in &summary.nodes_removed {
                    writeln!(f, "  - {}", node)?;
                }
                writeln!(f, "moved on leave:  {}", summary.moved_on_leave)?;
                writeln!(f, "items verified:  {}", summary.items_verified)?;
                writeln!(f, "min items/node:  {}", summary.stats.min_items)?;
                writeln!(f, "max items/node:  {}", summary.stats.max_items)?;
                writeln!(f, "mean items/node: {:.2}", summary.stats.mean_items)
            }
            CommandResult::Lookup { owners } => {
                for owner in owners {
                    writeln!(f, "{} @{} -> {}", owner.key, owner.position, owner.node)?;
                }
                Ok(())
            }
            CommandResult::Ranges { nodes } => {
                for node in nodes {
                    writeln!(f, "{} ({:.2}%)", node.node, node.ownership * 100.0)?;
                    for (start, end) in &node.ranges {
                        writeln!(f, "  ({}, {}]", start, end)?;
                    }
                }
                Ok(())
            }
        }
    }
}
