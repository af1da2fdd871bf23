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

//! Core data types for chain monitoring

use crate::error::TopologyError;
use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Name of the implicit node "0": the monitor's own location
pub const DEFAULT_ORIGIN_NAME: &str = "Server Room";

/// Wall-clock format used in alert texts
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One configured hop, as listed in the chain definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEntry {
    pub name: String,
    pub address: String,
}

impl NodeEntry {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// Immutable descriptor of a node at a fixed position in the chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Human-readable name (e.g. "Distribution-SW")
    pub name: String,

    /// Probe address, unique within the chain
    pub address: String,

    /// Zero-based index in physical cabling order
    pub position: usize,
}

/// Last recorded liveness of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeState {
    pub address: String,
    pub is_up: bool,
}

impl NodeState {
    /// Fresh state: nodes are assumed up until a probe proves otherwise
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            is_up: true,
        }
    }
}

/// Direction of a recorded liveness change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransitionKind {
    /// Node went from up to down
    Down,

    /// Node went from down to up
    Up,
}

impl TransitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::Down => "DOWN",
            TransitionKind::Up => "UP",
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A liveness change detected during one cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionEvent {
    pub kind: TransitionKind,
    pub node_name: String,
    pub node_address: String,

    /// Last node confirmed alive before this one in the same cycle (DOWN only)
    pub upstream: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl TransitionEvent {
    pub fn down(node: &Node, upstream: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind: TransitionKind::Down,
            node_name: node.name.clone(),
            node_address: node.address.clone(),
            upstream: Some(upstream.to_string()),
            timestamp,
        }
    }

    pub fn up(node: &Node, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind: TransitionKind::Up,
            node_name: node.name.clone(),
            node_address: node.address.clone(),
            upstream: None,
            timestamp,
        }
    }

    /// Event time in local time, [`TIMESTAMP_FORMAT`]
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string()
    }

    /// Event time as RFC 3339 UTC (`2024-05-01T08:30:00Z`), for logs
    pub fn utc_timestamp(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Alert text handed to the notifier
    pub fn message(&self) -> String {
        match self.kind {
            TransitionKind::Down => format!(
                "🚨 FIBER CUT DETECTED!\n\
                 📍 Location: Between [{}] and [{}]\n\
                 ❌ Unreachable Node: {} ({})\n\
                 ⏰ Time: {}",
                self.upstream.as_deref().unwrap_or(DEFAULT_ORIGIN_NAME),
                self.node_name,
                self.node_name,
                self.node_address,
                self.formatted_timestamp()
            ),
            TransitionKind::Up => {
                format!("✅ RESTORED: Connection to {} is back online.", self.node_name)
            }
        }
    }
}

/// Inferred broken segment: last node before the first recorded-down node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cut {
    pub upstream: String,
    pub node_name: String,
    pub node_address: String,
}

impl fmt::Display for Cut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "between [{}] and [{}]", self.upstream, self.node_name)
    }
}

/// Point-in-time view of one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSnapshot {
    pub name: String,
    pub address: String,
    pub position: usize,
    pub is_up: bool,
}

/// Point-in-time view of the whole chain, published after every cycle
#[derive(Debug, Clone, Serialize)]
pub struct ChainSnapshot {
    pub captured_at: DateTime<Utc>,

    /// Completed cycles since the monitor was created
    pub cycles: u64,

    /// Nodes in chain order
    pub nodes: Vec<NodeSnapshot>,

    pub cut: Option<Cut>,
}

impl ChainSnapshot {
    pub fn nodes_up(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_up).count()
    }
}

/// Monitor tunables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Pause between the end of one cycle and the start of the next (seconds)
    pub check_interval_secs: u64,

    /// Probe attempts per node per cycle before declaring it down
    pub retry_count: u32,

    /// Wait between failed attempts (milliseconds)
    pub retry_delay_ms: u64,

    /// Upstream name reported when the first node in the chain is down
    pub origin_name: String,
}

impl MonitorConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn validate(&self) -> Result<(), TopologyError> {
        if self.check_interval_secs == 0 {
            return Err(TopologyError::InvalidConfiguration {
                reason: "check_interval_secs must be at least 1".to_string(),
            });
        }
        if self.retry_count == 0 {
            return Err(TopologyError::InvalidConfiguration {
                reason: "retry_count must be at least 1".to_string(),
            });
        }
        if self.origin_name.trim().is_empty() {
            return Err(TopologyError::InvalidConfiguration {
                reason: "origin_name must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 10,
            retry_count: 3,
            retry_delay_ms: 1000,
            origin_name: DEFAULT_ORIGIN_NAME.to_string(),
        }
    }
}
