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

//! # RustFS Link-Chain Topology
//!
//! Reachability monitoring of an ordered chain of network nodes that mirrors
//! a physical link path. A failure is reported as a cut between the last node
//! that answered and the first one that did not, not as a list of down hosts.
//!
//! ## Features
//!
//! - **First-failure localization**: each cycle stops at the first dead node; downstream nodes are never probed
//! - **Debounced transitions**: one DOWN per outage and one UP per recovery, never repeated
//! - **Pluggable capabilities**: probing via [`rustfs_probe::Prober`], alerting via [`rustfs_notify::NotificationDispatcher`]
//! - **Snapshots**: per-cycle chain view over a watch channel, plus `metrics` gauges
//!
//! ## Example
//!
//! ```rust,no_run
//! use rustfs_notify::{LogNotifier, NotificationDispatcher};
//! use rustfs_probe::{PingTransport, Prober, RetryPolicy};
//! use rustfs_topology::{ChainMonitor, ChainTopology, HealthMonitor, MonitorConfig, NodeEntry};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = MonitorConfig::default();
//!     let chain = ChainTopology::new(vec![
//!         NodeEntry::new("Core-Router", "192.168.88.1"),
//!         NodeEntry::new("Distribution-SW", "192.168.88.2"),
//!     ])?;
//!
//!     let prober = Prober::new(
//!         Arc::new(PingTransport::new(Duration::from_secs(1))),
//!         RetryPolicy::new(config.retry_count, config.retry_delay()),
//!     );
//!     let monitor = ChainMonitor::new(chain, prober, config.origin_name.clone());
//!     let dispatcher = NotificationDispatcher::new(Arc::new(LogNotifier));
//!
//!     HealthMonitor::new(monitor, dispatcher, config.check_interval()).run().await;
//!     Ok(())
//! }
//! ```

pub mod chain_monitor;
pub mod error;
pub mod health_monitor;
pub mod metrics_collector;
pub mod topology;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use chain_monitor::ChainMonitor;
pub use error::TopologyError;
pub use health_monitor::{HealthMonitor, MonitorHandle};
pub use metrics_collector::MetricsCollector;
pub use topology::ChainTopology;
pub use types::*;
