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

//! Chain monitor - first-failure fault localization state machine
//!
//! One cycle walks the chain in physical order and stops at the first node
//! that does not answer. That node is the far end of the cut; the last node
//! that answered in the same cycle (or the origin) is the near end. Nodes
//! past the cut are not probed and keep their last recorded state.

use crate::topology::ChainTopology;
use crate::types::{ChainSnapshot, Cut, Node, NodeSnapshot, NodeState, TransitionEvent};
use chrono::Utc;
use hashbrown::HashMap;
use metrics::counter;
use rustfs_probe::Prober;
use tracing::{debug, error};

/// Owns the chain and the per-node state; the only writer of that state
#[derive(Debug)]
pub struct ChainMonitor {
    topology: ChainTopology,
    states: HashMap<String, NodeState>,
    prober: Prober,
    origin: String,
    cycles: u64,
}

impl ChainMonitor {
    /// Create a monitor with every node assumed up
    pub fn new(topology: ChainTopology, prober: Prober, origin: impl Into<String>) -> Self {
        let states = topology.initial_states();
        Self {
            topology,
            states,
            prober,
            origin: origin.into(),
            cycles: 0,
        }
    }

    /// Run one pass over the chain
    ///
    /// # Returns
    ///
    /// Transitions in emission order: zero or more UP events, then at most one
    /// DOWN event, which is always last.
    pub async fn run_cycle(&mut self) -> Vec<TransitionEvent> {
        let mut events = Vec::new();
        let mut upstream = self.origin.clone();
        let mut probed = 0usize;

        for node in self.topology.nodes() {
            probed += 1;
            let alive = probe_node(&self.prober, node).await;
            let state = self
                .states
                .entry(node.address.clone())
                .or_insert_with(|| NodeState::new(node.address.clone()));

            if !alive {
                if state.is_up {
                    state.is_up = false;
                    events.push(TransitionEvent::down(node, &upstream, Utc::now()));
                }
                break;
            }

            if !state.is_up {
                state.is_up = true;
                events.push(TransitionEvent::up(node, Utc::now()));
            }
            upstream.clone_from(&node.name);
        }

        self.cycles += 1;
        debug!(
            cycle = self.cycles,
            probed,
            chain_len = self.topology.len(),
            events = events.len(),
            "Chain cycle completed"
        );

        events
    }

    /// Recorded state for a node address
    pub fn node_state(&self, address: &str) -> Option<&NodeState> {
        self.states.get(address)
    }

    /// Recorded liveness for a node address
    pub fn is_up(&self, address: &str) -> Option<bool> {
        self.node_state(address).map(|s| s.is_up)
    }

    /// First recorded-down node in chain order and the node before it
    pub fn current_cut(&self) -> Option<Cut> {
        let mut upstream = self.origin.as_str();
        for node in self.topology.nodes() {
            if self.is_up(&node.address) == Some(false) {
                return Some(Cut {
                    upstream: upstream.to_string(),
                    node_name: node.name.clone(),
                    node_address: node.address.clone(),
                });
            }
            upstream = node.name.as_str();
        }
        None
    }

    /// Point-in-time view for publishing
    pub fn snapshot(&self) -> ChainSnapshot {
        let nodes = self
            .topology
            .nodes()
            .iter()
            .map(|n| NodeSnapshot {
                name: n.name.clone(),
                address: n.address.clone(),
                position: n.position,
                is_up: self.is_up(&n.address).unwrap_or(true),
            })
            .collect();

        ChainSnapshot {
            captured_at: Utc::now(),
            cycles: self.cycles,
            nodes,
            cut: self.current_cut(),
        }
    }

    pub fn topology(&self) -> &ChainTopology {
        &self.topology
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Completed cycles since creation
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

/// Probe failures and probe errors both count as down; errors are logged apart
async fn probe_node(prober: &Prober, node: &Node) -> bool {
    match prober.probe(&node.address).await {
        Ok(alive) => alive,
        Err(e) if e.is_invalid_target() => {
            counter!("linkwatch_probe_errors_total", "kind" => "invalid_target").increment(1);
            error!(
                node = %node.name,
                address = %node.address,
                error = %e,
                "Invalid probe target; check the chain configuration. Treating node as down"
            );
            false
        }
        Err(e) => {
            counter!("linkwatch_probe_errors_total", "kind" => "unavailable").increment(1);
            error!(
                node = %node.name,
                address = %node.address,
                transport = prober.transport_name(),
                error = %e,
                "Probe could not run locally. Treating node as down"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{LogCapture, ScriptedTransport, abcd_chain};
    use crate::types::{DEFAULT_ORIGIN_NAME, NodeEntry, TransitionKind};
    use rustfs_probe::RetryPolicy;
    use std::sync::Arc;
    use std::time::Duration;

    fn monitor_with(transport: Arc<ScriptedTransport>, chain: ChainTopology, attempts: u32) -> ChainMonitor {
        let prober = Prober::new(transport, RetryPolicy::new(attempts, Duration::ZERO));
        ChainMonitor::new(chain, prober, DEFAULT_ORIGIN_NAME)
    }

    fn summary(events: &[TransitionEvent]) -> Vec<(TransitionKind, String, Option<String>)> {
        events
            .iter()
            .map(|e| (e.kind, e.node_name.clone(), e.upstream.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_all_alive_emits_nothing() {
        let transport = ScriptedTransport::new();
        let mut monitor = monitor_with(transport.clone(), abcd_chain(), 3);

        assert!(monitor.run_cycle().await.is_empty());
        assert_eq!(transport.take_calls(), vec!["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4"]);
        assert_eq!(monitor.cycles(), 1);
        assert!(monitor.current_cut().is_none());
    }

    #[tokio::test]
    async fn test_localizes_first_failure_and_skips_downstream() {
        for k in 0..4 {
            let transport = ScriptedTransport::new();
            let chain = abcd_chain();
            let dead = chain.node(k).unwrap().clone();
            transport.set_down(&dead.address, true);

            let mut monitor = monitor_with(transport.clone(), chain.clone(), 1);
            let events = monitor.run_cycle().await;

            let expected_upstream = if k == 0 {
                DEFAULT_ORIGIN_NAME.to_string()
            } else {
                chain.node(k - 1).unwrap().name.clone()
            };
            assert_eq!(
                summary(&events),
                vec![(TransitionKind::Down, dead.name.clone(), Some(expected_upstream))]
            );

            let probed = transport.take_calls();
            assert_eq!(probed.len(), k + 1);
            assert_eq!(probed.last().unwrap(), &dead.address);
        }
    }

    #[tokio::test]
    async fn test_downstream_nodes_not_probed_even_if_reachable() {
        let transport = ScriptedTransport::new();
        transport.set_down("10.0.0.2", true);
        let mut monitor = monitor_with(transport.clone(), abcd_chain(), 1);

        monitor.run_cycle().await;

        let probed = transport.take_calls();
        assert!(!probed.contains(&"10.0.0.3".to_string()));
        assert!(!probed.contains(&"10.0.0.4".to_string()));
        assert_eq!(monitor.is_up("10.0.0.3"), Some(true));
    }

    #[tokio::test]
    async fn test_repeated_outcome_is_debounced() {
        let transport = ScriptedTransport::new();
        let mut monitor = monitor_with(transport.clone(), abcd_chain(), 1);

        assert!(monitor.run_cycle().await.is_empty());
        assert!(monitor.run_cycle().await.is_empty());

        transport.set_down("10.0.0.3", true);
        assert_eq!(monitor.run_cycle().await.len(), 1);
        assert!(monitor.run_cycle().await.is_empty());
        assert!(monitor.run_cycle().await.is_empty());
    }

    #[tokio::test]
    async fn test_recovery_emits_single_up_and_continues() {
        let transport = ScriptedTransport::new();
        let mut monitor = monitor_with(transport.clone(), abcd_chain(), 1);

        transport.set_down("10.0.0.2", true);
        monitor.run_cycle().await;
        transport.take_calls();

        transport.set_down("10.0.0.2", false);
        let events = monitor.run_cycle().await;

        assert_eq!(summary(&events), vec![(TransitionKind::Up, "B".to_string(), None)]);
        assert_eq!(transport.take_calls().len(), 4);
        assert!(monitor.current_cut().is_none());
    }

    #[tokio::test]
    async fn test_reference_scenario() {
        let transport = ScriptedTransport::new();
        let mut monitor = monitor_with(transport.clone(), abcd_chain(), 3);

        assert!(monitor.run_cycle().await.is_empty());

        // B cut: C and D become unreachable too, but only B is probed
        transport.set_down("10.0.0.2", true);
        transport.set_down("10.0.0.3", true);
        transport.set_down("10.0.0.4", true);
        assert_eq!(
            summary(&monitor.run_cycle().await),
            vec![(TransitionKind::Down, "B".to_string(), Some("A".to_string()))]
        );

        assert!(monitor.run_cycle().await.is_empty());

        // B back, C still dark, D reachable again
        transport.set_down("10.0.0.2", false);
        transport.set_down("10.0.0.4", false);
        assert_eq!(
            summary(&monitor.run_cycle().await),
            vec![
                (TransitionKind::Up, "B".to_string(), None),
                (TransitionKind::Down, "C".to_string(), Some("B".to_string())),
            ]
        );

        let cut = monitor.current_cut().unwrap();
        assert_eq!(cut.upstream, "B");
        assert_eq!(cut.node_name, "C");
    }

    #[tokio::test]
    async fn test_single_node_chain_reports_origin() {
        let transport = ScriptedTransport::new();
        transport.set_down("10.0.0.1", true);
        let chain = ChainTopology::new(vec![NodeEntry::new("A", "10.0.0.1")]).unwrap();
        let mut monitor = monitor_with(transport, chain, 1);

        assert_eq!(
            summary(&monitor.run_cycle().await),
            vec![(TransitionKind::Down, "A".to_string(), Some(DEFAULT_ORIGIN_NAME.to_string()))]
        );
    }

    #[tokio::test]
    async fn test_fresh_monitor_reports_persistent_outage_again() {
        let transport = ScriptedTransport::new();
        transport.set_down("10.0.0.2", true);

        let mut first = monitor_with(transport.clone(), abcd_chain(), 1);
        assert_eq!(first.run_cycle().await.len(), 1);
        assert!(first.run_cycle().await.is_empty());

        let mut restarted = monitor_with(transport, abcd_chain(), 1);
        let events = restarted.run_cycle().await;
        assert_eq!(
            summary(&events),
            vec![(TransitionKind::Down, "B".to_string(), Some("A".to_string()))]
        );
    }

    #[tokio::test]
    async fn test_multiple_recoveries_in_one_cycle() {
        let transport = ScriptedTransport::new();
        let mut monitor = monitor_with(transport.clone(), abcd_chain(), 1);

        // Mark B then C down across two cycles
        transport.set_down("10.0.0.2", true);
        monitor.run_cycle().await;
        transport.set_down("10.0.0.2", false);
        transport.set_down("10.0.0.3", true);
        monitor.run_cycle().await;

        // Knock out A: B keeps its recorded-up state, C keeps recorded-down
        transport.set_down("10.0.0.1", true);
        let events = monitor.run_cycle().await;
        assert_eq!(summary(&events), vec![(TransitionKind::Down, "A".to_string(), Some(DEFAULT_ORIGIN_NAME.to_string()))]);

        // Everything returns at once
        transport.set_down("10.0.0.1", false);
        transport.set_down("10.0.0.3", false);
        let events = monitor.run_cycle().await;
        assert_eq!(
            summary(&events),
            vec![(TransitionKind::Up, "A".to_string(), None), (TransitionKind::Up, "C".to_string(), None)]
        );
    }

    #[tokio::test]
    async fn test_retry_budget_is_fresh_every_cycle() {
        let transport = ScriptedTransport::new();
        transport.set_down("10.0.0.1", true);
        let mut monitor = monitor_with(transport.clone(), abcd_chain(), 3);

        monitor.run_cycle().await;
        assert_eq!(transport.take_calls(), vec!["10.0.0.1"; 3]);

        monitor.run_cycle().await;
        assert_eq!(transport.take_calls(), vec!["10.0.0.1"; 3]);
    }

    #[tokio::test]
    async fn test_invalid_address_treated_as_down() {
        let transport = ScriptedTransport::new();
        let chain = ChainTopology::new(vec![
            NodeEntry::new("A", "10.0.0.1"),
            NodeEntry::new("Typo", "10.0.0.300"),
            NodeEntry::new("C", "10.0.0.3"),
        ])
        .unwrap();
        let mut monitor = monitor_with(transport.clone(), chain, 3);

        let events = monitor.run_cycle().await;
        assert_eq!(
            summary(&events),
            vec![(TransitionKind::Down, "Typo".to_string(), Some("A".to_string()))]
        );
        assert_eq!(transport.take_calls(), vec!["10.0.0.1"]);
        assert!(monitor.run_cycle().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_address_logged_as_error() {
        let logs = LogCapture::default();
        let _guard = logs.install();

        let transport = ScriptedTransport::new();
        transport.set_down("10.0.0.3", true);
        let chain = ChainTopology::new(vec![
            NodeEntry::new("A", "10.0.0.1"),
            NodeEntry::new("Typo", "10.0.0.300"),
        ])
        .unwrap();
        let mut monitor = monitor_with(transport.clone(), chain, 1);
        monitor.run_cycle().await;

        let line = logs.line_with("Invalid probe target").expect("missing invalid target log line");
        assert!(line.contains("ERROR"), "{line}");
        assert!(line.contains("node=Typo") && line.contains("address=10.0.0.300"), "{line}");

        // A reachable-but-down node is only an outage, never a configuration error
        let outage_logs = LogCapture::default();
        let _outage_guard = outage_logs.install();
        let mut monitor = monitor_with(transport, abcd_chain(), 1);
        assert_eq!(monitor.run_cycle().await.len(), 1);
        assert!(outage_logs.lines().iter().all(|line| !line.contains("ERROR")));
        assert!(outage_logs.line_with("Chain cycle completed").is_some());
    }

    #[tokio::test]
    async fn test_snapshot_reflects_recorded_state() {
        let transport = ScriptedTransport::new();
        transport.set_down("10.0.0.3", true);
        let mut monitor = monitor_with(transport, abcd_chain(), 1);
        monitor.run_cycle().await;

        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.cycles, 1);
        assert_eq!(snapshot.nodes.len(), 4);
        assert_eq!(snapshot.nodes_up(), 3);
        assert!(!snapshot.nodes[2].is_up);
        assert_eq!(snapshot.cut.unwrap().to_string(), "between [B] and [C]");
    }
}
