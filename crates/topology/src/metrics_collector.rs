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

//! Per-cycle chain snapshots and metrics
//!
//! `MetricsCollector` pushes a [`ChainSnapshot`] through a watch channel after
//! every cycle and reports aggregate values through the `metrics` facade
//! (nodes up, cut present, transitions by kind), for whatever exporter the
//! host process installs.

use crate::types::{ChainSnapshot, TransitionEvent};
use metrics::{counter, gauge};
use tokio::sync::watch;
use tracing::trace;

/// Publishes the latest chain snapshot to any number of subscribers
#[derive(Debug)]
pub struct MetricsCollector {
    sender: watch::Sender<ChainSnapshot>,
}

impl MetricsCollector {
    /// Seed the channel with an initial snapshot
    pub fn new(initial: ChainSnapshot) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Record a completed cycle and publish its snapshot
    ///
    /// Publishing never fails: with no subscribers the value is simply replaced.
    pub fn record_cycle(&self, snapshot: ChainSnapshot, events: &[TransitionEvent]) {
        counter!("linkwatch_cycles_total").increment(1);
        for event in events {
            counter!("linkwatch_transitions_total", "kind" => event.kind.as_str()).increment(1);
        }

        gauge!("linkwatch_nodes_total").set(snapshot.nodes.len() as f64);
        gauge!("linkwatch_nodes_up").set(snapshot.nodes_up() as f64);
        gauge!("linkwatch_chain_cut").set(if snapshot.cut.is_some() { 1.0 } else { 0.0 });

        trace!(cycles = snapshot.cycles, nodes_up = snapshot.nodes_up(), "Publishing chain snapshot");
        self.sender.send_replace(snapshot);
    }

    /// Subscribe to future snapshots
    pub fn subscribe(&self) -> watch::Receiver<ChainSnapshot> {
        self.sender.subscribe()
    }

    /// Most recently published snapshot
    pub fn latest(&self) -> ChainSnapshot {
        self.sender.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cut, NodeSnapshot};
    use chrono::Utc;

    fn snapshot(cycles: u64, b_up: bool) -> ChainSnapshot {
        let nodes = vec![
            NodeSnapshot {
                name: "A".to_string(),
                address: "10.0.0.1".to_string(),
                position: 0,
                is_up: true,
            },
            NodeSnapshot {
                name: "B".to_string(),
                address: "10.0.0.2".to_string(),
                position: 1,
                is_up: b_up,
            },
        ];
        let cut = (!b_up).then(|| Cut {
            upstream: "A".to_string(),
            node_name: "B".to_string(),
            node_address: "10.0.0.2".to_string(),
        });
        ChainSnapshot {
            captured_at: Utc::now(),
            cycles,
            nodes,
            cut,
        }
    }

    #[tokio::test]
    async fn test_subscribers_see_latest_snapshot() {
        let collector = MetricsCollector::new(snapshot(0, true));
        let mut rx = collector.subscribe();

        collector.record_cycle(snapshot(1, false), &[]);

        rx.changed().await.unwrap();
        let latest = rx.borrow().clone();
        assert_eq!(latest.cycles, 1);
        assert_eq!(latest.nodes_up(), 1);
        assert_eq!(latest.cut.unwrap().node_name, "B");
    }

    #[test]
    fn test_publish_without_subscribers() {
        let collector = MetricsCollector::new(snapshot(0, true));
        collector.record_cycle(snapshot(7, true), &[]);
        assert_eq!(collector.latest().cycles, 7);
    }
}
