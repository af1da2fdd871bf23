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

//! ChainTopology - the validated, ordered node chain

use crate::error::TopologyError;
use crate::types::{Node, NodeEntry, NodeState};
use hashbrown::HashMap;
use rustfs_probe::Target;
use tracing::info;

/// Host and port a configured address resolves to
type TargetKey = (String, Option<u16>);

/// Fixed sequence of nodes in physical link order, from the vantage point outward
///
/// Validated once at construction: at least one node, no empty names or
/// addresses, no two addresses naming the same probe target. Immutable
/// afterwards.
#[derive(Debug, Clone)]
pub struct ChainTopology {
    nodes: Vec<Node>,
}

impl ChainTopology {
    /// Build a chain from configured entries, keeping their order
    ///
    /// # Example
    ///
    /// ```rust
    /// use rustfs_topology::{ChainTopology, NodeEntry};
    ///
    /// let chain = ChainTopology::new(vec![
    ///     NodeEntry::new("Core-Router", "192.168.88.1"),
    ///     NodeEntry::new("Distribution-SW", "192.168.88.2"),
    /// ])
    /// .unwrap();
    /// assert_eq!(chain.len(), 2);
    /// ```
    pub fn new(entries: Vec<NodeEntry>) -> Result<Self, TopologyError> {
        if entries.is_empty() {
            return Err(TopologyError::EmptyChain);
        }

        let mut seen: HashMap<TargetKey, String> = HashMap::with_capacity(entries.len());
        let mut nodes = Vec::with_capacity(entries.len());

        for (position, entry) in entries.into_iter().enumerate() {
            let name = entry.name.trim().to_string();
            let address = entry.address.trim().to_string();

            if name.is_empty() {
                return Err(TopologyError::EmptyField { position, field: "name" });
            }
            if address.is_empty() {
                return Err(TopologyError::EmptyField {
                    position,
                    field: "address",
                });
            }
            let key = target_key(&address);
            if let Some(first) = seen.get(&key) {
                return Err(TopologyError::DuplicateAddress {
                    address,
                    first: first.clone(),
                    second: name,
                });
            }

            seen.insert(key, name.clone());
            nodes.push(Node { name, address, position });
        }

        info!(nodes = nodes.len(), "Chain topology initialized");
        Ok(Self { nodes })
    }

    /// Nodes in chain order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a constructed chain; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, position: usize) -> Option<&Node> {
        self.nodes.get(position)
    }

    pub fn find_by_address(&self, address: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.address == address)
    }

    /// All-up state map keyed by address
    pub fn initial_states(&self) -> HashMap<String, NodeState> {
        self.nodes
            .iter()
            .map(|n| (n.address.clone(), NodeState::new(n.address.clone())))
            .collect()
    }
}

/// `OLT.example.net` and `olt.example.net`, or `::1` and `0:0::1`, share a key.
/// Unparseable addresses are keyed on their raw text.
fn target_key(address: &str) -> TargetKey {
    match Target::parse(address) {
        Ok(target) => (target.host().to_string(), target.port()),
        Err(_) => (address.to_string(), None),
    }
}
