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

//! Topology-related error types

use thiserror::Error;

/// Errors that prevent monitoring from starting
#[derive(Debug, Error)]
pub enum TopologyError {
    /// Chain has no nodes
    #[error("Chain must contain at least one node")]
    EmptyChain,

    /// Two nodes share the same address
    #[error("Duplicate address {address}: used by '{first}' and '{second}'")]
    DuplicateAddress {
        address: String,
        first: String,
        second: String,
    },

    /// A node entry is missing its name or address
    #[error("Node at position {position} has an empty {field}")]
    EmptyField { position: usize, field: &'static str },

    /// Monitor tunables are out of range
    #[error("Invalid monitor configuration: {reason}")]
    InvalidConfiguration { reason: String },
}
