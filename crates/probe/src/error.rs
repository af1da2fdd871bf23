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

//! Probe error types
//!
//! Unreachable targets are not errors: they are reported as `Ok(false)`.
//! These variants cover local problems that retrying will not fix.

use thiserror::Error;

/// Errors raised by the probing layer
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Address could not be parsed into a probe target
    #[error("Invalid probe target '{address}': {reason}")]
    InvalidTarget { address: String, reason: String },

    /// The local probe facility could not be used (e.g. missing `ping` binary)
    #[error("Probe transport '{transport}' unavailable: {reason}")]
    Unavailable { transport: &'static str, reason: String },
}

impl ProbeError {
    pub(crate) fn invalid(address: &str, reason: impl Into<String>) -> Self {
        ProbeError::InvalidTarget {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns true if the error stems from a malformed address rather than the local host
    pub fn is_invalid_target(&self) -> bool {
        matches!(self, ProbeError::InvalidTarget { .. })
    }
}
