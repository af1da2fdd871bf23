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

//! Retrying prober built on a single-shot transport

use crate::error::ProbeError;
use crate::target::Target;
use crate::transport::ProbeTransport;
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, trace};

/// Retry budget for a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (values below 1 are treated as 1)
    pub max_attempts: u32,

    /// Wait between a failed attempt and the next one
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

/// Stateless prober: up to `max_attempts` sequential attempts, first success wins
#[derive(Clone)]
pub struct Prober {
    transport: Arc<dyn ProbeTransport>,
    policy: RetryPolicy,
}

impl Prober {
    pub fn new(transport: Arc<dyn ProbeTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Probe an address with the configured retry policy
    ///
    /// # Returns
    ///
    /// `Ok(true)` on the first successful attempt, `Ok(false)` if every attempt
    /// failed, `Err` only for a malformed address or an unusable local transport.
    pub async fn probe(&self, address: &str) -> Result<bool, ProbeError> {
        let target = Target::parse(address)?;
        self.probe_target(&target).await
    }

    /// Probe an already parsed target
    pub async fn probe_target(&self, target: &Target) -> Result<bool, ProbeError> {
        let attempts = self.policy.max_attempts.max(1);
        let transport = self.transport.name();

        for attempt in 1..=attempts {
            counter!("linkwatch_probe_attempts_total", "transport" => transport).increment(1);

            if self.transport.attempt(target).await? {
                trace!(address = %target, attempt, "Probe succeeded");
                return Ok(true);
            }

            debug!(address = %target, attempt, max_attempts = attempts, "Probe attempt failed");
            if attempt < attempts && !self.policy.delay.is_zero() {
                sleep(self.policy.delay).await;
            }
        }

        Ok(false)
    }
}

impl std::fmt::Debug for Prober {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prober")
            .field("transport", &self.transport.name())
            .field("policy", &self.policy)
            .finish()
    }
}
