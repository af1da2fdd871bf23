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

//! Single-shot probe transports
//!
//! A transport performs exactly one reachability attempt with its own bounded
//! timeout. Retry lives in [`crate::Prober`].

use crate::error::ProbeError;
use crate::target::Target;
use std::process::Stdio;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// One reachability attempt against a target
///
/// Implementations return `Ok(false)` for every ordinary network failure
/// (refused, timed out, no route). `Err` is reserved for local faults.
#[async_trait::async_trait]
pub trait ProbeTransport: Send + Sync {
    /// Short transport name used in logs
    fn name(&self) -> &'static str;

    /// Perform a single attempt
    async fn attempt(&self, target: &Target) -> Result<bool, ProbeError>;
}

/// TCP connect probe
///
/// A completed three-way handshake counts as alive. Targets without an
/// explicit port use `default_port`.
#[derive(Debug, Clone)]
pub struct TcpConnectTransport {
    default_port: u16,
    timeout: Duration,
}

impl TcpConnectTransport {
    pub fn new(default_port: u16, timeout: Duration) -> Self {
        Self { default_port, timeout }
    }
}

#[async_trait::async_trait]
impl ProbeTransport for TcpConnectTransport {
    fn name(&self) -> &'static str {
        "tcp"
    }

    async fn attempt(&self, target: &Target) -> Result<bool, ProbeError> {
        let port = target.port().unwrap_or(self.default_port);

        match timeout(self.timeout, TcpStream::connect((target.host(), port))).await {
            Ok(Ok(_stream)) => Ok(true),
            Ok(Err(e)) => {
                debug!(address = %target, port, error = %e, "TCP connect failed");
                Ok(false)
            }
            Err(_) => {
                debug!(address = %target, port, timeout_ms = self.timeout.as_millis() as u64, "TCP connect timed out");
                Ok(false)
            }
        }
    }
}

/// ICMP echo probe via the system `ping` binary
///
/// Runs `ping -c 1 -W <secs> <host>` directly (no shell). Exit status zero
/// means alive. Any port on the target is ignored.
#[derive(Debug, Clone)]
pub struct PingTransport {
    program: String,
    timeout: Duration,
}

impl PingTransport {
    pub fn new(timeout: Duration) -> Self {
        Self::with_program("ping", timeout)
    }

    /// Use a specific ping executable (e.g. `/usr/bin/ping`)
    pub fn with_program(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn wait_secs(&self) -> u64 {
        self.timeout.as_secs_f64().ceil().max(1.0) as u64
    }
}

#[async_trait::async_trait]
impl ProbeTransport for PingTransport {
    fn name(&self) -> &'static str {
        "icmp"
    }

    async fn attempt(&self, target: &Target) -> Result<bool, ProbeError> {
        let wait_secs = self.wait_secs();
        let mut command = Command::new(&self.program);
        command
            .arg("-c")
            .arg("1")
            .arg("-W")
            .arg(wait_secs.to_string())
            .arg(target.host())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        let child = command.status();

        // ping enforces -W itself; the outer bound only guards against a hung process
        let grace = Duration::from_secs(wait_secs + 1);
        match timeout(grace, child).await {
            Ok(Ok(status)) => Ok(status.success()),
            Ok(Err(e)) => Err(ProbeError::Unavailable {
                transport: self.name(),
                reason: format!("failed to run '{}': {}", self.program, e),
            }),
            Err(_) => {
                debug!(address = %target, "ping process exceeded its deadline");
                Ok(false)
            }
        }
    }
}
