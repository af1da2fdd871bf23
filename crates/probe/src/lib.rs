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

//! # RustFS Reachability Probing
//!
//! Single-target liveness checks used by the chain monitor.
//!
//! ## Layers
//!
//! - **Target**: parsed, validated probe address (IP, `ip:port`, hostname, `host:port`)
//! - **ProbeTransport**: one single-shot attempt against a target (ICMP echo, TCP connect, test doubles)
//! - **Prober**: bounded retry on top of a transport, collapsing network failures to `false`
//!
//! ## Example
//!
//! ```rust,no_run
//! use rustfs_probe::{Prober, RetryPolicy, TcpConnectTransport};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let transport = Arc::new(TcpConnectTransport::new(80, Duration::from_secs(1)));
//!     let prober = Prober::new(transport, RetryPolicy::default());
//!
//!     let alive = prober.probe("192.168.88.1").await?;
//!     println!("alive: {alive}");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod prober;
pub mod target;
pub mod transport;

pub use error::ProbeError;
pub use prober::{Prober, RetryPolicy};
pub use target::Target;
pub use transport::{PingTransport, ProbeTransport, TcpConnectTransport};
