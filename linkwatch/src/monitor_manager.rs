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

//! Monitor Manager - wires configuration to the probe, notify and topology crates
//!
//! Builds the probe transport and alert channel selected by the config,
//! validates the chain, and owns the resulting [`HealthMonitor`] until it is
//! started in the background.

use crate::config::{Config, ProbeConfig, ProbeMethod};
use anyhow::{Result, anyhow};
use rustfs_notify::{LogNotifier, NotificationDispatcher, Notifier, TelegramConfig, TelegramNotifier};
use rustfs_probe::{PingTransport, ProbeTransport, Prober, RetryPolicy, TcpConnectTransport};
use rustfs_topology::{ChainMonitor, ChainSnapshot, HealthMonitor, MonitorHandle, TransitionEvent};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Owns the chain monitor, either idle (for one-shot checks) or running
pub struct MonitorManager {
    /// Present until [`MonitorManager::start`] moves it into the background task
    health_monitor: Option<HealthMonitor>,

    /// Background task handle once started
    handle: Option<MonitorHandle>,
}

impl MonitorManager {
    /// Build a manager from configuration
    ///
    /// Fails on any startup error (empty chain, duplicate addresses, invalid
    /// tunables, unusable notification settings). Monitoring does not begin.
    pub fn initialize(config: &Config) -> Result<Self> {
        let transport = build_transport(&config.probe);
        let notifier = build_notifier(&config.telegram)?;
        Self::with_capabilities(config, transport, notifier)
    }

    /// Build a manager that only logs alerts, whatever the Telegram settings
    ///
    /// Used for one-off diagnostic runs: a fresh monitor assumes every node is
    /// up, so any outage it finds would otherwise go out as a new alert.
    pub fn initialize_log_only(config: &Config) -> Result<Self> {
        Self::with_capabilities(config, build_transport(&config.probe), Arc::new(LogNotifier))
    }

    /// Build a manager with explicit probe and notification capabilities
    pub fn with_capabilities(
        config: &Config,
        transport: Arc<dyn ProbeTransport>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let topology = config.validate()?;

        for (name, error) in config.invalid_targets() {
            warn!(node = %name, error = %error, "Node address is not a valid probe target; it will always read as down");
        }

        let prober = Prober::new(
            transport,
            RetryPolicy::new(config.monitor.retry_count, config.monitor.retry_delay()),
        );
        debug!(?prober, "Prober initialized");

        let monitor = ChainMonitor::new(topology, prober, config.monitor.origin_name.clone());
        let dispatcher = NotificationDispatcher::new(notifier);
        let health_monitor = HealthMonitor::new(monitor, dispatcher, config.monitor.check_interval());

        info!(
            nodes = config.nodes.len(),
            retry_count = config.monitor.retry_count,
            interval_secs = config.monitor.check_interval_secs,
            "Monitor Manager initialized"
        );

        Ok(Self {
            health_monitor: Some(health_monitor),
            handle: None,
        })
    }

    /// Run exactly one cycle in the foreground
    pub async fn run_once(&mut self) -> Result<Vec<TransitionEvent>> {
        let monitor = self
            .health_monitor
            .as_mut()
            .ok_or_else(|| anyhow!("Monitor already running in the background"))?;
        Ok(monitor.run_cycle().await)
    }

    /// Move the monitor into a background task that cycles forever
    pub fn start(&mut self) -> Result<()> {
        let monitor = self
            .health_monitor
            .take()
            .ok_or_else(|| anyhow!("Monitor already started"))?;
        self.handle = Some(monitor.start());
        Ok(())
    }

    /// Alert channel of the idle monitor; `None` once started
    pub fn channel(&self) -> Option<&'static str> {
        self.health_monitor.as_ref().map(HealthMonitor::channel)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(MonitorHandle::is_running)
    }

    /// Latest chain view
    pub fn snapshot(&self) -> Option<ChainSnapshot> {
        match (&self.handle, &self.health_monitor) {
            (Some(handle), _) => Some(handle.latest()),
            (None, Some(monitor)) => Some(monitor.monitor().snapshot()),
            (None, None) => None,
        }
    }

    /// Subscribe to per-cycle snapshots
    pub fn subscribe(&self) -> Option<watch::Receiver<ChainSnapshot>> {
        match (&self.handle, &self.health_monitor) {
            (Some(handle), _) => Some(handle.subscribe()),
            (None, Some(monitor)) => Some(monitor.subscribe()),
            (None, None) => None,
        }
    }

    /// Stop the background task, if any
    pub fn shutdown(&mut self) {
        info!("Shutting down Monitor Manager");
        if let Some(mut handle) = self.handle.take() {
            handle.stop();
        }
    }
}

fn build_transport(probe: &ProbeConfig) -> Arc<dyn ProbeTransport> {
    match probe.method {
        ProbeMethod::Icmp => Arc::new(PingTransport::new(probe.timeout())),
        ProbeMethod::Tcp => Arc::new(TcpConnectTransport::new(probe.tcp_port, probe.timeout())),
    }
}

fn build_notifier(telegram: &TelegramConfig) -> Result<Arc<dyn Notifier>> {
    if telegram.is_simulation() {
        info!("Telegram token not configured; alerts will only be logged");
        return Ok(Arc::new(LogNotifier));
    }
    Ok(Arc::new(TelegramNotifier::new(telegram.clone())?))
}
