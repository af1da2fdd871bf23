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

//! Health monitoring service for the link chain
//!
//! Drives [`ChainMonitor`] on a fixed interval. Each cycle runs to completion
//! (probes, state updates, transition logs, notifications) before the sleep
//! that precedes the next one, so cycles never overlap.

use crate::chain_monitor::ChainMonitor;
use crate::metrics_collector::MetricsCollector;
use crate::types::{ChainSnapshot, TransitionEvent, TransitionKind};
use rustfs_notify::NotificationDispatcher;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Periodic driver around a [`ChainMonitor`]
///
/// Owns the monitor exclusively; once started, the background task is the
/// only code that touches node state.
#[derive(Debug)]
pub struct HealthMonitor {
    /// Chain state machine
    monitor: ChainMonitor,

    /// Best-effort alert delivery
    dispatcher: NotificationDispatcher,

    /// Pause between cycles
    check_interval: Duration,

    /// Snapshot publisher
    collector: MetricsCollector,
}

impl HealthMonitor {
    /// Create a new health monitor
    ///
    /// # Arguments
    ///
    /// * `monitor` - The chain state machine to drive
    /// * `dispatcher` - Where transition alerts go
    /// * `check_interval` - Sleep between the end of one cycle and the start of the next
    pub fn new(monitor: ChainMonitor, dispatcher: NotificationDispatcher, check_interval: Duration) -> Self {
        let collector = MetricsCollector::new(monitor.snapshot());
        Self {
            monitor,
            dispatcher,
            check_interval,
            collector,
        }
    }

    /// Perform a single monitoring cycle
    ///
    /// Every transition is logged and handed to the dispatcher, one
    /// notification per event, in emission order.
    pub async fn run_cycle(&mut self) -> Vec<TransitionEvent> {
        let events = self.monitor.run_cycle().await;

        for event in &events {
            log_transition(event);
            self.dispatcher.notify(&event.message()).await;
        }

        self.collector.record_cycle(self.monitor.snapshot(), &events);
        events
    }

    /// Run cycles forever
    pub async fn run(mut self) {
        info!(
            interval_secs = self.check_interval.as_secs(),
            nodes = self.monitor.topology().len(),
            channel = self.dispatcher.channel(),
            "Starting chain monitor"
        );

        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.check_interval).await;
        }
    }

    /// Spawn [`HealthMonitor::run`] on the tokio runtime
    pub fn start(self) -> MonitorHandle {
        let snapshots = self.subscribe();
        let handle = tokio::spawn(self.run());

        MonitorHandle {
            task_handle: Some(handle),
            snapshots,
        }
    }

    /// Subscribe to per-cycle chain snapshots
    pub fn subscribe(&self) -> watch::Receiver<ChainSnapshot> {
        self.collector.subscribe()
    }

    pub fn monitor(&self) -> &ChainMonitor {
        &self.monitor
    }

    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }

    /// Name of the alert channel transitions are dispatched to
    pub fn channel(&self) -> &'static str {
        self.dispatcher.channel()
    }
}

/// Handle to a running [`HealthMonitor`] task
#[derive(Debug)]
pub struct MonitorHandle {
    task_handle: Option<JoinHandle<()>>,
    snapshots: watch::Receiver<ChainSnapshot>,
}

impl MonitorHandle {
    /// Subscribe to per-cycle chain snapshots
    pub fn subscribe(&self) -> watch::Receiver<ChainSnapshot> {
        self.snapshots.clone()
    }

    /// Most recently published snapshot
    pub fn latest(&self) -> ChainSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the monitoring task
    ///
    /// Aborts the background task; an in-flight cycle is dropped at its next await point.
    pub fn stop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            info!("Stopping chain monitor");
            handle.abort();
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Structured operator log line for one transition
fn log_transition(event: &TransitionEvent) {
    let timestamp = event.utc_timestamp();
    match event.kind {
        TransitionKind::Down => {
            let upstream = event.upstream.as_deref().unwrap_or_default();
            warn!(
                kind = %event.kind,
                node = %event.node_name,
                address = %event.node_address,
                upstream = %upstream,
                timestamp = %timestamp,
                "Link cut detected between [{}] and [{}]",
                upstream,
                event.node_name
            )
        }
        TransitionKind::Up => info!(
            kind = %event.kind,
            node = %event.node_name,
            address = %event.node_address,
            timestamp = %timestamp,
            "Connection restored: {}",
            event.node_name
        ),
    }
}
