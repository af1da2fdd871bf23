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

//! Shared test doubles for the monitor tests

use crate::topology::ChainTopology;
use crate::types::NodeEntry;
use rustfs_notify::{Notifier, NotifyError};
use rustfs_probe::{ProbeError, ProbeTransport, Target};
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

/// Transport whose per-host outcome is set by the test; unknown hosts are up
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    down: Mutex<HashMap<String, bool>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn set_down(&self, host: &str, down: bool) {
        self.down.lock().unwrap().insert(host.to_string(), down);
    }

    /// Hosts probed since the last call, one entry per attempt
    pub(crate) fn take_calls(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

#[async_trait::async_trait]
impl ProbeTransport for ScriptedTransport {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn attempt(&self, target: &Target) -> Result<bool, ProbeError> {
        self.calls.lock().unwrap().push(target.host().to_string());
        let down = self.down.lock().unwrap().get(target.host()).copied().unwrap_or(false);
        Ok(!down)
    }
}

/// Notifier that records every message and optionally fails
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingNotifier {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(NotifyError::NotConfigured {
                reason: "test channel down".to_string(),
            });
        }
        Ok(())
    }
}

/// Chain A..D on 10.0.0.1..4
pub(crate) fn abcd_chain() -> ChainTopology {
    ChainTopology::new(vec![
        NodeEntry::new("A", "10.0.0.1"),
        NodeEntry::new("B", "10.0.0.2"),
        NodeEntry::new("C", "10.0.0.3"),
        NodeEntry::new("D", "10.0.0.4"),
    ])
    .unwrap()
}

/// Buffer for log output formatted by a thread-local `fmt` subscriber
#[derive(Clone, Default)]
pub(crate) struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Route this thread's events into the buffer until the guard drops
    pub(crate) fn install(&self) -> DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.buffer.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// First line containing `needle`
    pub(crate) fn line_with(&self, needle: &str) -> Option<String> {
        self.lines().into_iter().find(|line| line.contains(needle))
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
