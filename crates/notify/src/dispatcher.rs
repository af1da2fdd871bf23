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

//! Notifier capability and the best-effort dispatcher

use crate::error::NotifyError;
use metrics::counter;
use std::sync::Arc;
use tracing::{info, warn};

/// External notification channel
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Short channel name used in logs and metrics
    fn name(&self) -> &'static str;

    /// Deliver one free-form message
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Channel used when no real endpoint is configured: logs the alert and succeeds
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        info!("[Simulation] Telegram Alert: {}", text);
        Ok(())
    }
}

/// Fire-and-forget front of a [`Notifier`]
///
/// Every failure is logged and counted, then dropped. There is no retry:
/// the next message gets a fresh, independent attempt.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    pub fn channel(&self) -> &'static str {
        self.notifier.name()
    }

    /// Deliver `message`, swallowing any delivery error
    pub async fn notify(&self, message: &str) {
        let channel = self.notifier.name();
        match self.notifier.send(message).await {
            Ok(()) => {
                counter!("linkwatch_notifications_sent_total", "channel" => channel).increment(1);
            }
            Err(e) => {
                counter!("linkwatch_notifications_failed_total", "channel" => channel).increment(1);
                warn!(channel, error = %e, "Failed to send alert");
            }
        }
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("channel", &self.notifier.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FlakyNotifier {
        attempts: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Notifier for FlakyNotifier {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn send(&self, text: &str) -> Result<(), NotifyError> {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(text.to_string());
            if attempts.len() == 1 {
                return Err(NotifyError::Rejected {
                    status: 502,
                    body: "bad gateway".to_string(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failure_is_swallowed_and_not_retried() {
        let notifier = Arc::new(FlakyNotifier::default());
        let dispatcher = NotificationDispatcher::new(notifier.clone());

        dispatcher.notify("first").await;
        dispatcher.notify("second").await;

        let attempts = notifier.attempts.lock().unwrap().clone();
        assert_eq!(attempts, vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        assert!(LogNotifier.send("simulated").await.is_ok());
        assert_eq!(NotificationDispatcher::new(Arc::new(LogNotifier)).channel(), "log");
    }
}
