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

//! Telegram Bot API channel

use crate::dispatcher::Notifier;
use crate::error::NotifyError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Token value shipped in sample configs; treated as "not configured"
pub const PLACEHOLDER_TOKEN: &str = "YOUR_BOT_TOKEN";

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Telegram channel settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token issued by BotFather
    pub token: String,

    /// Target chat or channel id
    pub chat_id: String,

    /// API base URL, without trailing slash
    pub api_base: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl TelegramConfig {
    /// Returns true if alerts should only be logged, not sent
    pub fn is_simulation(&self) -> bool {
        let token = self.token.trim();
        token.is_empty() || token == PLACEHOLDER_TOKEN
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            chat_id: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 5,
        }
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Sends each message through the Bot API `sendMessage` method
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    url: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Result<Self, NotifyError> {
        if config.is_simulation() {
            return Err(NotifyError::NotConfigured {
                reason: "bot token is empty or a placeholder".to_string(),
            });
        }
        if config.chat_id.trim().is_empty() {
            return Err(NotifyError::NotConfigured {
                reason: "chat_id is empty".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .connect_timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        let url = format!(
            "{}/bot{}/sendMessage",
            config.api_base.trim_end_matches('/'),
            config.token.trim()
        );

        Ok(Self {
            client,
            url,
            chat_id: config.chat_id.trim().to_string(),
        })
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
        };

        // The request URL carries the bot token
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.without_url()))?;
        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "Telegram message accepted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
