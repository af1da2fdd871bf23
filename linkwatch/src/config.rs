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

//! Linkwatch configuration file

use rustfs_notify::TelegramConfig;
use rustfs_probe::{ProbeError, Target};
use rustfs_topology::{ChainTopology, MonitorConfig, NodeEntry, TopologyError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_TELEGRAM_TOKEN: &str = "LINKWATCH_TELEGRAM_TOKEN";
pub const ENV_TELEGRAM_CHAT_ID: &str = "LINKWATCH_TELEGRAM_CHAT_ID";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    // Physical order, nearest hop first
    #[serde(default)]
    pub nodes: Vec<NodeEntry>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProbeMethod {
    #[default]
    Icmp,
    Tcp,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ProbeConfig {
    pub method: ProbeMethod,
    pub timeout_ms: u64,
    // Used by the tcp method for addresses without an explicit port
    pub tcp_port: u16,
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            method: ProbeMethod::Icmp,
            timeout_ms: 1000,
            tcp_port: 80,
        }
    }
}

impl Config {
    /// Read, parse, apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut cfg = Self::from_toml_str(&content)?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Replace Telegram credentials with `LINKWATCH_TELEGRAM_*` when set
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_TELEGRAM_TOKEN).ok(),
            std::env::var(ENV_TELEGRAM_CHAT_ID).ok(),
        );
    }

    fn apply_overrides(&mut self, token: Option<String>, chat_id: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.telegram.token = token;
        }
        if let Some(chat_id) = chat_id.filter(|c| !c.trim().is_empty()) {
            self.telegram.chat_id = chat_id;
        }
    }

    /// Check every startup invariant and build the chain
    pub fn validate(&self) -> Result<ChainTopology, ConfigError> {
        self.monitor.validate()?;
        if self.probe.timeout_ms == 0 {
            return Err(ConfigError::Invalid(TopologyError::InvalidConfiguration {
                reason: "probe.timeout_ms must be at least 1".to_string(),
            }));
        }
        Ok(ChainTopology::new(self.nodes.clone())?)
    }

    /// Node addresses that will fail to parse as probe targets
    ///
    /// Not fatal: such nodes are probed as down every cycle and logged as
    /// configuration errors.
    pub fn invalid_targets(&self) -> Vec<(String, ProbeError)> {
        self.nodes
            .iter()
            .filter_map(|n| Target::parse(&n.address).err().map(|e| (n.name.clone(), e)))
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] TopologyError),
}
