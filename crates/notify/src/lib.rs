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

//! # RustFS Alert Notification
//!
//! Delivery of human-readable alert text to an external channel.
//!
//! - [`Notifier`]: one `send` per message, reporting success or failure
//! - [`TelegramNotifier`]: Telegram Bot API `sendMessage`
//! - [`LogNotifier`]: simulation channel that only logs
//! - [`NotificationDispatcher`]: best-effort wrapper that never propagates delivery failures
//!
//! ## Example
//!
//! ```rust,no_run
//! use rustfs_notify::{NotificationDispatcher, TelegramConfig, TelegramNotifier};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = TelegramConfig {
//!         token: "123:abc".to_string(),
//!         chat_id: "-100200300".to_string(),
//!         ..TelegramConfig::default()
//!     };
//!     let dispatcher = NotificationDispatcher::new(Arc::new(TelegramNotifier::new(config)?));
//!     dispatcher.notify("link check").await;
//!     Ok(())
//! }
//! ```

pub mod dispatcher;
pub mod error;
pub mod telegram;

pub use dispatcher::{LogNotifier, NotificationDispatcher, Notifier};
pub use error::NotifyError;
pub use telegram::{TelegramConfig, TelegramNotifier};
