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

//! Notification error types

use thiserror::Error;

/// Errors raised while delivering a notification
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Transport-level failure (DNS, connect, timeout, TLS); never carries the request URL
    #[error("Notification request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Channel answered with a non-success status
    #[error("Notification rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Channel is missing required settings
    #[error("Notification channel not configured: {reason}")]
    NotConfigured { reason: String },
}
