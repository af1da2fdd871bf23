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

//! Probe target parsing

use crate::error::ProbeError;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// A validated probe address
///
/// Accepted forms: `192.168.88.1`, `192.168.88.1:8291`, `[fe80::1]:22`, `::1`,
/// `olt-a.example.net`, `olt-a.example.net:443`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    address: String,
    host: String,
    port: Option<u16>,
}

impl Target {
    /// Parse and validate an address
    pub fn parse(address: &str) -> Result<Self, ProbeError> {
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(ProbeError::invalid(address, "empty address"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ProbeError::invalid(address, "address contains whitespace"));
        }

        if let Ok(socket) = trimmed.parse::<SocketAddr>() {
            if socket.port() == 0 {
                return Err(ProbeError::invalid(address, "port 0 is not probeable"));
            }
            return Ok(Self::new(trimmed, socket.ip().to_string(), Some(socket.port())));
        }

        if let Ok(ip) = trimmed.parse::<IpAddr>() {
            return Ok(Self::new(trimmed, ip.to_string(), None));
        }

        let (host, port) = match trimmed.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .ok()
                    .filter(|p| *p != 0)
                    .ok_or_else(|| ProbeError::invalid(address, format!("invalid port '{port}'")))?;
                (host, Some(port))
            }
            None => (trimmed, None),
        };

        validate_hostname(host).map_err(|reason| ProbeError::invalid(address, reason))?;
        Ok(Self::new(trimmed, host.to_ascii_lowercase(), port))
    }

    fn new(address: &str, host: String, port: Option<u16>) -> Self {
        Self {
            address: address.to_string(),
            host,
            port,
        }
    }

    /// Address as configured (trimmed)
    pub fn as_str(&self) -> &str {
        &self.address
    }

    /// Host part (IP literal or lowercase hostname)
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Explicit port, if the address carried one
    pub fn port(&self) -> Option<u16> {
        self.port
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

fn validate_hostname(host: &str) -> Result<(), String> {
    if host.is_empty() {
        return Err("empty host".to_string());
    }
    if host.len() > MAX_HOSTNAME_LEN {
        return Err(format!("hostname longer than {MAX_HOSTNAME_LEN} characters"));
    }

    let host = host.strip_suffix('.').unwrap_or(host);
    let mut last_label = "";
    for label in host.split('.') {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            return Err(format!("invalid hostname label '{label}'"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(format!("hostname label '{label}' starts or ends with '-'"));
        }
        if let Some(bad) = label.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '-') {
            return Err(format!("invalid character '{bad}' in hostname"));
        }
        last_label = label;
    }

    // A numeric final label means a malformed IPv4 literal, not a hostname
    if last_label.chars().all(|c| c.is_ascii_digit()) {
        return Err("malformed IP address".to_string());
    }

    Ok(())
}
