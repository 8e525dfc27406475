//! Information about the client making a request.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Who is on the other end of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub ip_address: String,
    pub user_agent: Option<String>,
    /// Stable identifier sent by native clients (`X-Device-Id`)
    pub device_id: Option<String>,
}

impl ClientInfo {
    pub fn new(ip_address: impl Into<String>, user_agent: Option<String>, device_id: Option<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            user_agent,
            device_id,
        }
    }

    /// SHA-256 hex fingerprint of the device.
    ///
    /// Uses the explicit device id when the client sends one, otherwise the
    /// user agent with version numbers stripped so browser updates keep the
    /// same fingerprint.
    pub fn device_fingerprint(&self) -> String {
        let source = match (&self.device_id, &self.user_agent) {
            (Some(device_id), _) if !device_id.trim().is_empty() => format!("device:{}", device_id.trim()),
            (_, Some(user_agent)) => format!("ua:{}", normalize_user_agent(user_agent)),
            _ => "unknown".to_string(),
        };
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hex::encode(hasher.finalize())
    }
}

fn normalize_user_agent(user_agent: &str) -> String {
    user_agent
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_digit() && *c != '.' && *c != '_')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
