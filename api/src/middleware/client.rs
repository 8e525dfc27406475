//! Client identification shared by the rate limiter, session security and
//! the login/register handlers.
//!
//! Forwarding headers are only believed when the socket peer is one of the
//! configured trusted proxies; any other client is identified by its peer
//! address.

use std::{net::IpAddr, sync::Arc};

use actix_web::{
    dev::ServiceRequest,
    http::header::{HeaderMap, USER_AGENT},
    HttpRequest,
};
use ipnetwork::IpNetwork;
use nl_core::domain::value_objects::ClientInfo;

const DEVICE_ID_HEADER: &str = "x-device-id";

/// Matches the `user_agent` column width
const MAX_USER_AGENT_CHARS: usize = 512;
const MAX_DEVICE_ID_CHARS: usize = 128;

/// Addresses and CIDR ranges allowed to assert `X-Forwarded-*` headers
#[derive(Debug, Clone, Default)]
pub struct TrustedProxies(Arc<Vec<IpNetwork>>);

impl TrustedProxies {
    /// Plain addresses become single-host networks; unparsable entries are skipped
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Self {
        let networks = entries
            .iter()
            .map(|entry| entry.as_ref().trim())
            .filter(|entry| !entry.is_empty())
            .filter_map(|entry| match entry.parse::<IpNetwork>() {
                Ok(network) => Some(network),
                Err(e) => {
                    log::warn!("Ignoring invalid trusted proxy '{}': {}", entry, e);
                    None
                }
            })
            .collect();
        Self(Arc::new(networks))
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        self.0.iter().any(|network| network.contains(ip))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Client IP
///
/// Behind a trusted proxy: first hop of `X-Forwarded-For`, then `X-Real-IP`,
/// each only when it parses as an address. Otherwise, and as fallback, the
/// peer address.
pub fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>, trusted: &TrustedProxies) -> String {
    let forwarded = peer
        .filter(|ip| trusted.contains(*ip))
        .and_then(|_| forwarded_ip(headers));

    match forwarded.or(peer) {
        Some(ip) => ip.to_string(),
        None => "unknown".to_string(),
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let header_ip = |name: &str, first_hop: bool| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|value| if first_hop { value.split(',').next().unwrap_or_default() } else { value })
            .and_then(|value| value.trim().parse::<IpAddr>().ok())
    };

    header_ip("x-forwarded-for", true).or_else(|| header_ip("x-real-ip", false))
}

/// First `max` characters, cut at a char boundary
fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((end, _)) => value[..end].to_string(),
        None => value.to_string(),
    }
}

fn client_info(headers: &HeaderMap, peer: Option<IpAddr>, trusted: &TrustedProxies) -> ClientInfo {
    let header = |name: &str, max: usize| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| truncate_chars(v, max))
    };

    ClientInfo::new(
        client_ip(headers, peer, trusted),
        header(USER_AGENT.as_str(), MAX_USER_AGENT_CHARS),
        header(DEVICE_ID_HEADER, MAX_DEVICE_ID_CHARS),
    )
}

pub fn client_info_from_request(req: &HttpRequest, trusted: &TrustedProxies) -> ClientInfo {
    client_info(req.headers(), req.peer_addr().map(|addr| addr.ip()), trusted)
}

pub fn client_info_from_service_request(req: &ServiceRequest, trusted: &TrustedProxies) -> ClientInfo {
    client_info(req.headers(), req.peer_addr().map(|addr| addr.ip()), trusted)
}
