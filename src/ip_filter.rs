//! Request gatekeeper: IP allow-list enforcement
//!
//! Runs before the handlers of the protected controller and rejects any
//! caller whose network address is not on the configured allow-list.
//! Rejection short-circuits the pipeline; the protected handler never runs.

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use tracing::{error, info, warn};

use crate::{error::ApiError, state::AppState};

/// Parsed allow-list of literal IPv4/IPv6 addresses.
///
/// A malformed entry poisons the whole list: every request is rejected
/// until the configuration is fixed (fail closed).
#[derive(Debug, Clone, Default)]
pub struct IpAllowList {
    entries: Vec<IpAddr>,
    malformed: bool,
}

impl IpAllowList {
    /// Read the allow-list from the `ADMIN_SAFE_LIST` environment variable
    /// (default: `127.0.0.1;::1`).
    pub fn from_env() -> Self {
        let raw =
            std::env::var("ADMIN_SAFE_LIST").unwrap_or_else(|_| "127.0.0.1;::1".to_string());
        Self::parse(&raw)
    }

    /// Parse a semicolon-delimited list of literal addresses. An entry
    /// containing `::1` is an alias for the IPv6 loopback address.
    pub fn parse(raw: &str) -> Self {
        let mut entries = Vec::new();
        let mut malformed = false;

        for item in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            if item.contains("::1") {
                entries.push(IpAddr::V6(Ipv6Addr::LOCALHOST));
                continue;
            }

            match item.parse::<IpAddr>() {
                Ok(ip) => entries.push(ip),
                Err(e) => {
                    error!("Error validating allow-list entry {:?}: {}", item, e);
                    malformed = true;
                }
            }
        }

        Self { entries, malformed }
    }

    /// Decide whether a caller address may pass. An absent address is
    /// always rejected.
    pub fn allows(&self, addr: Option<IpAddr>) -> bool {
        if self.malformed {
            return false;
        }

        match addr {
            Some(ip) => self.entries.iter().any(|entry| same_address(entry, &ip)),
            None => false,
        }
    }
}

/// Exact raw-byte comparison: same address family, identical octets. An
/// IPv4 address never matches its IPv6-mapped form.
fn same_address(a: &IpAddr, b: &IpAddr) -> bool {
    match (a, b) {
        (IpAddr::V4(a), IpAddr::V4(b)) => a.octets() == b.octets(),
        (IpAddr::V6(a), IpAddr::V6(b)) => a.octets() == b.octets(),
        _ => false,
    }
}

/// Middleware gating the protected controller's routes by caller address.
pub async fn client_ip_filter(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let remote = connect_info.map(|ConnectInfo(addr)| addr.ip());

    match remote {
        Some(ip) => info!("Request from remote IP address: {}", ip),
        None => warn!("Request without a remote IP address"),
    }

    if !state.allow_list.allows(remote) {
        warn!("Forbidden request from remote IP address {:?}", remote);
        return Err(ApiError::Forbidden);
    }

    Ok(next.run(req).await)
}
