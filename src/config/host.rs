//! Static unicast hosts (`hosts`).

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

use crate::{IdentityError, Sid};

/// Default overlay UDP port.
pub const DEFAULT_HOST_PORT: u16 = 4110;

/// A subscriber with a known unicast endpoint.
///
/// ```yaml
/// hosts:
///   - sid: "7f3a...e1"
///     interface: eth0
///     address: 192.168.1.20
///     port: 4110
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Full SID in hex.
    pub sid: String,

    /// Interface name to probe on; any interface when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,

    /// Unicast IP address.
    pub address: IpAddr,

    /// UDP port (default: 4110).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl HostConfig {
    /// Parse the configured SID.
    pub fn sid(&self) -> Result<Sid, IdentityError> {
        Sid::from_hex(&self.sid)
    }

    /// Unicast endpoint of this host.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port.unwrap_or(DEFAULT_HOST_PORT))
    }
}
