//! Network range parsing and host enumeration.
//!
//! A `NetworkRange` is parsed once from CIDR text and never changes. Host
//! addresses are produced lazily by `NetworkRange::hosts`, so a /64 costs no
//! more to set up than a /30.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnet::{IpAddrRange, IpNet};

use crate::error::{RangeError, Result};

/// An IPv4 or IPv6 network prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkRange {
    net: IpNet,
}

impl NetworkRange {
    /// Parse CIDR text such as `172.30.16.0/20` or `fd00:face:cafe:fade::/64`.
    ///
    /// Host bits in the address are dropped (`10.1.2.3/24` becomes
    /// `10.1.2.0/24`). A bare address is read as a single-host network.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let invalid = |reason: String| RangeError::InvalidNetworkAddress {
            input: input.to_string(),
            reason,
        };

        let net = if trimmed.contains('/') {
            IpNet::from_str(trimmed).map_err(|e| invalid(e.to_string()))?
        } else {
            let addr = IpAddr::from_str(trimmed).map_err(|e| invalid(e.to_string()))?;
            let max_prefix = if addr.is_ipv4() { 32 } else { 128 };
            IpNet::new(addr, max_prefix).map_err(|e| invalid(e.to_string()))?
        };

        Ok(Self { net: net.trunc() })
    }

    pub fn is_ipv4(&self) -> bool {
        matches!(self.net, IpNet::V4(_))
    }

    pub fn prefix_len(&self) -> u8 {
        self.net.prefix_len()
    }

    pub fn network_address(&self) -> IpAddr {
        self.net.network()
    }

    /// Broadcast address. IPv6 has no broadcast, so this is `None` there.
    pub fn broadcast_address(&self) -> Option<IpAddr> {
        match self.net {
            IpNet::V4(v4) => Some(IpAddr::V4(v4.broadcast())),
            IpNet::V6(_) => None,
        }
    }

    /// Reject prefixes that cannot be swept: IPv4 /31 and /32.
    pub fn ensure_sweepable(&self) -> Result<()> {
        if self.is_ipv4() && self.prefix_len() >= 31 {
            return Err(RangeError::UnsupportedPrefixLength {
                network: self.to_string(),
            });
        }
        Ok(())
    }

    /// Number of addresses `hosts` will yield, saturating at `u128::MAX`
    /// for an IPv6 /0.
    pub fn host_count(&self) -> Result<u128> {
        self.ensure_sweepable()?;
        let count = match self.net {
            IpNet::V4(v4) => (1u128 << (32 - v4.prefix_len())) - 2,
            IpNet::V6(v6) => 1u128
                .checked_shl(u32::from(128 - v6.prefix_len()))
                .unwrap_or(u128::MAX),
        };
        Ok(count)
    }

    /// Enumerate the addresses to probe, in ascending order.
    ///
    /// IPv4 networks skip the network and broadcast addresses; IPv6 networks
    /// yield every address. Each call starts a fresh iterator.
    pub fn hosts(&self) -> Result<Hosts> {
        self.ensure_sweepable()?;
        let range = match self.net {
            IpNet::V4(v4) => IpAddrRange::V4(v4.hosts()),
            IpNet::V6(v6) => IpAddrRange::V6(v6.hosts()),
        };
        Ok(Hosts { range })
    }
}

impl FromStr for NetworkRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for NetworkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.net)
    }
}

/// Lazy, ordered iterator over the host addresses of a `NetworkRange`.
#[derive(Debug, Clone)]
pub struct Hosts {
    range: IpAddrRange,
}

impl Iterator for Hosts {
    type Item = IpAddr;

    fn next(&mut self) -> Option<IpAddr> {
        self.range.next()
    }
}
