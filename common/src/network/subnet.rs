use std::fmt;
use std::net::Ipv4Addr;

use pnet::ipnetwork;

use crate::error::DiscoveryError;

/// An IPv4 network base address plus prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subnet {
    pub base: Ipv4Addr,
    pub prefix: u8,
}

impl Subnet {
    /// Derives the subnet of `addr` by zeroing its host bits under `netmask`.
    pub fn from_netmask(addr: Ipv4Addr, netmask: Ipv4Addr) -> Result<Self, DiscoveryError> {
        let prefix = ipnetwork::ipv4_mask_to_prefix(netmask)
            .map_err(|_| DiscoveryError::InvalidSubnet { addr, netmask })?;
        let base = Ipv4Addr::from(u32::from(addr) & u32::from(netmask));
        Ok(Self { base, prefix })
    }

    /// Addresses a sweep should probe.
    ///
    /// Network and broadcast addresses are skipped unless the prefix leaves no
    /// room for them (/31 and /32).
    pub fn hosts(&self) -> impl Iterator<Item = Ipv4Addr> {
        let start: u32 = self.base.into();
        let size: u64 = 1u64 << (32 - u32::from(self.prefix));
        let end: u32 = (u64::from(start) + size - 1) as u32;

        let (first, last) = if self.prefix >= 31 {
            (start, end)
        } else {
            (start + 1, end - 1)
        };
        (first..=last).map(Ipv4Addr::from)
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.prefix)
    }
}
