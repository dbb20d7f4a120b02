use std::fmt;
use std::net::Ipv4Addr;

/// Operating system / device family as identified by its login banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OsKind {
    /// Ubiquiti EdgeOS router.
    EdgeOs,
    /// Container-optimised compute node (CoreOS Container Linux).
    ContainerLinux,
    /// Single-board compute node running Raspbian.
    Raspbian,
    Unknown,
}

impl OsKind {
    pub fn display_name(self) -> &'static str {
        match self {
            OsKind::EdgeOs => "EdgeOS",
            OsKind::ContainerLinux => "Container Linux",
            OsKind::Raspbian => "Raspbian",
            OsKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A host that answered on the SSH port, plus what the fingerprinter learned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedHost {
    pub addr: Ipv4Addr,
    pub os: OsKind,
    /// CPU clock in MHz. `None` when the profile has no metric command
    /// (routers); `Some(0)` when the command ran but its output was unusable.
    pub cpu_mhz: Option<u32>,
}

impl ClassifiedHost {
    pub fn new(addr: Ipv4Addr, os: OsKind) -> Self {
        Self {
            addr,
            os,
            cpu_mhz: None,
        }
    }

    pub fn with_cpu_mhz(mut self, mhz: u32) -> Self {
        self.cpu_mhz = Some(mhz);
        self
    }

    pub fn unknown(addr: Ipv4Addr) -> Self {
        Self::new(addr, OsKind::Unknown)
    }

    /// Sort key for the descending performance sort; unmeasured hosts rank last.
    pub fn metric(&self) -> u32 {
        self.cpu_mhz.unwrap_or(0)
    }
}
