use std::net::Ipv4Addr;

use thiserror::Error;

/// Conditions that abort a discovery run before any inventory is printed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("did not detect any interfaces starting with '{prefix}'")]
    NoInterfacesFound { prefix: String },

    #[error("only a single router configuration is supported, found {}", format_routers(.routers))]
    MultipleRoutersUnsupported { routers: Vec<Ipv4Addr> },

    #[error("netmask {netmask} of {addr} is not contiguous")]
    InvalidSubnet { addr: Ipv4Addr, netmask: Ipv4Addr },
}

fn format_routers(routers: &[Ipv4Addr]) -> String {
    routers
        .iter()
        .map(|addr| addr.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiple_routers_lists_every_address() {
        let err = DiscoveryError::MultipleRoutersUnsupported {
            routers: vec![Ipv4Addr::new(192, 168, 1, 1), Ipv4Addr::new(192, 168, 1, 2)],
        };
        assert_eq!(
            err.to_string(),
            "only a single router configuration is supported, found 192.168.1.1, 192.168.1.2"
        );
    }

    #[test]
    fn no_interfaces_names_the_prefix() {
        let err = DiscoveryError::NoInterfacesFound { prefix: "e".into() };
        assert_eq!(err.to_string(), "did not detect any interfaces starting with 'e'");
    }
}
