use std::net::IpAddr;

use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

pub trait NetworkInterfaceExtension {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network>;
    fn get_non_ipv4_addrs(&self) -> Vec<IpAddr>;
    fn has_ipv4(&self) -> bool;
}

impl NetworkInterfaceExtension for NetworkInterface {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network> {
        self.ips
            .iter()
            .filter_map(|ip| {
                if let IpNetwork::V4(ipv4) = ip {
                    Some(*ipv4)
                } else {
                    None
                }
            })
            .collect()
    }

    fn get_non_ipv4_addrs(&self) -> Vec<IpAddr> {
        self.ips
            .iter()
            .filter(|ip| !ip.is_ipv4())
            .map(|ip| ip.ip())
            .collect()
    }

    fn has_ipv4(&self) -> bool {
        self.ips.iter().any(|ip| ip.is_ipv4())
    }
}

/// Wired interfaces are recognised by name only (`eth0`, `enp9s0`, ...).
pub fn is_wired(interface: &NetworkInterface, prefix: &str) -> bool {
    interface.name.starts_with(prefix)
}

/// Keeps the interfaces matching the wired naming marker, in system order.
pub fn select_wired(interfaces: Vec<NetworkInterface>, prefix: &str) -> Vec<NetworkInterface> {
    interfaces
        .into_iter()
        .filter(|interface| is_wired(interface, prefix))
        .collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
