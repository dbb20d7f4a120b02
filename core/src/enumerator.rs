//! Local subnet enumeration.
//!
//! Lists wired interfaces, turns each configured IPv4 address into a
//! [`Subnet`] and, when a wired interface has no IPv4 address at all, assigns
//! the configured fallback address so a factory-fresh router is reachable.

use std::net::Ipv4Addr;
use std::process::Command;

use anyhow::{Context, ensure};
use pnet::datalink::{self, NetworkInterface};
use tracing::{info, warn};

use edgeinv_common::config::Config;
use edgeinv_common::error::DiscoveryError;
use edgeinv_common::network::interface::{self, NetworkInterfaceExtension};
use edgeinv_common::network::subnet::Subnet;

/// Provides a snapshot of the system's network interfaces.
pub trait InterfaceSource: Send + Sync {
    fn interfaces(&self) -> Vec<NetworkInterface>;
}

/// Applies an IPv4 address to an interface in the OS network stack.
pub trait InterfaceConfigurator: Send + Sync {
    fn configure(&self, name: &str, addr: Ipv4Addr, netmask: Ipv4Addr) -> anyhow::Result<()>;
}

pub struct SystemInterfaces;

impl InterfaceSource for SystemInterfaces {
    fn interfaces(&self) -> Vec<NetworkInterface> {
        datalink::interfaces()
    }
}

/// Configures interfaces through `ifconfig`.
pub struct IfconfigConfigurator;

impl InterfaceConfigurator for IfconfigConfigurator {
    fn configure(&self, name: &str, addr: Ipv4Addr, netmask: Ipv4Addr) -> anyhow::Result<()> {
        let output = Command::new("ifconfig")
            .arg(name)
            .arg(addr.to_string())
            .arg("netmask")
            .arg(netmask.to_string())
            .output()
            .context("failed to run ifconfig")?;

        ensure!(
            output.status.success(),
            "ifconfig {name} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        Ok(())
    }
}

/// Derives one [`Subnet`] per IPv4 address found on a wired interface.
///
/// Duplicates across interfaces are kept. Fails only when no interface
/// matches the wired naming marker.
pub fn enumerate_subnets(
    source: &dyn InterfaceSource,
    configurator: &dyn InterfaceConfigurator,
    cfg: &Config,
) -> Result<Vec<Subnet>, DiscoveryError> {
    let wired = interface::select_wired(source.interfaces(), &cfg.interface_prefix);
    if wired.is_empty() {
        return Err(DiscoveryError::NoInterfacesFound {
            prefix: cfg.interface_prefix.clone(),
        });
    }

    let mut subnets: Vec<Subnet> = Vec::new();

    for intf in wired {
        info!("Detected interface {}", intf.name);

        let intf = if intf.has_ipv4() {
            intf
        } else {
            match apply_fallback(&intf.name, source, configurator, cfg) {
                Some(configured) => configured,
                None => continue,
            }
        };

        for addr in intf.get_non_ipv4_addrs() {
            info!("Ignoring non-IPv4 address {addr} on {}", intf.name);
        }

        for net in intf.get_ipv4_nets() {
            match Subnet::from_netmask(net.ip(), net.mask()) {
                Ok(subnet) => {
                    info!("Detected subnet {subnet} on {}", intf.name);
                    subnets.push(subnet);
                }
                Err(e) => warn!("Skipping address on {}: {e}", intf.name),
            }
        }
    }

    Ok(subnets)
}

fn apply_fallback(
    name: &str,
    source: &dyn InterfaceSource,
    configurator: &dyn InterfaceConfigurator,
    cfg: &Config,
) -> Option<NetworkInterface> {
    if !cfg.configure_interfaces {
        warn!("Interface {name} has no IPv4 address and auto-configuration is disabled, skipping");
        return None;
    }

    warn!(
        "Interface {name} has no IPv4 address, configuring {} netmask {}",
        cfg.fallback_address, cfg.fallback_netmask
    );

    if let Err(e) = configurator.configure(name, cfg.fallback_address, cfg.fallback_netmask) {
        warn!("Failed to configure interface {name}: {e:#}");
        return None;
    }

    let refreshed = source
        .interfaces()
        .into_iter()
        .find(|intf| intf.name == name && intf.has_ipv4());

    if refreshed.is_none() {
        warn!("Interface {name} still has no IPv4 address after configuration, skipping");
    }
    refreshed
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
