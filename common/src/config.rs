use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Run configuration for a single discovery pass.
///
/// Every field has a default, so an empty (or missing) config file yields the
/// behaviour of a stock edge cluster: `e*` interfaces, EdgeOS factory
/// credentials and CoreOS-style compute nodes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interfaces whose name starts with this marker are treated as wired.
    ///
    /// This is a naming convention only, no hardware query is made.
    pub interface_prefix: String,
    /// Address assigned to a wired interface that has no IPv4 address.
    pub fallback_address: Ipv4Addr,
    pub fallback_netmask: Ipv4Addr,
    /// Allows the enumerator to assign `fallback_address` on its own.
    pub configure_interfaces: bool,
    pub ssh_port: u16,
    /// Per-host TCP connect timeout used by the port sweep.
    pub probe_timeout_ms: u64,
    /// Per-attempt timeout for an SSH login plus its commands.
    pub ssh_timeout_secs: u64,
    pub max_concurrent_probes: usize,
    pub max_concurrent_logins: usize,
    pub router: RouterCredentials,
    pub container_linux: NodeCredentials,
    pub raspbian: NodeCredentials,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterCredentials {
    pub username: String,
    pub password: String,
    pub network_os: String,
}

/// Key-based login details shared by every compute node of one OS kind.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeCredentials {
    pub username: String,
    pub key_file: String,
    pub python_interpreter: String,
    #[serde(default)]
    pub bin_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interface_prefix: "e".to_string(),
            fallback_address: Ipv4Addr::new(192, 168, 1, 100),
            fallback_netmask: Ipv4Addr::new(255, 255, 255, 0),
            configure_interfaces: true,
            ssh_port: 22,
            probe_timeout_ms: 500,
            ssh_timeout_secs: 5,
            max_concurrent_probes: 256,
            max_concurrent_logins: 16,
            router: RouterCredentials::default(),
            container_linux: NodeCredentials {
                username: "core".to_string(),
                key_file: "~/.ssh/id_rsa".to_string(),
                python_interpreter: "/opt/bin/python".to_string(),
                bin_dir: Some("/opt/bin".to_string()),
            },
            raspbian: NodeCredentials {
                username: "pi".to_string(),
                key_file: "~/.ssh/id_rsa".to_string(),
                python_interpreter: "/usr/bin/python3".to_string(),
                bin_dir: None,
            },
        }
    }
}

impl Default for RouterCredentials {
    fn default() -> Self {
        Self {
            username: "ubnt".to_string(),
            password: "ubnt".to_string(),
            network_os: "edgeos".to_string(),
        }
    }
}

impl Config {
    /// Reads a TOML config file. Missing keys fall back to their defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn ssh_timeout(&self) -> Duration {
        Duration::from_secs(self.ssh_timeout_secs)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg.interface_prefix, "e");
        assert_eq!(cfg.fallback_address, Ipv4Addr::new(192, 168, 1, 100));
        assert_eq!(cfg.router.username, "ubnt");
        assert_eq!(cfg.container_linux.username, "core");
        assert_eq!(cfg.raspbian.python_interpreter, "/usr/bin/python3");
    }

    #[test]
    fn partial_toml_overrides_only_given_keys() {
        let raw = r#"
            interface_prefix = "enp"
            ssh_timeout_secs = 2

            [router]
            password = "hunter2"
        "#;
        let cfg = Config::from_toml(raw).unwrap();
        assert_eq!(cfg.interface_prefix, "enp");
        assert_eq!(cfg.ssh_timeout(), Duration::from_secs(2));
        assert_eq!(cfg.router.username, "ubnt");
        assert_eq!(cfg.router.password, "hunter2");
        assert_eq!(cfg.ssh_port, 22);
    }

    #[test]
    fn node_credentials_require_core_fields() {
        let raw = r#"
            [raspbian]
            username = "ubuntu"
        "#;
        assert!(Config::from_toml(raw).is_err());
    }
}
