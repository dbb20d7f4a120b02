//! Known device families, most common first.
//!
//! Adding a device type means appending a [`Profile`] here; the matching
//! loop in [`super::Fingerprinter`] never changes.

use std::path::PathBuf;

use edgeinv_common::config::Config;
use edgeinv_common::network::host::OsKind;

use crate::ssh::SshAuth;

pub const MOTD_COMMAND: &str = "cat /etc/motd";
pub const OS_RELEASE_COMMAND: &str = "cat /etc/os-release";
pub const CPU_MAX_FREQ_COMMAND: &str = "cat /sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq";

const DEFAULT_KEY_FILES: &[&str] = &["~/.ssh/id_ed25519", "~/.ssh/id_rsa"];

#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub kind: OsKind,
    pub username: String,
    pub auth: SshAuth,
    /// Prints a short identification banner.
    pub banner_command: String,
    /// Matched case-insensitively against the banner.
    pub marker: String,
    /// Prints the CPU clock in kHz.
    pub metric_command: Option<String>,
}

impl Profile {
    pub fn matches(&self, banner: &str) -> bool {
        banner.to_lowercase().contains(&self.marker.to_lowercase())
    }
}

pub fn default_profiles(cfg: &Config) -> Vec<Profile> {
    vec![
        Profile {
            name: "edgeos".to_string(),
            kind: OsKind::EdgeOs,
            username: cfg.router.username.clone(),
            auth: SshAuth::Password(cfg.router.password.clone()),
            banner_command: MOTD_COMMAND.to_string(),
            marker: "edgeos".to_string(),
            metric_command: None,
        },
        Profile {
            name: "container-linux".to_string(),
            kind: OsKind::ContainerLinux,
            username: cfg.container_linux.username.clone(),
            auth: SshAuth::KeyFiles(key_files(&cfg.container_linux.key_file)),
            banner_command: MOTD_COMMAND.to_string(),
            marker: "container linux".to_string(),
            metric_command: Some(CPU_MAX_FREQ_COMMAND.to_string()),
        },
        Profile {
            name: "raspbian".to_string(),
            kind: OsKind::Raspbian,
            username: cfg.raspbian.username.clone(),
            auth: SshAuth::KeyFiles(key_files(&cfg.raspbian.key_file)),
            banner_command: OS_RELEASE_COMMAND.to_string(),
            marker: "raspbian".to_string(),
            metric_command: Some(CPU_MAX_FREQ_COMMAND.to_string()),
        },
    ]
}

/// The configured key first, then the usual defaults.
fn key_files(configured: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = vec![expand_home(configured)];
    for default in DEFAULT_KEY_FILES {
        let path = expand_home(default);
        if !files.contains(&path) {
            files.push(path);
        }
    }
    files
}

pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Converts a kHz reading to MHz. Anything unparsable counts as 0.
pub fn parse_cpu_mhz(output: &str) -> u32 {
    output
        .trim()
        .parse::<u64>()
        .map(|khz| u32::try_from(khz / 1000).unwrap_or(u32::MAX))
        .unwrap_or(0)
}
