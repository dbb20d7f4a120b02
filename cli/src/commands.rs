pub mod inventory;

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use edgeinv_common::config::Config;

#[derive(Parser)]
#[command(name = "edgeinv")]
#[command(about = "Ansible dynamic inventory for directly attached edge clusters.")]
pub struct CommandLine {
    /// Print the whole inventory (the default)
    #[arg(long, conflicts_with = "host")]
    pub list: bool,
    /// Print variables for a single host
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,
    /// Print a static example inventory instead of scanning
    #[arg(long, conflicts_with_all = ["host", "list"])]
    pub example: bool,
    /// TOML file with credentials and discovery settings
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Name prefix identifying wired interfaces
    #[arg(long, value_name = "PREFIX")]
    pub interface_prefix: Option<String>,
    /// Never assign the fallback address to an unconfigured interface
    #[arg(long)]
    pub no_configure: bool,
    /// Per-attempt SSH timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub ssh_timeout: Option<u64>,
    /// Indent the JSON output
    #[arg(long)]
    pub pretty: bool,
    /// Increase diagnostic output (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

pub enum Action {
    List,
    Host(String),
    Example,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn action(&self) -> Action {
        match (&self.host, self.example) {
            (Some(host), _) => Action::Host(host.clone()),
            (None, true) => Action::Example,
            (None, false) => Action::List,
        }
    }

    /// Loads the config file, if any, then applies flag overrides.
    pub fn config(&self) -> anyhow::Result<Config> {
        let mut cfg = match &self.config {
            Some(path) => Config::from_file(path).context("loading configuration")?,
            None => Config::default(),
        };

        if let Some(prefix) = &self.interface_prefix {
            cfg.interface_prefix = prefix.clone();
        }
        if self.no_configure {
            cfg.configure_interfaces = false;
        }
        if let Some(secs) = self.ssh_timeout {
            cfg.ssh_timeout_secs = secs;
        }
        Ok(cfg)
    }
}
