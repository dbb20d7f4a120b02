//! In-memory stand-ins for the network stack, port scanner and SSH.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use edgeinv_common::config::Config;
use edgeinv_core::enumerator::{InterfaceConfigurator, InterfaceSource};
use edgeinv_core::fingerprint::profiles::{CPU_MAX_FREQ_COMMAND, MOTD_COMMAND};
use edgeinv_core::pipeline::InventoryService;
use edgeinv_core::ssh::{RemoteExecutor, RemoteSession, SessionTarget};
use edgeinv_core::sweeper::{PortProbe, PortState};
use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

pub fn ni(name: &str, ips: &[IpNetwork]) -> NetworkInterface {
    NetworkInterface {
        name: name.into(),
        description: "".into(),
        index: 0,
        mac: None,
        ips: ips.to_vec(),
        flags: 0,
    }
}

pub fn v4(a: u8, b: u8, c: u8, d: u8, p: u8) -> IpNetwork {
    IpNetwork::V4(Ipv4Network::new(Ipv4Addr::new(a, b, c, d), p).unwrap())
}

pub fn lan(d: u8) -> Ipv4Addr {
    Ipv4Addr::new(192, 168, 1, d)
}

pub struct StaticInterfaces(pub Vec<NetworkInterface>);

impl InterfaceSource for StaticInterfaces {
    fn interfaces(&self) -> Vec<NetworkInterface> {
        self.0.clone()
    }
}

#[derive(Clone, Default)]
pub struct CountingConfigurator {
    pub calls: Arc<AtomicUsize>,
}

impl InterfaceConfigurator for CountingConfigurator {
    fn configure(&self, _name: &str, _addr: Ipv4Addr, _netmask: Ipv4Addr) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeScanner {
    pub ports: HashMap<Ipv4Addr, PortState>,
}

#[async_trait]
impl PortProbe for FakeScanner {
    async fn probe(&self, addr: Ipv4Addr, _port: u16) -> Option<PortState> {
        self.ports.get(&addr).copied()
    }
}

/// Maps (address, username) to the outputs of the commands that account can run.
#[derive(Default)]
pub struct FakeSsh {
    accounts: HashMap<(Ipv4Addr, String), HashMap<String, String>>,
    pub opened: AtomicUsize,
    pub closed: Arc<AtomicUsize>,
}

impl FakeSsh {
    pub fn account(&mut self, addr: Ipv4Addr, user: &str, outputs: &[(&str, &str)]) {
        let outputs = outputs
            .iter()
            .map(|(cmd, out)| (cmd.to_string(), out.to_string()))
            .collect();
        self.accounts.insert((addr, user.to_string()), outputs);
    }
}

struct FakeSession {
    outputs: HashMap<String, String>,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl RemoteSession for FakeSession {
    async fn exec(&mut self, command: &str) -> anyhow::Result<String> {
        self.outputs
            .get(command)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("{command}: not found"))
    }

    async fn close(self: Box<Self>) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteExecutor for FakeSsh {
    async fn connect(&self, target: &SessionTarget) -> anyhow::Result<Box<dyn RemoteSession>> {
        let outputs = self
            .accounts
            .get(&(target.addr, target.username.clone()))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("permission denied"))?;
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            outputs,
            closed: self.closed.clone(),
        }))
    }
}

/// A small lab: one physical LAN with hosts registered by the helpers below.
#[derive(Default)]
pub struct Lab {
    pub interfaces: Vec<NetworkInterface>,
    pub scanner: FakeScanner,
    pub ssh: FakeSsh,
}

impl Lab {
    pub fn on_lan() -> Self {
        Self {
            interfaces: vec![
                ni("lo", &[v4(127, 0, 0, 1, 8)]),
                ni("eth0", &[v4(192, 168, 1, 50, 24)]),
            ],
            ..Self::default()
        }
    }

    pub fn router(&mut self, addr: Ipv4Addr, motd: &str) -> &mut Self {
        self.scanner.ports.insert(addr, PortState::Open);
        self.ssh.account(addr, "ubnt", &[(MOTD_COMMAND, motd)]);
        self
    }

    pub fn node(&mut self, addr: Ipv4Addr, mhz: u32) -> &mut Self {
        self.scanner.ports.insert(addr, PortState::Open);
        let khz = (mhz * 1000).to_string();
        self.ssh.account(
            addr,
            "core",
            &[
                (MOTD_COMMAND, "Container Linux by CoreOS stable (2303.3.0)"),
                (CPU_MAX_FREQ_COMMAND, khz.as_str()),
            ],
        );
        self
    }

    pub fn stranger(&mut self, addr: Ipv4Addr) -> &mut Self {
        self.scanner.ports.insert(addr, PortState::Open);
        self.ssh.account(addr, "ubnt", &[(MOTD_COMMAND, "Welcome to Ubuntu 22.04")]);
        self
    }

    pub fn port(&mut self, addr: Ipv4Addr, state: PortState) -> &mut Self {
        self.scanner.ports.insert(addr, state);
        self
    }

    pub fn service(self) -> (InventoryService, Arc<FakeSsh>, CountingConfigurator) {
        let ssh = Arc::new(self.ssh);
        let configurator = CountingConfigurator::default();
        let cfg = Config {
            ssh_timeout_secs: 1,
            ..Config::default()
        };
        let service = InventoryService::new(
            Box::new(StaticInterfaces(self.interfaces)),
            Box::new(configurator.clone()),
            Arc::new(self.scanner),
            ssh.clone(),
            cfg,
        );
        (service, ssh, configurator)
    }
}
