//! TCP port sweep over every derived subnet.
//!
//! Each address is probed independently through a [`PortProbe`]; only an
//! explicit `open` report puts a host into the result set. Hosts that do not
//! answer are simply absent.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use edgeinv_common::network::subnet::Subnet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortState {
    Open,
    Closed,
    Filtered,
}

#[async_trait]
pub trait PortProbe: Send + Sync {
    /// Reports the state of `port` on `addr`, or `None` when nothing about the
    /// port could be learned.
    async fn probe(&self, addr: Ipv4Addr, port: u16) -> Option<PortState>;
}

/// Unprivileged connect() probe, no name resolution involved.
pub struct TcpConnectProbe {
    probe_timeout: Duration,
}

impl TcpConnectProbe {
    pub fn new(probe_timeout: Duration) -> Self {
        Self { probe_timeout }
    }
}

#[async_trait]
impl PortProbe for TcpConnectProbe {
    async fn probe(&self, addr: Ipv4Addr, port: u16) -> Option<PortState> {
        let socket_addr = SocketAddr::new(addr.into(), port);

        match timeout(self.probe_timeout, TcpStream::connect(socket_addr)).await {
            Ok(Ok(_stream)) => Some(PortState::Open),
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => Some(PortState::Closed),
            Ok(Err(_)) => None,
            Err(_elapsed) => Some(PortState::Filtered),
        }
    }
}

/// Probes `port` on every host address of every subnet.
///
/// At most `max_concurrent` probes are in flight at once. The returned set is
/// ordered and free of duplicates regardless of completion order.
pub async fn sweep(
    subnets: &[Subnet],
    probe: Arc<dyn PortProbe>,
    port: u16,
    max_concurrent: usize,
) -> BTreeSet<Ipv4Addr> {
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut open: BTreeSet<Ipv4Addr> = BTreeSet::new();

    for subnet in subnets {
        info!("Scanning port {port} in network {subnet}");

        let mut probes: JoinSet<(Ipv4Addr, Option<PortState>)> = JoinSet::new();
        for addr in subnet.hosts() {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            while let Some(joined) = probes.try_join_next() {
                record(joined, port, &mut open);
            }
            let probe = probe.clone();
            probes.spawn(async move {
                let _permit = permit;
                (addr, probe.probe(addr, port).await)
            });
        }

        while let Some(joined) = probes.join_next().await {
            record(joined, port, &mut open);
        }
    }

    info!("Found {} host(s) with port {port} open", open.len());
    open
}

fn record(
    joined: Result<(Ipv4Addr, Option<PortState>), JoinError>,
    port: u16,
    open: &mut BTreeSet<Ipv4Addr>,
) {
    match joined {
        Ok((addr, Some(PortState::Open))) => {
            debug!("{addr}:{port} is open");
            open.insert(addr);
        }
        Ok((addr, Some(state))) => debug!("{addr}:{port} is {state:?}, excluding"),
        Ok((_, None)) => {}
        Err(e) => warn!("Probe task failed: {e}"),
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
