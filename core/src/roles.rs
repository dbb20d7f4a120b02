//! Role assignment.
//!
//! Splits classified hosts into a router and compute-node buckets, names the
//! compute nodes and picks the control-plane and distributed-store members.

use std::cmp::Reverse;
use std::net::Ipv4Addr;

use tracing::{debug, info};

use edgeinv_common::error::DiscoveryError;
use edgeinv_common::network::host::{ClassifiedHost, OsKind};

const CONTROL_PLANE_SIZE: usize = 3;
const STORE_SIZE: usize = 7;

/// A compute node with its synthetic inventory name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeNode {
    pub id: String,
    pub host: ClassifiedHost,
    discovery_idx: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleAssignment {
    pub router: Option<ClassifiedHost>,
    /// Sorted by CPU clock, fastest first; ids `node0`, `node1`, ...
    pub container_linux: Vec<ComputeNode>,
    /// Sorted by CPU clock, fastest first; ids `pi0`, `pi1`, ...
    pub raspbian: Vec<ComputeNode>,
    pub control_plane: Vec<String>,
    pub store: Vec<String>,
    pub workers: Vec<String>,
}

impl RoleAssignment {
    pub fn compute_nodes(&self) -> impl Iterator<Item = &ComputeNode> {
        self.container_linux.iter().chain(self.raspbian.iter())
    }
}

/// Buckets `hosts` by [`OsKind`] and derives group membership.
///
/// `hosts` must be in discovery order; ties in CPU clock keep that order.
/// Fails when more than one router was found.
pub fn assign_roles(hosts: Vec<ClassifiedHost>) -> Result<RoleAssignment, DiscoveryError> {
    let mut routers: Vec<ClassifiedHost> = Vec::new();
    let mut container_linux: Vec<(usize, ClassifiedHost)> = Vec::new();
    let mut raspbian: Vec<(usize, ClassifiedHost)> = Vec::new();

    for (idx, host) in hosts.into_iter().enumerate() {
        match host.os {
            OsKind::EdgeOs => routers.push(host),
            OsKind::ContainerLinux => container_linux.push((idx, host)),
            OsKind::Raspbian => raspbian.push((idx, host)),
            OsKind::Unknown => debug!("Dropping unclassified host {}", host.addr),
        }
    }

    if routers.len() > 1 {
        return Err(DiscoveryError::MultipleRoutersUnsupported {
            routers: routers.iter().map(|r| r.addr).collect::<Vec<Ipv4Addr>>(),
        });
    }

    let container_linux = name_bucket(container_linux, "node");
    let raspbian = name_bucket(raspbian, "pi");

    let mut cluster: Vec<&ComputeNode> = container_linux.iter().chain(raspbian.iter()).collect();
    cluster.sort_by_key(|node| (Reverse(node.host.metric()), node.discovery_idx));
    let cluster: Vec<String> = cluster.into_iter().map(|node| node.id.clone()).collect();

    let control_plane = control_plane_members(&cluster).to_vec();
    let store = store_members(&cluster).to_vec();

    if let Some(router) = routers.first() {
        info!("Router: {}", router.addr);
    }
    info!("Control plane: {}", control_plane.join(", "));
    info!("Distributed store: {}", store.join(", "));

    Ok(RoleAssignment {
        router: routers.pop(),
        container_linux,
        raspbian,
        control_plane,
        store,
        workers: cluster,
    })
}

/// Sorts a bucket by descending clock (stable) and numbers it from 0.
fn name_bucket(mut bucket: Vec<(usize, ClassifiedHost)>, prefix: &str) -> Vec<ComputeNode> {
    bucket.sort_by_key(|(_, host)| Reverse(host.metric()));
    bucket
        .into_iter()
        .enumerate()
        .map(|(n, (discovery_idx, host))| {
            let id = format!("{prefix}{n}");
            info!("Assigned {id} to {} ({} MHz)", host.addr, host.metric());
            ComputeNode {
                id,
                host,
                discovery_idx,
            }
        })
        .collect()
}

/// The first three nodes, or all of them when there are fewer.
pub fn control_plane_members<T>(sorted: &[T]) -> &[T] {
    &sorted[..sorted.len().min(CONTROL_PLANE_SIZE)]
}

/// Indices 1..=6 for an even bucket smaller than seven, otherwise 0..=6.
pub fn store_members<T>(sorted: &[T]) -> &[T] {
    let len = sorted.len();
    let end = len.min(STORE_SIZE);
    if len % 2 == 0 && len < STORE_SIZE && len > 0 {
        &sorted[1..end]
    } else {
        &sorted[..end]
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
