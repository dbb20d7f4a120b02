//! Builds the Ansible inventory document from a [`RoleAssignment`].

use std::collections::BTreeMap;

use serde_json::{Value, json};

use edgeinv_common::config::{Config, NodeCredentials};
use edgeinv_common::inventory::{InventoryDocument, InventoryGroup, LOCALHOST, Meta, Vars};

use crate::roles::{ComputeNode, RoleAssignment};

pub const ALL: &str = "all";
pub const ROUTERS: &str = "routers";
pub const CONTAINER_LINUX: &str = "container_linux";
pub const RASPBIAN: &str = "raspbian";
pub const PXE_SERVER: &str = "pxe_server";
pub const CONTROL_PLANE: &str = "kube-master";
pub const STORE: &str = "etcd";
pub const WORKERS: &str = "kube-node";
pub const CLUSTER: &str = "k8s-cluster";

const LOCAL_PYTHON: &str = "/usr/bin/python";

pub fn synthesize(roles: &RoleAssignment, cfg: &Config) -> InventoryDocument {
    let mut groups: BTreeMap<String, InventoryGroup> = BTreeMap::new();

    groups.insert(
        ALL.to_string(),
        InventoryGroup::with_children([
            ROUTERS,
            CONTAINER_LINUX,
            RASPBIAN,
            PXE_SERVER,
            STORE,
            CLUSTER,
        ]),
    );

    let router_hosts = roles.router.iter().map(|router| router.addr.to_string());
    groups.insert(
        ROUTERS.to_string(),
        InventoryGroup::with_hosts(router_hosts)
            .var("ansible_user", cfg.router.username.as_str())
            .var("ansible_password", cfg.router.password.as_str())
            .var("ansible_connection", "network_cli")
            .var("ansible_network_os", cfg.router.network_os.as_str()),
    );

    groups.insert(
        CONTAINER_LINUX.to_string(),
        node_group(&roles.container_linux, &cfg.container_linux),
    );
    groups.insert(RASPBIAN.to_string(), node_group(&roles.raspbian, &cfg.raspbian));

    groups.insert(
        CONTROL_PLANE.to_string(),
        InventoryGroup::with_hosts(roles.control_plane.iter().cloned()),
    );
    groups.insert(STORE.to_string(), InventoryGroup::with_hosts(roles.store.iter().cloned()));
    groups.insert(WORKERS.to_string(), InventoryGroup::with_hosts(roles.workers.iter().cloned()));
    groups.insert(
        CLUSTER.to_string(),
        InventoryGroup::with_children([CONTROL_PLANE, WORKERS]),
    );
    groups.insert(PXE_SERVER.to_string(), InventoryGroup::with_hosts([LOCALHOST]));

    let mut meta = Meta::default();
    meta.hostvars.insert(LOCALHOST.to_string(), localhost_vars());
    let buckets = [
        (&roles.container_linux, &cfg.container_linux),
        (&roles.raspbian, &cfg.raspbian),
    ];
    for (nodes, creds) in buckets {
        for node in nodes {
            meta.hostvars.insert(node.id.clone(), node_vars(node, creds));
        }
    }

    InventoryDocument { groups, meta }
}

fn node_group(nodes: &[ComputeNode], creds: &NodeCredentials) -> InventoryGroup {
    let group = InventoryGroup::with_hosts(nodes.iter().map(|node| node.id.clone()));
    match &creds.bin_dir {
        Some(bin_dir) => group.var("bin_dir", bin_dir.as_str()),
        None => group,
    }
}

fn localhost_vars() -> Vars {
    Vars::from([
        ("ansible_connection".to_string(), json!("local")),
        ("ansible_python_interpreter".to_string(), json!(LOCAL_PYTHON)),
    ])
}

fn node_vars(node: &ComputeNode, creds: &NodeCredentials) -> Vars {
    let mut vars = Vars::from([
        ("ansible_host".to_string(), json!(node.host.addr.to_string())),
        ("ansible_user".to_string(), json!(creds.username)),
        ("ansible_ssh_private_key_file".to_string(), json!(creds.key_file)),
        ("ansible_python_interpreter".to_string(), json!(creds.python_interpreter)),
        ("ansible_become".to_string(), Value::Bool(true)),
    ]);
    if let Some(mhz) = node.host.cpu_mhz {
        vars.insert("cpu_mhz".to_string(), json!(mhz));
    }
    vars
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
