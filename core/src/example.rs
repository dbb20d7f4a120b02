//! A fixed inventory for smoke-testing the consumer without touching the network.

use serde_json::json;

use edgeinv_common::inventory::{InventoryDocument, InventoryGroup, Vars};

pub fn example_inventory() -> InventoryDocument {
    let mut doc = InventoryDocument::default();

    doc.groups.insert(
        "group".to_string(),
        InventoryGroup::with_hosts(["192.168.28.71", "192.168.28.72"])
            .var("ansible_ssh_user", "vagrant")
            .var("ansible_ssh_private_key_file", "~/.vagrant.d/insecure_private_key")
            .var("ansible_python_interpreter", "/usr/bin/python3")
            .var("example_variable", "value"),
    );
    doc.groups.insert(
        "all".to_string(),
        InventoryGroup::with_children(["group"]),
    );

    for (host, value) in [("192.168.28.71", "foo"), ("192.168.28.72", "bar")] {
        doc.meta.hostvars.insert(
            host.to_string(),
            Vars::from([("host_specific_var".to_string(), json!(value))]),
        );
    }

    doc
}
