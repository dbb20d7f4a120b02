#![cfg(test)]
use std::sync::atomic::Ordering;

use edgeinv_common::error::DiscoveryError;
use edgeinv_common::inventory::LOCALHOST;
use edgeinv_core::sweeper::PortState;
use edgeinv_core::synthesizer::{
    ALL, CONTAINER_LINUX, CONTROL_PLANE, PXE_SERVER, ROUTERS, STORE, WORKERS,
};
use serde_json::json;

use crate::utils::{Lab, lan, ni, v4};

/// A router, four nodes of mixed speed, one unknown Linux box and one host
/// with SSH filtered end up in the right groups.
#[tokio::test]
async fn full_pipeline_builds_grouped_inventory() {
    let mut lab = Lab::on_lan();
    lab.router(lan(1), "Welcome to EdgeOS v2.0.9")
        .node(lan(10), 1200)
        .node(lan(11), 800)
        .node(lan(12), 2400)
        .node(lan(13), 1600)
        .stranger(lan(20))
        .port(lan(30), PortState::Filtered)
        .port(lan(31), PortState::Closed);

    let (service, ssh, configurator) = lab.service();
    let doc = service.build_inventory().await.expect("discovery failed");

    assert_eq!(doc.hosts_of(ROUTERS), ["192.168.1.1"]);
    assert_eq!(doc.hosts_of(CONTAINER_LINUX), ["node0", "node1", "node2", "node3"]);
    assert_eq!(doc.hosts_of(CONTROL_PLANE), ["node0", "node1", "node2"]);
    assert_eq!(doc.hosts_of(STORE), ["node1", "node2", "node3"]);
    assert_eq!(doc.hosts_of(WORKERS), ["node0", "node1", "node2", "node3"]);
    assert_eq!(doc.hosts_of(PXE_SERVER), [LOCALHOST]);

    let expected_order = [
        ("node0", "192.168.1.12"),
        ("node1", "192.168.1.13"),
        ("node2", "192.168.1.10"),
        ("node3", "192.168.1.11"),
    ];
    for (id, addr) in expected_order {
        assert_eq!(doc.hostvars(id).unwrap()["ansible_host"], json!(addr));
    }

    let hostvars: Vec<&String> = doc.meta.hostvars.keys().collect();
    assert_eq!(hostvars, ["localhost", "node0", "node1", "node2", "node3"]);
    assert!(doc.hostvars("192.168.1.20").is_none());

    assert_eq!(ssh.opened.load(Ordering::SeqCst), ssh.closed.load(Ordering::SeqCst));
    assert_eq!(configurator.calls.load(Ordering::SeqCst), 0);

    let rendered = serde_json::to_value(&doc).unwrap();
    assert!(rendered[ALL]["children"].is_array());
    assert!(rendered["_meta"]["hostvars"][LOCALHOST].is_object());
}

#[tokio::test]
async fn no_wired_interface_aborts() {
    let lab = Lab {
        interfaces: vec![
            ni("lo", &[v4(127, 0, 0, 1, 8)]),
            ni("wlan0", &[v4(10, 0, 0, 9, 24)]),
        ],
        ..Lab::default()
    };
    let (service, ssh, _) = lab.service();

    let err = service.build_inventory().await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<DiscoveryError>(),
        Some(&DiscoveryError::NoInterfacesFound { prefix: "e".into() })
    );
    assert_eq!(ssh.opened.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn two_edgeos_routers_abort() {
    let mut lab = Lab::on_lan();
    lab.router(lan(1), "EdgeOS v2")
        .router(lan(2), "EDGEOS-LITE")
        .node(lan(10), 1000);
    let (service, _, _) = lab.service();

    let err = service.build_inventory().await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<DiscoveryError>(),
        Some(&DiscoveryError::MultipleRoutersUnsupported { routers: vec![lan(1), lan(2)] })
    );
}

#[tokio::test]
async fn nine_nodes_store_takes_first_seven() {
    let mut lab = Lab::on_lan();
    for n in 0..9u8 {
        lab.node(lan(100 + n), 1000 + u32::from(n) * 100);
    }
    let (service, _, _) = lab.service();
    let doc = service.build_inventory().await.unwrap();

    let expected: Vec<String> = (0..7).map(|n| format!("node{n}")).collect();
    assert_eq!(doc.hosts_of(STORE), expected.as_slice());
    assert_eq!(doc.hostvars("node0").unwrap()["ansible_host"], json!("192.168.1.108"));
}

#[tokio::test]
async fn six_nodes_store_skips_fastest() {
    let mut lab = Lab::on_lan();
    for n in 0..6u8 {
        lab.node(lan(100 + n), 1000 + u32::from(n) * 100);
    }
    let (service, _, _) = lab.service();
    let doc = service.build_inventory().await.unwrap();

    assert_eq!(doc.hosts_of(STORE), ["node1", "node2", "node3", "node4", "node5"]);
}

#[tokio::test]
async fn identical_network_yields_identical_document() {
    let build = || async {
        let mut lab = Lab::on_lan();
        lab.router(lan(1), "EdgeOS")
            .node(lan(40), 1500)
            .node(lan(41), 1500)
            .node(lan(42), 900)
            .stranger(lan(43));
        let (service, _, _) = lab.service();
        serde_json::to_string(&service.build_inventory().await.unwrap()).unwrap()
    };

    assert_eq!(build().await, build().await);
}

#[tokio::test]
async fn empty_network_still_lists_localhost() {
    let (service, _, _) = Lab::on_lan().service();
    let doc = service.build_inventory().await.unwrap();

    assert!(doc.hosts_of(ROUTERS).is_empty());
    assert!(doc.hosts_of(WORKERS).is_empty());
    assert_eq!(doc.meta.hostvars.len(), 1);
    assert!(doc.hostvars(LOCALHOST).is_some());
}

#[tokio::test]
async fn unconfigured_interface_gets_fallback_address() {
    let lab = Lab {
        interfaces: vec![ni("eth0", &[])],
        ..Lab::default()
    };
    let (service, _, configurator) = lab.service();

    // The static interface table never changes, so the interface is skipped
    // after the configuration attempt.
    let doc = service.build_inventory().await.unwrap();
    assert_eq!(configurator.calls.load(Ordering::SeqCst), 1);
    assert!(doc.hosts_of(WORKERS).is_empty());
}
