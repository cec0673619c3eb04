//! Integration tests for the `qm`/`pct` process plumbing.
//!
//! `PveTools` runs the fake `qm` and `pct` scripts from `common` in place of
//! the real Proxmox tools.

mod common;

use common::{fixture_dir, script};
use pve_connect::Error;
use pve_connect::connect::{self, ConnectOptions, Plan};
use pve_connect::host::{HostTools, PveTools, ToolPaths};
use pve_connect::session::Session;

fn fake_host(qm: &str, pct: &str) -> PveTools {
    PveTools::new(ToolPaths {
        qm: script(qm),
        pct: script(pct),
        ssh: "ssh".to_string(),
    })
}

#[tokio::test]
async fn test_listings() {
    let tools = fake_host("qm", "pct");

    let vms = tools.list_vms().await.unwrap();
    assert!(vms.contains("web"));

    let cts = tools.list_containers().await.unwrap();
    assert!(cts.contains("proxy"));
}

#[tokio::test]
async fn test_listing_failure_names_command() {
    let tools = fake_host("fail/qm", "pct");

    match tools.list_vms().await {
        Err(Error::Listing { command, detail }) => {
            assert!(command.ends_with("qm list"));
            assert!(detail.contains("permission denied"));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_listing_binary() {
    let tools = PveTools::new(ToolPaths {
        qm: fixture_dir().join("missing").to_string_lossy().into_owned(),
        ..ToolPaths::default()
    });
    assert!(matches!(tools.list_vms().await, Err(Error::Listing { .. })));
}

#[tokio::test]
async fn test_agent_queries() {
    let tools = fake_host("qm", "pct");

    assert!(tools.agent_ping(100).await);
    assert!(!tools.agent_ping(102).await);
    assert!(tools.agent_network_interfaces(102).await.is_none());

    let interfaces = tools.agent_network_interfaces(100).await.unwrap();
    assert!(interfaces.contains("10.0.0.5"));
}

#[tokio::test]
async fn test_vm_config() {
    let tools = fake_host("qm", "pct");

    let config = tools.vm_config(102).await.unwrap();
    assert!(config.lines().any(|l| l.starts_with("serial0:")));

    let config = tools.vm_config(100).await.unwrap();
    assert!(!config.contains("serial0"));
}

async fn plan_for(tools: &PveTools, stdin: &str) -> (pve_connect::Result<Plan>, String) {
    let mut input = stdin.as_bytes();
    let mut output = Vec::new();
    let plan = connect::run(tools, &ConnectOptions::default(), &mut input, &mut output).await;
    (plan, String::from_utf8(output).unwrap())
}

#[tokio::test]
async fn test_end_to_end_ssh() {
    let tools = fake_host("qm", "pct");

    let (plan, out) = plan_for(&tools, "100\n\n").await;
    assert_eq!(
        plan.unwrap(),
        Plan::Launch(Session::Ssh {
            user: "root".to_string(),
            host: "10.0.0.5".to_string(),
        })
    );
    assert!(out.contains("web") && out.contains("legacy") && out.contains("proxy"));
}

#[tokio::test]
async fn test_end_to_end_serial_fallback() {
    let tools = fake_host("qm", "pct");

    let (plan, out) = plan_for(&tools, "102\n").await;
    assert_eq!(plan.unwrap(), Plan::Launch(Session::Serial { vmid: 102 }));
    assert!(!out.contains("SSH username"));
}

#[tokio::test]
async fn test_end_to_end_container() {
    let tools = fake_host("qm", "pct");

    let (plan, _) = plan_for(&tools, "101\n").await;
    assert_eq!(plan.unwrap(), Plan::Launch(Session::Container { id: 101 }));
}

#[tokio::test]
async fn test_end_to_end_container_listing_failure() {
    let tools = fake_host("qm", "fail/pct");

    let (plan, out) = plan_for(&tools, "101\n").await;
    assert!(matches!(plan, Err(Error::Listing { ref command, .. }) if command.ends_with("pct list")));
    assert!(out.is_empty());
}
