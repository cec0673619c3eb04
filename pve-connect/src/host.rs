//! Host management tool invocation (`qm`, `pct`).
//!
//! Every call here returns captured output. Interactive hand-offs live in
//! [`crate::session`].

use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Programs used to reach the host's VMs and containers.
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub qm: String,
    pub pct: String,
    pub ssh: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            qm: "qm".to_string(),
            pct: "pct".to_string(),
            ssh: "ssh".to_string(),
        }
    }
}

/// Queries against the hypervisor's management tools.
///
/// Listing failures are errors. Guest agent and config queries report
/// unavailability as `false`/`None`.
#[async_trait]
pub trait HostTools: Send + Sync {
    /// Raw `qm list` output.
    async fn list_vms(&self) -> Result<String>;

    /// Raw `pct list` output.
    async fn list_containers(&self) -> Result<String>;

    /// Whether the guest agent of `vmid` answers a ping.
    async fn agent_ping(&self, vmid: u32) -> bool;

    /// Raw `network-get-interfaces` output from the guest agent.
    async fn agent_network_interfaces(&self, vmid: u32) -> Option<String>;

    /// Raw `qm config` output.
    async fn vm_config(&self, vmid: u32) -> Option<String>;
}

/// [`HostTools`] backed by the real `qm` and `pct` binaries.
pub struct PveTools {
    paths: ToolPaths,
}

impl PveTools {
    pub fn new(paths: ToolPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ToolPaths {
        &self.paths
    }

    async fn listing(&self, program: &str) -> Result<String> {
        let command = format!("{} list", program);
        debug!(command = %command, "Listing resources");

        let output = Command::new(program)
            .arg("list")
            .output()
            .await
            .map_err(|e| Error::Listing {
                command: command.clone(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Listing {
                command,
                detail: failure_detail(&output, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run a `qm` subcommand, treating any failure as unavailable.
    async fn qm_optional(&self, args: &[&str]) -> Option<Output> {
        let output = match Command::new(&self.paths.qm).args(args).output().await {
            Ok(output) => output,
            Err(e) => {
                warn!(program = %self.paths.qm, args = ?args, error = %e, "Failed to run qm");
                return None;
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(
                args = ?args,
                detail = %failure_detail(&output, stderr.trim()),
                "qm command unsuccessful"
            );
            return None;
        }

        Some(output)
    }
}

fn failure_detail(output: &Output, stderr: &str) -> String {
    if stderr.is_empty() {
        output.status.to_string()
    } else {
        format!("{} ({})", stderr, output.status)
    }
}

#[async_trait]
impl HostTools for PveTools {
    async fn list_vms(&self) -> Result<String> {
        self.listing(&self.paths.qm).await
    }

    async fn list_containers(&self) -> Result<String> {
        self.listing(&self.paths.pct).await
    }

    async fn agent_ping(&self, vmid: u32) -> bool {
        let id = vmid.to_string();
        self.qm_optional(&["agent", &id, "ping"]).await.is_some()
    }

    async fn agent_network_interfaces(&self, vmid: u32) -> Option<String> {
        let id = vmid.to_string();
        self.qm_optional(&["agent", &id, "network-get-interfaces"])
            .await
            .map(|output| String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn vm_config(&self, vmid: u32) -> Option<String> {
        let id = vmid.to_string();
        self.qm_optional(&["config", &id])
            .await
            .map(|output| String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Whether a `qm config` dump has a serial port 0.
pub fn has_serial_console(config: &str) -> bool {
    config.lines().any(|line| line.starts_with("serial0:"))
}
