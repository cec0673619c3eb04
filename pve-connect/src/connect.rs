//! Inventory, selection and connection planning.
//!
//! Flow:
//! 1. Fetch `qm list` and `pct list` (fatal on failure)
//! 2. Print the combined table
//! 3. Ask for an id and classify it
//! 4. Containers go straight to `pct enter`. VMs try guest agent + SSH,
//!    then the serial console, then give up with an explanation.

use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::guest;
use crate::host::{self, HostTools};
use crate::inventory::{Inventory, ResourceKind};
use crate::render;
use crate::session::{self, Session};

pub const ID_PROMPT: &str = "Enter VMID/CTID to connect: ";

pub const NO_METHOD_MESSAGE: &str = "No connection method available. \
Install and start the QEMU guest agent in the VM (for SSH access), \
or add a serial console (serial0) to the VM configuration.";

/// What the operator gets after planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Launch(Session),
    /// VM reachable neither via guest agent nor serial console.
    NoMethod,
}

/// Outcome of asking the guest agent for an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentProbe {
    Unavailable,
    NoAddress,
    Address(String),
}

/// Operator-facing settings.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Username used when the SSH prompt is left blank.
    pub default_user: String,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            default_user: "root".to_string(),
        }
    }
}

/// Fail unless running with root privileges.
pub fn ensure_root() -> Result<()> {
    if nix::unistd::Uid::effective().is_root() {
        Ok(())
    } else {
        Err(Error::NotRoot)
    }
}

/// Fetch both listings. Either failing aborts the run.
pub async fn fetch_inventory(tools: &dyn HostTools) -> Result<Inventory> {
    let vms = tools.list_vms().await?;
    let containers = tools.list_containers().await?;

    let inventory = Inventory::from_listings(&vms, &containers);
    debug!(
        vms = inventory.vms.len(),
        containers = inventory.containers.len(),
        "Fetched inventory"
    );
    Ok(inventory)
}

/// Full interactive flow up to the point of terminal hand-off.
pub async fn run<R, W>(
    tools: &dyn HostTools,
    options: &ConnectOptions,
    input: &mut R,
    output: &mut W,
) -> Result<Plan>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let inventory = fetch_inventory(tools).await?;

    say(output, &render::render_table(&inventory)).await?;

    let entered = session::read_line(input, output, ID_PROMPT).await?;
    let Some(kind) = inventory.classify(&entered) else {
        return Err(Error::InvalidId(entered));
    };

    // classify only matches canonical integer ids
    let id: u32 = entered
        .parse()
        .map_err(|_| Error::InvalidId(entered.clone()))?;

    info!(id, kind = %kind, "Selected resource");

    match kind {
        ResourceKind::Container => Ok(Plan::Launch(Session::Container { id })),
        ResourceKind::Vm => plan_vm_session(tools, id, options, input, output).await,
    }
}

/// Ask the guest agent of `vmid` for a reachable address.
pub async fn probe_agent(tools: &dyn HostTools, vmid: u32) -> AgentProbe {
    if !tools.agent_ping(vmid).await {
        return AgentProbe::Unavailable;
    }

    let Some(interfaces) = tools.agent_network_interfaces(vmid).await else {
        return AgentProbe::NoAddress;
    };

    match guest::select_address(&interfaces) {
        Some(address) => AgentProbe::Address(address),
        None => AgentProbe::NoAddress,
    }
}

/// Agent → SSH, else serial console, else nothing.
pub async fn plan_vm_session<R, W>(
    tools: &dyn HostTools,
    vmid: u32,
    options: &ConnectOptions,
    input: &mut R,
    output: &mut W,
) -> Result<Plan>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    say(output, "Checking QEMU guest agent...").await?;

    match probe_agent(tools, vmid).await {
        AgentProbe::Address(host) => {
            info!(vmid, host = %host, "Guest agent reported address");

            let prompt = format!("SSH username [{}]: ", options.default_user);
            let entered = session::read_line(input, output, &prompt).await?;
            let user = if entered.is_empty() {
                options.default_user.clone()
            } else {
                entered
            };

            say(output, &format!("Connecting via SSH to {}@{}...", user, host)).await?;
            return Ok(Plan::Launch(Session::Ssh { user, host }));
        }
        AgentProbe::NoAddress => {
            info!(vmid, "Guest agent returned no usable address");
            say(output, "Guest agent is running but reported no usable IP address.").await?;
        }
        AgentProbe::Unavailable => {
            info!(vmid, "Guest agent unavailable");
            say(output, "Guest agent is not available.").await?;
        }
    }

    say(output, "Falling back to serial console...").await?;

    let has_serial = match tools.vm_config(vmid).await {
        Some(config) => host::has_serial_console(&config),
        None => false,
    };

    if has_serial {
        say(output, "Attaching to serial console (exit with Ctrl+O)...").await?;
        Ok(Plan::Launch(Session::Serial { vmid }))
    } else {
        info!(vmid, "No serial0 configured");
        Ok(Plan::NoMethod)
    }
}

async fn say<W: AsyncWrite + Unpin>(output: &mut W, message: &str) -> Result<()> {
    output
        .write_all(format!("{}\n", message).as_bytes())
        .await
        .map_err(Error::Prompt)?;
    output.flush().await.map_err(Error::Prompt)
}
