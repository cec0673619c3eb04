//! Interactive sessions that take over the terminal.

use std::fmt;
use std::os::unix::process::CommandExt;
use std::process::Command;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;

use crate::error::{Error, Result};
use crate::host::ToolPaths;

/// Where the operator ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// `pct enter <id>`
    Container { id: u32 },
    /// `ssh <user>@<host>`
    Ssh { user: String, host: String },
    /// `qm terminal <vmid>`
    Serial { vmid: u32 },
}

impl Session {
    /// Command that runs this session.
    pub fn command(&self, paths: &ToolPaths) -> Command {
        match self {
            Session::Container { id } => {
                let mut cmd = Command::new(&paths.pct);
                cmd.arg("enter").arg(id.to_string());
                cmd
            }
            Session::Ssh { user, host } => {
                let mut cmd = Command::new(&paths.ssh);
                cmd.arg(format!("{}@{}", user, host));
                cmd
            }
            Session::Serial { vmid } => {
                let mut cmd = Command::new(&paths.qm);
                cmd.arg("terminal").arg(vmid.to_string());
                cmd
            }
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Session::Container { id } => write!(f, "container {}", id),
            Session::Ssh { user, host } => write!(f, "{}@{}", user, host),
            Session::Serial { vmid } => write!(f, "serial console of VM {}", vmid),
        }
    }
}

/// Replace this process with the session. Only returns if exec fails.
pub fn handoff(session: &Session, paths: &ToolPaths) -> Error {
    let mut cmd = session.command(paths);
    let program = cmd.get_program().to_string_lossy().into_owned();

    info!(session = %session, program = %program, "Handing off terminal");

    let source = cmd.exec();
    Error::Handoff { program, source }
}

/// Print `prompt` and read one trimmed line. End of input reads as empty.
pub async fn read_line<R, W>(input: &mut R, output: &mut W, prompt: &str) -> Result<String>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output
        .write_all(prompt.as_bytes())
        .await
        .map_err(Error::Prompt)?;
    output.flush().await.map_err(Error::Prompt)?;

    let mut line = String::new();
    input.read_line(&mut line).await.map_err(Error::Prompt)?;

    Ok(line.trim().to_string())
}
