use std::process::ExitCode;

use clap::Parser;
use tokio::io::BufReader;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use pve_connect::connect::{self, ConnectOptions, NO_METHOD_MESSAGE, Plan};
use pve_connect::host::{PveTools, ToolPaths};
use pve_connect::session;

#[derive(Parser)]
#[command(name = "pve-connect")]
#[command(version)]
#[command(about = "Connect to a Proxmox VM (SSH or serial console) or container", long_about = None)]
struct Args {
    /// VM management tool
    #[arg(long, default_value = "qm")]
    qm: String,

    /// Container management tool
    #[arg(long, default_value = "pct")]
    pct: String,

    /// SSH client
    #[arg(long, default_value = "ssh")]
    ssh: String,

    /// SSH username used when the prompt is left blank
    #[arg(long, default_value = "root")]
    default_user: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "pve_connect=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Usage errors exit 1 like every other failure, not clap's 2
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> pve_connect::Result<()> {
    connect::ensure_root()?;

    let paths = ToolPaths {
        qm: args.qm,
        pct: args.pct,
        ssh: args.ssh,
    };
    let options = ConnectOptions {
        default_user: args.default_user,
    };
    let tools = PveTools::new(paths);

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    match connect::run(&tools, &options, &mut stdin, &mut stdout).await? {
        Plan::Launch(session) => {
            debug!(session = %session, "Launching session");
            Err(session::handoff(&session, tools.paths()))
        }
        Plan::NoMethod => {
            eprintln!("{}", NO_METHOD_MESSAGE);
            Ok(())
        }
    }
}
