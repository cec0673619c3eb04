//! Error types for pve-connect.

use std::io;

use thiserror::Error;

/// Errors that end a pve-connect run with a non-zero exit status.
///
/// Guest agent and serial console failures are not errors: they only steer
/// the VM connector to its next fallback.
#[derive(Debug, Error)]
pub enum Error {
    /// The host management tools need root.
    #[error("must be run as root (qm and pct require root privileges)")]
    NotRoot,

    /// One of the inventory listing commands failed.
    #[error("failed to list resources with `{command}`: {detail}")]
    Listing { command: String, detail: String },

    /// The entered id matches neither a VM nor a container.
    #[error("Invalid ID: {0}")]
    InvalidId(String),

    /// Reading an operator prompt failed.
    #[error("failed to read input: {0}")]
    Prompt(#[source] io::Error),

    /// exec of an interactive session program failed.
    #[error("failed to launch `{program}`: {source}")]
    Handoff {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Result type for pve-connect operations.
pub type Result<T> = std::result::Result<T, Error>;
