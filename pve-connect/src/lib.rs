//! pve-connect: pick a Proxmox VM or container and get a shell on it.
//!
//! Containers are entered with `pct enter`. VMs are reached over SSH using
//! the address reported by the QEMU guest agent, falling back to the serial
//! console.

pub mod connect;
pub mod error;
pub mod guest;
pub mod host;
pub mod inventory;
pub mod render;
pub mod session;

pub use error::{Error, Result};
