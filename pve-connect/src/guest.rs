//! QEMU guest agent `network-get-interfaces` parsing.

use serde::Deserialize;
use tracing::debug;

/// Address as reported by the guest agent.
#[derive(Debug, Clone, Deserialize)]
pub struct GuestIpAddress {
    #[serde(rename = "ip-address")]
    pub ip_address: String,
    #[serde(rename = "ip-address-type", default)]
    pub ip_address_type: Option<String>,
    #[serde(default)]
    pub prefix: Option<u8>,
}

/// Network interface as reported by the guest agent.
#[derive(Debug, Clone, Deserialize)]
pub struct GuestInterface {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "hardware-address", default)]
    pub hardware_address: Option<String>,
    #[serde(rename = "ip-addresses", default)]
    pub ip_addresses: Vec<GuestIpAddress>,
}

const IP_ADDRESS_KEY: &str = "\"ip-address\"";

/// Deserialize the interface list, `None` if the output is not JSON.
pub fn parse_interfaces(output: &str) -> Option<Vec<GuestInterface>> {
    match serde_json::from_str(output) {
        Ok(interfaces) => Some(interfaces),
        Err(e) => {
            debug!(error = %e, "Guest agent output is not JSON, scanning text");
            None
        }
    }
}

/// All IP addresses in document order.
///
/// Falls back to a textual scan for `"ip-address" : "..."` pairs when the
/// output is not valid JSON.
pub fn extract_addresses(output: &str) -> Vec<String> {
    match parse_interfaces(output) {
        Some(interfaces) => interfaces
            .into_iter()
            .flat_map(|iface| iface.ip_addresses)
            .map(|addr| addr.ip_address)
            .collect(),
        None => scan_addresses(output),
    }
}

fn scan_addresses(output: &str) -> Vec<String> {
    let mut addresses = Vec::new();
    let mut rest = output;

    while let Some(pos) = rest.find(IP_ADDRESS_KEY) {
        rest = &rest[pos + IP_ADDRESS_KEY.len()..];

        let Some(value) = rest.trim_start().strip_prefix(':') else {
            continue;
        };
        let Some(value) = value.trim_start().strip_prefix('"') else {
            continue;
        };
        if let Some(end) = value.find('"') {
            addresses.push(value[..end].to_string());
        }
    }

    addresses
}

/// Loopback and link-local addresses are not reachable from the host.
pub fn is_reachable(address: &str) -> bool {
    let lower = address.to_ascii_lowercase();
    !(lower.starts_with("127.") || lower.starts_with("fe80:") || lower == "::1")
}

/// First reachable address in listed order.
pub fn select_address(output: &str) -> Option<String> {
    let Some(interfaces) = parse_interfaces(output) else {
        return scan_addresses(output)
            .into_iter()
            .find(|addr| is_reachable(addr));
    };

    interfaces.into_iter().find_map(|iface| {
        let addr = iface
            .ip_addresses
            .into_iter()
            .find(|addr| is_reachable(&addr.ip_address))?;

        debug!(
            interface = %iface.name,
            mac = iface.hardware_address.as_deref().unwrap_or("-"),
            family = addr.ip_address_type.as_deref().unwrap_or("-"),
            prefix = ?addr.prefix,
            address = %addr.ip_address,
            "Selected guest address"
        );
        Some(addr.ip_address)
    })
}
