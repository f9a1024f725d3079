//! Egress interface validation.

use pnet::datalink;

use crate::error::{Result, SweepError};

/// Names of the network interfaces the OS reports.
pub fn available_interfaces() -> Vec<String> {
    datalink::interfaces()
        .into_iter()
        .map(|iface| iface.name)
        .collect()
}

/// Check `name` against the interface list, returning the full list in the
/// error so the user can pick a valid one.
pub fn validate_interface(name: &str, available: &[String]) -> Result<()> {
    if available.iter().any(|iface| iface == name) {
        return Ok(());
    }
    Err(SweepError::InvalidInterfaceName {
        name: name.to_string(),
        available: available.to_vec(),
    })
}
