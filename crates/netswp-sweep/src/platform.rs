//! Operating system detection and ping argument layout.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// The OS families whose `ping` output and flags netswp understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Linux,
    MacOs,
    Windows,
}

impl OsFamily {
    /// The family this binary was built for. Other Unix targets are treated
    /// as Linux.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }

    /// Windows `ping` has no flag to select an egress interface.
    pub fn supports_interface_binding(self) -> bool {
        !matches!(self, Self::Windows)
    }

    /// Whether IPv6 targets need a separate `ping6` binary.
    pub fn needs_ping6(self) -> bool {
        matches!(self, Self::MacOs)
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linux => "linux",
            Self::MacOs => "macos",
            Self::Windows => "windows",
        };
        f.write_str(name)
    }
}

/// Build the ping arguments for one probe.
///
/// `interface` is ignored on Windows; callers check
/// `supports_interface_binding` first.
pub fn ping_args(
    os: OsFamily,
    address: IpAddr,
    count: u32,
    timeout: Duration,
    interface: Option<&str>,
) -> Vec<String> {
    let secs = timeout.as_secs().max(1).to_string();
    let count = count.to_string();
    let mut args = Vec::new();

    match os {
        OsFamily::Linux => {
            args.extend(["-c".to_string(), count, "-w".to_string(), secs]);
            if let Some(iface) = interface {
                args.extend(["-I".to_string(), iface.to_string()]);
            }
        }
        OsFamily::MacOs if address.is_ipv6() => {
            // ping6 has no overall deadline flag; the caller's watchdog covers it.
            args.extend(["-c".to_string(), count]);
            if let Some(iface) = interface {
                args.extend(["-I".to_string(), iface.to_string()]);
            }
        }
        OsFamily::MacOs => {
            args.extend(["-c".to_string(), count, "-t".to_string(), secs]);
            if let Some(iface) = interface {
                args.extend(["-b".to_string(), iface.to_string()]);
            }
        }
        OsFamily::Windows => {
            let millis = timeout.as_millis().max(1).to_string();
            args.extend(["-n".to_string(), count, "-w".to_string(), millis]);
        }
    }

    args.push(address.to_string());
    args
}
