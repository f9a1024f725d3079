//! Parsers for the textual output of the system `ping` utility.
//!
//! Unix-like systems (iputils, BSD/macOS ping and ping6) share one layout:
//! a `PING <addr> ...` header and a `... packets transmitted, N received`
//! statistics line. Windows prints `Pinging <addr> with ...` and a
//! `Packets: Sent = 1, Received = 1, Lost = 0` line. The format is chosen
//! once per sweep from the OS family.

use std::net::IpAddr;
use std::sync::Arc;

use crate::platform::OsFamily;

/// Reads the fields the classifier needs out of raw ping output.
pub trait ReplyFormat: Send + Sync {
    /// The address ping reports it is talking to, or `None` when the output
    /// lacks the expected header.
    fn responder(&self, output: &str) -> Option<IpAddr>;

    /// Whether the output reports a successful echo reply.
    fn is_success(&self, output: &str) -> bool;
}

/// Select the reply format for an OS family.
pub fn for_os(os: OsFamily) -> Arc<dyn ReplyFormat> {
    match os {
        OsFamily::Linux | OsFamily::MacOs => Arc::new(UnixReply),
        OsFamily::Windows => Arc::new(WindowsReply),
    }
}

/// iputils and BSD ping output.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixReply;

impl ReplyFormat for UnixReply {
    fn responder(&self, output: &str) -> Option<IpAddr> {
        let header = output
            .lines()
            .map(str::trim)
            .find(|line| line.starts_with("PING"))?;

        // BSD ping6: "PING6(56=40+8+8 bytes) fd00::2 --> fd00::1"
        if let Some((_, target)) = header.split_once("-->") {
            return target.split_whitespace().next()?.parse().ok();
        }

        // "PING host (10.0.0.1) 56(84) bytes of data." or
        // "PING fd00::1(fd00::1) 56 data bytes"
        let rest = header.strip_prefix("PING")?.trim_start();
        if let Some(inner) = parenthesized(rest) {
            if let Ok(addr) = inner.parse() {
                return Some(addr);
            }
        }

        let token = rest.split_whitespace().next()?;
        let token = token.split('(').next()?.trim_end_matches(':');
        token.parse().ok()
    }

    fn is_success(&self, output: &str) -> bool {
        output
            .lines()
            .filter(|line| line.contains("transmitted"))
            .flat_map(|line| line.split(','))
            .filter(|field| field.contains("received"))
            .filter_map(|field| field.split_whitespace().next())
            .filter_map(|n| n.parse::<u32>().ok())
            .any(|received| received >= 1)
    }
}

/// Windows `ping.exe` output.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsReply;

impl ReplyFormat for WindowsReply {
    fn responder(&self, output: &str) -> Option<IpAddr> {
        let header = output
            .lines()
            .map(str::trim)
            .find(|line| line.starts_with("Pinging"))?;
        let rest = header.strip_prefix("Pinging")?.trim_start();

        // "Pinging host [10.0.0.1] with 32 bytes of data:"
        if let Some(inner) = bracketed(rest) {
            if let Ok(addr) = inner.parse() {
                return Some(addr);
            }
        }

        let token = rest.split_whitespace().next()?.trim_end_matches(':');
        token.parse().ok()
    }

    fn is_success(&self, output: &str) -> bool {
        output.contains("Lost = 0")
    }
}

fn parenthesized(s: &str) -> Option<&str> {
    let start = s.find('(')?;
    let end = s[start..].find(')')? + start;
    Some(&s[start + 1..end])
}

fn bracketed(s: &str) -> Option<&str> {
    let start = s.find('[')?;
    let end = s[start..].find(']')? + start;
    Some(&s[start + 1..end])
}
