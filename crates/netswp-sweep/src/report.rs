//! Rendering of per-host lines, the sweep summary and fatal notices.

use std::fmt::Write as _;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use netswp_core::{ProbeOutcome, RangeError, TallySnapshot};

use crate::error::SweepError;

/// Final result of a completed sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub sweep_id: Uuid,
    pub network: String,
    pub started_at: DateTime<Utc>,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
    #[serde(flatten)]
    pub tally: TallySnapshot,
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// One status line for a classified host.
pub fn host_line(outcome: &ProbeOutcome) -> Option<String> {
    match outcome {
        ProbeOutcome::Reachable { address } => Some(format!("[+] {address} is up")),
        ProbeOutcome::Unreachable { address } => Some(format!("[!] {address} is unreachable")),
        ProbeOutcome::Indeterminate => None,
    }
}

pub fn render_text(report: &SweepReport) -> String {
    let TallySnapshot {
        total,
        reachable,
        unreachable,
    } = report.tally;

    format!(
        "\nPing Sweep Summary [Total Host Addresses: {total}]\n\
         \t{reachable} IP address(es) are reachable\n\
         \t{unreachable} IP address(es) are unreachable\n\
         \tSwept {} in {:.2}s",
        report.network,
        report.elapsed.as_secs_f64()
    )
}

pub fn render_json(report: &SweepReport) -> serde_json::Result<String> {
    serde_json::to_string(report)
}

/// The notice printed when the sweep stops on a fatal condition.
pub fn render_failure(err: &SweepError) -> String {
    let mut out = String::new();
    match err {
        SweepError::Range(RangeError::InvalidNetworkAddress { .. }) => {
            let _ = writeln!(out, "[!] {err}");
            let _ = writeln!(out, "[!] Specify a valid network address");
            let _ = write!(out, "[*] e.g. 172.30.16.0/20 or fd00:face:cafe:fade::/64");
        }
        SweepError::Range(RangeError::UnsupportedPrefixLength { .. }) => {
            let _ = writeln!(out, "[-] {err}");
            let _ = write!(out, "[-] Specify a valid network address to proceed");
        }
        SweepError::InvalidInterfaceName { available, .. } => {
            let _ = writeln!(out, "[!] Verify your interface name is correct");
            let _ = write!(out, "[!] Below are the available interfaces on this system");
            for iface in available {
                let _ = write!(out, "\n\t[+] {iface}");
            }
        }
        SweepError::DestinationNetworkUnreachable { .. } => {
            let _ = write!(out, "[!] Network is unreachable");
        }
        SweepError::UserAbort => {
            let _ = write!(out, "\n[~] Ping sweep aborted...");
        }
        _ => {
            let _ = write!(out, "[-] {err}");
        }
    }
    out
}
