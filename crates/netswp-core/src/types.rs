//! Probe outcomes and the running sweep tally.

use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// ── Outcome ───────────────────────────────────────────────────────

/// Classified result of a single echo probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// The host answered the echo request.
    Reachable { address: IpAddr },
    /// The probe completed without a reply.
    Unreachable { address: IpAddr },
    /// The probe produced no usable output. In practice this means the
    /// destination network itself is unreachable, not just one host.
    Indeterminate,
}

impl ProbeOutcome {
    pub fn address(&self) -> Option<IpAddr> {
        match self {
            Self::Reachable { address } | Self::Unreachable { address } => Some(*address),
            Self::Indeterminate => None,
        }
    }
}

// ── Tally ─────────────────────────────────────────────────────────

/// Running counters for a sweep, shared between workers.
#[derive(Debug, Default)]
pub struct SweepTally {
    total: AtomicU64,
    reachable: AtomicU64,
    unreachable: AtomicU64,
}

impl SweepTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one classified outcome. `Indeterminate` is never counted.
    pub fn record(&self, outcome: &ProbeOutcome) {
        let bucket = match outcome {
            ProbeOutcome::Reachable { .. } => &self.reachable,
            ProbeOutcome::Unreachable { .. } => &self.unreachable,
            ProbeOutcome::Indeterminate => return,
        };
        bucket.fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    /// Freeze the current counts for reporting.
    pub fn snapshot(&self) -> TallySnapshot {
        TallySnapshot {
            total: self.total.load(Ordering::Acquire),
            reachable: self.reachable.load(Ordering::Acquire),
            unreachable: self.unreachable.load(Ordering::Acquire),
        }
    }
}

/// Immutable copy of a `SweepTally`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TallySnapshot {
    pub total: u64,
    pub reachable: u64,
    pub unreachable: u64,
}
