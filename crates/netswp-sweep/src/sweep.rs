//! Sweep coordination.
//!
//! Walks the host sequence of a network, keeping at most `concurrency` probes
//! in flight. A semaphore permit is taken before each address is pulled from
//! the iterator, so large IPv6 prefixes are never materialised. Workers share
//! an atomic `SweepTally` and a cancellation token; the token is a child of
//! the caller's token so a user interrupt and an internal halt both stop the
//! pool, while the caller can still tell the two apart.

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use netswp_core::{NetworkRange, ProbeOutcome, SweepTally};

use crate::classify::classify;
use crate::config::MAX_CONCURRENCY;
use crate::error::{Result, SweepError};
use crate::probe::{ProbeConfig, Prober};
use crate::reply::ReplyFormat;
use crate::report::{self, SweepReport};

/// Lifecycle of a sweep, reported in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepPhase {
    Idle,
    Enumerating,
    Probing,
    Completed,
    AbortedByUser,
    AbortedByNetworkError,
}

impl fmt::Display for SweepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Enumerating => "enumerating",
            Self::Probing => "probing",
            Self::Completed => "completed",
            Self::AbortedByUser => "aborted_by_user",
            Self::AbortedByNetworkError => "aborted_by_network_error",
        };
        f.write_str(name)
    }
}

/// How a single worker finished.
#[derive(Debug)]
enum WorkerExit {
    Counted,
    Halted,
    NetworkUnreachable(IpAddr),
    Failed(SweepError),
}

/// Drives a sweep over one network with a bounded pool of probe workers.
pub struct SweepCoordinator<P> {
    prober: Arc<P>,
    format: Arc<dyn ReplyFormat>,
    probe: Arc<ProbeConfig>,
    concurrency: usize,
    print_hosts: bool,
}

impl<P: Prober + 'static> SweepCoordinator<P> {
    pub fn new(
        prober: P,
        format: Arc<dyn ReplyFormat>,
        probe: ProbeConfig,
        concurrency: usize,
    ) -> Self {
        Self {
            prober: Arc::new(prober),
            format,
            probe: Arc::new(probe),
            concurrency: concurrency.clamp(1, MAX_CONCURRENCY),
            print_hosts: false,
        }
    }

    /// Print a status line to stdout for every classified host.
    pub fn with_host_lines(mut self, enabled: bool) -> Self {
        self.print_hosts = enabled;
        self
    }

    /// Sweep `range`.
    ///
    /// Returns the report on completion. Cancelling `cancel` stops the sweep
    /// with `UserAbort`; an indeterminate probe stops it with
    /// `DestinationNetworkUnreachable`. Neither produces a report.
    pub async fn run(&self, range: &NetworkRange, cancel: CancellationToken) -> Result<SweepReport> {
        let sweep_id = Uuid::new_v4();
        let started_at = chrono::Utc::now();
        let start = Instant::now();
        tracing::debug!(sweep_id = %sweep_id, phase = %SweepPhase::Idle, network = %range);

        let hosts = range.hosts()?;
        let host_count = range.host_count()?;
        tracing::debug!(sweep_id = %sweep_id, phase = %SweepPhase::Enumerating, network = %range);

        let tally = Arc::new(SweepTally::new());
        let halt = cancel.child_token();
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut workers = JoinSet::new();
        let mut failure: Option<SweepError> = None;
        let mut dispatched: u64 = 0;

        tracing::info!(
            sweep_id = %sweep_id,
            network = %range,
            hosts = %host_count,
            concurrency = self.concurrency,
            phase = %SweepPhase::Probing,
            "Starting ping sweep"
        );

        for address in hosts {
            while let Some(joined) = workers.try_join_next() {
                absorb(joined, &halt, &mut failure);
            }

            let permit = tokio::select! {
                biased;
                _ = halt.cancelled() => break,
                permit = permits.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            dispatched += 1;
            workers.spawn(probe_host(
                self.prober.clone(),
                self.format.clone(),
                self.probe.clone(),
                tally.clone(),
                halt.clone(),
                address,
                self.print_hosts,
                permit,
            ));
        }

        while let Some(joined) = workers.join_next().await {
            absorb(joined, &halt, &mut failure);
        }

        let elapsed = start.elapsed();

        if cancel.is_cancelled() {
            tracing::warn!(sweep_id = %sweep_id, dispatched, phase = %SweepPhase::AbortedByUser, "Ping sweep aborted");
            return Err(SweepError::UserAbort);
        }

        if let Some(err) = failure {
            tracing::error!(
                sweep_id = %sweep_id,
                dispatched,
                phase = %SweepPhase::AbortedByNetworkError,
                error = %err,
                "Ping sweep stopped"
            );
            return Err(err);
        }

        let tally = tally.snapshot();
        tracing::info!(
            sweep_id = %sweep_id,
            network = %range,
            total = tally.total,
            reachable = tally.reachable,
            unreachable = tally.unreachable,
            duration_ms = elapsed.as_millis(),
            phase = %SweepPhase::Completed,
            "Ping sweep complete"
        );

        Ok(SweepReport {
            sweep_id,
            network: range.to_string(),
            started_at,
            elapsed,
            tally,
        })
    }
}

/// One worker: probe, classify, count.
#[allow(clippy::too_many_arguments)]
async fn probe_host<P: Prober>(
    prober: Arc<P>,
    format: Arc<dyn ReplyFormat>,
    config: Arc<ProbeConfig>,
    tally: Arc<SweepTally>,
    halt: CancellationToken,
    address: IpAddr,
    print_hosts: bool,
    _permit: OwnedSemaphorePermit,
) -> WorkerExit {
    if halt.is_cancelled() {
        return WorkerExit::Halted;
    }

    let raw = tokio::select! {
        biased;
        _ = halt.cancelled() => return WorkerExit::Halted,
        raw = prober.probe(address, &config) => raw,
    };

    let raw = match raw {
        Ok(raw) => raw,
        Err(e) => return WorkerExit::Failed(e),
    };

    if halt.is_cancelled() {
        return WorkerExit::Halted;
    }

    let outcome = classify(format.as_ref(), &raw);
    if outcome == ProbeOutcome::Indeterminate {
        tracing::debug!(address = %address, branch = ?raw.branch, "Indeterminate probe result");
        halt.cancel();
        return WorkerExit::NetworkUnreachable(address);
    }

    tally.record(&outcome);
    tracing::debug!(address = %address, outcome = ?outcome, branch = ?raw.branch, "Host classified");
    if print_hosts {
        if let Some(line) = report::host_line(&outcome) {
            println!("{line}");
        }
    }
    WorkerExit::Counted
}

/// Fold one finished worker into the sweep state. The first failure wins and
/// halts every other worker.
fn absorb(
    joined: std::result::Result<WorkerExit, JoinError>,
    halt: &CancellationToken,
    failure: &mut Option<SweepError>,
) {
    let err = match joined {
        Ok(WorkerExit::Counted | WorkerExit::Halted) => return,
        Ok(WorkerExit::NetworkUnreachable(address)) => {
            SweepError::DestinationNetworkUnreachable { address }
        }
        Ok(WorkerExit::Failed(e)) => e,
        Err(e) => SweepError::Worker(e.to_string()),
    };

    halt.cancel();
    if failure.is_none() {
        *failure = Some(err);
    }
}
