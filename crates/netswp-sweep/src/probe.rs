//! Ping process wrapper.
//!
//! Executes the system `ping` as a child process via `tokio::process::Command`
//! and returns its raw stdout for classification. Every probe, including an
//! unbound retry, runs under one watchdog deadline of `ProbeConfig::timeout`.

use std::net::IpAddr;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::Instant;

use crate::config::SweepConfig;
use crate::error::{Result, SweepError};
use crate::platform::{self, OsFamily};

/// Per-probe timeout.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Echo requests sent per probe.
pub const ECHO_COUNT: u32 = 1;

/// Settings shared by every probe in a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Egress interface to bind to, already validated against the host.
    pub interface: Option<String>,
    pub timeout: Duration,
    pub count: u32,
}

impl ProbeConfig {
    pub fn new(interface: Option<String>) -> Self {
        Self {
            interface,
            timeout: PROBE_TIMEOUT,
            count: ECHO_COUNT,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Which kind of ping produced a `RawProbe`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeBranch {
    Bound { interface: String },
    Unbound,
    /// The bound probe produced nothing and was retried unbound.
    UnboundFallback { interface: String },
}

/// Unparsed result of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProbe {
    /// The address the probe was asked to reach.
    pub requested: IpAddr,
    /// Captured stdout; empty when ping wrote nothing.
    pub output: String,
    pub branch: ProbeBranch,
    /// The watchdog killed the process before it exited.
    pub timed_out: bool,
}

impl RawProbe {
    pub fn is_empty(&self) -> bool {
        self.output.trim().is_empty()
    }
}

/// Issues one liveness probe to one address.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, address: IpAddr, config: &ProbeConfig) -> Result<RawProbe>;
}

/// `Prober` backed by the operating system's ping utility.
pub struct PingProber {
    os: OsFamily,
    ping_path: String,
    ping6_path: String,
    fallback_unbound: bool,
}

impl PingProber {
    pub fn new(os: OsFamily, config: &SweepConfig) -> Self {
        Self {
            os,
            ping_path: config.ping_path.clone(),
            ping6_path: config.ping6_path.clone(),
            fallback_unbound: config.fallback_unbound,
        }
    }

    fn program(&self, address: IpAddr) -> &str {
        if address.is_ipv6() && self.os.needs_ping6() {
            &self.ping6_path
        } else {
            &self.ping_path
        }
    }

    /// Run ping once and capture stdout. The process is killed if it is still
    /// running at `deadline`.
    async fn run(
        &self,
        address: IpAddr,
        config: &ProbeConfig,
        interface: Option<&str>,
        deadline: Instant,
    ) -> Result<(String, bool)> {
        let start = Instant::now();
        if start >= deadline {
            return Ok((String::new(), true));
        }

        let program = self.program(address);
        let args = platform::ping_args(self.os, address, config.count, config.timeout, interface);

        let child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SweepError::ProbeSpawn {
                program: program.to_string(),
                source,
            })?;

        match tokio::time::timeout_at(deadline, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                tracing::trace!(
                    address = %address,
                    status = ?output.status.code(),
                    elapsed_ms = start.elapsed().as_millis(),
                    "Ping exited"
                );
                Ok((String::from_utf8_lossy(&output.stdout).into_owned(), false))
            }
            Ok(Err(source)) => Err(SweepError::ProbeSpawn {
                program: program.to_string(),
                source,
            }),
            Err(_) => {
                tracing::debug!(
                    address = %address,
                    elapsed_ms = start.elapsed().as_millis(),
                    "Ping killed by watchdog"
                );
                Ok((String::new(), true))
            }
        }
    }
}

#[async_trait]
impl Prober for PingProber {
    async fn probe(&self, address: IpAddr, config: &ProbeConfig) -> Result<RawProbe> {
        let deadline = Instant::now() + config.timeout;
        let interface = config
            .interface
            .as_deref()
            .filter(|_| self.os.supports_interface_binding());

        let Some(iface) = interface else {
            let (output, timed_out) = self.run(address, config, None, deadline).await?;
            return Ok(RawProbe {
                requested: address,
                output,
                branch: ProbeBranch::Unbound,
                timed_out,
            });
        };

        let bound = self.run(address, config, Some(iface), deadline).await;
        let needs_fallback = match &bound {
            Ok((output, timed_out)) => !timed_out && output.trim().is_empty(),
            Err(_) => true,
        };

        if needs_fallback && self.fallback_unbound {
            tracing::debug!(address = %address, interface = %iface, "Bound probe produced nothing, retrying unbound");
            let (output, timed_out) = self.run(address, config, None, deadline).await?;
            return Ok(RawProbe {
                requested: address,
                output,
                branch: ProbeBranch::UnboundFallback {
                    interface: iface.to_string(),
                },
                timed_out,
            });
        }

        let (output, timed_out) = bound?;
        Ok(RawProbe {
            requested: address,
            output,
            branch: ProbeBranch::Bound {
                interface: iface.to_string(),
            },
            timed_out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prober(ping_path: &str, fallback_unbound: bool) -> PingProber {
        let config = SweepConfig {
            ping_path: ping_path.to_string(),
            fallback_unbound,
            ..SweepConfig::default()
        };
        PingProber::new(OsFamily::Linux, &config)
    }

    fn addr() -> IpAddr {
        "192.0.2.1".parse().unwrap()
    }

    #[test]
    fn test_probe_config_defaults() {
        let config = ProbeConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert_eq!(config.count, 1);
        assert_eq!(config.interface, None);
    }

    #[test]
    fn test_ping6_only_on_macos() {
        let config = SweepConfig::default();
        let v6: IpAddr = "fd00::1".parse().unwrap();

        let mac = PingProber::new(OsFamily::MacOs, &config);
        assert_eq!(mac.program(v6), "ping6");
        assert_eq!(mac.program(addr()), "ping");

        let linux = PingProber::new(OsFamily::Linux, &config);
        assert_eq!(linux.program(v6), "ping");
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let prober = prober("/nonexistent/netswp-ping", false);
        let err = prober
            .probe(addr(), &ProbeConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SweepError::ProbeSpawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_silent_binary_gives_empty_output() {
        // `true` ignores its arguments and prints nothing.
        let prober = prober("true", false);
        let raw = prober.probe(addr(), &ProbeConfig::default()).await.unwrap();
        assert!(raw.is_empty());
        assert!(!raw.timed_out);
        assert_eq!(raw.branch, ProbeBranch::Unbound);
        assert_eq!(raw.requested, addr());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_bound_probe_without_fallback() {
        let prober = prober("true", false);
        let config = ProbeConfig::new(Some("eth0".to_string()));
        let raw = prober.probe(addr(), &config).await.unwrap();
        assert_eq!(
            raw.branch,
            ProbeBranch::Bound {
                interface: "eth0".to_string()
            }
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_bound_probe_falls_back_when_enabled() {
        let prober = prober("true", true);
        let config = ProbeConfig::new(Some("eth0".to_string()));
        let raw = prober.probe(addr(), &config).await.unwrap();
        assert_eq!(
            raw.branch,
            ProbeBranch::UnboundFallback {
                interface: "eth0".to_string()
            }
        );
    }

    /// Write an executable shell script standing in for ping.
    #[cfg(unix)]
    fn fake_ping(dir: &tempfile::TempDir, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("ping");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_ping_killed_at_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = fake_ping(&dir, "echo 'PING 192.0.2.1 (192.0.2.1) 56(84) bytes of data.'\nexec sleep 30");
        let prober = prober(&path, false);
        let config = ProbeConfig {
            timeout: Duration::from_millis(300),
            ..ProbeConfig::default()
        };

        let start = std::time::Instant::now();
        let raw = prober.probe(addr(), &config).await.unwrap();
        let elapsed = start.elapsed();

        assert!(raw.timed_out);
        assert!(raw.is_empty());
        assert!(elapsed >= config.timeout, "returned early: {elapsed:?}");
        assert!(elapsed < config.timeout + Duration::from_millis(200), "took {elapsed:?}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fallback_shares_the_probe_deadline() {
        // Bound runs print nothing and exit; unbound runs hang.
        let dir = tempfile::tempdir().unwrap();
        let path = fake_ping(
            &dir,
            "case \"$*\" in *-I*) exit 0 ;; esac\nexec sleep 30",
        );
        let prober = prober(&path, true);
        let config = ProbeConfig {
            interface: Some("eth0".to_string()),
            timeout: Duration::from_millis(300),
            ..ProbeConfig::default()
        };

        let start = std::time::Instant::now();
        let raw = prober.probe(addr(), &config).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(
            raw.branch,
            ProbeBranch::UnboundFallback {
                interface: "eth0".to_string()
            }
        );
        assert!(raw.timed_out);
        assert!(elapsed < config.timeout + Duration::from_millis(200), "took {elapsed:?}");
    }
}
