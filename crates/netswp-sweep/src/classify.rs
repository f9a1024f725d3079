//! Raw probe → `ProbeOutcome` classification.

use netswp_core::ProbeOutcome;

use crate::probe::RawProbe;
use crate::reply::ReplyFormat;

/// Classify one raw probe.
///
/// The reported address comes from ping's own header rather than the
/// requested address. Output without that header is `Indeterminate`. A
/// success marker means `Reachable`; anything else is `Unreachable`.
///
/// A probe killed by the watchdog has no output to read, so it is counted as
/// `Unreachable` at the requested address instead of `Indeterminate`.
pub fn classify(format: &dyn ReplyFormat, raw: &RawProbe) -> ProbeOutcome {
    if raw.timed_out {
        return ProbeOutcome::Unreachable {
            address: raw.requested,
        };
    }

    let Some(address) = format.responder(&raw.output) else {
        return ProbeOutcome::Indeterminate;
    };

    if format.is_success(&raw.output) {
        ProbeOutcome::Reachable { address }
    } else {
        ProbeOutcome::Unreachable { address }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeBranch;
    use crate::reply::{UnixReply, WindowsReply};
    use std::net::IpAddr;

    fn raw(requested: &str, output: &str) -> RawProbe {
        RawProbe {
            requested: requested.parse().unwrap(),
            output: output.to_string(),
            branch: ProbeBranch::Unbound,
            timed_out: false,
        }
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_reachable() {
        let out = "PING 10.0.0.1 (10.0.0.1) 56(84) bytes of data.\n\
                   --- 10.0.0.1 ping statistics ---\n\
                   1 packets transmitted, 1 received, 0% packet loss, time 0ms\n";
        assert_eq!(
            classify(&UnixReply, &raw("10.0.0.1", out)),
            ProbeOutcome::Reachable {
                address: ip("10.0.0.1")
            }
        );
    }

    #[test]
    fn test_unreachable_is_the_fallback() {
        for out in [
            "PING 10.0.0.2 (10.0.0.2) 56(84) bytes of data.\n\
             1 packets transmitted, 0 received, 100% packet loss, time 0ms\n",
            "PING 10.0.0.2 (10.0.0.2) 56(84) bytes of data.\n",
            "PING 10.0.0.2 (10.0.0.2) 56(84) bytes of data.\nRequest timeout for icmp_seq 0\n",
        ] {
            assert_eq!(
                classify(&UnixReply, &raw("10.0.0.2", out)),
                ProbeOutcome::Unreachable {
                    address: ip("10.0.0.2")
                }
            );
        }
    }

    #[test]
    fn test_address_taken_from_reply() {
        let out = "PING 10.9.9.9 (10.9.9.9) 56(84) bytes of data.\n\
                   1 packets transmitted, 1 received, 0% packet loss, time 0ms\n";
        let outcome = classify(&UnixReply, &raw("10.0.0.1", out));
        assert_eq!(outcome.address(), Some(ip("10.9.9.9")));
    }

    #[test]
    fn test_empty_output_is_indeterminate() {
        assert_eq!(
            classify(&UnixReply, &raw("fd00::1", "")),
            ProbeOutcome::Indeterminate
        );
        assert_eq!(
            classify(&WindowsReply, &raw("10.0.0.1", "\r\n")),
            ProbeOutcome::Indeterminate
        );
    }

    #[test]
    fn test_timed_out_is_unreachable() {
        let mut probe = raw("10.0.0.3", "");
        probe.timed_out = true;
        assert_eq!(
            classify(&UnixReply, &probe),
            ProbeOutcome::Unreachable {
                address: ip("10.0.0.3")
            }
        );
    }

    #[test]
    fn test_windows_lost_zero_is_reachable() {
        let out = "Pinging 10.0.0.1 with 32 bytes of data:\r\n\
                   Reply from 10.0.0.1: bytes=32 time<1ms TTL=128\r\n\
                   Packets: Sent = 1, Received = 1, Lost = 0 (0% loss),\r\n";
        assert_eq!(
            classify(&WindowsReply, &raw("10.0.0.1", out)),
            ProbeOutcome::Reachable {
                address: ip("10.0.0.1")
            }
        );
    }
}
