//! netswp-sweep: Concurrent ping sweeper.
//!
//! Wraps the system `ping` to probe every host of an IPv4 or IPv6 network,
//! classifies each reply, and reports how many hosts answered.

pub mod classify;
pub mod config;
pub mod error;
pub mod interfaces;
pub mod platform;
pub mod probe;
pub mod reply;
pub mod report;
pub mod sweep;
