//! netswp-core: Shared types for the netswp ping sweeper.
//!
//! This crate holds the pieces of a sweep that do not touch the operating
//! system:
//! - `NetworkRange` parsing and host enumeration
//! - `ProbeOutcome`, the classified result of a single echo probe
//! - `SweepTally`, the atomic running counters shared by sweep workers
//! - Range error types

pub mod error;
pub mod range;
pub mod types;

pub use error::RangeError;
pub use range::{Hosts, NetworkRange};
pub use types::{ProbeOutcome, SweepTally, TallySnapshot};
