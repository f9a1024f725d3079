//! Error types for the netswp-sweep crate.

use std::net::IpAddr;

use thiserror::Error;

use netswp_core::RangeError;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error(transparent)]
    Range(#[from] RangeError),

    #[error("Interface {name} not found")]
    InvalidInterfaceName { name: String, available: Vec<String> },

    #[error("Network is unreachable (no usable reply while probing {address})")]
    DestinationNetworkUnreachable { address: IpAddr },

    #[error("Ping sweep aborted")]
    UserAbort,

    #[error("Failed to run {program}: {source}")]
    ProbeSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Sweep worker failed: {0}")]
    Worker(String),
}

impl SweepError {
    /// Process exit code for this condition. Every fatal condition gets its
    /// own code.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Range(RangeError::InvalidNetworkAddress { .. }) => 2,
            Self::InvalidInterfaceName { .. } => 3,
            Self::Range(RangeError::UnsupportedPrefixLength { .. }) => 4,
            Self::DestinationNetworkUnreachable { .. } => 5,
            Self::Config(_) => 6,
            Self::ProbeSpawn { .. } => 7,
            Self::Worker(_) => 8,
            Self::UserAbort => 130,
        }
    }
}

impl From<config::ConfigError> for SweepError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
