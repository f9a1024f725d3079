use thiserror::Error;

/// Errors raised while turning user input into a sweepable network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("{input} does not appear to be an IPv4 or IPv6 network: {reason}")]
    InvalidNetworkAddress { input: String, reason: String },

    #[error("{network} is not accepted: /31 and /32 IPv4 networks cannot be swept")]
    UnsupportedPrefixLength { network: String },
}

pub type Result<T> = std::result::Result<T, RangeError>;
