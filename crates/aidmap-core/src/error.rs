//! Configuration error type.

use std::io;

use aidmap_types::{IdRange, Namespace};
use thiserror::Error;

/// The identity or path tables are inconsistent.
///
/// These surface while an [`IdentityDb`](crate::IdentityDb) is being built
/// and are never recoverable: a namespace built on a bad table would hand
/// out wrong ids.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Range set has fewer than two ranges, an inverted range, or ranges
    /// that overlap or are out of order.
    #[error("{0} ranges must be ascending and non-overlapping")]
    RangesNotAscending(Namespace),

    /// A band reaching `AID_USER_OFFSET` or beyond, into the next user's
    /// slice.
    #[error("range {0} extends past the per-user id space")]
    RangeBeyondUser(IdRange),

    /// An OEM band with `start > end`.
    #[error("OEM band {0} is inverted")]
    InvalidOemBand(IdRange),

    /// Rule table does not end with an empty-prefix default.
    #[error("{0} rule table must end with an empty-prefix catch-all")]
    MissingCatchAll(&'static str),

    /// A rule or allow-list names an identity the registry does not have.
    #[error("unknown identity in configuration: {0}")]
    UnknownIdentity(String),

    /// RON syntax or shape error.
    #[error("config parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Reading an override file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Configuration result type.
pub type ConfigResult<T> = Result<T, ConfigError>;
