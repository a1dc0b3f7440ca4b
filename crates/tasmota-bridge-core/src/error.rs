//! Runtime error types for Tasmota Bridge.
//!
//! Neither error ever escapes the reconciliation loop: a [`FetchError`]
//! skips the tick, an [`UpdateError`] feeds the per-device retry state.

use thiserror::Error;

/// Pushing a power state to a device failed.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum UpdateError {
    /// Connection refused, DNS failure, timeout.
    #[error("Failed to reach Tasmota device {address}: {source}")]
    Transport {
        address: String,
        #[source]
        source: reqwest::Error,
    },

    /// Device answered with a non-2xx status.
    #[error("Failed to update Tasmota device {address}: HTTP {status}")]
    Status { address: String, status: u16 },

    /// Device answered 2xx but the body has no usable `POWER` field.
    #[error("Unexpected response from Tasmota device {address}: {message}")]
    InvalidResponse { address: String, message: String },
}

impl UpdateError {
    pub fn address(&self) -> &str {
        match self {
            Self::Transport { address, .. }
            | Self::Status { address, .. }
            | Self::InvalidResponse { address, .. } => address,
        }
    }
}

/// Reading output states from the controller failed.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FetchError {
    #[error("Output source unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Output source returned HTTP {0}")]
    Status(u16),

    #[error("Output source payload has no status list")]
    MissingStatus,

    #[error("Output source payload is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Result type alias for device pushes.
pub type UpdateResult<T> = Result<T, UpdateError>;
