use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by system construction, job handling and result writing.
///
/// The Monte Carlo engines themselves never fail: acceptance, rejection and
/// cluster growth are outcomes, not errors.
#[derive(Error, Debug)]
pub enum MagnetoError {
    /// A lattice file is missing, unreadable, or does not encode a square
    /// grid of ±1 spins.
    #[error("invalid lattice file {path}: {reason}")]
    InvalidInputFile { path: PathBuf, reason: String },

    /// The requested temperature mode has no implementation.
    #[error("temperature mode '{0}' is not implemented")]
    UnimplementedMode(String),

    /// An output template could not be parsed.
    #[error("malformed output format: {0}")]
    Formatting(String),

    /// The job descriptor failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build RNG worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type MagnetoResult<T> = Result<T, MagnetoError>;
