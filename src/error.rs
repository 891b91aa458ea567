use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the simulation core and its configuration layer.
///
/// The force and collision core never fails on numerical degeneracies (they are
/// absorbed in place); errors surface only where user-supplied values enter the
/// crate: particle/boundary construction, `tick(dt)` arguments and config loading.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Numerical or geometric issue that cannot be absorbed locally.
    #[error("numerical error: {0}")]
    MathError(String),

    /// Malformed scenario description.
    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Propagated I/O errors (scenario files).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
