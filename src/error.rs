use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Infrastructure failures only. Expected domain outcomes (account absent,
/// username taken, no such task) are plain values on the `Ok` path and never
/// show up here.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The initial connectivity check failed; the process cannot serve
    /// requests.
    #[error("failed to reach MongoDB: {0}")]
    Unreachable(#[source] mongodb::error::Error),

    /// A round trip failed after startup: store unreachable, timed out, or a
    /// constraint violation other than the expected duplicate-username case.
    #[error("store operation failed: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}
