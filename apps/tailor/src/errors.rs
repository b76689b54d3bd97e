use thiserror::Error;

/// Crate-level error type.
///
/// Note the deliberate asymmetry with the derivation engine: `derive` never
/// returns an error (it logs and skips malformed data), while the codec and
/// stores fail loudly — a row that cannot be decoded means corrupted storage,
/// and silently dropping it would corrupt everything derived downstream.
#[derive(Debug, Error)]
pub enum TailorError {
    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
