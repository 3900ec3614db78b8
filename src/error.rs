use thiserror::Error;

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Source / transport ────────────────────────────────────────────────────
    #[error("Source fetch failed: {0}")]
    Transport(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── CSV / schema ──────────────────────────────────────────────────────────
    #[error("CSV schema mismatch, missing keys: {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    #[error("CSV error: {0}")]
    Csv(String),

    // ── Filesystem ────────────────────────────────────────────────────────────
    #[error("Filesystem error: {0}")]
    Filesystem(String),

    // ── Generic fallback ──────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}
