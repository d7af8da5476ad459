//! Error types for the canonicalizer
//!
//! Per-line trouble (unbalanced brackets, malformed alignments, ambiguous
//! structure) is never an error: the engine repairs or passes through and
//! every input line yields an output line. `Error` covers only what can
//! fail *before* any line is processed.

/// Canonicalizer error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Underlying file I/O failure (CLI file drivers)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or inconsistent input at the corpus level
    #[error("Input error: {0}")]
    Input(String),

    /// Rejected engine configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for canonicalizer operations
pub type Result<T> = std::result::Result<T, Error>;
