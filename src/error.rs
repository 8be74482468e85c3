use thiserror::Error as ThisError;

/// Crate-wide error taxonomy. Mirrors the kinds enumerated for the clustering core
/// plus the handful the ambient CLI/config layer needs.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("could not open input file {path}: {source}")]
    InputOpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("input stream contained zero usable vectors")]
    EmptyInput,

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("cosine operation on a zero-norm vector")]
    ZeroNorm,

    #[error("line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    #[error("configuration error: {0}")]
    ConfigParse(String),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
