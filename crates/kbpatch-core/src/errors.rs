//! Error types for the kbpatch core library.

/// Top-level error enum for the kbpatch core library.
///
/// Every variant is fatal: the reconciliation is a deterministic transform
/// over fully-loaded in-memory data, so there is nothing transient to retry,
/// and a single corrupt record indicates index corruption that would silently
/// merge unrelated methods if skipped.
#[derive(Debug, thiserror::Error)]
pub enum KbError {
    #[error("malformed signature {0:?}: does not match <Cls: Ret method(Params)>")]
    MalformedSignature(String),

    #[error("no backing record for indexed signature {0:?}")]
    MissingCounterpart(String),

    #[error("invalid {field} value {value:?}: expected an integer API level")]
    InvalidApiLevel { field: &'static str, value: String },

    #[error("malformed CSV row at line {line}: {reason}")]
    MalformedCsvRow { line: usize, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type KbResult<T> = Result<T, KbError>;
