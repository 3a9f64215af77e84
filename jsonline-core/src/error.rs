use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` did not finish within {timeout_ms}ms")]
    Timeout { program: String, timeout_ms: u64 },

    #[error("config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("inline JSON line is not valid: {message} (line: {line})")]
    InvalidJson { line: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
