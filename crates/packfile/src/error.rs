use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackfileError {
    #[error("failed reading packfile source: {0}")]
    Io(#[from] std::io::Error),
    #[error("packfile line {line_number} is not a valid entry: {source}")]
    Parse {
        line_number: usize,
        source: serde_json::Error,
    },
    #[error("factory expected a {expected} source, got {got}")]
    SourceMismatch {
        expected: &'static str,
        got: &'static str,
    },
    #[error("packfile is closed")]
    Closed,
    #[error("automatic delivery requires a current-thread runtime")]
    UnsupportedRuntime,
}
