use thiserror::Error;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum PatchError {
    #[error("unknown factory name: {name}")]
    UnknownFactory { name: String },
    #[error("automatic delivery requires a current-thread runtime")]
    UnsupportedRuntime,
}
