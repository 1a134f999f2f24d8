use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LinkError {
    #[error("Failed to find a locked preamble")]
    PreambleNotFound,

    #[error("Uncorrectable codeword at index {index} ({decoded} bytes decoded before it)")]
    UncorrectableCodeword { index: usize, decoded: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, LinkError>;
