use formats::TopologyError;
use thiserror::Error;

/// The JavaScript error constructor a host should raise for an error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorClass {
    Range,
    Type,
}

/// A rejected attribute or property assignment. The element keeps the value
/// it had before the assignment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("unknown projection {0:?}")]
    UnknownProjection(String),
    #[error("areas must be an array of H3 cell identifiers")]
    NotASequence,
    #[error("areas[{index}] is not a valid H3 cell identifier: {value}")]
    InvalidCell { index: usize, value: String },
    #[error("unknown reload policy {0:?} (expected \"once\" or \"on-source-change\")")]
    UnknownReloadPolicy(String),
}

impl AttributeError {
    pub fn class(&self) -> ErrorClass {
        match self {
            AttributeError::UnknownProjection(_) | AttributeError::UnknownReloadPolicy(_) => {
                ErrorClass::Range
            }
            AttributeError::NotASequence | AttributeError::InvalidCell { .. } => ErrorClass::Type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request for {url} failed with status {status}")]
    Status { url: String, status: u16 },
    #[error("request for {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("response from {url} is not valid JSON: {message}")]
    Decode { url: String, message: String },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("invalid topology: {0}")]
    Topology(#[from] TopologyError),
}
