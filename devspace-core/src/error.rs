pub use anyhow::bail;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// Errors produced by environment backends and shared infrastructure.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A backend failed to start, stop, or inspect a machine.
    Backend(String),
    /// The backend does not implement the requested capability.
    Unsupported(String),
    /// The backend rejected the machine configuration it was handed.
    InvalidMachineConfig(String),
    Io(#[from] std::io::Error),
    Serialization(String),
    Internal(String),
    Other(#[from] anyhow::Error),
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            CoreError::Backend(s) => write!(f, "Backend error: {}", s),
            CoreError::Unsupported(s) => write!(f, "Operation not supported: {}", s),
            CoreError::InvalidMachineConfig(s) => write!(f, "Invalid machine config: {}", s),
            CoreError::Io(e) => write!(f, "I/O error: {}", e),
            CoreError::Serialization(s) => write!(f, "Serialization error: {}", s),
            CoreError::Internal(s) => write!(f, "Internal error: {}", s),
            CoreError::Other(e) => write!(f, "Other error: {}", e),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

impl CoreError {
    /// Whether the error signals an unimplemented backend capability rather
    /// than a failure of an implemented one.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, CoreError::Unsupported(_))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
