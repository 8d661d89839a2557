//! Error types for volcast.

use thiserror::Error;

/// The main error type for volcast operations.
#[derive(Error, Debug)]
pub enum VolcastError {
    /// No usable compute device could be found or created.
    #[error("no compatible compute device: {0}")]
    NoCompatibleDevice(String),

    /// Device memory or resource shape failure.
    #[error("resource allocation failed: {0}")]
    ResourceAllocation(String),

    /// The ray-casting kernel failed to assemble or compile.
    #[error("kernel compilation failed:\n{diagnostics}")]
    KernelCompilation { diagnostics: String },

    /// Argument binding or dispatch failed.
    #[error("kernel dispatch failed: {0}")]
    KernelDispatch(String),

    /// A required input (volume, transfer function) was not bound.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// An input value was rejected during validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Image export error.
    #[error("image export error: {0}")]
    Image(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Coarse classification of a [`VolcastError`], for callers that only need
/// to decide how to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoCompatibleDevice,
    ResourceAllocation,
    KernelCompilation,
    KernelDispatch,
    MissingInput,
    InvalidInput,
    Io,
}

impl VolcastError {
    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoCompatibleDevice(_) => ErrorKind::NoCompatibleDevice,
            Self::ResourceAllocation(_) => ErrorKind::ResourceAllocation,
            Self::KernelCompilation { .. } => ErrorKind::KernelCompilation,
            Self::KernelDispatch(_) => ErrorKind::KernelDispatch,
            Self::MissingInput(_) => ErrorKind::MissingInput,
            Self::InvalidInput(_) | Self::SizeMismatch { .. } | Self::JsonError(_) => {
                ErrorKind::InvalidInput
            }
            Self::Image(_) | Self::IoError(_) => ErrorKind::Io,
        }
    }
}

/// A specialized Result type for volcast operations.
pub type Result<T> = std::result::Result<T, VolcastError>;
