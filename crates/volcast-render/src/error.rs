//! Compute backend error types.

use thiserror::Error;
use volcast_core::VolcastError;

use crate::image_export::ImageExportError;

/// Errors that can occur while driving the compute device.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No adapter matched and the backend offered no default.
    #[error("no compatible compute device: {0}")]
    NoCompatibleDevice(String),

    /// Failed to create wgpu device.
    #[error("failed to create compute device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Texture, buffer or sampler creation failed.
    #[error("resource allocation failed: {0}")]
    ResourceAllocation(String),

    /// Kernel assembly or compilation failed.
    #[error("kernel compilation failed:\n{diagnostics}")]
    KernelCompilation { diagnostics: String },

    /// Binding or dispatch failed.
    #[error("kernel dispatch failed: {0}")]
    KernelDispatch(String),

    /// A required input was not bound before rendering.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// Mapping a staging buffer for readback failed.
    #[error("GPU buffer mapping failed")]
    BufferMapFailed,

    /// Writing an image failed.
    #[error(transparent)]
    Image(#[from] ImageExportError),
}

/// A specialized Result type for compute operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

impl From<RenderError> for VolcastError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::NoCompatibleDevice(msg) => Self::NoCompatibleDevice(msg),
            RenderError::DeviceCreationFailed(e) => Self::NoCompatibleDevice(e.to_string()),
            RenderError::ResourceAllocation(msg) => Self::ResourceAllocation(msg),
            RenderError::KernelCompilation { diagnostics } => Self::KernelCompilation { diagnostics },
            RenderError::KernelDispatch(msg) => Self::KernelDispatch(msg),
            RenderError::MissingInput(msg) => Self::MissingInput(msg),
            RenderError::BufferMapFailed => Self::KernelDispatch("GPU buffer mapping failed".into()),
            RenderError::Image(ImageExportError::IoError(e)) => Self::IoError(e),
            RenderError::Image(e) => Self::Image(e.to_string()),
        }
    }
}
