//! wgpu compute backend for volcast.
//!
//! This crate provides:
//! - Device discovery and the per-renderer device/queue ([`ComputeContext`])
//! - Volume and transfer-function textures
//! - Kernel template assembly and compilation (WGSL)
//! - Render target management and ray-casting dispatch
//! - PNG/JPEG export of packed pixels

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Accessors returning references don't need must_use
#![allow(clippy::must_use_candidate)]
// Texel and pixel counts are bounded by device limits well below u32::MAX
#![allow(clippy::cast_possible_truncation)]

pub mod buffer;
pub mod context;
pub mod error;
pub mod image_export;
pub mod kernel;
pub mod raycaster;
pub mod render_target;
pub mod sampler;
pub mod transfer_texture;
pub mod volume_texture;

pub use context::{device_kind, volume_format_for, ComputeContext, DeviceInfo};
pub use error::{RenderError, RenderResult};
pub use image_export::{encode_png, save_packed_pixels, ImageExportError};
pub use kernel::{KernelProgram, KernelTemplate, RAYCAST_TEMPLATE, WORKGROUP_SIZE};
pub use raycaster::{workgroup_count, RaycastUniforms, VolumeRaycaster};
pub use render_target::RenderTarget;
pub use transfer_texture::TransferTexture;
pub use volume_texture::VolumeTexture;

// Re-export wgpu so callers can name texture formats and backends
pub use wgpu;
