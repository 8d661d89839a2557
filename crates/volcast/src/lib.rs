//! volcast: GPU volume ray-casting for 3D scalar grids.
//!
//! Give it a volume, a transfer function and a camera; get back a composited
//! image as packed RGBA pixels.
//!
//! # Quick Start
//!
//! ```no_run
//! use volcast::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     let volume = VolumeData::from_fn(UVec3::splat(64), |x, y, z| {
//!         let p = Vec3::new(x as f32, y as f32, z as f32) - Vec3::splat(31.5);
//!         if p.length() < 20.0 { 1.0 } else { 0.0 }
//!     })?;
//!
//!     let mut renderer = Renderer::new(&RendererConfig::default().with_size(512, 512))?;
//!     renderer.bind_volume(&volume)?;
//!     renderer.set_transfer_function(&TransferFunction::grayscale_ramp())?;
//!
//!     let params = RenderParams::look_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::Y);
//!     renderer.render_to_file("sphere.png", &params)?;
//!     Ok(())
//! }
//! ```
//!
//! # Pieces
//!
//! - [`Renderer`] - blocking renderer owning one device, queue and kernel
//! - [`headless`] - one-shot helpers, including a host-side reference render
//! - [`RendererConfig`] - serde configuration with defaults for every field
//! - [`VolcastError`] - the error every call returns, classified by [`ErrorKind`]

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod headless;
mod renderer;

pub use headless::{render_reference, render_volume, render_volume_to_file};
pub use renderer::Renderer;

// Re-export core types
pub use volcast_core::{
    pack_rgba, select_device, to_rgba_bytes, unpack_rgba, AddressMode, DeviceKind,
    DevicePreference, DeviceSelection, ErrorKind, FilterMode, KernelConstants, Mat4,
    RenderParams, RendererConfig, Result, SamplingPolicy, ShadingParams, TransferFunction,
    UVec3, Vec3, Vec4, VolcastError, VolumeData,
};

// Re-export render types
pub use volcast_render::{encode_png, save_packed_pixels, DeviceInfo, KernelTemplate};

/// Re-export of the compute backend for lower-level use.
pub use volcast_render as render;

/// Installs the `env_logger` logger, honoring `RUST_LOG`.
///
/// Safe to call more than once; later calls do nothing.
pub fn init_logging() {
    if env_logger::try_init().is_ok() {
        log::debug!("volcast logging initialized");
    }
}
