//! Core data model for volcast.
//!
//! This crate holds everything that does not need a GPU:
//! - [`VolumeData`] scalar grids and [`TransferFunction`] lookup tables
//! - [`RenderParams`], [`KernelConstants`] and [`RendererConfig`]
//! - Device preference and selection policy
//! - Packed pixel helpers and a CPU reference ray marcher

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Grid math converts between u32 indices and f32 coordinates all the time
#![allow(clippy::cast_precision_loss)]

pub mod config;
pub mod device;
pub mod error;
pub mod params;
pub mod pixel;
pub mod raymarch;
pub mod sampling;
pub mod transfer_function;
pub mod volume;

pub use config::RendererConfig;
pub use device::{select_device, DeviceKind, DevicePreference, DeviceSelection};
pub use error::{ErrorKind, Result, VolcastError};
pub use params::{KernelConstants, RenderParams, ShadingParams};
pub use pixel::{pack_rgba, to_rgba_bytes, unpack_rgba};
pub use raymarch::{Ray, ReferenceRaymarcher, OPACITY_THRESHOLD};
pub use sampling::{AddressMode, FilterMode, SamplingPolicy};
pub use transfer_function::{TransferFunction, TRANSFER_FUNCTION_RESOLUTION};
pub use volume::VolumeData;

// Re-export glam types for convenience
pub use glam::{Mat4, UVec3, Vec3, Vec4};
