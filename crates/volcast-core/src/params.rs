//! Ray-casting parameters.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VolcastError};

/// Constants baked into the ray-casting kernel when it is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConstants {
    /// Distance between consecutive samples along a ray, in normalized box units.
    pub ray_step_size: f32,
    /// Upper bound on samples taken per ray.
    pub ray_max_steps: u32,
}

impl Default for KernelConstants {
    fn default() -> Self {
        Self {
            ray_step_size: 0.01,
            ray_max_steps: 500,
        }
    }
}

impl KernelConstants {
    /// Checks that the constants describe a terminating march.
    pub fn validate(&self) -> Result<()> {
        if !self.ray_step_size.is_finite() || self.ray_step_size <= 0.0 {
            return Err(VolcastError::InvalidInput(format!(
                "ray step size must be positive and finite, got {}",
                self.ray_step_size
            )));
        }
        if self.ray_max_steps == 0 {
            return Err(VolcastError::InvalidInput(
                "ray max steps must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Per-render shading scalars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingParams {
    /// Multiplier on transfer-function opacity.
    pub density: f32,
    /// Multiplier on the final composited color.
    pub brightness: f32,
    /// Subtracted from the sampled intensity before the transfer lookup.
    pub transfer_offset: f32,
    /// Applied to the offset intensity before the transfer lookup.
    pub transfer_scale: f32,
}

impl Default for ShadingParams {
    fn default() -> Self {
        Self {
            density: 1.0,
            brightness: 1.0,
            transfer_offset: 0.0,
            transfer_scale: 1.0,
        }
    }
}

impl ShadingParams {
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("density", self.density),
            ("brightness", self.brightness),
            ("transfer offset", self.transfer_offset),
            ("transfer scale", self.transfer_scale),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(VolcastError::InvalidInput(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Everything a single render call needs besides the bound resources.
///
/// The inverse view matrix has no default: callers always say where the
/// camera is. Shading left unset falls back to the renderer's configured
/// shading, or to [`ShadingParams::default`] when there is none.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    /// Camera-to-world transform. Rays start at its translation and point
    /// along its -Z axis.
    pub inv_view_matrix: Mat4,
    pub shading: Option<ShadingParams>,
}

impl RenderParams {
    /// Creates render parameters with unset shading.
    #[must_use]
    pub fn new(inv_view_matrix: Mat4) -> Self {
        Self {
            inv_view_matrix,
            shading: None,
        }
    }

    /// Creates render parameters for a camera at `eye` looking at `target`.
    #[must_use]
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        Self::new(Mat4::look_at_rh(eye, target, up).inverse())
    }

    /// Sets the shading scalars, overriding any configured ones.
    #[must_use]
    pub fn with_shading(mut self, shading: ShadingParams) -> Self {
        self.shading = Some(shading);
        self
    }

    /// Fills unset shading with `fallback`. Explicit shading is kept.
    #[must_use]
    pub fn or_shading(mut self, fallback: ShadingParams) -> Self {
        self.shading.get_or_insert(fallback);
        self
    }

    /// The shading scalars a render uses.
    #[must_use]
    pub fn shading_or_default(&self) -> ShadingParams {
        self.shading.unwrap_or_default()
    }

    /// Checks the matrix is usable and the shading scalars are finite.
    pub fn validate(&self) -> Result<()> {
        if !self.inv_view_matrix.is_finite() {
            return Err(VolcastError::InvalidInput(
                "inverse view matrix has non-finite entries".into(),
            ));
        }
        if self.inv_view_matrix.determinant().abs() <= f32::EPSILON {
            return Err(VolcastError::InvalidInput(
                "inverse view matrix is singular".into(),
            ));
        }
        self.shading_or_default().validate()
    }
}
