//! CPU reference implementation of the ray-casting kernel.
//!
//! Mirrors the per-pixel algorithm in the WGSL kernel step for step so the
//! algorithm can be exercised without a GPU. It is not meant to be fast.

use glam::{Mat4, Vec3, Vec4, Vec4Swizzles};

use crate::error::{Result, VolcastError};
use crate::params::{KernelConstants, RenderParams};
use crate::pixel::pack_rgba;
use crate::sampling::SamplingPolicy;
use crate::transfer_function::TransferFunction;
use crate::volume::VolumeData;

/// Accumulated opacity at which a ray stops marching.
pub const OPACITY_THRESHOLD: f32 = 0.95;

/// A ray in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Point at parameter `t`.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Builds the eye ray through pixel `(x, y)`; row 0 is the top row.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn through_pixel(inv_view: &Mat4, x: u32, y: u32, width: u32, height: u32) -> Self {
        let u = (x as f32 / width as f32) * 2.0 - 1.0;
        let v = 1.0 - (y as f32 / height as f32) * 2.0;

        let origin = (*inv_view * Vec4::new(0.0, 0.0, 0.0, 1.0)).xyz();
        let direction = (*inv_view * Vec4::new(u, v, -2.0, 0.0)).xyz().normalize();
        Self { origin, direction }
    }

    /// Slab test against the box `[-half_extent, half_extent]`.
    ///
    /// Returns `(t_near, t_far)` when the ray hits the box in front of its
    /// origin.
    #[must_use]
    pub fn intersect_box(&self, half_extent: Vec3) -> Option<(f32, f32)> {
        let inv_dir = self.direction.recip();
        let t_bot = inv_dir * (-half_extent - self.origin);
        let t_top = inv_dir * (half_extent - self.origin);

        let t_min = t_top.min(t_bot);
        let t_max = t_top.max(t_bot);

        let t_near = t_min.max_element();
        let t_far = t_max.min_element();

        (t_far > t_near.max(0.0)).then_some((t_near, t_far))
    }
}

/// Host-side ray marcher with the kernel's constants and volume sampling.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceRaymarcher {
    pub constants: KernelConstants,
    pub volume_sampling: SamplingPolicy,
}

impl ReferenceRaymarcher {
    #[must_use]
    pub fn new(constants: KernelConstants, volume_sampling: SamplingPolicy) -> Self {
        Self {
            constants,
            volume_sampling,
        }
    }

    /// Renders a full image, row-major from the top-left.
    pub fn render(
        &self,
        volume: &VolumeData,
        transfer_function: &TransferFunction,
        params: &RenderParams,
        width: u32,
        height: u32,
    ) -> Result<Vec<u32>> {
        if width == 0 || height == 0 {
            return Err(VolcastError::InvalidInput(format!(
                "render size must be non-zero, got {width}x{height}"
            )));
        }
        self.constants.validate()?;
        params.validate()?;

        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let ray = Ray::through_pixel(&params.inv_view_matrix, x, y, width, height);
                pixels.push(self.shade_ray(&ray, volume, transfer_function, params));
            }
        }
        Ok(pixels)
    }

    /// Marches one ray and returns its packed pixel.
    #[must_use]
    pub fn shade_ray(
        &self,
        ray: &Ray,
        volume: &VolumeData,
        transfer_function: &TransferFunction,
        params: &RenderParams,
    ) -> u32 {
        let half_extent = volume.normalized_half_extent();
        let Some((t_near, t_far)) = ray.intersect_box(half_extent) else {
            return 0;
        };

        let shading = params.shading_or_default();
        let mut t = t_near.max(0.0);
        let mut acc = Vec4::ZERO;

        for _ in 0..self.constants.ray_max_steps {
            let pos = ray.at(t);
            let coord = (pos / half_extent) * 0.5 + 0.5;
            let sample = volume.sample(coord, self.volume_sampling);

            let mut col =
                transfer_function.sample((sample - shading.transfer_offset) * shading.transfer_scale);
            col.w *= shading.density;
            let col = (col.xyz() * col.w).extend(col.w);

            acc += col * (1.0 - acc.w);
            if acc.w > OPACITY_THRESHOLD {
                break;
            }

            t += self.constants.ray_step_size;
            if t > t_far {
                break;
            }
        }

        pack_rgba(acc * shading.brightness)
    }
}
