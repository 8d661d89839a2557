//! Host-side scalar volumes.

use glam::{UVec3, Vec3};

use crate::error::{Result, VolcastError};
use crate::sampling::SamplingPolicy;

/// A 3D grid of scalar intensities with its physical geometry.
///
/// Voxels are stored x-fastest: `index = x + dims.x * (y + dims.y * z)`.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeData {
    dims: UVec3,
    spacing: Vec3,
    origin: Vec3,
    voxels: Vec<f32>,
}

impl VolumeData {
    /// Creates a volume with unit spacing at the origin.
    pub fn new(dims: UVec3, voxels: Vec<f32>) -> Result<Self> {
        Self::with_geometry(dims, Vec3::ONE, Vec3::ZERO, voxels)
    }

    /// Creates a volume with explicit voxel spacing and origin.
    pub fn with_geometry(dims: UVec3, spacing: Vec3, origin: Vec3, voxels: Vec<f32>) -> Result<Self> {
        if dims.min_element() == 0 {
            return Err(VolcastError::InvalidInput(format!(
                "volume must be 3-dimensional with non-zero extent, got {}x{}x{}",
                dims.x, dims.y, dims.z
            )));
        }
        if !spacing.is_finite() || spacing.min_element() <= 0.0 {
            return Err(VolcastError::InvalidInput(format!(
                "voxel spacing must be positive and finite, got {spacing}"
            )));
        }
        if !origin.is_finite() {
            return Err(VolcastError::InvalidInput(format!(
                "volume origin must be finite, got {origin}"
            )));
        }

        let expected = voxel_count(dims);
        if voxels.len() != expected {
            return Err(VolcastError::SizeMismatch {
                expected,
                actual: voxels.len(),
            });
        }

        Ok(Self {
            dims,
            spacing,
            origin,
            voxels,
        })
    }

    /// Builds a volume by evaluating `f(x, y, z)` at every voxel.
    pub fn from_fn(dims: UVec3, mut f: impl FnMut(u32, u32, u32) -> f32) -> Result<Self> {
        let mut voxels = Vec::with_capacity(voxel_count(dims));
        for z in 0..dims.z {
            for y in 0..dims.y {
                for x in 0..dims.x {
                    voxels.push(f(x, y, z));
                }
            }
        }
        Self::new(dims, voxels)
    }

    /// Sets the voxel spacing.
    pub fn with_spacing(mut self, spacing: Vec3) -> Result<Self> {
        if !spacing.is_finite() || spacing.min_element() <= 0.0 {
            return Err(VolcastError::InvalidInput(format!(
                "voxel spacing must be positive and finite, got {spacing}"
            )));
        }
        self.spacing = spacing;
        Ok(self)
    }

    /// Grid dimensions in voxels.
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    /// Physical size of one voxel.
    pub fn spacing(&self) -> Vec3 {
        self.spacing
    }

    /// Physical position of voxel (0, 0, 0). Rendering ignores it; see
    /// [`Self::normalized_half_extent`].
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Raw voxel values, x-fastest.
    pub fn voxels(&self) -> &[f32] {
        &self.voxels
    }

    /// Number of voxels.
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Always false for a constructed volume; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Linear index of a voxel.
    pub fn index(&self, x: u32, y: u32, z: u32) -> usize {
        x as usize + self.dims.x as usize * (y as usize + self.dims.y as usize * z as usize)
    }

    /// Value at a voxel.
    pub fn get(&self, x: u32, y: u32, z: u32) -> Option<f32> {
        if x >= self.dims.x || y >= self.dims.y || z >= self.dims.z {
            return None;
        }
        self.voxels.get(self.index(x, y, z)).copied()
    }

    /// Minimum and maximum voxel values, ignoring NaNs.
    pub fn value_range(&self) -> (f32, f32) {
        self.voxels
            .iter()
            .filter(|v| !v.is_nan())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Physical extent of the grid (`dims * spacing`).
    pub fn extent(&self) -> Vec3 {
        self.dims.as_vec3() * self.spacing
    }

    /// Half extent of the render box: the box is centered at the origin and
    /// its largest physical axis spans `[-1, 1]`.
    ///
    /// Camera coordinates are relative to this box, not to world space:
    /// [`Self::origin`] is kept as metadata and does not move the box.
    pub fn normalized_half_extent(&self) -> Vec3 {
        let extent = self.extent();
        extent / extent.max_element()
    }

    /// Samples the volume at a normalized texture coordinate in `[0, 1]^3`.
    pub fn sample(&self, coord: Vec3, policy: SamplingPolicy) -> f32 {
        let (x0, x1, fx) = policy.texel_pair(coord.x, self.dims.x);
        let (y0, y1, fy) = policy.texel_pair(coord.y, self.dims.y);
        let (z0, z1, fz) = policy.texel_pair(coord.z, self.dims.z);

        let v = |x: u32, y: u32, z: u32| self.voxels[self.index(x, y, z)];

        let c00 = lerp(v(x0, y0, z0), v(x1, y0, z0), fx);
        let c10 = lerp(v(x0, y1, z0), v(x1, y1, z0), fx);
        let c01 = lerp(v(x0, y0, z1), v(x1, y0, z1), fx);
        let c11 = lerp(v(x0, y1, z1), v(x1, y1, z1), fx);

        let c0 = lerp(c00, c10, fy);
        let c1 = lerp(c01, c11, fy);
        lerp(c0, c1, fz)
    }
}

fn voxel_count(dims: UVec3) -> usize {
    dims.x as usize * dims.y as usize * dims.z as usize
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
