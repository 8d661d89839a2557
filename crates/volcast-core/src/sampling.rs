//! Texture sampling policies shared by the GPU textures and the CPU reference.

use serde::{Deserialize, Serialize};

/// How out-of-range texture coordinates are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AddressMode {
    /// Coordinates wrap around (tiling).
    #[default]
    Repeat,
    /// Coordinates clamp to the edge texel.
    ClampToEdge,
}

/// How values between texel centers are reconstructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FilterMode {
    /// (Tri)linear interpolation.
    #[default]
    Linear,
    /// Nearest texel.
    Nearest,
}

/// Addressing + filtering pair attached to a sampled resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SamplingPolicy {
    pub address: AddressMode,
    pub filter: FilterMode,
}

impl SamplingPolicy {
    /// Wrap addressing with linear filtering; the volume default.
    pub const REPEAT_LINEAR: Self = Self {
        address: AddressMode::Repeat,
        filter: FilterMode::Linear,
    };

    /// Clamped addressing with linear filtering; the transfer-function default.
    pub const CLAMP_LINEAR: Self = Self {
        address: AddressMode::ClampToEdge,
        filter: FilterMode::Linear,
    };

    /// Resolves an integer texel index along an axis of `len` texels.
    #[must_use]
    pub fn resolve_index(self, index: i64, len: u32) -> u32 {
        let len = i64::from(len.max(1));
        let resolved = match self.address {
            AddressMode::Repeat => index.rem_euclid(len),
            AddressMode::ClampToEdge => index.clamp(0, len - 1),
        };
        // resolved lies in [0, len) which always fits in u32
        u32::try_from(resolved).unwrap_or(0)
    }

    /// Splits a normalized coordinate into the two texel indices and the
    /// blend weight of the second, following texel-center conventions.
    ///
    /// For nearest filtering both indices are equal and the weight is zero.
    #[must_use]
    pub fn texel_pair(self, coord: f32, len: u32) -> (u32, u32, f32) {
        #[allow(clippy::cast_precision_loss)]
        let scaled = coord * len as f32;
        match self.filter {
            FilterMode::Nearest => {
                #[allow(clippy::cast_possible_truncation)]
                let i = self.resolve_index(scaled.floor() as i64, len);
                (i, i, 0.0)
            }
            FilterMode::Linear => {
                let s = scaled - 0.5;
                let base = s.floor();
                let frac = s - base;
                #[allow(clippy::cast_possible_truncation)]
                let i0 = base as i64;
                (
                    self.resolve_index(i0, len),
                    self.resolve_index(i0 + 1, len),
                    frac,
                )
            }
        }
    }
}
