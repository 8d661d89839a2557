//! Transfer functions: scalar intensity to color and opacity.

use glam::{Vec3, Vec4};

use crate::error::{Result, VolcastError};
use crate::sampling::SamplingPolicy;

/// Number of samples control-point transfer functions are resampled to.
pub const TRANSFER_FUNCTION_RESOLUTION: usize = 256;

/// A transfer function mapping normalized intensity to straight
/// (non-premultiplied) RGBA.
///
/// Samples are evenly spaced over `[0, 1]` and sampled with texel-center
/// conventions, the same way the GPU texture built from them is.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    samples: Vec<Vec4>,
    sampling: SamplingPolicy,
}

impl TransferFunction {
    /// Creates a transfer function from RGBA samples.
    pub fn new(samples: Vec<Vec4>) -> Result<Self> {
        if samples.is_empty() {
            return Err(VolcastError::InvalidInput(
                "transfer function needs at least one sample".into(),
            ));
        }
        if samples.iter().any(|s| !s.is_finite()) {
            return Err(VolcastError::InvalidInput(
                "transfer function samples must be finite".into(),
            ));
        }
        Ok(Self {
            samples,
            sampling: SamplingPolicy::CLAMP_LINEAR,
        })
    }

    /// Builds a transfer function from `(position, rgba)` control points,
    /// linearly interpolated and resampled to [`TRANSFER_FUNCTION_RESOLUTION`].
    ///
    /// Positions must lie in `[0, 1]`; they are sorted before use.
    pub fn from_control_points(points: &[(f32, Vec4)]) -> Result<Self> {
        if points.is_empty() {
            return Err(VolcastError::InvalidInput(
                "transfer function needs at least one control point".into(),
            ));
        }
        if points.iter().any(|(p, _)| !(0.0..=1.0).contains(p)) {
            return Err(VolcastError::InvalidInput(
                "control point positions must lie in [0, 1]".into(),
            ));
        }

        let mut points = points.to_vec();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));

        let samples = (0..TRANSFER_FUNCTION_RESOLUTION)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let t = i as f32 / (TRANSFER_FUNCTION_RESOLUTION - 1) as f32;
                interpolate_control_points(&points, t)
            })
            .collect();

        Self::new(samples)
    }

    /// Grayscale ramp where color and opacity both equal the intensity.
    pub fn grayscale_ramp() -> Self {
        let samples = (0..TRANSFER_FUNCTION_RESOLUTION)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let t = i as f32 / (TRANSFER_FUNCTION_RESOLUTION - 1) as f32;
                Vec4::splat(t)
            })
            .collect();
        Self {
            samples,
            sampling: SamplingPolicy::CLAMP_LINEAR,
        }
    }

    /// Builds a transfer function from evenly spaced RGB colors (a color map)
    /// with opacity rising linearly from 0 to 1.
    pub fn from_colors(colors: &[Vec3]) -> Result<Self> {
        if colors.is_empty() {
            return Err(VolcastError::InvalidInput("color list is empty".into()));
        }
        let n = colors.len();
        let points: Vec<(f32, Vec4)> = colors
            .iter()
            .enumerate()
            .map(|(i, c)| {
                #[allow(clippy::cast_precision_loss)]
                let t = if n == 1 { 0.0 } else { i as f32 / (n - 1) as f32 };
                (t, c.extend(t))
            })
            .collect();
        Self::from_control_points(&points)
    }

    /// Overrides the sampling policy used for lookups.
    ///
    /// The `volcast` renderer replaces this with its configured
    /// `transfer_sampling` when the function is uploaded.
    #[must_use]
    pub fn with_sampling(mut self, sampling: SamplingPolicy) -> Self {
        self.sampling = sampling;
        self
    }

    /// The RGBA samples.
    pub fn samples(&self) -> &[Vec4] {
        &self.samples
    }

    /// Sampling policy used for lookups.
    pub fn sampling(&self) -> SamplingPolicy {
        self.sampling
    }

    /// Looks up the transfer function at a normalized coordinate.
    pub fn sample(&self, t: f32) -> Vec4 {
        if self.samples.len() == 1 {
            return self.samples[0];
        }
        #[allow(clippy::cast_possible_truncation)]
        let len = self.samples.len() as u32;
        let (i0, i1, w) = self.sampling.texel_pair(t, len);
        self.samples[i0 as usize].lerp(self.samples[i1 as usize], w)
    }
}

fn interpolate_control_points(points: &[(f32, Vec4)], t: f32) -> Vec4 {
    let first = points[0];
    let last = points[points.len() - 1];
    if t <= first.0 {
        return first.1;
    }
    if t >= last.0 {
        return last.1;
    }
    for pair in points.windows(2) {
        let (p0, c0) = pair[0];
        let (p1, c1) = pair[1];
        if t >= p0 && t <= p1 {
            let span = p1 - p0;
            if span <= f32::EPSILON {
                return c1;
            }
            return c0.lerp(c1, (t - p0) / span);
        }
    }
    last.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty() {
        assert!(TransferFunction::new(vec![]).is_err());
        assert!(TransferFunction::from_control_points(&[]).is_err());
        assert!(TransferFunction::from_colors(&[]).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_positions() {
        assert!(TransferFunction::from_control_points(&[(1.5, Vec4::ONE)]).is_err());
    }

    #[test]
    fn test_single_sample_is_constant() {
        let tf = TransferFunction::new(vec![Vec4::new(1.0, 0.0, 0.0, 0.5)]).unwrap();
        assert_eq!(tf.sample(0.0), Vec4::new(1.0, 0.0, 0.0, 0.5));
        assert_eq!(tf.sample(0.7), Vec4::new(1.0, 0.0, 0.0, 0.5));
    }

    #[test]
    fn test_grayscale_ramp_endpoints() {
        let tf = TransferFunction::grayscale_ramp();
        assert_eq!(tf.sample(0.0), Vec4::ZERO);
        assert_eq!(tf.sample(1.0), Vec4::ONE);
        // clamped beyond the ends
        assert_eq!(tf.sample(-2.0), Vec4::ZERO);
        assert_eq!(tf.sample(3.0), Vec4::ONE);
    }

    #[test]
    fn test_control_points_are_sorted() {
        let tf = TransferFunction::from_control_points(&[
            (1.0, Vec4::ONE),
            (0.0, Vec4::ZERO),
        ])
        .unwrap();
        assert_eq!(tf.samples()[0], Vec4::ZERO);
        assert_eq!(tf.samples()[TRANSFER_FUNCTION_RESOLUTION - 1], Vec4::ONE);
        let mid = tf.sample(0.5);
        assert!((mid.w - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_from_colors_alpha_ramp() {
        let tf = TransferFunction::from_colors(&[Vec3::X, Vec3::Z]).unwrap();
        let lo = tf.samples()[0];
        let hi = tf.samples()[TRANSFER_FUNCTION_RESOLUTION - 1];
        assert_eq!(lo, Vec4::new(1.0, 0.0, 0.0, 0.0));
        assert_eq!(hi, Vec4::new(0.0, 0.0, 1.0, 1.0));
    }
}
