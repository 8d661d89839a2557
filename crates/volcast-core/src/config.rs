//! Renderer configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::device::DevicePreference;
use crate::error::{Result, VolcastError};
use crate::params::{KernelConstants, ShadingParams};
use crate::sampling::SamplingPolicy;

/// Construction-time configuration for a renderer.
///
/// Every field has a default, so a partial JSON document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Which kind of compute device to look for first.
    pub device_preference: DevicePreference,

    /// Output image width in pixels.
    pub width: u32,

    /// Output image height in pixels.
    pub height: u32,

    /// Constants compiled into the kernel.
    pub kernel: KernelConstants,

    /// Shading scalars for renders whose [`RenderParams`](crate::RenderParams)
    /// leave shading unset.
    pub shading: ShadingParams,

    /// Sampling policy for the volume texture.
    pub volume_sampling: SamplingPolicy,

    /// Sampling policy for the transfer-function texture.
    pub transfer_sampling: SamplingPolicy,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            device_preference: DevicePreference::Gpu,
            width: 512,
            height: 512,
            kernel: KernelConstants::default(),
            shading: ShadingParams::default(),
            volume_sampling: SamplingPolicy::REPEAT_LINEAR,
            transfer_sampling: SamplingPolicy::CLAMP_LINEAR,
        }
    }
}

impl RendererConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("loaded renderer config from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    /// Serializes the configuration to pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Sets the output resolution.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the device preference.
    #[must_use]
    pub fn with_device_preference(mut self, preference: DevicePreference) -> Self {
        self.device_preference = preference;
        self
    }

    /// Checks resolution, kernel constants and shading.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(VolcastError::InvalidInput(format!(
                "render size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        self.kernel.validate()?;
        self.shading.validate()
    }
}
