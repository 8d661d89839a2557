//! Compute device classification and selection policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VolcastError;

/// Kind of compute device reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Discrete, integrated or virtual GPU.
    Gpu,
    /// Software rasterizer / CPU implementation.
    Cpu,
    /// Dedicated accelerator.
    Accelerator,
    /// Anything the backend cannot classify.
    Other,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceKind::Gpu => "GPU",
            DeviceKind::Cpu => "CPU",
            DeviceKind::Accelerator => "Accelerator",
            DeviceKind::Other => "Other",
        };
        f.write_str(name)
    }
}

/// Which kind of device the renderer should try to run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DevicePreference {
    /// First GPU in enumeration order.
    #[default]
    Gpu,
    /// First CPU device in enumeration order.
    Cpu,
    /// First accelerator in enumeration order.
    Accelerator,
    /// Skip the scan and let the environment decide.
    Default,
}

impl DevicePreference {
    /// Returns the device kind this preference asks for, if any.
    #[must_use]
    pub fn wanted_kind(self) -> Option<DeviceKind> {
        match self {
            DevicePreference::Gpu => Some(DeviceKind::Gpu),
            DevicePreference::Cpu => Some(DeviceKind::Cpu),
            DevicePreference::Accelerator => Some(DeviceKind::Accelerator),
            DevicePreference::Default => None,
        }
    }
}

impl FromStr for DevicePreference {
    type Err = VolcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gpu" => Ok(DevicePreference::Gpu),
            "cpu" => Ok(DevicePreference::Cpu),
            "accelerator" => Ok(DevicePreference::Accelerator),
            "default" | "" => Ok(DevicePreference::Default),
            other => Err(VolcastError::InvalidInput(format!(
                "unknown device preference '{other}'"
            ))),
        }
    }
}

/// Outcome of [`select_device`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceSelection {
    /// Index of the first enumerated device matching the preference.
    Matched(usize),
    /// Nothing matched; the caller must use the environment default.
    Fallback,
}

/// Picks a device out of an enumeration.
///
/// Linear scan, first match wins. Two devices of the same kind resolve to
/// whichever the backend enumerated first; there is no further tie-break.
pub fn select_device<I>(kinds: I, preference: DevicePreference) -> DeviceSelection
where
    I: IntoIterator<Item = DeviceKind>,
{
    let Some(wanted) = preference.wanted_kind() else {
        return DeviceSelection::Fallback;
    };

    kinds
        .into_iter()
        .position(|kind| kind == wanted)
        .map_or(DeviceSelection::Fallback, DeviceSelection::Matched)
}
