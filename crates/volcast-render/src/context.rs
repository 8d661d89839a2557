//! Compute device discovery and the per-renderer device/queue pair.

use volcast_core::{select_device, DeviceKind, DevicePreference, DeviceSelection};

use crate::error::{RenderError, RenderResult};

/// Description of the adapter a context was created on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub kind: DeviceKind,
    pub backend: wgpu::Backend,
}

impl std::fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, {:?})", self.name, self.kind, self.backend)
    }
}

/// Maps a wgpu adapter type onto the device kinds callers select by.
#[must_use]
pub fn device_kind(device_type: wgpu::DeviceType) -> DeviceKind {
    match device_type {
        wgpu::DeviceType::DiscreteGpu
        | wgpu::DeviceType::IntegratedGpu
        | wgpu::DeviceType::VirtualGpu => DeviceKind::Gpu,
        wgpu::DeviceType::Cpu => DeviceKind::Cpu,
        wgpu::DeviceType::Other => DeviceKind::Other,
    }
}

/// Texel format used for volume textures on a device with `features`.
///
/// 32-bit float textures are only filterable behind a feature flag; without
/// it volumes are stored as 16-bit floats.
#[must_use]
pub fn volume_format_for(features: wgpu::Features) -> wgpu::TextureFormat {
    if features.contains(wgpu::Features::FLOAT32_FILTERABLE) {
        wgpu::TextureFormat::R32Float
    } else {
        wgpu::TextureFormat::R16Float
    }
}

/// One device and one queue, chosen once and owned by a renderer.
pub struct ComputeContext {
    /// The wgpu device.
    pub device: wgpu::Device,
    /// The wgpu queue. All uploads and dispatches go through it in order.
    pub queue: wgpu::Queue,
    info: DeviceInfo,
    limits: wgpu::Limits,
    volume_format: wgpu::TextureFormat,
}

impl ComputeContext {
    /// Selects an adapter for `preference` and creates its device and queue.
    pub async fn new(preference: DevicePreference) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let adapter = Self::pick_adapter(&instance, preference).await?;
        Self::from_adapter(&adapter).await
    }

    async fn pick_adapter(
        instance: &wgpu::Instance,
        preference: DevicePreference,
    ) -> RenderResult<wgpu::Adapter> {
        let mut adapters = instance.enumerate_adapters(wgpu::Backends::all());
        let kinds: Vec<DeviceKind> = adapters
            .iter()
            .map(|a| device_kind(a.get_info().device_type))
            .collect();
        log::debug!("enumerated {} adapter(s): {:?}", adapters.len(), kinds);

        match select_device(kinds.iter().copied(), preference) {
            DeviceSelection::Matched(index) => return Ok(adapters.swap_remove(index)),
            DeviceSelection::Fallback => {
                if let Some(kind) = preference.wanted_kind() {
                    log::warn!("no {kind} adapter found, falling back to the default adapter");
                }
            }
        }

        if let Some(adapter) = wgpu::util::initialize_adapter_from_env_or_default(instance, None).await {
            return Ok(adapter);
        }

        if adapters.is_empty() {
            return Err(RenderError::NoCompatibleDevice(
                "no adapters reported by any backend".into(),
            ));
        }
        log::warn!("backend offered no default adapter, using the first enumerated one");
        Ok(adapters.swap_remove(0))
    }

    async fn from_adapter(adapter: &wgpu::Adapter) -> RenderResult<Self> {
        let adapter_info = adapter.get_info();
        let info = DeviceInfo {
            name: adapter_info.name.clone(),
            kind: device_kind(adapter_info.device_type),
            backend: adapter_info.backend,
        };

        let volume_format = volume_format_for(adapter.features());
        let required_features = if volume_format == wgpu::TextureFormat::R32Float {
            wgpu::Features::FLOAT32_FILTERABLE
        } else {
            wgpu::Features::empty()
        };
        let limits = adapter.limits();

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("volcast device"),
                    required_features,
                    required_limits: limits.clone(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        log::info!("using compute device {info}, volume texels {volume_format:?}");

        Ok(Self {
            device,
            queue,
            info,
            limits,
            volume_format,
        })
    }

    /// The adapter this context runs on.
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Limits the device was created with.
    pub fn limits(&self) -> &wgpu::Limits {
        &self.limits
    }

    /// Texel format for volume textures on this device.
    pub fn volume_format(&self) -> wgpu::TextureFormat {
        self.volume_format
    }

    /// Blocks until all submitted work on the queue has finished.
    pub fn synchronize(&self) {
        let _ = self.device.poll(wgpu::Maintain::Wait);
    }

    /// Starts capturing validation and out-of-memory errors.
    pub(crate) fn push_error_scope(&self) {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
    }

    /// Ends a capture started with [`Self::push_error_scope`].
    pub(crate) async fn pop_error_scope(&self) -> Option<wgpu::Error> {
        let validation = self.device.pop_error_scope().await;
        let out_of_memory = self.device.pop_error_scope().await;
        validation.or(out_of_memory)
    }
}
