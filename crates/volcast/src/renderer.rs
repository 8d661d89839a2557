//! Blocking renderer facade.

use std::path::Path;

use pollster::FutureExt;
use volcast_core::{Mat4, RenderParams, RendererConfig, Result, TransferFunction, VolcastError, VolumeData};
use volcast_render::wgpu::TextureFormat;
use volcast_render::{save_packed_pixels, ComputeContext, DeviceInfo, KernelTemplate, VolumeRaycaster};

/// A volume renderer bound to one compute device.
///
/// Owns the device and queue, the compiled kernel, the render target and
/// the bound volume and transfer function. Every call blocks until the
/// device work it needs has finished.
pub struct Renderer {
    ctx: ComputeContext,
    raycaster: VolumeRaycaster,
    config: RendererConfig,
}

impl Renderer {
    /// Creates a renderer with the built-in ray-casting kernel.
    pub fn new(config: &RendererConfig) -> Result<Self> {
        Self::with_template(config, &KernelTemplate::raycast())
    }

    /// Creates a renderer compiling a caller-supplied kernel template.
    pub fn with_template(config: &RendererConfig, template: &KernelTemplate) -> Result<Self> {
        config.validate()?;

        let ctx = ComputeContext::new(config.device_preference).block_on()?;
        let raycaster = VolumeRaycaster::new(
            &ctx,
            template,
            &config.kernel,
            config.volume_sampling,
            config.width,
            config.height,
        )
        .block_on()?;

        log::info!(
            "renderer ready on {} at {}x{}",
            ctx.info(),
            config.width,
            config.height
        );

        Ok(Self {
            ctx,
            raycaster,
            config: config.clone(),
        })
    }

    /// Uploads a volume, replacing the previous one.
    pub fn bind_volume(&mut self, volume: &VolumeData) -> Result<()> {
        self.raycaster.bind_volume(&self.ctx, volume).block_on()?;
        Ok(())
    }

    /// Uploads a transfer function.
    ///
    /// Lookups use `config.transfer_sampling`; a policy set on
    /// `transfer_function` with [`TransferFunction::with_sampling`] is
    /// replaced.
    pub fn set_transfer_function(&mut self, transfer_function: &TransferFunction) -> Result<()> {
        let transfer_function = transfer_function
            .clone()
            .with_sampling(self.config.transfer_sampling);
        self.raycaster
            .set_transfer_function(&self.ctx, &transfer_function)
            .block_on()?;
        Ok(())
    }

    /// Changes the output resolution. Returns whether the target was
    /// reallocated.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<bool> {
        if width == 0 || height == 0 {
            return Err(VolcastError::InvalidInput(format!(
                "render size must be non-zero, got {width}x{height}"
            )));
        }
        let reallocated = self.raycaster.resize(&self.ctx, width, height)?;
        self.config.width = width;
        self.config.height = height;
        Ok(reallocated)
    }

    /// Current output resolution.
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Renders one image and returns its packed pixels, row-major from the
    /// top-left.
    ///
    /// Unset shading in `params` is taken from the config.
    pub fn render(&mut self, params: &RenderParams) -> Result<Vec<u32>> {
        let params = params.or_shading(self.config.shading);
        params.validate()?;
        Ok(self.raycaster.render(&self.ctx, &params).block_on()?)
    }

    /// Render parameters for `inv_view_matrix` with the configured shading.
    pub fn params(&self, inv_view_matrix: Mat4) -> RenderParams {
        RenderParams::new(inv_view_matrix).with_shading(self.config.shading)
    }

    /// Renders one image and writes it to `path` (PNG or JPEG).
    pub fn render_to_file(&mut self, path: impl AsRef<Path>, params: &RenderParams) -> Result<()> {
        let pixels = self.render(params)?;
        let (width, height) = self.size();
        save_packed_pixels(path, &pixels, width, height)
            .map_err(|e| VolcastError::from(volcast_render::RenderError::from(e)))
    }

    /// The adapter this renderer runs on.
    pub fn device_info(&self) -> &DeviceInfo {
        self.ctx.info()
    }

    /// Texel format volumes are stored in on this device.
    pub fn volume_format(&self) -> TextureFormat {
        self.ctx.volume_format()
    }

    /// Reads the bound volume back from the device.
    pub fn read_volume(&self) -> Result<Vec<f32>> {
        let volume = self
            .raycaster
            .volume()
            .ok_or_else(|| VolcastError::MissingInput("no volume bound".into()))?;
        Ok(volume.read_back(&self.ctx).block_on()?)
    }

    /// The host mirror of the render target as of the last render.
    pub fn last_pixels(&self) -> &[u32] {
        self.raycaster.target().host_pixels()
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn context(&self) -> &ComputeContext {
        &self.ctx
    }
}
