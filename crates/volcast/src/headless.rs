//! One-shot rendering helpers.
//!
//! Each call creates a renderer, renders a single image and drops every
//! device resource before returning. Useful for batch jobs and tests.

use std::path::Path;

use volcast_core::{
    ReferenceRaymarcher, RenderParams, RendererConfig, Result, TransferFunction, VolumeData,
};

use crate::renderer::Renderer;

/// Renders `volume` once on the configured device.
///
/// # Example
/// ```no_run
/// use volcast::*;
///
/// let volume = VolumeData::from_fn(UVec3::splat(32), |x, _, _| x as f32 / 31.0).unwrap();
/// let params = RenderParams::look_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::Y);
/// let config = RendererConfig::default().with_size(256, 256);
/// let pixels = render_volume(&config, &volume, &TransferFunction::grayscale_ramp(), &params).unwrap();
/// assert_eq!(pixels.len(), 256 * 256);
/// ```
pub fn render_volume(
    config: &RendererConfig,
    volume: &VolumeData,
    transfer_function: &TransferFunction,
    params: &RenderParams,
) -> Result<Vec<u32>> {
    let mut renderer = Renderer::new(config)?;
    renderer.bind_volume(volume)?;
    renderer.set_transfer_function(transfer_function)?;
    renderer.render(params)
}

/// Renders `volume` once and writes the image to `path`.
pub fn render_volume_to_file(
    path: impl AsRef<Path>,
    config: &RendererConfig,
    volume: &VolumeData,
    transfer_function: &TransferFunction,
    params: &RenderParams,
) -> Result<()> {
    let mut renderer = Renderer::new(config)?;
    renderer.bind_volume(volume)?;
    renderer.set_transfer_function(transfer_function)?;
    renderer.render_to_file(path, params)
}

/// Renders `volume` on the host with the same algorithm and settings as the
/// device kernel. Needs no GPU.
///
/// Unset shading in `params` is taken from `config`, as [`Renderer::render`]
/// does. Transfer lookups use `config.transfer_sampling`, replacing the
/// transfer function's own policy.
pub fn render_reference(
    config: &RendererConfig,
    volume: &VolumeData,
    transfer_function: &TransferFunction,
    params: &RenderParams,
) -> Result<Vec<u32>> {
    config.validate()?;
    let transfer_function = transfer_function
        .clone()
        .with_sampling(config.transfer_sampling);
    let params = params.or_shading(config.shading);
    ReferenceRaymarcher::new(config.kernel, config.volume_sampling).render(
        volume,
        &transfer_function,
        &params,
        config.width,
        config.height,
    )
}
