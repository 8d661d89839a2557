//! Transfer-function lookup texture.
//!
//! Stored as an `N x 1` 2D texture: compute shaders can only sample 2D and
//! 3D textures with an explicit level.

use half::f16;
use volcast_core::TransferFunction;

use crate::context::ComputeContext;
use crate::error::{RenderError, RenderResult};
use crate::sampler::create_sampler;

/// A transfer function uploaded as a one-row RGBA texture.
pub struct TransferTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    len: u32,
}

impl TransferTexture {
    pub async fn new(ctx: &ComputeContext, transfer_function: &TransferFunction) -> RenderResult<Self> {
        let samples = transfer_function.samples();
        let max = ctx.limits().max_texture_dimension_2d;
        let len = u32::try_from(samples.len())
            .ok()
            .filter(|len| *len <= max)
            .ok_or_else(|| {
                RenderError::ResourceAllocation(format!(
                    "transfer function has {} samples, device 2D texture limit is {max}",
                    samples.len()
                ))
            })?;

        let size = wgpu::Extent3d {
            width: len,
            height: 1,
            depth_or_array_layers: 1,
        };

        ctx.push_error_scope();

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("transfer function texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba16Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let texels = encode_rgba16f(transfer_function);
        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&texels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(len * 8),
                rows_per_image: None,
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = create_sampler(
            &ctx.device,
            transfer_function.sampling(),
            Some("transfer function sampler"),
        );

        if let Some(err) = ctx.pop_error_scope().await {
            return Err(RenderError::ResourceAllocation(err.to_string()));
        }

        log::debug!("uploaded transfer function with {len} samples");

        Ok(Self {
            _texture: texture,
            view,
            sampler,
            len,
        })
    }

    /// Number of texels.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

fn encode_rgba16f(transfer_function: &TransferFunction) -> Vec<u16> {
    transfer_function
        .samples()
        .iter()
        .flat_map(|c| c.to_array().map(|v| f16::from_f32(v).to_bits()))
        .collect()
}
