//! Volume upload: a 3D single-channel float texture and its sampler.

use glam::UVec3;
use half::f16;
use volcast_core::{SamplingPolicy, VolumeData};

use crate::buffer::{aligned_bytes_per_row, create_staging_buffer, read_staging_buffer};
use crate::context::ComputeContext;
use crate::error::{RenderError, RenderResult};
use crate::sampler::create_sampler;

/// A volume resident on the device.
pub struct VolumeTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    dims: UVec3,
    format: wgpu::TextureFormat,
}

impl VolumeTexture {
    /// Creates the texture, queues the voxel upload and creates the sampler.
    ///
    /// The upload is ordered before any later submission on the same queue.
    pub async fn new(
        ctx: &ComputeContext,
        volume: &VolumeData,
        sampling: SamplingPolicy,
    ) -> RenderResult<Self> {
        let dims = volume.dims();
        let max = ctx.limits().max_texture_dimension_3d;
        if dims.max_element() > max {
            return Err(RenderError::ResourceAllocation(format!(
                "volume {}x{}x{} exceeds the device 3D texture limit of {max}",
                dims.x, dims.y, dims.z
            )));
        }

        let format = ctx.volume_format();
        let size = extent(dims);

        ctx.push_error_scope();

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("volume texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D3,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let texels = encode_texels(volume.voxels(), format);
        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &texels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(dims.x * bytes_per_texel(format)),
                rows_per_image: Some(dims.y),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = create_sampler(&ctx.device, sampling, Some("volume sampler"));

        if let Some(err) = ctx.pop_error_scope().await {
            return Err(RenderError::ResourceAllocation(err.to_string()));
        }

        log::debug!(
            "uploaded volume {}x{}x{} as {format:?} ({} bytes)",
            dims.x,
            dims.y,
            dims.z,
            texels.len()
        );

        Ok(Self {
            texture,
            view,
            sampler,
            dims,
            format,
        })
    }

    /// Dimensions in voxels.
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    /// Texel format the voxels are stored in.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Reads every voxel back to the host, x-fastest.
    ///
    /// Waits for all queued work, including the upload. Fails with
    /// [`RenderError::ResourceAllocation`] when the staging copy would exceed
    /// the device's buffer size limit.
    pub async fn read_back(&self, ctx: &ComputeContext) -> RenderResult<Vec<f32>> {
        let layout = ReadbackLayout::new(self.dims, self.format);
        layout.check_fits(ctx.limits().max_buffer_size)?;

        ctx.push_error_scope();

        let staging = create_staging_buffer(
            &ctx.device,
            layout.staging_size(),
            Some("volume readback staging"),
        );

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("volume readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(layout.padded_row),
                    rows_per_image: Some(self.dims.y),
                },
            },
            extent(self.dims),
        );
        ctx.queue.submit(std::iter::once(encoder.finish()));

        if let Some(err) = ctx.pop_error_scope().await {
            return Err(RenderError::ResourceAllocation(err.to_string()));
        }

        let data = read_staging_buffer(ctx, &staging)?;

        let row_bytes = layout.row_bytes as usize;
        let padded_row = layout.padded_row as usize;
        let mut packed = Vec::with_capacity(row_bytes * layout.rows as usize);
        for row in data.chunks_exact(padded_row) {
            packed.extend_from_slice(&row[..row_bytes]);
        }
        Ok(decode_texels(&packed, self.format))
    }
}

/// Row layout of a texture-to-buffer copy of a whole volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReadbackLayout {
    row_bytes: u32,
    padded_row: u32,
    rows: u64,
}

impl ReadbackLayout {
    fn new(dims: UVec3, format: wgpu::TextureFormat) -> Self {
        let row_bytes = dims.x * bytes_per_texel(format);
        Self {
            row_bytes,
            padded_row: aligned_bytes_per_row(row_bytes),
            rows: u64::from(dims.y) * u64::from(dims.z),
        }
    }

    fn staging_size(&self) -> u64 {
        u64::from(self.padded_row) * self.rows
    }

    fn check_fits(&self, max_buffer_size: u64) -> RenderResult<()> {
        if self.staging_size() > max_buffer_size {
            return Err(RenderError::ResourceAllocation(format!(
                "volume readback needs a {} byte staging buffer, device limit is {max_buffer_size}",
                self.staging_size()
            )));
        }
        Ok(())
    }
}

fn extent(dims: UVec3) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: dims.x,
        height: dims.y,
        depth_or_array_layers: dims.z,
    }
}

fn bytes_per_texel(format: wgpu::TextureFormat) -> u32 {
    match format {
        wgpu::TextureFormat::R16Float => 2,
        _ => 4,
    }
}

/// Converts voxels to the byte layout of `format`.
pub(crate) fn encode_texels(voxels: &[f32], format: wgpu::TextureFormat) -> Vec<u8> {
    match format {
        wgpu::TextureFormat::R16Float => {
            let halves: Vec<u16> = voxels.iter().map(|v| f16::from_f32(*v).to_bits()).collect();
            bytemuck::cast_slice(&halves).to_vec()
        }
        _ => bytemuck::cast_slice(voxels).to_vec(),
    }
}

/// Inverse of [`encode_texels`].
pub(crate) fn decode_texels(bytes: &[u8], format: wgpu::TextureFormat) -> Vec<f32> {
    match format {
        wgpu::TextureFormat::R16Float => bytes
            .chunks_exact(2)
            .map(|b| f16::from_le_bytes([b[0], b[1]]).to_f32())
            .collect(),
        _ => bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
    }
}
