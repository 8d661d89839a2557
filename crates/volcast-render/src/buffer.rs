//! GPU buffer helpers.

use wgpu::util::DeviceExt;

use crate::context::ComputeContext;
use crate::error::{RenderError, RenderResult};

/// Creates a uniform buffer from data.
pub fn create_uniform_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    data: &T,
    label: Option<&str>,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label,
        contents: bytemuck::bytes_of(data),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

/// Creates a storage buffer from data that can also be copied out.
pub fn create_storage_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    data: &[T],
    label: Option<&str>,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label,
        contents: bytemuck::cast_slice(data),
        usage: wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_DST
            | wgpu::BufferUsages::COPY_SRC,
    })
}

/// Updates a buffer with new data.
pub fn update_buffer<T: bytemuck::Pod>(queue: &wgpu::Queue, buffer: &wgpu::Buffer, data: &[T]) {
    queue.write_buffer(buffer, 0, bytemuck::cast_slice(data));
}

/// Rounds a row of `row_bytes` up to the alignment texture copies require.
#[must_use]
pub fn aligned_bytes_per_row(row_bytes: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    row_bytes.div_ceil(align) * align
}

/// Creates a mappable buffer for reading `size` bytes back to the host.
pub fn create_staging_buffer(device: &wgpu::Device, size: u64, label: Option<&str>) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label,
        size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Maps a staging buffer, waits for the queue and copies its contents out.
///
/// The copy into `staging` must already have been submitted.
pub fn read_staging_buffer(ctx: &ComputeContext, staging: &wgpu::Buffer) -> RenderResult<Vec<u8>> {
    let slice = staging.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    ctx.synchronize();
    rx.recv()
        .map_err(|_| RenderError::BufferMapFailed)?
        .map_err(|_| RenderError::BufferMapFailed)?;

    let data = slice.get_mapped_range().to_vec();
    staging.unmap();
    Ok(data)
}

/// Copies a whole storage buffer to the host.
pub fn read_buffer(ctx: &ComputeContext, buffer: &wgpu::Buffer) -> RenderResult<Vec<u8>> {
    let staging = create_staging_buffer(&ctx.device, buffer.size(), Some("readback staging"));

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("readback encoder"),
        });
    encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, buffer.size());
    ctx.queue.submit(std::iter::once(encoder.finish()));

    read_staging_buffer(ctx, &staging)
}
