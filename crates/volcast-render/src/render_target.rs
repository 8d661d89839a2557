//! Output pixel storage on the device with a host mirror.

use crate::buffer::{create_storage_buffer, read_buffer};
use crate::context::ComputeContext;
use crate::error::{RenderError, RenderResult};

/// `width * height` packed pixels on the device, mirrored on the host.
pub struct RenderTarget {
    buffer: wgpu::Buffer,
    host: Vec<u32>,
    width: u32,
    height: u32,
}

impl RenderTarget {
    /// Allocates a zeroed target.
    pub fn new(ctx: &ComputeContext, width: u32, height: u32) -> RenderResult<Self> {
        let len = pixel_count(width, height)?;
        let max_bytes = ctx.limits().max_storage_buffer_binding_size;
        if len * 4 > max_bytes as usize {
            return Err(RenderError::ResourceAllocation(format!(
                "{width}x{height} target needs {} bytes, device storage binding limit is {max_bytes}",
                len * 4
            )));
        }

        let host = vec![0u32; len];
        let buffer = create_storage_buffer(&ctx.device, &host, Some("render target"));
        log::debug!("allocated {width}x{height} render target");

        Ok(Self {
            buffer,
            host,
            width,
            height,
        })
    }

    /// Reallocates the target if the size changed. Returns whether it did.
    pub fn ensure_size(&mut self, ctx: &ComputeContext, width: u32, height: u32) -> RenderResult<bool> {
        if self.width == width && self.height == height {
            return Ok(false);
        }
        *self = Self::new(ctx, width, height)?;
        Ok(true)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// The host mirror as of the last read-back (zeroes before the first).
    pub fn host_pixels(&self) -> &[u32] {
        &self.host
    }

    /// Element count of the device buffer.
    pub fn device_len(&self) -> usize {
        usize::try_from(self.buffer.size() / 4).unwrap_or(usize::MAX)
    }

    /// Waits for the queue, copies the device buffer into the host mirror
    /// and returns it.
    pub fn read_back(&mut self, ctx: &ComputeContext) -> RenderResult<&[u32]> {
        let bytes = read_buffer(ctx, &self.buffer)?;
        for (dst, src) in self.host.iter_mut().zip(bytes.chunks_exact(4)) {
            *dst = u32::from_le_bytes([src[0], src[1], src[2], src[3]]);
        }
        Ok(&self.host)
    }
}

fn pixel_count(width: u32, height: u32) -> RenderResult<usize> {
    if width == 0 || height == 0 {
        return Err(RenderError::ResourceAllocation(format!(
            "render target size must be non-zero, got {width}x{height}"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| RenderError::ResourceAllocation(format!("{width}x{height} overflows")))
}
