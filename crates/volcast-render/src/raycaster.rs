//! Ray-casting kernel invocation.

use glam::Vec3;
use volcast_core::{KernelConstants, RenderParams, SamplingPolicy, TransferFunction, VolumeData};

use crate::buffer::{create_uniform_buffer, update_buffer};
use crate::context::ComputeContext;
use crate::error::{RenderError, RenderResult};
use crate::kernel::{KernelProgram, KernelTemplate, WORKGROUP_SIZE};
use crate::render_target::RenderTarget;
use crate::transfer_texture::TransferTexture;
use crate::volume_texture::VolumeTexture;

/// GPU-side per-render parameters.
///
/// Layout matches `RaycastUniforms` in the kernel template.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RaycastUniforms {
    pub inv_view: [[f32; 4]; 4],
    pub box_extent: [f32; 4],
    pub width: u32,
    pub height: u32,
    pub density: f32,
    pub brightness: f32,
    pub transfer_offset: f32,
    pub transfer_scale: f32,
    pub _pad: [f32; 2],
}

impl RaycastUniforms {
    #[must_use]
    pub fn new(params: &RenderParams, half_extent: Vec3, width: u32, height: u32) -> Self {
        let shading = params.shading_or_default();
        Self {
            inv_view: params.inv_view_matrix.to_cols_array_2d(),
            box_extent: half_extent.extend(0.0).to_array(),
            width,
            height,
            density: shading.density,
            brightness: shading.brightness,
            transfer_offset: shading.transfer_offset,
            transfer_scale: shading.transfer_scale,
            _pad: [0.0; 2],
        }
    }
}

impl Default for RaycastUniforms {
    fn default() -> Self {
        Self::new(&RenderParams::new(glam::Mat4::IDENTITY), Vec3::ONE, 1, 1)
    }
}

/// Number of 8x8 workgroups covering a `width x height` image.
#[must_use]
pub fn workgroup_count(width: u32, height: u32) -> (u32, u32) {
    (width.div_ceil(WORKGROUP_SIZE), height.div_ceil(WORKGROUP_SIZE))
}

/// Owns the compiled kernel, the bound inputs and the render target.
pub struct VolumeRaycaster {
    program: KernelProgram,
    target: RenderTarget,
    uniform_buffer: wgpu::Buffer,
    volume: Option<VolumeTexture>,
    volume_extent: Vec3,
    transfer: Option<TransferTexture>,
    volume_sampling: SamplingPolicy,
}

impl VolumeRaycaster {
    /// Compiles the kernel and allocates a `width x height` target.
    pub async fn new(
        ctx: &ComputeContext,
        template: &KernelTemplate,
        constants: &KernelConstants,
        volume_sampling: SamplingPolicy,
        width: u32,
        height: u32,
    ) -> RenderResult<Self> {
        let program = KernelProgram::compile(ctx, template, constants).await?;
        let target = RenderTarget::new(ctx, width, height)?;
        let uniform_buffer = create_uniform_buffer(
            &ctx.device,
            &RaycastUniforms::default(),
            Some("raycast uniforms"),
        );

        Ok(Self {
            program,
            target,
            uniform_buffer,
            volume: None,
            volume_extent: Vec3::ONE,
            transfer: None,
            volume_sampling,
        })
    }

    /// Uploads `volume`, replacing any previously bound one.
    pub async fn bind_volume(&mut self, ctx: &ComputeContext, volume: &VolumeData) -> RenderResult<()> {
        let texture = VolumeTexture::new(ctx, volume, self.volume_sampling).await?;
        self.volume = Some(texture);
        self.volume_extent = volume.normalized_half_extent();
        Ok(())
    }

    /// Uploads `transfer_function`, replacing any previously set one.
    pub async fn set_transfer_function(
        &mut self,
        ctx: &ComputeContext,
        transfer_function: &TransferFunction,
    ) -> RenderResult<()> {
        self.transfer = Some(TransferTexture::new(ctx, transfer_function).await?);
        Ok(())
    }

    /// Resizes the render target. Returns whether it was reallocated.
    pub fn resize(&mut self, ctx: &ComputeContext, width: u32, height: u32) -> RenderResult<bool> {
        self.target.ensure_size(ctx, width, height)
    }

    pub fn volume(&self) -> Option<&VolumeTexture> {
        self.volume.as_ref()
    }

    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    pub fn program(&self) -> &KernelProgram {
        &self.program
    }

    /// Queues one kernel launch. Does not wait for it.
    pub async fn dispatch(&self, ctx: &ComputeContext, params: &RenderParams) -> RenderResult<()> {
        let volume = self
            .volume
            .as_ref()
            .ok_or_else(|| RenderError::MissingInput("no volume bound".into()))?;
        let transfer = self
            .transfer
            .as_ref()
            .ok_or_else(|| RenderError::MissingInput("no transfer function set".into()))?;

        let (width, height) = (self.target.width(), self.target.height());

        let uniforms = RaycastUniforms::new(params, self.volume_extent, width, height);

        ctx.push_error_scope();

        update_buffer(&ctx.queue, &self.uniform_buffer, &[uniforms]);

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("raycast bind group"),
            layout: self.program.bind_group_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.target.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(volume.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(volume.sampler()),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(transfer.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(transfer.sampler()),
                },
            ],
        });

        let (groups_x, groups_y) = workgroup_count(width, height);
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("raycast encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("raycast pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(self.program.pipeline());
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        ctx.queue.submit(std::iter::once(encoder.finish()));

        if let Some(err) = ctx.pop_error_scope().await {
            return Err(RenderError::KernelDispatch(err.to_string()));
        }

        log::debug!("dispatched {groups_x}x{groups_y} workgroups for {width}x{height}");
        Ok(())
    }

    /// Dispatches, waits and returns a copy of the pixels.
    pub async fn render(&mut self, ctx: &ComputeContext, params: &RenderParams) -> RenderResult<Vec<u32>> {
        self.dispatch(ctx, params).await?;
        Ok(self.target.read_back(ctx)?.to_vec())
    }
}
