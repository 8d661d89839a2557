//! Sampler creation from host-side sampling policies.

use volcast_core::{AddressMode, FilterMode, SamplingPolicy};

#[must_use]
pub fn address_mode(mode: AddressMode) -> wgpu::AddressMode {
    match mode {
        AddressMode::Repeat => wgpu::AddressMode::Repeat,
        AddressMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
    }
}

#[must_use]
pub fn filter_mode(mode: FilterMode) -> wgpu::FilterMode {
    match mode {
        FilterMode::Linear => wgpu::FilterMode::Linear,
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
    }
}

/// Creates a sampler that addresses and filters the way `policy` says on
/// every axis.
pub fn create_sampler(
    device: &wgpu::Device,
    policy: SamplingPolicy,
    label: Option<&str>,
) -> wgpu::Sampler {
    let address = address_mode(policy.address);
    let filter = filter_mode(policy.filter);
    device.create_sampler(&wgpu::SamplerDescriptor {
        label,
        address_mode_u: address,
        address_mode_v: address,
        address_mode_w: address,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}
