//! Device rendering integration tests.
//!
//! These need a compute adapter (real or software). Each test prints a note
//! and returns early when no device can be created.

use volcast::render::wgpu::TextureFormat;
use volcast::*;

fn sphere_volume(n: u32, radius: f32) -> VolumeData {
    let c = (n as f32 - 1.0) * 0.5;
    VolumeData::from_fn(UVec3::splat(n), |x, y, z| {
        let d = Vec3::new(x as f32 - c, y as f32 - c, z as f32 - c).length();
        if d <= radius {
            1.0
        } else {
            0.0
        }
    })
    .expect("sphere volume")
}

fn front_camera() -> RenderParams {
    RenderParams::look_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::Y)
}

/// Creates a renderer, or `None` when this machine has no usable adapter.
fn renderer_or_skip(config: &RendererConfig) -> Option<Renderer> {
    match Renderer::new(config) {
        Ok(renderer) => Some(renderer),
        Err(e) if e.kind() == ErrorKind::NoCompatibleDevice => {
            eprintln!("Skipping device test: no compute adapter available ({e})");
            None
        }
        Err(e) => panic!("renderer creation failed: {e}"),
    }
}

fn sphere_renderer(width: u32, height: u32) -> Option<Renderer> {
    let mut renderer = renderer_or_skip(&RendererConfig::default().with_size(width, height))?;
    renderer
        .bind_volume(&sphere_volume(64, 8.0))
        .expect("bind volume");
    renderer
        .set_transfer_function(&TransferFunction::grayscale_ramp())
        .expect("set transfer function");
    Some(renderer)
}

#[test]
fn headless_sphere_center_lit_corners_background() {
    let Some(mut renderer) = sphere_renderer(128, 128) else {
        return;
    };

    let pixels = renderer.render(&front_camera()).expect("render");
    assert_eq!(pixels.len(), 128 * 128);

    let at = |x: usize, y: usize| pixels[y * 128 + x];
    assert_ne!(at(64, 64), 0, "center of the sphere should be lit");
    for (x, y) in [(0, 0), (127, 0), (0, 127), (127, 127)] {
        assert_eq!(at(x, y), 0, "corner ({x}, {y}) should be background");
    }
}

#[test]
fn headless_agrees_with_reference_on_coverage() {
    let Some(mut renderer) = sphere_renderer(64, 64) else {
        return;
    };
    let gpu = renderer.render(&front_camera()).expect("render");
    let cpu = render_reference(
        renderer.config(),
        &sphere_volume(64, 8.0),
        &TransferFunction::grayscale_ramp(),
        &front_camera(),
    )
    .expect("reference render");

    // Filtering precision differs between host and device, so only compare
    // pixels far from the silhouette.
    for (x, y) in [(32, 32), (0, 0), (63, 63), (8, 32), (32, 56)] {
        let i = y * 64 + x;
        assert_eq!(gpu[i] == 0, cpu[i] == 0, "coverage differs at ({x}, {y})");
    }
}

#[test]
fn headless_renders_are_bit_identical() {
    let Some(mut renderer) = sphere_renderer(96, 80) else {
        return;
    };
    let params = RenderParams::look_at(Vec3::new(2.0, 1.5, 3.0), Vec3::ZERO, Vec3::Y);
    let first = renderer.render(&params).expect("first render");
    let second = renderer.render(&params).expect("second render");
    assert_eq!(first, second);
}

#[test]
fn headless_resize_reallocates_target() {
    let Some(mut renderer) = sphere_renderer(32, 32) else {
        return;
    };
    assert!(!renderer.resize(32, 32).expect("same size"));
    assert!(renderer.resize(64, 48).expect("new size"));
    assert_eq!(renderer.size(), (64, 48));

    let pixels = renderer.render(&front_camera()).expect("render");
    assert_eq!(pixels.len(), 64 * 48);
    assert!(renderer.resize(0, 48).is_err());
}

#[test]
fn headless_target_starts_zeroed() {
    let Some(renderer) = renderer_or_skip(&RendererConfig::default().with_size(40, 30)) else {
        return;
    };
    let host = renderer.last_pixels();
    assert_eq!(host.len(), 40 * 30);
    assert!(host.iter().all(|&p| p == 0));
}

#[test]
fn headless_volume_readback_matches_upload() {
    let Some(mut renderer) = renderer_or_skip(&RendererConfig::default().with_size(8, 8)) else {
        return;
    };
    let dims = UVec3::new(5, 6, 7);
    let volume = VolumeData::from_fn(dims, |x, y, z| (x + 10 * y + 100 * z) as f32 / 700.0)
        .expect("volume");
    renderer.bind_volume(&volume).expect("bind volume");

    let read = renderer.read_volume().expect("read back");
    assert_eq!(read.len(), (dims.x * dims.y * dims.z) as usize);

    match renderer.volume_format() {
        TextureFormat::R32Float => assert_eq!(read, volume.voxels()),
        TextureFormat::R16Float => {
            for (got, want) in read.iter().zip(volume.voxels()) {
                assert!((got - want).abs() <= want.abs() * 1.0e-3 + 1.0e-4);
            }
        }
        other => panic!("unexpected volume format {other:?}"),
    }
}

#[test]
fn headless_render_without_inputs_is_missing_input() {
    let Some(mut renderer) = renderer_or_skip(&RendererConfig::default().with_size(16, 16)) else {
        return;
    };
    let err = renderer.render(&front_camera()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingInput);
    let err = renderer.read_volume().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingInput);

    // a volume alone is not enough
    renderer.bind_volume(&sphere_volume(8, 2.0)).expect("bind volume");
    let err = renderer.render(&front_camera()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingInput);
}

#[test]
fn headless_broken_kernel_reports_diagnostics() {
    let config = RendererConfig::default().with_size(8, 8);
    let template = KernelTemplate::from_source(
        "const S: f32 = {{ray_step_size}};\nconst N: u32 = {{ray_max_steps}};\nfn main( {",
    );
    match Renderer::with_template(&config, &template) {
        Ok(_) => panic!("broken kernel should not compile"),
        Err(e) if e.kind() == ErrorKind::NoCompatibleDevice => {
            eprintln!("Skipping device test: no compute adapter available ({e})");
        }
        Err(VolcastError::KernelCompilation { diagnostics }) => {
            assert!(!diagnostics.trim().is_empty());
        }
        Err(e) => panic!("unexpected error: {e}"),
    }
}

#[test]
fn headless_device_info_is_recorded() {
    let Some(renderer) = renderer_or_skip(&RendererConfig::default().with_size(4, 4)) else {
        return;
    };
    let info = renderer.device_info();
    assert!(!info.to_string().is_empty());
    assert_ne!(info.kind, DeviceKind::Accelerator);
}

#[test]
fn headless_configured_shading_applies_to_unset_params() {
    let mut config = RendererConfig::default().with_size(32, 32);
    config.shading.brightness = 0.0;
    let Some(mut renderer) = renderer_or_skip(&config) else {
        return;
    };
    renderer.bind_volume(&sphere_volume(32, 6.0)).expect("bind volume");
    renderer
        .set_transfer_function(&TransferFunction::grayscale_ramp())
        .expect("set transfer function");

    let dark = renderer.render(&front_camera()).expect("render");
    assert!(dark.iter().all(|&p| p & 0x00ff_ffff == 0));
    let configured = renderer.params(front_camera().inv_view_matrix);
    assert_eq!(configured.shading, Some(renderer.config().shading));
    assert_eq!(renderer.render(&configured).expect("render"), dark);

    let lit_params = front_camera().with_shading(ShadingParams::default());
    let lit = renderer.render(&lit_params).expect("render");
    assert_ne!(lit[16 * 32 + 16], 0);
}

#[test]
fn headless_render_to_png() {
    let Some(mut renderer) = sphere_renderer(32, 32) else {
        return;
    };
    let path = std::env::temp_dir().join("volcast_headless_sphere.png");
    renderer
        .render_to_file(&path, &front_camera())
        .expect("render to file");
    let bytes = std::fs::read(&path).expect("read png");
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    let _ = std::fs::remove_file(&path);
}
