//! Host-side integration tests: configuration, errors, device selection
//! policy and the reference renderer. None of these need a GPU.

use proptest::prelude::*;
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

#[test]
fn test_init_logging_is_idempotent() {
    init_logging();
    init_logging();
}

#[test]
fn test_config_from_file() {
    let path = std::env::temp_dir().join("volcast_basics_config.json");
    let json = serde_json::json!({
        "device_preference": "Cpu",
        "width": 200,
        "height": 100,
        "kernel": { "ray_step_size": 0.02 },
        "shading": { "brightness": 1.5 },
        "volume_sampling": { "address": "ClampToEdge", "filter": "Nearest" }
    });
    std::fs::write(&path, json.to_string()).expect("write config");

    let config = RendererConfig::from_path(&path).expect("load config");
    assert_eq!(config.device_preference, DevicePreference::Cpu);
    assert_eq!((config.width, config.height), (200, 100));
    assert_eq!(config.kernel.ray_step_size, 0.02);
    assert_eq!(config.kernel.ray_max_steps, 500);
    assert_eq!(config.shading.brightness, 1.5);
    assert_eq!(config.shading.density, 1.0);
    assert_eq!(config.volume_sampling.address, AddressMode::ClampToEdge);
    assert_eq!(config.volume_sampling.filter, FilterMode::Nearest);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_config_errors_are_classified() {
    let missing = RendererConfig::from_path("/nonexistent/volcast/config.json").unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::Io);

    let malformed = RendererConfig::from_json_str("{ width: ").unwrap_err();
    assert_eq!(malformed.kind(), ErrorKind::InvalidInput);

    let bad_kernel =
        RendererConfig::from_json_str(r#"{ "kernel": { "ray_max_steps": 0 } }"#).unwrap_err();
    assert_eq!(bad_kernel.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_device_preference_parsing() {
    assert_eq!("GPU".parse::<DevicePreference>().unwrap(), DevicePreference::Gpu);
    assert_eq!("cpu".parse::<DevicePreference>().unwrap(), DevicePreference::Cpu);
    assert_eq!(
        "Accelerator".parse::<DevicePreference>().unwrap(),
        DevicePreference::Accelerator
    );
    assert_eq!("default".parse::<DevicePreference>().unwrap(), DevicePreference::Default);
    assert!("tpu".parse::<DevicePreference>().is_err());
}

#[test]
fn test_volume_size_mismatch() {
    let err = VolumeData::new(UVec3::new(4, 4, 4), vec![0.0; 63]).unwrap_err();
    assert!(matches!(
        err,
        VolcastError::SizeMismatch {
            expected: 64,
            actual: 63
        }
    ));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_reference_sphere_scenario() {
    let config = RendererConfig::default().with_size(128, 128);
    let params = RenderParams::look_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::Y);
    let pixels = render_reference(
        &config,
        &sphere_volume(64, 8.0),
        &TransferFunction::grayscale_ramp(),
        &params,
    )
    .expect("reference render");

    assert_eq!(pixels.len(), 128 * 128);
    assert_ne!(pixels[64 * 128 + 64], 0);
    for i in [0, 127, 127 * 128, 128 * 128 - 1] {
        assert_eq!(pixels[i], 0);
    }

    let again = render_reference(
        &config,
        &sphere_volume(64, 8.0),
        &TransferFunction::grayscale_ramp(),
        &params,
    )
    .expect("reference render");
    assert_eq!(pixels, again);
}

#[test]
fn test_reference_rejects_bad_matrix() {
    let config = RendererConfig::default().with_size(8, 8);
    let err = render_reference(
        &config,
        &sphere_volume(8, 2.0),
        &TransferFunction::grayscale_ramp(),
        &RenderParams::new(Mat4::ZERO),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_reference_image_export() {
    let config = RendererConfig::default().with_size(24, 16);
    let params = RenderParams::look_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::Y);
    let pixels = render_reference(
        &config,
        &sphere_volume(16, 4.0),
        &TransferFunction::grayscale_ramp(),
        &params,
    )
    .expect("reference render");
    let png = encode_png(&pixels, 24, 16).expect("encode");
    assert_eq!(&png[..4], b"\x89PNG");
}

fn front_camera() -> RenderParams {
    RenderParams::look_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::Y)
}

fn lit_count(pixels: &[u32]) -> usize {
    pixels.iter().filter(|&&p| p != 0).count()
}

#[test]
fn test_reference_uses_configured_shading() {
    let volume = VolumeData::new(UVec3::splat(8), vec![0.8; 512]).expect("volume");
    let tf = TransferFunction::grayscale_ramp();

    let lit_config = RendererConfig::default().with_size(8, 8);
    let lit = render_reference(&lit_config, &volume, &tf, &front_camera()).expect("lit render");
    assert!(lit_count(&lit) > 0);

    let mut dark_config = lit_config.clone();
    dark_config.shading = ShadingParams {
        density: 0.0,
        brightness: 0.0,
        ..Default::default()
    };
    let dark = render_reference(&dark_config, &volume, &tf, &front_camera()).expect("dark render");
    assert_eq!(lit_count(&dark), 0);

    // shading set on the params wins over the config
    let explicit = front_camera().with_shading(ShadingParams::default());
    let overridden = render_reference(&dark_config, &volume, &tf, &explicit).expect("render");
    assert_eq!(overridden, lit);
}

#[test]
fn test_reference_transfer_sampling_comes_from_config() {
    let volume = sphere_volume(16, 5.0);
    let config = RendererConfig::default().with_size(16, 16);
    let ramp = TransferFunction::grayscale_ramp();
    let nearest = ramp.clone().with_sampling(SamplingPolicy {
        address: AddressMode::Repeat,
        filter: FilterMode::Nearest,
    });

    let a = render_reference(&config, &volume, &ramp, &front_camera()).expect("render");
    let b = render_reference(&config, &volume, &nearest, &front_camera()).expect("render");
    assert_eq!(a, b);
}

#[test]
fn test_volume_origin_does_not_move_the_render_box() {
    let voxels = sphere_volume(16, 5.0).voxels().to_vec();
    let at_zero =
        VolumeData::with_geometry(UVec3::splat(16), Vec3::ONE, Vec3::ZERO, voxels.clone())
            .expect("volume");
    let shifted =
        VolumeData::with_geometry(UVec3::splat(16), Vec3::ONE, Vec3::new(100.0, -50.0, 7.0), voxels)
            .expect("volume");
    let config = RendererConfig::default().with_size(16, 16);
    let tf = TransferFunction::grayscale_ramp();

    let a = render_reference(&config, &at_zero, &tf, &front_camera()).expect("render");
    let b = render_reference(&config, &shifted, &tf, &front_camera()).expect("render");
    assert_eq!(a, b);
}

proptest! {
    #[test]
    fn prop_selection_never_fails_when_devices_exist(
        kinds in proptest::collection::vec(0u8..4, 1..8),
        wanted in 0u8..4,
    ) {
        let to_kind = |k: u8| match k {
            0 => DeviceKind::Gpu,
            1 => DeviceKind::Cpu,
            2 => DeviceKind::Accelerator,
            _ => DeviceKind::Other,
        };
        let kinds: Vec<DeviceKind> = kinds.into_iter().map(to_kind).collect();
        let preference = match wanted {
            0 => DevicePreference::Gpu,
            1 => DevicePreference::Cpu,
            2 => DevicePreference::Accelerator,
            _ => DevicePreference::Default,
        };

        match select_device(kinds.iter().copied(), preference) {
            DeviceSelection::Matched(i) => {
                prop_assert_eq!(Some(kinds[i]), preference.wanted_kind());
                prop_assert!(kinds[..i].iter().all(|k| Some(*k) != preference.wanted_kind()));
            }
            DeviceSelection::Fallback => {
                let wanted = preference.wanted_kind();
                prop_assert!(wanted.map_or(true, |w| !kinds.contains(&w)));
            }
        }
    }
}
