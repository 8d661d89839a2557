//! Kernel source assembly and compilation.
//!
//! The ray-casting kernel ships as a WGSL template with `{{name}}` slots for
//! the values in [`KernelConstants`]. Assembly substitutes typed literals and
//! rejects templates with missing or unknown slots before anything reaches
//! the device compiler.

use volcast_core::KernelConstants;

use crate::context::ComputeContext;
use crate::error::{RenderError, RenderResult};

/// The built-in ray-casting kernel template.
pub const RAYCAST_TEMPLATE: &str = include_str!("../shaders/raycast.wgsl.in");

/// Workgroup edge length the kernel is written for.
pub const WORKGROUP_SIZE: u32 = 8;

const ENTRY_POINT: &str = "main";

const SLOT_STEP_SIZE: &str = "ray_step_size";
const SLOT_MAX_STEPS: &str = "ray_max_steps";

/// WGSL source with named constant slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelTemplate {
    source: String,
    label: String,
}

impl KernelTemplate {
    /// The built-in ray-casting template.
    #[must_use]
    pub fn raycast() -> Self {
        Self::from_source(RAYCAST_TEMPLATE)
    }

    /// A caller-supplied template.
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            label: "raycast kernel".to_string(),
        }
    }

    /// Sets the label used for the shader module and pipeline.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Substitutes `constants` into every slot.
    ///
    /// Fails if either slot is absent, a slot name is unknown, or a slot is
    /// left unterminated.
    pub fn assemble(&self, constants: &KernelConstants) -> RenderResult<String> {
        constants
            .validate()
            .map_err(|e| compile_error(e.to_string()))?;

        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source.as_str();
        let mut seen_step = false;
        let mut seen_max = false;

        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            let close = after
                .find("}}")
                .ok_or_else(|| compile_error("unterminated template slot".to_string()))?;
            let name = after[..close].trim();

            match name {
                SLOT_STEP_SIZE => {
                    out.push_str(&float_literal(constants.ray_step_size));
                    seen_step = true;
                }
                SLOT_MAX_STEPS => {
                    out.push_str(&format!("{}u", constants.ray_max_steps));
                    seen_max = true;
                }
                other => {
                    return Err(compile_error(format!("unknown template slot {{{{{other}}}}}")));
                }
            }
            rest = &after[close + 2..];
        }
        out.push_str(rest);

        for (slot, seen) in [(SLOT_STEP_SIZE, seen_step), (SLOT_MAX_STEPS, seen_max)] {
            if !seen {
                return Err(compile_error(format!(
                    "template is missing the {{{{{slot}}}}} slot"
                )));
            }
        }

        Ok(out)
    }
}

impl Default for KernelTemplate {
    fn default() -> Self {
        Self::raycast()
    }
}

/// Formats a float so WGSL always parses it as a float literal.
fn float_literal(value: f32) -> String {
    // Debug keeps a decimal point or exponent: 1.0, 0.01, 1e-7
    format!("{value:?}")
}

fn compile_error(diagnostics: String) -> RenderError {
    RenderError::KernelCompilation { diagnostics }
}

/// A compiled ray-casting kernel and its binding layout.
pub struct KernelProgram {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    constants: KernelConstants,
}

impl KernelProgram {
    /// Assembles and compiles `template`.
    ///
    /// Compiler and pipeline validation errors come back as
    /// [`RenderError::KernelCompilation`] with the full diagnostic text.
    pub async fn compile(
        ctx: &ComputeContext,
        template: &KernelTemplate,
        constants: &KernelConstants,
    ) -> RenderResult<Self> {
        let source = template.assemble(constants)?;

        ctx.push_error_scope();

        let module = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(template.label()),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

        let bind_group_layout = create_bind_group_layout(&ctx.device);
        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("raycast pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let pipeline = ctx
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(template.label()),
                layout: Some(&pipeline_layout),
                module: &module,
                entry_point: Some(ENTRY_POINT),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            });

        if let Some(err) = ctx.pop_error_scope().await {
            let info = module.get_compilation_info().await;
            let mut diagnostics = err.to_string();
            for message in &info.messages {
                let line = message
                    .location
                    .map(|loc| format!("{}:{}: ", loc.line_number, loc.line_position))
                    .unwrap_or_default();
                diagnostics.push_str(&format!("\n{line}{}", message.message));
            }
            if diagnostics.trim().is_empty() {
                diagnostics = "kernel failed validation without a message".to_string();
            }
            log::warn!("kernel compilation failed: {diagnostics}");
            return Err(RenderError::KernelCompilation { diagnostics });
        }

        log::info!(
            "compiled {} (step {}, max steps {})",
            template.label(),
            constants.ray_step_size,
            constants.ray_max_steps
        );

        Ok(Self {
            pipeline,
            bind_group_layout,
            constants: *constants,
        })
    }

    pub fn pipeline(&self) -> &wgpu::ComputePipeline {
        &self.pipeline
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Constants the program was compiled with.
    pub fn constants(&self) -> &KernelConstants {
        &self.constants
    }
}

/// Layout shared by every ray-casting kernel: output pixels, uniforms,
/// volume texture and sampler, transfer texture and sampler.
pub fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let filterable = wgpu::TextureSampleType::Float { filterable: true };
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("raycast bind group layout"),
        entries: &[
            // Output pixels
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: false },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            // Uniforms
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            // Volume
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Texture {
                    sample_type: filterable,
                    view_dimension: wgpu::TextureViewDimension::D3,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 3,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            // Transfer function
            wgpu::BindGroupLayoutEntry {
                binding: 4,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Texture {
                    sample_type: filterable,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 5,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_template_assembles() {
        let source = KernelTemplate::raycast()
            .assemble(&KernelConstants::default())
            .unwrap();
        assert!(source.contains("const RAY_STEP_SIZE: f32 = 0.01;"));
        assert!(source.contains("const RAY_MAX_STEPS: u32 = 500u;"));
        assert!(!source.contains("{{"));
    }

    #[test]
    fn test_float_literal_keeps_decimal_point() {
        assert_eq!(float_literal(1.0), "1.0");
        assert_eq!(float_literal(0.25), "0.25");
        let tiny = float_literal(1.0e-7);
        assert!(tiny.contains('e') || tiny.contains('.'));
    }

    #[test]
    fn test_missing_slot_fails() {
        let template = KernelTemplate::from_source("const S: f32 = {{ray_step_size}};");
        let err = template.assemble(&KernelConstants::default()).unwrap_err();
        match err {
            RenderError::KernelCompilation { diagnostics } => {
                assert!(diagnostics.contains("ray_max_steps"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_slot_fails() {
        let template = KernelTemplate::from_source(
            "{{ray_step_size}} {{ray_max_steps}} {{ray_min_steps}}",
        );
        assert!(matches!(
            template.assemble(&KernelConstants::default()),
            Err(RenderError::KernelCompilation { .. })
        ));
    }

    #[test]
    fn test_unterminated_slot_fails() {
        let template = KernelTemplate::from_source("{{ray_step_size}} {{ray_max_steps");
        assert!(template.assemble(&KernelConstants::default()).is_err());
    }

    #[test]
    fn test_slots_tolerate_whitespace_and_repeats() {
        let template = KernelTemplate::from_source(
            "{{ ray_step_size }} {{ray_max_steps}} {{ray_max_steps}}",
        );
        let constants = KernelConstants {
            ray_step_size: 0.5,
            ray_max_steps: 7,
        };
        assert_eq!(template.assemble(&constants).unwrap(), "0.5 7u 7u");
    }

    proptest::proptest! {
        #[test]
        fn prop_assembled_literals_parse_back(
            step in 1.0e-6f32..10.0,
            max_steps in 1u32..100_000,
        ) {
            let template = KernelTemplate::from_source("{{ray_step_size}};{{ray_max_steps}}");
            let constants = KernelConstants { ray_step_size: step, ray_max_steps: max_steps };
            let source = template.assemble(&constants).unwrap();
            let (step_text, max_text) = source.split_once(';').unwrap();

            proptest::prop_assert!(step_text.contains('.') || step_text.contains('e'));
            proptest::prop_assert_eq!(step_text.parse::<f32>().unwrap(), step);
            proptest::prop_assert_eq!(max_text, format!("{max_steps}u"));
        }
    }

    #[test]
    fn test_invalid_constants_rejected_before_compile() {
        let constants = KernelConstants {
            ray_step_size: -1.0,
            ray_max_steps: 10,
        };
        assert!(KernelTemplate::raycast().assemble(&constants).is_err());
    }
}
