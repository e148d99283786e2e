//! Splat shader material with the two per-pass variants.
//!
//! One material type serves both passes; the `depth_prepass` uniform selects
//! the depth-encoding fragment path (opaque, offscreen target) or the
//! colour-compositing path (blended, samples the pre-pass envelope).

use bevy::{
    pbr::{Material, MaterialPipeline, MaterialPipelineKey},
    prelude::*,
    render::{
        mesh::{MeshVertexAttribute, MeshVertexBufferLayoutRef},
        render_resource::{
            AsBindGroup, RenderPipelineDescriptor, ShaderRef, ShaderType,
            SpecializedMeshPipelineError, VertexFormat,
        },
    },
};

use crate::engine::config::SplatConfig;

pub const SPLAT_SHADER_PATH: &str = "shaders/surfel_splat.wgsl";

/// World-space disc radius, one float per expanded vertex.
pub const ATTRIBUTE_SPLAT_RADIUS: MeshVertexAttribute =
    MeshVertexAttribute::new("SplatRadius", 988540917, VertexFormat::Float32);

/// Quad-corner coordinate in {-1, 1}^2 used for billboarding.
pub const ATTRIBUTE_QUAD_CORNER: MeshVertexAttribute =
    MeshVertexAttribute::new("QuadCorner", 988540918, VertexFormat::Float32x2);

/// The three configuration knobs, identical across both pass instances.
#[derive(Debug, Clone, Copy, PartialEq, ShaderType)]
pub struct SplatParams {
    pub radius_scale: f32,
    pub forward_factor: f32,
    pub depth_prepass: u32,
    pub _pad: f32,
}

#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct SplatMaterial {
    #[uniform(0)]
    pub params: SplatParams,
    /// Pre-pass depth envelope. The colour variant samples it with nearest
    /// filtering and clamp-to-edge addressing (set on the image sampler);
    /// the depth variant binds a dummy image it never reads.
    #[texture(1)]
    #[sampler(2)]
    pub envelope_texture: Handle<Image>,
}

impl SplatMaterial {
    /// Depth pre-pass variant: writes the splat envelope, reads nothing.
    pub fn depth_variant(config: &SplatConfig, dummy: Handle<Image>) -> Self {
        Self {
            params: SplatParams {
                radius_scale: config.radius_scale,
                forward_factor: config.forward_factor,
                depth_prepass: 1,
                _pad: 0.0,
            },
            envelope_texture: dummy,
        }
    }

    /// Colour variant: composites against the pre-pass envelope. For
    /// single-pass techniques `envelope` is a dummy image with zero
    /// coverage, which the shader treats as "accept everything".
    pub fn color_variant(config: &SplatConfig, envelope: Handle<Image>) -> Self {
        Self {
            params: SplatParams {
                radius_scale: config.radius_scale,
                forward_factor: config.forward_factor,
                depth_prepass: 0,
                _pad: 0.0,
            },
            envelope_texture: envelope,
        }
    }
}

/// Push the shared knobs into one material instance. Split out of the sync
/// system so the invariant is testable without a render world.
pub fn apply_config(params: &mut SplatParams, config: &SplatConfig) {
    params.radius_scale = config.radius_scale;
    params.forward_factor = config.forward_factor;
}

impl Material for SplatMaterial {
    fn vertex_shader() -> ShaderRef {
        SPLAT_SHADER_PATH.into()
    }

    fn fragment_shader() -> ShaderRef {
        SPLAT_SHADER_PATH.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        if self.params.depth_prepass == 1 {
            AlphaMode::Opaque
        } else {
            AlphaMode::Blend
        }
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            Mesh::ATTRIBUTE_NORMAL.at_shader_location(1),
            Mesh::ATTRIBUTE_COLOR.at_shader_location(2),
            ATTRIBUTE_SPLAT_RADIUS.at_shader_location(3),
            ATTRIBUTE_QUAD_CORNER.at_shader_location(4),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        // Splats are drawn double-sided, the quads billboard toward the
        // camera and the point path has no winding at all.
        descriptor.primitive.cull_mode = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::SplatTechnique;

    #[test]
    fn both_variants_share_the_same_knob_values() {
        let config = SplatConfig {
            technique: SplatTechnique::QuadSplat { two_pass: true },
            radius_scale: 0.4,
            forward_factor: 0.7,
        };
        let depth = SplatMaterial::depth_variant(&config, Handle::default());
        let color = SplatMaterial::color_variant(&config, Handle::default());

        assert_eq!(depth.params.radius_scale, color.params.radius_scale);
        assert_eq!(depth.params.forward_factor, color.params.forward_factor);
        assert_eq!(depth.params.depth_prepass, 1);
        assert_eq!(color.params.depth_prepass, 0);
    }

    #[test]
    fn apply_config_updates_knobs_but_not_the_pass_selector() {
        let config = SplatConfig {
            technique: SplatTechnique::QuadSplat { two_pass: true },
            radius_scale: 1.5,
            forward_factor: 0.1,
        };
        let mut params = SplatParams {
            radius_scale: 0.25,
            forward_factor: 0.5,
            depth_prepass: 1,
            _pad: 0.0,
        };
        apply_config(&mut params, &config);
        assert_eq!(params.radius_scale, 1.5);
        assert_eq!(params.forward_factor, 0.1);
        assert_eq!(params.depth_prepass, 1);
    }
}
