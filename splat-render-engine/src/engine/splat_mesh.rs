//! Mesh assembly from expanded splat geometry. The buffers are uploaded
//! once and never mutated afterwards.

use bevy::{
    prelude::*,
    render::{
        mesh::{Indices, PrimitiveTopology},
        render_asset::RenderAssetUsages,
    },
};
use surfel_format::{SplatGeometry, SplatTopology};

use crate::engine::splat_material::{ATTRIBUTE_QUAD_CORNER, ATTRIBUTE_SPLAT_RADIUS};

/// Build the render mesh for a splat geometry buffer: standard position,
/// normal and colour attributes plus the per-vertex radius and quad-corner
/// attributes consumed by the splat shader.
pub fn build_splat_mesh(geometry: &SplatGeometry) -> Mesh {
    let topology = match geometry.topology {
        SplatTopology::PointList => PrimitiveTopology::PointList,
        SplatTopology::TriangleList => PrimitiveTopology::TriangleList,
    };

    let positions: Vec<[f32; 3]> = geometry.vertices.iter().map(|v| v.position).collect();
    let normals: Vec<[f32; 3]> = geometry.vertices.iter().map(|v| v.normal).collect();
    let colors: Vec<[f32; 4]> = geometry.vertices.iter().map(|v| v.color).collect();
    let radii: Vec<f32> = geometry.vertices.iter().map(|v| v.radius).collect();
    let corners: Vec<[f32; 2]> = geometry.vertices.iter().map(|v| v.corner).collect();

    let mut mesh = Mesh::new(topology, RenderAssetUsages::RENDER_WORLD);
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colors);
    mesh.insert_attribute(ATTRIBUTE_SPLAT_RADIUS, radii);
    mesh.insert_attribute(ATTRIBUTE_QUAD_CORNER, corners);
    mesh.insert_indices(Indices::U32(geometry.indices.clone()));
    mesh
}
