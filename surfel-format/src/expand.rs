//! Geometry expansion: one camera-facing quad (4 vertices, 6 indices) per
//! surfel, or a 1:1 point list for plain point rendering. The technique is
//! a static configuration choice, never a per-frame switch.

use bytemuck::{Pod, Zeroable};

use crate::surfel::SurfelDataset;

/// Quad-corner coordinates consumed by the vertex stage to billboard the
/// quad toward the camera and scale it by the surfel radius.
pub const QUAD_CORNERS: [[f32; 2]; 4] = [[-1.0, -1.0], [-1.0, 1.0], [1.0, -1.0], [1.0, 1.0]];

/// Per-surfel index template, offset by `4 * surfel_index`. Both render
/// passes draw the same buffer, so winding is identical by construction.
pub const QUAD_INDEX_TEMPLATE: [u32; 6] = [0, 1, 2, 3, 2, 1];

/// One expanded vertex, laid out for direct GPU upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SplatVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub radius: f32,
    pub color: [f32; 4],
    /// Quad corner in {-1, 1}^2; zero for point-list geometry.
    pub corner: [f32; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplatTopology {
    PointList,
    TriangleList,
}

/// Expanded vertex/index buffers ready for upload. Static after creation.
#[derive(Debug, Clone)]
pub struct SplatGeometry {
    pub vertices: Vec<SplatVertex>,
    pub indices: Vec<u32>,
    pub topology: SplatTopology,
}

impl SplatGeometry {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Quad expansion: 4 vertices and 6 indices per surfel. Position, normal,
/// radius and colour are copied to all four vertices; only the corner
/// coordinate differs.
pub fn expand_quads(dataset: &SurfelDataset) -> SplatGeometry {
    let mut vertices = Vec::with_capacity(dataset.len() * 4);
    let mut indices = Vec::with_capacity(dataset.len() * 6);

    for (i, surfel) in dataset.surfels.iter().enumerate() {
        for corner in QUAD_CORNERS {
            vertices.push(SplatVertex {
                position: surfel.position.to_array(),
                normal: surfel.normal.to_array(),
                radius: surfel.radius,
                color: surfel.color.to_array(),
                corner,
            });
        }
        let base = (i * 4) as u32;
        indices.extend(QUAD_INDEX_TEMPLATE.iter().map(|&k| base + k));
    }

    SplatGeometry {
        vertices,
        indices,
        topology: SplatTopology::TriangleList,
    }
}

/// Point-primitive path: vertex `i` is surfel `i`, index `i` is `i`.
pub fn expand_points(dataset: &SurfelDataset) -> SplatGeometry {
    let vertices = dataset
        .surfels
        .iter()
        .map(|surfel| SplatVertex {
            position: surfel.position.to_array(),
            normal: surfel.normal.to_array(),
            radius: surfel.radius,
            color: surfel.color.to_array(),
            corner: [0.0, 0.0],
        })
        .collect();

    SplatGeometry {
        vertices,
        indices: (0..dataset.len() as u32).collect(),
        topology: SplatTopology::PointList,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Aabb;
    use crate::surfel::Surfel;
    use glam::{Vec3, Vec4};

    fn dataset(count: usize) -> SurfelDataset {
        SurfelDataset {
            surfels: (0..count)
                .map(|i| Surfel {
                    position: Vec3::splat(i as f32),
                    normal: Vec3::Z,
                    radius: 0.1 * (i + 1) as f32,
                    color: Vec4::new(1.0, 0.0, 0.0, 1.0),
                })
                .collect(),
            stored_bounds: Aabb::empty(),
        }
    }

    #[test]
    fn quads_produce_4n_vertices_and_6n_indices() {
        let geometry = expand_quads(&dataset(7));
        assert_eq!(geometry.vertices.len(), 28);
        assert_eq!(geometry.indices.len(), 42);
        assert_eq!(geometry.topology, SplatTopology::TriangleList);
    }

    #[test]
    fn indices_stay_inside_their_surfel_block() {
        let geometry = expand_quads(&dataset(5));
        let vertex_count = geometry.vertices.len() as u32;
        for (i, chunk) in geometry.indices.chunks(6).enumerate() {
            let base = (i * 4) as u32;
            for &index in chunk {
                assert!(index < vertex_count);
                assert!((base..base + 4).contains(&index));
            }
        }
    }

    #[test]
    fn quad_vertices_share_attributes_and_differ_by_corner() {
        let geometry = expand_quads(&dataset(2));
        for quad in geometry.vertices.chunks(4) {
            for vertex in quad {
                assert_eq!(vertex.position, quad[0].position);
                assert_eq!(vertex.normal, quad[0].normal);
                assert_eq!(vertex.radius, quad[0].radius);
                assert_eq!(vertex.color, quad[0].color);
            }
            let corners: Vec<[f32; 2]> = quad.iter().map(|v| v.corner).collect();
            assert_eq!(corners, QUAD_CORNERS.to_vec());
        }
    }

    #[test]
    fn point_expansion_is_one_to_one() {
        let geometry = expand_points(&dataset(3));
        assert_eq!(geometry.vertices.len(), 3);
        assert_eq!(geometry.indices, vec![0, 1, 2]);
        assert_eq!(geometry.topology, SplatTopology::PointList);
    }

    #[test]
    fn empty_dataset_expands_to_empty_geometry() {
        for geometry in [expand_quads(&dataset(0)), expand_points(&dataset(0))] {
            assert!(geometry.is_empty());
            assert!(geometry.indices.is_empty());
        }
    }
}
