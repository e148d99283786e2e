use glam::{Vec3, Vec4};

use crate::bounds::Aabb;

/// A single surface sample: disc centre, orientation, world-space disc
/// radius and an RGBA colour with channels in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surfel {
    pub position: Vec3,
    pub normal: Vec3,
    pub radius: f32,
    pub color: Vec4,
}

/// An ordered surfel sequence decoded from one `.rsf` file.
///
/// `stored_bounds` is the bounds block as written in the file. It is kept
/// for format compatibility but never trusted for rendering; callers
/// recompute bounds from the actual points via [`SurfelDataset::compute_bounds`].
#[derive(Debug, Clone)]
pub struct SurfelDataset {
    pub surfels: Vec<Surfel>,
    pub stored_bounds: Aabb,
}

impl SurfelDataset {
    pub fn len(&self) -> usize {
        self.surfels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfels.is_empty()
    }

    /// Min/max reduction over all positions, one linear scan.
    pub fn compute_bounds(&self) -> Aabb {
        Aabb::from_points(self.surfels.iter().map(|s| s.position))
    }
}
