use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box over surfel positions.
///
/// Used for the normalisation pass and as a culling hint for the renderer.
/// Recomputed once per dataset load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Bounds initialised so any first point replaces both corners.
    pub fn empty() -> Self {
        Self {
            min: Vec3::INFINITY,
            max: Vec3::NEG_INFINITY,
        }
    }

    /// Grow the bounds to include a point.
    pub fn update(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut bounds = Self::empty();
        for p in points {
            bounds.update(p);
        }
        bounds
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// True when no point has been folded in.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Per-axis zero-extent flags. A degenerate axis cannot be remapped by
    /// the normaliser and collapses to the cube centre instead.
    pub fn degenerate_axes(&self) -> [bool; 3] {
        let size = self.size();
        [size.x == 0.0, size.y == 0.0, size.z == 0.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_tracks_min_and_max() {
        let bounds = Aabb::from_points([
            Vec3::new(1.0, -2.0, 3.0),
            Vec3::new(-4.0, 5.0, 0.5),
            Vec3::new(0.0, 0.0, 9.0),
        ]);
        assert_eq!(bounds.min, Vec3::new(-4.0, -2.0, 0.5));
        assert_eq!(bounds.max, Vec3::new(1.0, 5.0, 9.0));
    }

    #[test]
    fn empty_bounds_report_empty() {
        assert!(Aabb::empty().is_empty());
        assert!(!Aabb::from_points([Vec3::ZERO]).is_empty());
    }

    #[test]
    fn single_point_is_degenerate_on_all_axes() {
        let bounds = Aabb::from_points([Vec3::new(2.0, 2.0, 2.0)]);
        assert_eq!(bounds.degenerate_axes(), [true, true, true]);
    }

    #[test]
    fn coplanar_points_are_degenerate_on_one_axis() {
        let bounds = Aabb::from_points([Vec3::new(0.0, 1.0, 0.0), Vec3::new(3.0, 1.0, 4.0)]);
        assert_eq!(bounds.degenerate_axes(), [false, true, false]);
    }
}
