use crate::bounds::Aabb;
use crate::surfel::SurfelDataset;

/// Result of one normalisation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeOutcome {
    /// Bounds of the dataset before positions were remapped.
    pub source_bounds: Aabb,
    /// Axes with zero extent; positions on these axes were mapped to 0
    /// instead of dividing by a zero range.
    pub degenerate_axes: [bool; 3],
}

impl NormalizeOutcome {
    pub fn has_degenerate_axis(&self) -> bool {
        self.degenerate_axes.iter().any(|&d| d)
    }
}

/// Remap every position into the canonical [-1, 1] cube, in place:
/// `p' = 2 * (p - min) / (max - min) - 1` per axis.
///
/// Zero-extent axes collapse to 0 rather than producing NaN/Inf. Runs
/// exactly once per dataset load; normals, radii and colours are untouched.
pub fn normalize_in_place(dataset: &mut SurfelDataset) -> NormalizeOutcome {
    let source_bounds = dataset.compute_bounds();
    let degenerate_axes = if dataset.is_empty() {
        [true; 3]
    } else {
        source_bounds.degenerate_axes()
    };

    let size = source_bounds.size();
    for surfel in &mut dataset.surfels {
        for axis in 0..3 {
            surfel.position[axis] = if degenerate_axes[axis] {
                0.0
            } else {
                2.0 * (surfel.position[axis] - source_bounds.min[axis]) / size[axis] - 1.0
            };
        }
    }

    NormalizeOutcome {
        source_bounds,
        degenerate_axes,
    }
}
