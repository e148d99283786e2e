use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use surfel_format::{Aabb, SurfelDataset, rsf::RsfHeader};

/// Scan results for one `.rsf` file. Stored bounds come from the file's
/// bounds block; computed bounds from the actual points, so a drifted
/// block is visible in the report.
#[derive(Debug, Serialize)]
pub struct DatasetSummary {
    pub path: String,
    pub surfel_count: u32,
    pub data_offset: u32,
    pub stored_bounds: Aabb,
    pub computed_bounds: Option<Aabb>,
    pub bounds_drift: bool,
    pub radius_min: Option<f32>,
    pub radius_max: Option<f32>,
    pub degenerate_axes: [bool; 3],
}

impl DatasetSummary {
    pub fn scan(path: &str, header: &RsfHeader, dataset: &SurfelDataset) -> Self {
        let pb = ProgressBar::new(dataset.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} surfels ({percent}%) {msg}")
                .unwrap()
                .progress_chars("▉▊▋▌▍▎▏ "),
        );
        pb.set_message("Scanning surfels");

        let mut bounds = Aabb::empty();
        let mut radius_min = f32::INFINITY;
        let mut radius_max = f32::NEG_INFINITY;
        for (idx, surfel) in dataset.surfels.iter().enumerate() {
            bounds.update(surfel.position);
            radius_min = radius_min.min(surfel.radius);
            radius_max = radius_max.max(surfel.radius);

            if idx % 50_000 == 0 {
                pb.set_position(idx as u64);
            }
        }
        pb.finish_with_message("Scan complete");

        let computed_bounds = (!dataset.is_empty()).then_some(bounds);
        let bounds_drift = computed_bounds
            .map(|computed| {
                let stored = dataset.stored_bounds;
                !computed.min.abs_diff_eq(stored.min, 1e-4)
                    || !computed.max.abs_diff_eq(stored.max, 1e-4)
            })
            .unwrap_or(false);

        Self {
            path: path.to_string(),
            surfel_count: header.count,
            data_offset: header.data_offset,
            stored_bounds: dataset.stored_bounds,
            computed_bounds,
            bounds_drift,
            radius_min: computed_bounds.map(|_| radius_min),
            radius_max: computed_bounds.map(|_| radius_max),
            degenerate_axes: computed_bounds
                .map(|b| b.degenerate_axes())
                .unwrap_or([true; 3]),
        }
    }

    pub fn print(&self) {
        match self.computed_bounds {
            Some(bounds) => {
                println!("Computed bounds: {:?} .. {:?}", bounds.min, bounds.max);
                println!(
                    "Radius range: {:.4} .. {:.4}",
                    self.radius_min.unwrap_or(0.0),
                    self.radius_max.unwrap_or(0.0)
                );
                if self.bounds_drift {
                    println!("Warning: stored bounds block disagrees with point extents");
                }
            }
            None => println!("Empty dataset"),
        }
    }
}
