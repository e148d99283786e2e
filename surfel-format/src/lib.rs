//! Surfel point-cloud processing: `.rsf` decoding, bounds computation,
//! canonical-cube normalisation and quad/point expansion for splat rendering.
//!
//! Everything here runs on the CPU before the first frame; the render engine
//! consumes the output as static geometry.

pub mod bounds;
pub mod error;
pub mod expand;
pub mod normalize;
pub mod rsf;
pub mod surfel;

pub use bounds::Aabb;
pub use error::RsfError;
pub use expand::{SplatGeometry, SplatTopology, SplatVertex, expand_points, expand_quads};
pub use normalize::{NormalizeOutcome, normalize_in_place};
pub use rsf::{RsfHeader, decode_bytes, decode_file};
pub use surfel::{Surfel, SurfelDataset};
