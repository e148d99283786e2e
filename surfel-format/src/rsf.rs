//! Binary `.rsf` surfel file decoder.
//!
//! Layout, all little-endian:
//! - header: 4 x u32: surfel count, byte offset of the data block, two
//!   reserved words
//! - bounds block: 6 x f32 stored min/max corners
//! - data block at the header offset: count x 8 x f32
//!   (position.xyz, radius, normal.xyz, one pad float) followed by
//!   count x 4 x u8 RGBA
//!
//! The stored bounds are parsed and surfaced but never trusted; actual
//! extents are recomputed from the decoded points so a drifted bounds block
//! cannot skew normalisation.

use std::fs;
use std::path::Path;

use glam::{Vec3, Vec4};

use crate::bounds::Aabb;
use crate::error::RsfError;
use crate::surfel::{Surfel, SurfelDataset};

pub const HEADER_BYTES: usize = 4 * 4;
pub const BOUNDS_BYTES: usize = 6 * 4;
/// position.xyz, radius, normal.xyz and one pad float per surfel.
pub const FLOATS_PER_SURFEL: usize = 8;
pub const COLOR_BYTES_PER_SURFEL: usize = 4;

/// Parsed 16-byte file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsfHeader {
    pub count: u32,
    pub data_offset: u32,
    pub reserved: [u32; 2],
}

/// Decode a `.rsf` file from disk. I/O failures map to [`RsfError::Io`],
/// everything else to the format variants.
pub fn decode_file(path: impl AsRef<Path>) -> Result<SurfelDataset, RsfError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| RsfError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_bytes(&bytes)
}

/// Decode an in-memory `.rsf` image.
pub fn decode_bytes(bytes: &[u8]) -> Result<SurfelDataset, RsfError> {
    let header = read_header(bytes)?;
    let stored_bounds = read_stored_bounds(bytes);

    let count = header.count as usize;
    let offset = header.data_offset as usize;
    let float_bytes = count * FLOATS_PER_SURFEL * 4;
    let need = offset + float_bytes + count * COLOR_BYTES_PER_SURFEL;
    // Validate the full extent up front; never read past the buffer on a
    // header that promises more data than the file holds.
    if need > bytes.len() {
        return Err(RsfError::DataOutOfRange {
            count: header.count,
            offset: header.data_offset,
            need,
            len: bytes.len(),
        });
    }

    let float_block = &bytes[offset..offset + float_bytes];
    let color_block = &bytes[offset + float_bytes..need];

    let mut surfels = Vec::with_capacity(count);
    for i in 0..count {
        let f = |j: usize| read_f32(float_block, (i * FLOATS_PER_SURFEL + j) * 4);
        let c = &color_block[i * COLOR_BYTES_PER_SURFEL..(i + 1) * COLOR_BYTES_PER_SURFEL];
        surfels.push(Surfel {
            position: Vec3::new(f(0), f(1), f(2)),
            radius: f(3),
            normal: Vec3::new(f(4), f(5), f(6)),
            color: Vec4::new(
                c[0] as f32 / 255.0,
                c[1] as f32 / 255.0,
                c[2] as f32 / 255.0,
                c[3] as f32 / 255.0,
            ),
        });
    }

    Ok(SurfelDataset {
        surfels,
        stored_bounds,
    })
}

/// Parse the 16-byte header, failing if the file cannot even hold the
/// header and bounds block.
pub fn read_header(bytes: &[u8]) -> Result<RsfHeader, RsfError> {
    let need = HEADER_BYTES + BOUNDS_BYTES;
    if bytes.len() < need {
        return Err(RsfError::HeaderTooShort {
            len: bytes.len(),
            need,
        });
    }
    Ok(RsfHeader {
        count: read_u32(bytes, 0),
        data_offset: read_u32(bytes, 4),
        reserved: [read_u32(bytes, 8), read_u32(bytes, 12)],
    })
}

fn read_stored_bounds(bytes: &[u8]) -> Aabb {
    let f = |j: usize| read_f32(bytes, HEADER_BYTES + j * 4);
    Aabb {
        min: Vec3::new(f(0), f(1), f(2)),
        max: Vec3::new(f(3), f(4), f(5)),
    }
}

// Callers validate the full extent before indexing.
fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn read_f32(bytes: &[u8], at: usize) -> f32 {
    f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build an in-memory `.rsf` image with the data block immediately
    /// after the bounds block.
    fn build_rsf(surfels: &[([f32; 3], f32, [f32; 3], [u8; 4])]) -> Vec<u8> {
        let offset = (HEADER_BYTES + BOUNDS_BYTES) as u32;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(surfels.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&offset.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        for v in [0.0f32; 6] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        for (position, radius, normal, _) in surfels {
            for v in position {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
            bytes.extend_from_slice(&radius.to_le_bytes());
            for v in normal {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
            bytes.extend_from_slice(&0.0f32.to_le_bytes());
        }
        for (_, _, _, color) in surfels {
            bytes.extend_from_slice(color);
        }
        bytes
    }

    #[test]
    fn decodes_count_positions_and_normalised_colors() {
        let bytes = build_rsf(&[
            ([1.0, 2.0, 3.0], 0.5, [0.0, 0.0, 1.0], [255, 0, 128, 255]),
            ([-1.0, 0.0, 4.0], 0.25, [0.0, 1.0, 0.0], [0, 51, 102, 255]),
        ]);
        let dataset = decode_bytes(&bytes).unwrap();
        assert_eq!(dataset.len(), 2);

        let first = &dataset.surfels[0];
        assert_eq!(first.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(first.radius, 0.5);
        assert_eq!(first.normal, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(first.color.x, 1.0);
        assert_eq!(first.color.y, 0.0);

        for surfel in &dataset.surfels {
            for channel in surfel.color.to_array() {
                assert!((0.0..=1.0).contains(&channel));
            }
        }
    }

    #[test]
    fn empty_file_decodes_to_empty_dataset() {
        let bytes = build_rsf(&[]);
        let dataset = decode_bytes(&bytes).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn header_shorter_than_fixed_blocks_is_rejected() {
        let err = decode_bytes(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, RsfError::HeaderTooShort { .. }));
        assert!(err.is_format());
    }

    #[test]
    fn truncated_data_block_is_rejected_without_reading() {
        let mut bytes = build_rsf(&[([0.0; 3], 1.0, [0.0, 1.0, 0.0], [255; 4])]);
        bytes.truncate(bytes.len() - 8);
        let err = decode_bytes(&bytes).unwrap_err();
        assert!(matches!(err, RsfError::DataOutOfRange { .. }));
    }

    #[test]
    fn count_larger_than_file_is_rejected() {
        let mut bytes = build_rsf(&[([0.0; 3], 1.0, [0.0, 1.0, 0.0], [255; 4])]);
        // Claim far more surfels than the data block holds.
        bytes[0..4].copy_from_slice(&1_000_000u32.to_le_bytes());
        let err = decode_bytes(&bytes).unwrap_err();
        assert!(matches!(err, RsfError::DataOutOfRange { .. }));
    }

    #[test]
    fn stored_bounds_are_surfaced_verbatim() {
        let mut bytes = build_rsf(&[([9.0, 9.0, 9.0], 1.0, [0.0, 1.0, 0.0], [255; 4])]);
        // Write a bounds block that disagrees with the single point.
        let stored = [-2.0f32, -2.0, -2.0, 2.0, 2.0, 2.0];
        for (j, v) in stored.iter().enumerate() {
            bytes[HEADER_BYTES + j * 4..HEADER_BYTES + (j + 1) * 4]
                .copy_from_slice(&v.to_le_bytes());
        }
        let dataset = decode_bytes(&bytes).unwrap();
        assert_eq!(dataset.stored_bounds.min, Vec3::splat(-2.0));
        assert_eq!(dataset.stored_bounds.max, Vec3::splat(2.0));
        // Recomputed bounds follow the points, not the stored block.
        assert_eq!(dataset.compute_bounds().min, Vec3::splat(9.0));
    }
}
