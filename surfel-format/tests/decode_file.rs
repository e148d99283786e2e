use std::fs;
use std::path::PathBuf;

use surfel_format::rsf::{BOUNDS_BYTES, HEADER_BYTES};
use surfel_format::{RsfError, decode_file};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("surfel-format-{}-{}", std::process::id(), name))
}

fn minimal_rsf(count: u32) -> Vec<u8> {
    let offset = (HEADER_BYTES + BOUNDS_BYTES) as u32;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&count.to_le_bytes());
    bytes.extend_from_slice(&offset.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 8]);
    bytes.extend_from_slice(&[0u8; BOUNDS_BYTES]);
    for i in 0..count {
        let values = [i as f32, 0.0, 0.0, 0.5, 0.0, 1.0, 0.0, 0.0];
        for v in values {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
    }
    for _ in 0..count {
        bytes.extend_from_slice(&[200, 100, 50, 255]);
    }
    bytes
}

#[test]
fn decodes_a_file_written_to_disk() {
    let path = temp_path("roundtrip.rsf");
    fs::write(&path, minimal_rsf(4)).unwrap();

    let dataset = decode_file(&path).unwrap();
    assert_eq!(dataset.len(), 4);
    assert_eq!(dataset.surfels[3].position.x, 3.0);

    fs::remove_file(&path).ok();
}

#[test]
fn missing_file_is_an_io_error() {
    let err = decode_file(temp_path("does-not-exist.rsf")).unwrap_err();
    assert!(matches!(err, RsfError::Io { .. }));
    assert!(!err.is_format());
}

#[test]
fn truncated_file_on_disk_is_a_format_error() {
    let path = temp_path("truncated.rsf");
    let mut bytes = minimal_rsf(4);
    bytes.truncate(bytes.len() - 16);
    fs::write(&path, bytes).unwrap();

    let err = decode_file(&path).unwrap_err();
    assert!(err.is_format());

    fs::remove_file(&path).ok();
}
