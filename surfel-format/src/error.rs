use std::path::PathBuf;
use thiserror::Error;

/// Decode failures for `.rsf` files.
///
/// `Io` covers missing or unreadable files; the remaining variants are
/// format violations where the header promises more data than the file
/// holds. Both are fatal at load time, there is no partial recovery.
#[derive(Debug, Error)]
pub enum RsfError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file too short for header and bounds block: {len} bytes, need {need}")]
    HeaderTooShort { len: usize, need: usize },

    #[error(
        "data block out of range: header declares {count} surfels at offset {offset}, \
         needs {need} bytes but file holds {len}"
    )]
    DataOutOfRange {
        count: u32,
        offset: u32,
        need: usize,
        len: usize,
    },
}

impl RsfError {
    /// Distinguishes format violations from plain I/O failures.
    pub fn is_format(&self) -> bool {
        !matches!(self, RsfError::Io { .. })
    }
}
