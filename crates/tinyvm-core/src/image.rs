//! Program image loading
//!
//! An image is a flat binary with no header. It is copied verbatim into the
//! code region starting at offset 0; any capacity left over is zero.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Code region capacity in bytes
pub const CODE_SIZE: usize = 32 * 1024;

/// A loaded program image, always exactly [`CODE_SIZE`] bytes long
#[derive(Clone)]
pub struct CodeImage {
    /// Code bytes, zero past `loaded_len`
    bytes: Box<[u8; CODE_SIZE]>,
    /// Number of bytes copied from the source
    loaded_len: usize,
    /// Length of the source before truncation to capacity
    source_len: usize,
}

impl CodeImage {
    /// Build an image from raw bytes.
    ///
    /// Sources longer than [`CODE_SIZE`] are truncated; check
    /// [`CodeImage::is_truncated`] to find out whether that happened.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut bytes = Box::new([0u8; CODE_SIZE]);
        let loaded_len = data.len().min(CODE_SIZE);
        bytes[..loaded_len].copy_from_slice(&data[..loaded_len]);

        Self {
            bytes,
            loaded_len,
            source_len: data.len(),
        }
    }

    /// Read an image file from disk
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| ImageError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_bytes(&data))
    }

    /// Number of bytes actually copied into the code region
    pub fn loaded_len(&self) -> usize {
        self.loaded_len
    }

    /// Length of the source the image was built from
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// True when the source did not fit and its tail was dropped
    pub fn is_truncated(&self) -> bool {
        self.source_len > CODE_SIZE
    }

    /// The full code region contents
    pub fn as_bytes(&self) -> &[u8; CODE_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for CodeImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeImage")
            .field("loaded_len", &self.loaded_len)
            .field("source_len", &self.source_len)
            .finish()
    }
}

/// Image loading errors
#[derive(Debug, Error)]
pub enum ImageError {
    /// The image file could not be opened or read
    #[error("couldn't open image file {}: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
