//! MD5 file hasher with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing MD5 fingerprints
//! of file contents. Files are read in fixed-size chunks so memory use stays
//! bounded regardless of file size. Bytes are hashed exactly as stored on
//! disk: no newline translation, no text decoding.
//!
//! # Example
//!
//! ```no_run
//! use md5ls::scanner::Hasher;
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let (fingerprint, bytes) = hasher.full_hash(Path::new("Cargo.toml")).unwrap();
//! println!("{fingerprint}  {bytes} bytes");
//! ```

use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

use md5::{Digest, Md5};

use super::HashError;
use crate::manifest::Fingerprint;

/// Default read chunk size (32 KiB).
///
/// Large files benefit from fewer reads, many small files from less
/// per-read overhead; 16-64 KiB is the sweet spot in practice.
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Largest accepted read chunk size (64 MiB).
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Streaming content hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    chunk_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher using [`DEFAULT_CHUNK_SIZE`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Use a custom read chunk size.
    ///
    /// Zero falls back to [`DEFAULT_CHUNK_SIZE`]; anything above
    /// [`MAX_CHUNK_SIZE`] is capped with a warning.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = match chunk_size {
            0 => DEFAULT_CHUNK_SIZE,
            n if n > MAX_CHUNK_SIZE => {
                log::warn!("Chunk size {n} exceeds {MAX_CHUNK_SIZE} bytes, capping");
                MAX_CHUNK_SIZE
            }
            n => n,
        };
        self
    }

    /// Current read chunk size in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Hash everything readable from `reader`.
    ///
    /// Returns the fingerprint and the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// Propagates any read error other than `Interrupted`, which is retried
    /// by the read loop.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<(Fingerprint, u64)> {
        let mut digest = Md5::new();
        let mut buffer = vec![0u8; self.chunk_size];
        let mut total = 0u64;

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            digest.update(&buffer[..n]);
            total += n as u64;
        }

        Ok((Fingerprint::new(format!("{:x}", digest.finalize())), total))
    }

    /// Hash the full contents of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the file cannot be opened or read. Callers
    /// building a manifest treat this as a per-file skip.
    pub fn full_hash(&self, path: &Path) -> Result<(Fingerprint, u64), HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let result = self
            .hash_reader(file)
            .map_err(|e| HashError::from_io(path, e))?;
        log::trace!("Hashed {} ({} bytes)", path.display(), result.1);
        Ok(result)
    }
}
