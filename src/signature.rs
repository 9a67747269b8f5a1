//! PNG signature detection.
//!
//! `Strict` requires the eight signature bytes at the current position.
//! `Scan` slides an eight byte window forward one byte at a time until the
//! signature lines up, which finds a PNG embedded in some other file. The
//! window is kept in memory so scanning works on pipes as well as files.

use std::io::{self, Read};

use crate::chunk::ChunkError;

pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureMode {
    #[default]
    Strict,
    Scan,
}

/// Consume the signature from `reader`.
///
/// Returns the byte offset at which the signature started (always 0 in
/// strict mode). On success the reader is positioned on the first chunk.
pub fn find_signature<R: Read>(reader: &mut R, mode: SignatureMode) -> Result<u64, ChunkError> {
    let mut window = [0u8; 8];
    if !fill(reader, &mut window)? {
        return Err(ChunkError::NotPng);
    }
    if window == PNG_SIGNATURE {
        return Ok(0);
    }
    if mode == SignatureMode::Strict {
        return Err(ChunkError::NotPng);
    }

    let mut offset = 0u64;
    let mut next = [0u8; 1];
    loop {
        match reader.read(&mut next) {
            Ok(0) => return Err(ChunkError::NotPng),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ChunkError::Io(e)),
        }
        window.copy_within(1.., 0);
        window[7] = next[0];
        offset += 1;
        if window == PNG_SIGNATURE {
            return Ok(offset);
        }
    }
}

/// Read until `buf` is full. `Ok(false)` means end of input came first.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}
