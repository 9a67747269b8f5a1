//! Chunk framing.
//!
//! Every chunk on disk is laid out as:
//!
//! ```text
//! length  u32 BE   payload length, at most 2^31 - 1
//! type    [u8; 4]  four ASCII letters
//! data    [u8]     `length` bytes
//! crc     u32 BE   CRC-32 over type + data
//! ```
//!
//! [`ChunkReader`] pulls one chunk at a time off any `Read`. The CRC is
//! carried through but never checked against the payload. [`ChunkWriter`]
//! is the inverse and does compute the CRC, so streams it produces are
//! valid PNG framing.

use std::fmt;
use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher;
use thiserror::Error;
use tracing::trace;

use crate::kind::ChunkTag;
use crate::signature::PNG_SIGNATURE;

/// Largest legal chunk length.
pub const MAX_CHUNK_LEN: u32 = i32::MAX as u32;

/// Payload bytes reserved up front; larger payloads grow as they arrive so
/// a lying length field cannot force a huge allocation.
const INITIAL_DATA_CAPACITY: usize = 64 * 1024;

/// Which part of the chunk frame ran out of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkField {
    Length,
    Type,
    Data,
    Crc,
}

impl fmt::Display for ChunkField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChunkField::Length => "len",
            ChunkField::Type => "type",
            ChunkField::Data => "data",
            ChunkField::Crc => "crc",
        })
    }
}

/// Fatal framing errors. Any of these ends the inspection.
#[derive(Error, Debug)]
pub enum ChunkError {
    #[error("not a PNG file")]
    NotPng,
    #[error("Invalid chunk len {0}")]
    InvalidLength(u32),
    #[error("Invalid chunk type \"{}\"", .0.escape_ascii())]
    InvalidType([u8; 4]),
    #[error("Invalid chunk {0}: unexpected end of input")]
    Truncated(ChunkField),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One framed chunk. The payload is released when the chunk is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub tag: ChunkTag,
    pub data: Vec<u8>,
    /// Stored CRC, as read. Zero is a legal value.
    pub crc: u32,
}

impl Chunk {
    pub fn length(&self) -> u32 {
        self.data.len() as u32
    }
}

pub struct ChunkReader<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> ChunkReader<R> {
    /// Wrap a reader already positioned past the signature.
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    /// Bytes consumed through this reader so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn read_chunk(&mut self) -> Result<Chunk, ChunkError> {
        let start = self.offset;
        let length = self.read_length()?;
        let tag = self.read_type()?;
        let data = self.read_data(length)?;
        let crc = self.read_crc()?;
        trace!(offset = start, chunk = %tag, length, crc, "framed chunk");
        Ok(Chunk { tag, data, crc })
    }

    fn read_length(&mut self) -> Result<u32, ChunkError> {
        let len = self.inner.read_u32::<BigEndian>().map_err(truncated(ChunkField::Length))?;
        self.offset += 4;
        if len > MAX_CHUNK_LEN {
            return Err(ChunkError::InvalidLength(len));
        }
        Ok(len)
    }

    fn read_type(&mut self) -> Result<ChunkTag, ChunkError> {
        let mut raw = [0u8; 4];
        self.inner.read_exact(&mut raw).map_err(truncated(ChunkField::Type))?;
        self.offset += 4;
        ChunkTag::from_bytes(raw).ok_or(ChunkError::InvalidType(raw))
    }

    fn read_data(&mut self, length: u32) -> Result<Vec<u8>, ChunkError> {
        let mut data = Vec::with_capacity((length as usize).min(INITIAL_DATA_CAPACITY));
        let got = self.inner.by_ref().take(length as u64).read_to_end(&mut data)?;
        self.offset += got as u64;
        if got != length as usize {
            return Err(ChunkError::Truncated(ChunkField::Data));
        }
        Ok(data)
    }

    fn read_crc(&mut self) -> Result<u32, ChunkError> {
        let crc = self.inner.read_u32::<BigEndian>().map_err(truncated(ChunkField::Crc))?;
        self.offset += 4;
        Ok(crc)
    }
}

fn truncated(field: ChunkField) -> impl FnOnce(io::Error) -> ChunkError {
    move |e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            ChunkError::Truncated(field)
        } else {
            ChunkError::Io(e)
        }
    }
}

/// Frames chunks onto a writer.
pub struct ChunkWriter<W> {
    inner: W,
}

impl<W: Write> ChunkWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_signature(&mut self) -> io::Result<()> {
        self.inner.write_all(&PNG_SIGNATURE)
    }

    /// Write one chunk with a correct CRC. `tag` is written as given, so
    /// malformed tags can be produced on purpose.
    pub fn write_chunk(&mut self, tag: &[u8; 4], data: &[u8]) -> io::Result<()> {
        let mut hasher = Hasher::new();
        hasher.update(tag);
        hasher.update(data);
        self.write_raw(data.len() as u32, tag, data, hasher.finalize())
    }

    /// Write a chunk frame with caller-supplied length and CRC.
    pub fn write_raw(
        &mut self,
        length: u32,
        tag: &[u8; 4],
        data: &[u8],
        crc: u32,
    ) -> io::Result<()> {
        self.inner.write_u32::<BigEndian>(length)?;
        self.inner.write_all(tag)?;
        self.inner.write_all(data)?;
        self.inner.write_u32::<BigEndian>(crc)?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ChunkKind;
    use std::io::Cursor;

    fn framed(f: impl FnOnce(&mut ChunkWriter<Vec<u8>>)) -> Cursor<Vec<u8>> {
        let mut w = ChunkWriter::new(Vec::new());
        f(&mut w);
        Cursor::new(w.into_inner())
    }

    #[test]
    fn reads_known_chunk() {
        let bytes = framed(|w| w.write_chunk(b"gAMA", &[0, 0, 0xb1, 0x8f]).unwrap());
        let mut r = ChunkReader::new(bytes);
        let chunk = r.read_chunk().unwrap();
        assert_eq!(chunk.tag, ChunkTag::Known(ChunkKind::gAMA));
        assert_eq!(chunk.length(), 4);
        assert_eq!(chunk.data, vec![0, 0, 0xb1, 0x8f]);
        assert_ne!(chunk.crc, 0);
        assert_eq!(r.offset(), 16);
    }

    #[test]
    fn zero_crc_is_not_an_error() {
        let mut r = ChunkReader::new(framed(|w| w.write_raw(0, b"IEND", &[], 0).unwrap()));
        let chunk = r.read_chunk().unwrap();
        assert_eq!(chunk.crc, 0);
    }

    #[test]
    fn oversized_length_is_rejected() {
        let bytes = framed(|w| w.write_raw(0x8000_0000, b"IDAT", &[], 0).unwrap());
        let mut r = ChunkReader::new(bytes);
        assert!(matches!(r.read_chunk(), Err(ChunkError::InvalidLength(0x8000_0000))));
    }

    #[test]
    fn non_letter_type_is_rejected() {
        let mut r = ChunkReader::new(framed(|w| w.write_chunk(b"ID4T", &[]).unwrap()));
        assert!(matches!(r.read_chunk(), Err(ChunkError::InvalidType(t)) if &t == b"ID4T"));
    }

    #[test]
    fn short_data_is_truncation() {
        let mut bytes = framed(|w| w.write_raw(10, b"tEXt", b"abc", 0).unwrap()).into_inner();
        bytes.truncate(8 + 3);
        let mut r = ChunkReader::new(Cursor::new(bytes));
        assert!(matches!(r.read_chunk(), Err(ChunkError::Truncated(ChunkField::Data))));
    }

    #[test]
    fn short_crc_is_truncation() {
        let mut bytes = framed(|w| w.write_chunk(b"IEND", &[]).unwrap()).into_inner();
        bytes.truncate(10);
        let mut r = ChunkReader::new(Cursor::new(bytes));
        assert!(matches!(r.read_chunk(), Err(ChunkError::Truncated(ChunkField::Crc))));
    }

    #[test]
    fn empty_input_is_truncated_length() {
        let mut r = ChunkReader::new(Cursor::new(Vec::new()));
        assert!(matches!(r.read_chunk(), Err(ChunkError::Truncated(ChunkField::Length))));
    }

    #[test]
    fn iend_crc_matches_reference() {
        let bytes = framed(|w| w.write_chunk(b"IEND", &[]).unwrap()).into_inner();
        assert_eq!(&bytes[8..], &[0xae, 0x42, 0x60, 0x82]);
    }
}
