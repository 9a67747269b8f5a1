//! The inspection loop.
//!
//! Finds the signature, then frames chunks one at a time until IEND or the
//! first framing error. What happens to each chunk is decided by
//! [`dispatch`] from the run mode alone.

use std::io::{self, Read, Write};

use thiserror::Error;
use tracing::debug;

use crate::chunk::{ChunkError, ChunkReader};
use crate::context::PngContext;
use crate::decode::decode;
use crate::kind::{ChunkKind, ChunkTag};
use crate::report::report;
use crate::signature::{find_signature, SignatureMode};

#[derive(Error, Debug)]
pub enum InspectError {
    #[error(transparent)]
    Chunk(#[from] ChunkError),
    #[error("{0}: invalid chunk")]
    UnknownChunkName(String),
    #[error("{0}: unsupported chunk type")]
    UnsupportedChunk(ChunkKind),
    #[error("output error: {0}")]
    Output(#[from] io::Error),
}

/// What the run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Print the name of every chunk.
    #[default]
    List,
    /// Print the decoded report of one chunk kind only.
    Filter(ChunkKind),
}

impl RunMode {
    /// Filter mode for a chunk named on the command line.
    pub fn filter(name: &str) -> Result<Self, InspectError> {
        let kind = ChunkKind::from_name(name)
            .ok_or_else(|| InspectError::UnknownChunkName(name.to_string()))?;
        if !kind.has_report() {
            return Err(InspectError::UnsupportedChunk(kind));
        }
        Ok(RunMode::Filter(kind))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub mode: RunMode,
    pub signature: SignatureMode,
}

/// Per-chunk action chosen by [`dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListName,
    Report(ChunkKind),
    /// Decode into the context for later chunks, print nothing.
    Absorb(ChunkKind),
    Skip,
}

pub fn dispatch(mode: RunMode, tag: &ChunkTag) -> Action {
    match (mode, tag) {
        (RunMode::List, _) => Action::ListName,
        (RunMode::Filter(_), ChunkTag::Unknown(_)) => Action::Skip,
        (RunMode::Filter(selected), ChunkTag::Known(kind)) if *kind == selected => {
            Action::Report(*kind)
        }
        (RunMode::Filter(_), ChunkTag::Known(kind)) => Action::Absorb(*kind),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectSummary {
    /// Offset of the PNG signature in the input.
    pub signature_offset: u64,
    /// Chunks framed, IEND included.
    pub chunks: usize,
}

/// Inspect a PNG stream. Reports go to `out`, warnings to `diag`.
///
/// Anything written before a framing error stays written.
pub fn inspect<R: Read, O: Write, E: Write>(
    mut input: R,
    options: &Options,
    out: &mut O,
    diag: &mut E,
) -> Result<InspectSummary, InspectError> {
    let signature_offset = find_signature(&mut input, options.signature)?;
    debug!(signature_offset, "found PNG signature");

    let mut reader = ChunkReader::new(input);
    let mut ctx = PngContext::new();
    let mut chunks = 0usize;
    loop {
        let chunk = reader.read_chunk()?;
        chunks += 1;
        match dispatch(options.mode, &chunk.tag) {
            Action::ListName => match chunk.tag {
                ChunkTag::Known(kind) => writeln!(out, "{kind}")?,
                ChunkTag::Unknown(_) => {
                    let visibility = if chunk.tag.is_public() { "public" } else { "private" };
                    writeln!(out, "{} (unknown {visibility} chunk)", chunk.tag)?;
                }
            },
            Action::Report(kind) => match decode(&mut ctx, kind, &chunk.data) {
                Ok(()) => report(&ctx, kind, out, diag)?,
                Err(e) => writeln!(diag, "{e}")?,
            },
            Action::Absorb(kind) => {
                if let Err(e) = decode(&mut ctx, kind, &chunk.data) {
                    debug!(error = %e, "ignoring undecodable chunk");
                }
            }
            Action::Skip => {}
        }
        if chunk.tag == ChunkTag::Known(ChunkKind::IEND) {
            break;
        }
    }
    debug!(chunks, bytes = reader.offset(), "reached IEND");
    Ok(InspectSummary { signature_offset, chunks })
}
