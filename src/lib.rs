pub mod signature;
pub mod chunk;
pub mod kind;
pub mod context;
pub mod decode;
pub mod report;
pub mod inspect;

pub use signature::{find_signature, SignatureMode, PNG_SIGNATURE};
pub use chunk::{Chunk, ChunkError, ChunkReader, ChunkWriter};
pub use kind::{ChunkKind, ChunkTag};
pub use context::PngContext;
pub use decode::{decode, DecodeError};
pub use inspect::{dispatch, inspect, Action, InspectError, InspectSummary, Options, RunMode};
