//! Chunk kind registry.
//!
//! Every chunk type the inspector knows about is a variant of [`ChunkKind`].
//! Anything else that still spells four ASCII letters is carried as
//! [`ChunkTag::Unknown`] with its raw bytes, and classified public or
//! private by the case of its second letter.

use std::fmt;

/// Known PNG chunk kinds, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum ChunkKind {
    IHDR,
    PLTE,
    IDAT,
    IEND,
    tRNS,
    cHRM,
    gAMA,
    iCCP,
    sBIT,
    sRGB,
    iTXt,
    tEXt,
    zTXt,
    bKGD,
    hIST,
    pHYs,
    sPLT,
    tIME,
}

impl ChunkKind {
    pub const ALL: [ChunkKind; 18] = [
        ChunkKind::IHDR,
        ChunkKind::PLTE,
        ChunkKind::IDAT,
        ChunkKind::IEND,
        ChunkKind::tRNS,
        ChunkKind::cHRM,
        ChunkKind::gAMA,
        ChunkKind::iCCP,
        ChunkKind::sBIT,
        ChunkKind::sRGB,
        ChunkKind::iTXt,
        ChunkKind::tEXt,
        ChunkKind::zTXt,
        ChunkKind::bKGD,
        ChunkKind::hIST,
        ChunkKind::pHYs,
        ChunkKind::sPLT,
        ChunkKind::tIME,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChunkKind::IHDR => "IHDR",
            ChunkKind::PLTE => "PLTE",
            ChunkKind::IDAT => "IDAT",
            ChunkKind::IEND => "IEND",
            ChunkKind::tRNS => "tRNS",
            ChunkKind::cHRM => "cHRM",
            ChunkKind::gAMA => "gAMA",
            ChunkKind::iCCP => "iCCP",
            ChunkKind::sBIT => "sBIT",
            ChunkKind::sRGB => "sRGB",
            ChunkKind::iTXt => "iTXt",
            ChunkKind::tEXt => "tEXt",
            ChunkKind::zTXt => "zTXt",
            ChunkKind::bKGD => "bKGD",
            ChunkKind::hIST => "hIST",
            ChunkKind::pHYs => "pHYs",
            ChunkKind::sPLT => "sPLT",
            ChunkKind::tIME => "tIME",
        }
    }

    /// Exact, case-sensitive lookup by chunk name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    pub fn from_bytes(bytes: &[u8; 4]) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name().as_bytes() == bytes)
    }

    /// Whether the report layer has a semantic handler for this kind.
    pub fn has_report(self) -> bool {
        !matches!(
            self,
            ChunkKind::IDAT | ChunkKind::IEND | ChunkKind::iCCP | ChunkKind::iTXt | ChunkKind::zTXt
        )
    }
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The type field of a framed chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkTag {
    Known(ChunkKind),
    Unknown([u8; 4]),
}

impl ChunkTag {
    /// Classify four type bytes. Returns `None` unless all four are ASCII
    /// letters.
    pub fn from_bytes(bytes: [u8; 4]) -> Option<Self> {
        if !bytes.iter().all(u8::is_ascii_alphabetic) {
            return None;
        }
        Some(match ChunkKind::from_bytes(&bytes) {
            Some(kind) => ChunkTag::Known(kind),
            None => ChunkTag::Unknown(bytes),
        })
    }

    pub fn kind(&self) -> Option<ChunkKind> {
        match self {
            ChunkTag::Known(kind) => Some(*kind),
            ChunkTag::Unknown(_) => None,
        }
    }

    /// Public unless the second letter is lowercase.
    pub fn is_public(&self) -> bool {
        match self {
            ChunkTag::Known(kind) => !kind.name().as_bytes()[1].is_ascii_lowercase(),
            ChunkTag::Unknown(bytes) => !bytes[1].is_ascii_lowercase(),
        }
    }
}

impl fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkTag::Known(kind) => f.write_str(kind.name()),
            ChunkTag::Unknown(bytes) => {
                for &b in bytes {
                    write!(f, "{}", b as char)?;
                }
                Ok(())
            }
        }
    }
}
