//! Decoded state accumulated over a whole chunk stream.
//!
//! Singleton chunks get an `Option` slot that the last occurrence wins.
//! Repeatable chunks (`tEXt`, `sPLT`) append to a `Vec` in arrival order.
//! A slot is only ever assigned a fully decoded value.

/// IHDR colour type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ColourType {
    Greyscale = 0,
    Truecolour = 2,
    Indexed = 3,
    GreyscaleAlpha = 4,
    TruecolourAlpha = 6,
}

impl ColourType {
    pub fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0 => ColourType::Greyscale,
            2 => ColourType::Truecolour,
            3 => ColourType::Indexed,
            4 => ColourType::GreyscaleAlpha,
            6 => ColourType::TruecolourAlpha,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            ColourType::Greyscale => "greyscale",
            ColourType::Truecolour => "truecolour",
            ColourType::Indexed => "indexed",
            ColourType::GreyscaleAlpha => "greyscale + alpha",
            ColourType::TruecolourAlpha => "truecolour + alpha",
        }
    }

    /// Bit depths PNG allows for this colour type.
    pub fn allowed_bit_depths(self) -> &'static [u8] {
        match self {
            ColourType::Greyscale => &[1, 2, 4, 8, 16],
            ColourType::Indexed => &[1, 2, 4, 8],
            ColourType::Truecolour | ColourType::GreyscaleAlpha | ColourType::TruecolourAlpha => {
                &[8, 16]
            }
        }
    }
}

pub const COMPRESSION_DEFLATE: u8 = 0;
pub const FILTER_ADAPTIVE: u8 = 0;
pub const INTERLACE_NONE: u8 = 0;
pub const INTERLACE_ADAM7: u8 = 1;

/// Image header. Enumerated fields stay raw so invalid values survive to
/// the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ihdr {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub colour_type: u8,
    pub compression: u8,
    pub filter: u8,
    pub interlace: u8,
}

impl Ihdr {
    pub fn colour(&self) -> Option<ColourType> {
        ColourType::from_u8(self.colour_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8 {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plte {
    pub entries: Vec<Rgb8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trns {
    Grey(u16),
    Rgb { red: u16, green: u16, blue: u16 },
    /// One alpha per leading palette entry; may be shorter than the palette.
    Palette(Vec<u8>),
}

/// Chromaticities, stored as the raw value times 100000.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chrm {
    pub white_x: u32,
    pub white_y: u32,
    pub red_x: u32,
    pub red_y: u32,
    pub green_x: u32,
    pub green_y: u32,
    pub blue_x: u32,
    pub blue_y: u32,
}

/// Image gamma times 100000.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gama(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sbit {
    Greyscale(u8),
    GreyscaleAlpha { grey: u8, alpha: u8 },
    Colour { red: u8, green: u8, blue: u8 },
    ColourAlpha { red: u8, green: u8, blue: u8, alpha: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderingIntent {
    Perceptual = 0,
    RelativeColorimetric = 1,
    Saturation = 2,
    AbsoluteColorimetric = 3,
}

impl RenderingIntent {
    pub fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0 => RenderingIntent::Perceptual,
            1 => RenderingIntent::RelativeColorimetric,
            2 => RenderingIntent::Saturation,
            3 => RenderingIntent::AbsoluteColorimetric,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            RenderingIntent::Perceptual => "perceptual",
            RenderingIntent::RelativeColorimetric => "relative colorimetric",
            RenderingIntent::Saturation => "saturation",
            RenderingIntent::AbsoluteColorimetric => "absolute colorimetric",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Srgb {
    pub intent: u8,
}

/// Latin-1 keyword/text pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub keyword: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bkgd {
    Greyscale(u16),
    Rgb { red: u16, green: u16, blue: u16 },
    PaletteIndex(u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hist {
    pub frequencies: Vec<u16>,
}

pub const UNIT_UNKNOWN: u8 = 0;
pub const UNIT_METRE: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phys {
    pub ppu_x: u32,
    pub ppu_y: u32,
    pub unit: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpltEntry {
    Depth8 { red: u8, green: u8, blue: u8, alpha: u8, frequency: u16 },
    Depth16 { red: u16, green: u16, blue: u16, alpha: u16, frequency: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splt {
    pub name: String,
    pub sample_depth: u8,
    pub entries: Vec<SpltEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Everything decoded so far. Owned by the inspection loop and handed to
/// each decoder and report by reference.
#[derive(Debug, Default)]
pub struct PngContext {
    pub ihdr: Option<Ihdr>,
    /// An IHDR was framed but its payload did not decode.
    pub ihdr_rejected: bool,
    pub plte: Option<Plte>,
    pub trns: Option<Trns>,
    pub chrm: Option<Chrm>,
    pub gama: Option<Gama>,
    pub sbit: Option<Sbit>,
    pub srgb: Option<Srgb>,
    pub text: Vec<Text>,
    pub bkgd: Option<Bkgd>,
    pub hist: Option<Hist>,
    pub phys: Option<Phys>,
    pub splt: Vec<Splt>,
    pub time: Option<Time>,
}

impl PngContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn colour_type(&self) -> Option<ColourType> {
        self.ihdr.as_ref().and_then(Ihdr::colour)
    }

    /// Number of palette entries, once a PLTE has been decoded.
    pub fn palette_len(&self) -> Option<usize> {
        self.plte.as_ref().map(|p| p.entries.len())
    }
}
