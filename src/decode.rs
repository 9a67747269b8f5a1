//! Payload decoders: raw chunk bytes into [`PngContext`] slots.
//!
//! All multi-byte integers are big-endian (PNG network order). A decoder
//! either assigns its slot with a complete value or returns an error and
//! leaves the slot untouched. A rejected IHDR is remembered in the context.
//!
//! tRNS, sBIT and bKGD take their shape from the IHDR colour type and fail
//! with [`DecodeError::MissingHeader`] if no IHDR has been seen yet, or
//! [`DecodeError::RejectedHeader`] if the only IHDR failed to decode.
//! hIST, and tRNS on indexed images, are sized by the palette and fail with
//! [`DecodeError::MissingPalette`] before a PLTE.

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

use crate::context::*;
use crate::kind::ChunkKind;

const MAX_KEYWORD_LEN: usize = 79;
const MAX_PALETTE_ENTRIES: usize = 256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{kind}: invalid length {actual}, expected {expected}")]
    BadLength { kind: ChunkKind, expected: usize, actual: usize },
    #[error("{0}: chunk appears before IHDR")]
    MissingHeader(ChunkKind),
    #[error("{0}: IHDR was present but could not be decoded")]
    RejectedHeader(ChunkKind),
    #[error("{0}: chunk appears before PLTE")]
    MissingPalette(ChunkKind),
    #[error("{kind}: {reason}")]
    Malformed { kind: ChunkKind, reason: String },
}

fn malformed(kind: ChunkKind, reason: impl Into<String>) -> DecodeError {
    DecodeError::Malformed { kind, reason: reason.into() }
}

fn expect_len(kind: ChunkKind, data: &[u8], expected: usize) -> Result<(), DecodeError> {
    if data.len() != expected {
        return Err(DecodeError::BadLength { kind, expected, actual: data.len() });
    }
    Ok(())
}

fn colour_type(ctx: &PngContext, kind: ChunkKind) -> Result<ColourType, DecodeError> {
    let ihdr = match &ctx.ihdr {
        Some(ihdr) => ihdr,
        None if ctx.ihdr_rejected => return Err(DecodeError::RejectedHeader(kind)),
        None => return Err(DecodeError::MissingHeader(kind)),
    };
    ihdr.colour()
        .ok_or_else(|| malformed(kind, format!("unusable IHDR colour type {}", ihdr.colour_type)))
}

fn palette_len(ctx: &PngContext, kind: ChunkKind) -> Result<usize, DecodeError> {
    ctx.palette_len().ok_or(DecodeError::MissingPalette(kind))
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Split a null-terminated keyword off the front of `data`.
fn keyword(kind: ChunkKind, data: &[u8]) -> Result<(String, &[u8]), DecodeError> {
    let nul = data
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| malformed(kind, "missing null separator"))?;
    if nul == 0 || nul > MAX_KEYWORD_LEN {
        return Err(malformed(kind, format!("invalid keyword length {nul}")));
    }
    Ok((latin1(&data[..nul]), &data[nul + 1..]))
}

/// Decode `data` as a `kind` chunk into `ctx`. Kinds without a payload
/// layout here (IDAT, IEND, iCCP, iTXt, zTXt) are accepted as is.
pub fn decode(ctx: &mut PngContext, kind: ChunkKind, data: &[u8]) -> Result<(), DecodeError> {
    match kind {
        ChunkKind::IHDR => match decode_ihdr(data) {
            Ok(ihdr) => {
                ctx.ihdr = Some(ihdr);
                ctx.ihdr_rejected = false;
            }
            Err(e) => {
                ctx.ihdr_rejected = true;
                return Err(e);
            }
        },
        ChunkKind::PLTE => ctx.plte = Some(decode_plte(data)?),
        ChunkKind::tRNS => ctx.trns = Some(decode_trns(ctx, data)?),
        ChunkKind::cHRM => ctx.chrm = Some(decode_chrm(data)?),
        ChunkKind::gAMA => {
            expect_len(kind, data, 4)?;
            ctx.gama = Some(Gama(BigEndian::read_u32(data)));
        }
        ChunkKind::sBIT => ctx.sbit = Some(decode_sbit(ctx, data)?),
        ChunkKind::sRGB => {
            expect_len(kind, data, 1)?;
            ctx.srgb = Some(Srgb { intent: data[0] });
        }
        ChunkKind::tEXt => {
            let (keyword, rest) = keyword(kind, data)?;
            ctx.text.push(Text { keyword, text: latin1(rest) });
        }
        ChunkKind::bKGD => ctx.bkgd = Some(decode_bkgd(ctx, data)?),
        ChunkKind::hIST => ctx.hist = Some(decode_hist(ctx, data)?),
        ChunkKind::pHYs => {
            expect_len(kind, data, 9)?;
            ctx.phys = Some(Phys {
                ppu_x: BigEndian::read_u32(&data[0..4]),
                ppu_y: BigEndian::read_u32(&data[4..8]),
                unit: data[8],
            });
        }
        ChunkKind::sPLT => {
            let splt = decode_splt(data)?;
            ctx.splt.push(splt);
        }
        ChunkKind::tIME => {
            expect_len(kind, data, 7)?;
            ctx.time = Some(Time {
                year: BigEndian::read_u16(&data[0..2]),
                month: data[2],
                day: data[3],
                hour: data[4],
                minute: data[5],
                second: data[6],
            });
        }
        ChunkKind::IDAT
        | ChunkKind::IEND
        | ChunkKind::iCCP
        | ChunkKind::iTXt
        | ChunkKind::zTXt => {}
    }
    Ok(())
}

fn decode_ihdr(data: &[u8]) -> Result<Ihdr, DecodeError> {
    expect_len(ChunkKind::IHDR, data, 13)?;
    Ok(Ihdr {
        width: BigEndian::read_u32(&data[0..4]),
        height: BigEndian::read_u32(&data[4..8]),
        bit_depth: data[8],
        colour_type: data[9],
        compression: data[10],
        filter: data[11],
        interlace: data[12],
    })
}

fn decode_plte(data: &[u8]) -> Result<Plte, DecodeError> {
    if data.is_empty() || data.len() % 3 != 0 || data.len() / 3 > MAX_PALETTE_ENTRIES {
        return Err(malformed(ChunkKind::PLTE, format!("invalid length {}", data.len())));
    }
    let entries = data
        .chunks_exact(3)
        .map(|c| Rgb8 { red: c[0], green: c[1], blue: c[2] })
        .collect();
    Ok(Plte { entries })
}

fn decode_trns(ctx: &PngContext, data: &[u8]) -> Result<Trns, DecodeError> {
    let kind = ChunkKind::tRNS;
    match colour_type(ctx, kind)? {
        ColourType::Greyscale => {
            expect_len(kind, data, 2)?;
            Ok(Trns::Grey(BigEndian::read_u16(data)))
        }
        ColourType::Truecolour => {
            expect_len(kind, data, 6)?;
            Ok(Trns::Rgb {
                red: BigEndian::read_u16(&data[0..2]),
                green: BigEndian::read_u16(&data[2..4]),
                blue: BigEndian::read_u16(&data[4..6]),
            })
        }
        ColourType::Indexed => {
            let entries = palette_len(ctx, kind)?;
            if data.len() > entries {
                return Err(malformed(
                    kind,
                    format!("{} alpha values for {entries} palette entries", data.len()),
                ));
            }
            Ok(Trns::Palette(data.to_vec()))
        }
        other => Err(malformed(kind, format!("not allowed for colour type {}", other.name()))),
    }
}

fn decode_chrm(data: &[u8]) -> Result<Chrm, DecodeError> {
    expect_len(ChunkKind::cHRM, data, 32)?;
    let mut v = [0u32; 8];
    BigEndian::read_u32_into(data, &mut v);
    Ok(Chrm {
        white_x: v[0],
        white_y: v[1],
        red_x: v[2],
        red_y: v[3],
        green_x: v[4],
        green_y: v[5],
        blue_x: v[6],
        blue_y: v[7],
    })
}

fn decode_sbit(ctx: &PngContext, data: &[u8]) -> Result<Sbit, DecodeError> {
    let kind = ChunkKind::sBIT;
    Ok(match colour_type(ctx, kind)? {
        ColourType::Greyscale => {
            expect_len(kind, data, 1)?;
            Sbit::Greyscale(data[0])
        }
        ColourType::GreyscaleAlpha => {
            expect_len(kind, data, 2)?;
            Sbit::GreyscaleAlpha { grey: data[0], alpha: data[1] }
        }
        ColourType::Truecolour | ColourType::Indexed => {
            expect_len(kind, data, 3)?;
            Sbit::Colour { red: data[0], green: data[1], blue: data[2] }
        }
        ColourType::TruecolourAlpha => {
            expect_len(kind, data, 4)?;
            Sbit::ColourAlpha { red: data[0], green: data[1], blue: data[2], alpha: data[3] }
        }
    })
}

fn decode_bkgd(ctx: &PngContext, data: &[u8]) -> Result<Bkgd, DecodeError> {
    let kind = ChunkKind::bKGD;
    Ok(match colour_type(ctx, kind)? {
        ColourType::Greyscale | ColourType::GreyscaleAlpha => {
            expect_len(kind, data, 2)?;
            Bkgd::Greyscale(BigEndian::read_u16(data))
        }
        ColourType::Truecolour | ColourType::TruecolourAlpha => {
            expect_len(kind, data, 6)?;
            Bkgd::Rgb {
                red: BigEndian::read_u16(&data[0..2]),
                green: BigEndian::read_u16(&data[2..4]),
                blue: BigEndian::read_u16(&data[4..6]),
            }
        }
        ColourType::Indexed => {
            expect_len(kind, data, 1)?;
            Bkgd::PaletteIndex(data[0])
        }
    })
}

fn decode_hist(ctx: &PngContext, data: &[u8]) -> Result<Hist, DecodeError> {
    let kind = ChunkKind::hIST;
    let entries = palette_len(ctx, kind)?;
    expect_len(kind, data, entries * 2)?;
    Ok(Hist { frequencies: data.chunks_exact(2).map(BigEndian::read_u16).collect() })
}

fn decode_splt(data: &[u8]) -> Result<Splt, DecodeError> {
    let kind = ChunkKind::sPLT;
    let (name, rest) = keyword(kind, data)?;
    let (&sample_depth, body) = rest
        .split_first()
        .ok_or_else(|| malformed(kind, "missing sample depth"))?;
    let entry_size = match sample_depth {
        8 => 6,
        16 => 10,
        d => return Err(malformed(kind, format!("invalid sample depth {d}"))),
    };
    if body.len() % entry_size != 0 {
        return Err(malformed(
            kind,
            format!("{} bytes of entries is not a multiple of {entry_size}", body.len()),
        ));
    }
    let entries = body
        .chunks_exact(entry_size)
        .map(|e| {
            if sample_depth == 8 {
                SpltEntry::Depth8 {
                    red: e[0],
                    green: e[1],
                    blue: e[2],
                    alpha: e[3],
                    frequency: BigEndian::read_u16(&e[4..6]),
                }
            } else {
                SpltEntry::Depth16 {
                    red: BigEndian::read_u16(&e[0..2]),
                    green: BigEndian::read_u16(&e[2..4]),
                    blue: BigEndian::read_u16(&e[4..6]),
                    alpha: BigEndian::read_u16(&e[6..8]),
                    frequency: BigEndian::read_u16(&e[8..10]),
                }
            }
        })
        .collect();
    Ok(Splt { name, sample_depth, entries })
}
