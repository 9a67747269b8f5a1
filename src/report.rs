//! Human-readable chunk reports.
//!
//! Each report reads the slot its decoder just filled, checks field ranges,
//! and writes one line per field to `out`. Range violations go to `diag`
//! as warnings and never stop the report, except for an unknown sRGB
//! rendering intent which has nothing printable.

use std::io::{self, Write};

use crate::context::*;
use crate::kind::ChunkKind;

/// Fixed-point scale of cHRM and gAMA values.
const FIXED_POINT_SCALE: f64 = 100_000.0;

pub fn report<O: Write, E: Write>(
    ctx: &PngContext,
    kind: ChunkKind,
    out: &mut O,
    diag: &mut E,
) -> io::Result<()> {
    match kind {
        ChunkKind::IHDR => report_ihdr(ctx, out, diag),
        ChunkKind::PLTE => report_plte(ctx, out),
        ChunkKind::tRNS => report_trns(ctx, out),
        ChunkKind::cHRM => report_chrm(ctx, out),
        ChunkKind::gAMA => report_gama(ctx, out, diag),
        ChunkKind::sBIT => report_sbit(ctx, out),
        ChunkKind::sRGB => report_srgb(ctx, out, diag),
        ChunkKind::tEXt => report_text(ctx, out),
        ChunkKind::bKGD => report_bkgd(ctx, out, diag),
        ChunkKind::hIST => report_hist(ctx, out),
        ChunkKind::pHYs => report_phys(ctx, out, diag),
        ChunkKind::sPLT => report_splt(ctx, out),
        ChunkKind::tIME => report_time(ctx, out, diag),
        ChunkKind::IDAT
        | ChunkKind::IEND
        | ChunkKind::iCCP
        | ChunkKind::iTXt
        | ChunkKind::zTXt => Ok(()),
    }
}

/// "1, 2, 4 or 8"
fn depth_list(depths: &[u8]) -> String {
    match depths.split_last() {
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => {
            let head: Vec<String> = rest.iter().map(u8::to_string).collect();
            format!("{} or {last}", head.join(", "))
        }
        None => String::new(),
    }
}

fn enum_name(name: Option<&'static str>, raw: u8) -> String {
    match name {
        Some(n) => n.to_string(),
        None => format!("invalid ({raw})"),
    }
}

fn report_ihdr<O: Write, E: Write>(ctx: &PngContext, out: &mut O, diag: &mut E) -> io::Result<()> {
    let Some(h) = &ctx.ihdr else { return Ok(()) };

    if h.width == 0 {
        writeln!(diag, "IHDR: Invalid width 0")?;
    }
    if h.height == 0 {
        writeln!(diag, "IHDR: Invalid height 0")?;
    }
    match h.colour() {
        Some(ct) => {
            let allowed = ct.allowed_bit_depths();
            if !allowed.contains(&h.bit_depth) {
                writeln!(
                    diag,
                    "IHDR: Invalid bit depth {}, should be {}",
                    h.bit_depth,
                    depth_list(allowed)
                )?;
            }
        }
        None => writeln!(diag, "IHDR: Invalid colour type {}", h.colour_type)?,
    }
    if h.compression != COMPRESSION_DEFLATE {
        writeln!(diag, "IHDR: Invalid compression type {}", h.compression)?;
    }
    if h.filter != FILTER_ADAPTIVE {
        writeln!(diag, "IHDR: Invalid filter type {}", h.filter)?;
    }
    if h.interlace != INTERLACE_NONE && h.interlace != INTERLACE_ADAM7 {
        writeln!(diag, "IHDR: Invalid interlace method {}", h.interlace)?;
    }

    let compression = (h.compression == COMPRESSION_DEFLATE).then_some("deflate");
    let filter = (h.filter == FILTER_ADAPTIVE).then_some("adaptive");
    let interlace = match h.interlace {
        INTERLACE_NONE => Some("standard"),
        INTERLACE_ADAM7 => Some("adam7"),
        _ => None,
    };
    writeln!(out, "IHDR: width: {}", h.width)?;
    writeln!(out, "IHDR: height: {}", h.height)?;
    writeln!(out, "IHDR: bitdepth: {}", h.bit_depth)?;
    writeln!(
        out,
        "IHDR: colourtype: {}",
        enum_name(h.colour().map(ColourType::name), h.colour_type)
    )?;
    writeln!(out, "IHDR: compression: {}", enum_name(compression, h.compression))?;
    writeln!(out, "IHDR: filter: {}", enum_name(filter, h.filter))?;
    writeln!(out, "IHDR: interlace method: {}", enum_name(interlace, h.interlace))?;
    Ok(())
}

fn report_plte<O: Write>(ctx: &PngContext, out: &mut O) -> io::Result<()> {
    let Some(plte) = &ctx.plte else { return Ok(()) };
    writeln!(out, "PLTE: {} entries", plte.entries.len())?;
    for (i, e) in plte.entries.iter().enumerate() {
        writeln!(out, "PLTE: entry {i}: 0x{:02x}{:02x}{:02x}", e.red, e.green, e.blue)?;
    }
    Ok(())
}

fn report_trns<O: Write>(ctx: &PngContext, out: &mut O) -> io::Result<()> {
    match &ctx.trns {
        Some(Trns::Grey(grey)) => writeln!(out, "tRNS: gray: {grey}")?,
        Some(Trns::Rgb { red, green, blue }) => {
            writeln!(out, "tRNS: red: {red}")?;
            writeln!(out, "tRNS: green: {green}")?;
            writeln!(out, "tRNS: blue: {blue}")?;
        }
        Some(Trns::Palette(alphas)) => {
            // Entries past the end of the chunk are fully opaque.
            for i in 0..ctx.palette_len().unwrap_or(alphas.len()) {
                let alpha = alphas.get(i).copied().unwrap_or(u8::MAX);
                writeln!(out, "tRNS: palette index {i}: {alpha}")?;
            }
        }
        None => {}
    }
    Ok(())
}

fn report_chrm<O: Write>(ctx: &PngContext, out: &mut O) -> io::Result<()> {
    let Some(c) = &ctx.chrm else { return Ok(()) };
    let fields = [
        ("white point x", c.white_x),
        ("white point y", c.white_y),
        ("red x", c.red_x),
        ("red y", c.red_y),
        ("green x", c.green_x),
        ("green y", c.green_y),
        ("blue x", c.blue_x),
        ("blue y", c.blue_y),
    ];
    for (label, raw) in fields {
        writeln!(out, "cHRM: {label}: {:.6}", raw as f64 / FIXED_POINT_SCALE)?;
    }
    Ok(())
}

fn report_gama<O: Write, E: Write>(ctx: &PngContext, out: &mut O, diag: &mut E) -> io::Result<()> {
    let Some(Gama(raw)) = ctx.gama else { return Ok(()) };
    if raw == 0 {
        writeln!(diag, "gAMA: invalid value of 0")?;
    }
    writeln!(out, "gAMA: image gamma: {:.6}", raw as f64 / FIXED_POINT_SCALE)
}

fn report_sbit<O: Write>(ctx: &PngContext, out: &mut O) -> io::Result<()> {
    let Some(sbit) = ctx.sbit else { return Ok(()) };
    let fields: Vec<(&str, u8)> = match sbit {
        Sbit::Greyscale(grey) => vec![("greyscale", grey)],
        Sbit::GreyscaleAlpha { grey, alpha } => vec![("greyscale", grey), ("alpha", alpha)],
        Sbit::Colour { red, green, blue } => vec![("red", red), ("green", green), ("blue", blue)],
        Sbit::ColourAlpha { red, green, blue, alpha } => {
            vec![("red", red), ("green", green), ("blue", blue), ("alpha", alpha)]
        }
    };
    for (channel, bits) in fields {
        writeln!(out, "sBIT: significant {channel} bits: {bits}")?;
    }
    Ok(())
}

fn report_srgb<O: Write, E: Write>(ctx: &PngContext, out: &mut O, diag: &mut E) -> io::Result<()> {
    let Some(srgb) = ctx.srgb else { return Ok(()) };
    match RenderingIntent::from_u8(srgb.intent) {
        Some(intent) => writeln!(out, "sRGB: rendering intent: {}", intent.name()),
        None => writeln!(diag, "sRGB: invalid rendering intent value {}", srgb.intent),
    }
}

fn report_text<O: Write>(ctx: &PngContext, out: &mut O) -> io::Result<()> {
    let Some(text) = ctx.text.last() else { return Ok(()) };
    writeln!(out, "tEXt: {}: {}", text.keyword, text.text)
}

fn report_bkgd<O: Write, E: Write>(ctx: &PngContext, out: &mut O, diag: &mut E) -> io::Result<()> {
    match ctx.bkgd {
        Some(Bkgd::Greyscale(grey)) => writeln!(out, "bKGD: greyscale {grey}")?,
        Some(Bkgd::Rgb { red, green, blue }) => {
            writeln!(out, "bKGD: rgb value 0x{red:04x}{green:04x}{blue:04x}")?
        }
        Some(Bkgd::PaletteIndex(index)) => {
            if let Some(entries) = ctx.palette_len() {
                if index as usize >= entries {
                    writeln!(
                        diag,
                        "bKGD: palette index {index} out of range, palette has {entries} entries"
                    )?;
                }
            }
            writeln!(out, "bKGD: palette index {index}")?;
        }
        None => {}
    }
    Ok(())
}

fn report_hist<O: Write>(ctx: &PngContext, out: &mut O) -> io::Result<()> {
    let Some(hist) = &ctx.hist else { return Ok(()) };
    writeln!(out, "hIST: {} entries", hist.frequencies.len())?;
    for (i, freq) in hist.frequencies.iter().enumerate() {
        writeln!(out, "hIST: entry {i}: {freq}")?;
    }
    Ok(())
}

fn report_phys<O: Write, E: Write>(ctx: &PngContext, out: &mut O, diag: &mut E) -> io::Result<()> {
    let Some(phys) = ctx.phys else { return Ok(()) };
    let unit = match phys.unit {
        UNIT_UNKNOWN => Some("unknown"),
        UNIT_METRE => Some("metre"),
        other => {
            writeln!(diag, "pHYs: invalid unit specifier {other}")?;
            None
        }
    };
    writeln!(out, "pHYs: pixel per unit, X axis: {}", phys.ppu_x)?;
    writeln!(out, "pHYs: pixel per unit, Y axis: {}", phys.ppu_y)?;
    writeln!(out, "pHYs: unit specifier: {}", enum_name(unit, phys.unit))
}

/// Every suggested palette seen so far is reported, not just the newest.
fn report_splt<O: Write>(ctx: &PngContext, out: &mut O) -> io::Result<()> {
    for splt in &ctx.splt {
        writeln!(out, "sPLT: palette name: {}", splt.name)?;
        writeln!(out, "sPLT: sample depth: {}", splt.sample_depth)?;
        writeln!(out, "sPLT: {} entries", splt.entries.len())?;
        for (i, entry) in splt.entries.iter().enumerate() {
            match *entry {
                SpltEntry::Depth8 { red, green, blue, alpha, frequency } => writeln!(
                    out,
                    "sPLT: entry {i:3}: red: 0x{red:02X}, green 0x{green:02X}, \
                     blue: 0x{blue:02X}, alpha: 0x{alpha:02X}, frequency: {frequency}"
                )?,
                SpltEntry::Depth16 { red, green, blue, alpha, frequency } => writeln!(
                    out,
                    "sPLT: entry {i:3}: red: 0x{red:04X}, green 0x{green:04X}, \
                     blue: 0x{blue:04X}, alpha: 0x{alpha:04X}, frequency: {frequency}"
                )?,
            }
        }
    }
    Ok(())
}

fn report_time<O: Write, E: Write>(ctx: &PngContext, out: &mut O, diag: &mut E) -> io::Result<()> {
    let Some(t) = ctx.time else { return Ok(()) };
    // Day is checked against 31 for every month; no calendar check.
    if t.month == 0 || t.month > 12 {
        writeln!(diag, "tIME: invalid month value")?;
    }
    if t.day == 0 || t.day > 31 {
        writeln!(diag, "tIME: invalid day value")?;
    }
    if t.hour > 23 {
        writeln!(diag, "tIME: invalid hour value")?;
    }
    if t.minute > 59 {
        writeln!(diag, "tIME: invalid minute value")?;
    }
    if t.second > 60 {
        writeln!(diag, "tIME: invalid second value")?;
    }
    writeln!(
        out,
        "tIME: {}-{}-{} {}:{}:{}",
        t.year, t.month, t.day, t.hour, t.minute, t.second
    )
}
