use pnginfo::{
    inspect, ChunkError, ChunkKind, ChunkWriter, InspectError, InspectSummary, Options, RunMode,
    SignatureMode,
};
use std::io::Cursor;

const IHDR_RGB8: [u8; 13] = [0, 0, 0, 1, 0, 0, 0, 1, 8, 2, 0, 0, 0];

fn png(chunks: &[(&[u8; 4], &[u8])]) -> Vec<u8> {
    let mut w = ChunkWriter::new(Vec::new());
    w.write_signature().unwrap();
    for (tag, data) in chunks {
        w.write_chunk(tag, data).unwrap();
    }
    w.into_inner()
}

type Outcome = (Result<InspectSummary, InspectError>, String, String);

fn run(bytes: Vec<u8>, options: Options) -> Outcome {
    let (mut out, mut diag) = (Vec::new(), Vec::new());
    let res = inspect(Cursor::new(bytes), &options, &mut out, &mut diag);
    (res, String::from_utf8(out).unwrap(), String::from_utf8(diag).unwrap())
}

fn filter(kind: ChunkKind) -> Options {
    Options { mode: RunMode::Filter(kind), ..Options::default() }
}

#[test]
fn test_minimal_stream_lists_two_chunks() {
    let bytes = png(&[(b"IHDR", &IHDR_RGB8), (b"IEND", &[])]);
    let (res, out, diag) = run(bytes, Options::default());
    let summary = res.unwrap();
    assert_eq!(out, "IHDR\nIEND\n");
    assert!(diag.is_empty());
    assert_eq!(summary.chunks, 2);
    assert_eq!(summary.signature_offset, 0);
}

#[test]
fn test_list_classifies_unknown_chunks() {
    let bytes = png(&[
        (b"IHDR", &IHDR_RGB8),
        (b"prVt", &[1, 2, 3]),
        (b"PUBL", &[]),
        (b"IDAT", &[0; 16]),
        (b"IEND", &[]),
    ]);
    let (res, out, _) = run(bytes, Options::default());
    res.unwrap();
    assert_eq!(
        out,
        "IHDR\nprVt (unknown private chunk)\nPUBL (unknown public chunk)\nIDAT\nIEND\n"
    );
}

#[test]
fn test_stops_at_iend() {
    let mut bytes = png(&[(b"IHDR", &IHDR_RGB8), (b"IEND", &[])]);
    bytes.extend_from_slice(b"trailing junk that is not a chunk");
    let (res, out, _) = run(bytes, Options::default());
    assert_eq!(res.unwrap().chunks, 2);
    assert_eq!(out.lines().count(), 2);
}

#[test]
fn test_missing_iend_is_fatal_but_keeps_output() {
    let bytes = png(&[(b"IHDR", &IHDR_RGB8)]);
    let (res, out, _) = run(bytes, Options::default());
    assert!(matches!(res, Err(InspectError::Chunk(ChunkError::Truncated(_)))));
    assert_eq!(out, "IHDR\n");
}

#[test]
fn test_bad_signature() {
    let mut bytes = png(&[(b"IEND", &[])]);
    bytes[1] = b'X';
    let (res, out, _) = run(bytes, Options::default());
    assert!(matches!(res, Err(InspectError::Chunk(ChunkError::NotPng))));
    assert!(out.is_empty());
}

#[test]
fn test_scan_finds_embedded_png() {
    let mut bytes = b"\x00\x01some outer container header".to_vec();
    let offset = bytes.len() as u64;
    bytes.extend(png(&[(b"IHDR", &IHDR_RGB8), (b"IEND", &[])]));

    let (res, _, _) = run(bytes.clone(), Options::default());
    assert!(res.is_err());

    let opts = Options { signature: SignatureMode::Scan, ..Options::default() };
    let (res, out, _) = run(bytes, opts);
    assert_eq!(res.unwrap().signature_offset, offset);
    assert_eq!(out, "IHDR\nIEND\n");
}

#[test]
fn test_filter_reports_only_selected_kind() {
    let bytes = png(&[
        (b"IHDR", &IHDR_RGB8),
        (b"gAMA", &45455u32.to_be_bytes()),
        (b"tEXt", b"Software\0pnginfo"),
        (b"zzZZ", &[]),
        (b"IDAT", &[0; 4]),
        (b"tEXt", b"Comment\0second"),
        (b"IEND", &[]),
    ]);
    let (res, out, diag) = run(bytes.clone(), filter(ChunkKind::gAMA));
    res.unwrap();
    assert_eq!(out, "gAMA: image gamma: 0.454550\n");
    assert!(diag.is_empty());

    let (res, out, _) = run(bytes, filter(ChunkKind::tEXt));
    res.unwrap();
    assert_eq!(out, "tEXt: Software: pnginfo\ntEXt: Comment: second\n");
}

#[test]
fn test_filter_uses_header_from_earlier_chunk() {
    let bytes = png(&[
        (b"IHDR", &[0, 0, 0, 2, 0, 0, 0, 2, 8, 6, 0, 0, 0]),
        (b"sBIT", &[5, 6, 7, 8]),
        (b"IEND", &[]),
    ]);
    let (res, out, _) = run(bytes, filter(ChunkKind::sBIT));
    res.unwrap();
    assert_eq!(
        out,
        "sBIT: significant red bits: 5\nsBIT: significant green bits: 6\n\
         sBIT: significant blue bits: 7\nsBIT: significant alpha bits: 8\n"
    );
}

#[test]
fn test_mode_dependent_chunk_before_header_warns() {
    let bytes = png(&[(b"bKGD", &[0, 1]), (b"IHDR", &IHDR_RGB8), (b"IEND", &[])]);
    let (res, out, diag) = run(bytes, filter(ChunkKind::bKGD));
    res.unwrap();
    assert!(out.is_empty());
    assert_eq!(diag, "bKGD: chunk appears before IHDR\n");
}

#[test]
fn test_undecodable_header_is_reported_as_such() {
    let bytes = png(&[(b"IHDR", &[0, 0, 0, 1, 0, 0]), (b"bKGD", &[0, 1]), (b"IEND", &[])]);
    let (res, out, diag) = run(bytes, filter(ChunkKind::bKGD));
    res.unwrap();
    assert!(out.is_empty());
    assert_eq!(diag, "bKGD: IHDR was present but could not be decoded\n");
}

#[test]
fn test_every_suggested_palette_is_reported() {
    let bytes = png(&[
        (b"IHDR", &IHDR_RGB8),
        (b"sPLT", b"one\0\x08\x01\x02\x03\x04\x00\x05"),
        (b"sPLT", b"two\0\x08"),
        (b"IEND", &[]),
    ]);
    let (res, out, diag) = run(bytes, filter(ChunkKind::sPLT));
    res.unwrap();
    assert!(diag.is_empty());
    assert_eq!(out.matches("sPLT: palette name: one").count(), 2);
    assert_eq!(out.matches("sPLT: palette name: two").count(), 1);
    assert_eq!(
        out,
        "sPLT: palette name: one\nsPLT: sample depth: 8\nsPLT: 1 entries\n\
         sPLT: entry   0: red: 0x01, green 0x02, blue: 0x03, alpha: 0x04, frequency: 5\n\
         sPLT: palette name: one\nsPLT: sample depth: 8\nsPLT: 1 entries\n\
         sPLT: entry   0: red: 0x01, green 0x02, blue: 0x03, alpha: 0x04, frequency: 5\n\
         sPLT: palette name: two\nsPLT: sample depth: 8\nsPLT: 0 entries\n"
    );
}

#[test]
fn test_indexed_image_palette_dependencies() {
    let bytes = png(&[
        (b"IHDR", &[0, 0, 0, 2, 0, 0, 0, 2, 2, 3, 0, 0, 0]),
        (b"PLTE", &[255, 0, 0, 0, 255, 0, 0, 0, 255]),
        (b"tRNS", &[0]),
        (b"hIST", &[0, 10, 0, 20, 0, 30]),
        (b"IDAT", &[0; 8]),
        (b"IEND", &[]),
    ]);
    let (res, out, _) = run(bytes.clone(), filter(ChunkKind::PLTE));
    res.unwrap();
    assert_eq!(
        out,
        "PLTE: 3 entries\nPLTE: entry 0: 0xff0000\n\
         PLTE: entry 1: 0x00ff00\nPLTE: entry 2: 0x0000ff\n"
    );

    let (res, out, _) = run(bytes.clone(), filter(ChunkKind::tRNS));
    res.unwrap();
    assert_eq!(out.lines().count(), 3);

    let (res, out, _) = run(bytes, filter(ChunkKind::hIST));
    res.unwrap();
    assert_eq!(out, "hIST: 3 entries\nhIST: entry 0: 10\nhIST: entry 1: 20\nhIST: entry 2: 30\n");
}

#[test]
fn test_semantic_warnings_are_not_fatal() {
    let bytes = png(&[
        (b"IHDR", &[0, 0, 0, 0, 0, 0, 0, 1, 3, 2, 0, 0, 0]),
        (b"IEND", &[]),
    ]);
    let (res, out, diag) = run(bytes, filter(ChunkKind::IHDR));
    res.unwrap();
    assert_eq!(out.lines().count(), 7);
    assert_eq!(diag, "IHDR: Invalid width 0\nIHDR: Invalid bit depth 3, should be 8 or 16\n");
}

#[test]
fn test_decode_error_reported_and_skipped() {
    let bytes = png(&[(b"IHDR", &IHDR_RGB8), (b"tIME", &[1, 2, 3]), (b"IEND", &[])]);
    let (res, out, diag) = run(bytes, filter(ChunkKind::tIME));
    res.unwrap();
    assert!(out.is_empty());
    assert_eq!(diag, "tIME: invalid length 3, expected 7\n");
}

#[test]
fn test_repeated_singleton_last_wins() {
    let bytes = png(&[
        (b"IHDR", &IHDR_RGB8),
        (b"tIME", &[0x07, 0xe2, 1, 1, 0, 0, 0]),
        (b"tIME", &[0x07, 0xe3, 6, 15, 8, 30, 0]),
        (b"IEND", &[]),
    ]);
    let (res, out, _) = run(bytes, filter(ChunkKind::tIME));
    res.unwrap();
    assert_eq!(out, "tIME: 2018-1-1 0:0:0\ntIME: 2019-6-15 8:30:0\n");
}
