use super::*;

use miniz_oxide::deflate::compress_to_vec_zlib;

fn png_bytes(ihdr: &[u8], chunks: &[(ChunkType, &[u8])]) -> Vec<u8> {
  let mut out = PNG_SIGNATURE.to_vec();
  write_chunk(&mut out, ChunkType::IHDR, ihdr).unwrap();
  for (chunk_type, data) in chunks {
    write_chunk(&mut out, *chunk_type, data).unwrap();
  }
  write_chunk(&mut out, ChunkType::IEND, &[]).unwrap();
  out
}

fn ihdr(width: u32, height: u32, layout: PixelLayout, is_interlaced: bool) -> [u8; Header::LEN] {
  Header { width, height, layout, is_interlaced }.to_bytes()
}

fn decode_bytes(png: &[u8]) -> PngResult<DecodedImage> {
  decode(SliceSource::new(png))
}

#[test]
fn test_decode_gray1_with_filters() {
  let lines = [0, 0b1011_0000, 2, 0b0000_0000];
  let png = png_bytes(
    &ihdr(5, 2, PixelLayout::Y1, false),
    &[(ChunkType::IDAT, &compress_to_vec_zlib(&lines, 6))],
  );
  let image = decode_bytes(&png).unwrap();
  assert_eq!(image.format, ImageFormat::RGBA);
  let ys: Vec<u8> = image.as_rgba().unwrap().iter().map(|p| p.r).collect();
  assert_eq!(ys, [255, 0, 255, 255, 0, 255, 0, 255, 255, 0]);
}

#[test]
fn test_decode_interlaced_1x1() {
  let png = png_bytes(
    &ihdr(1, 1, PixelLayout::RGBA8, true),
    &[(ChunkType::IDAT, &compress_to_vec_zlib(&[0, 1, 2, 3, 4], 6))],
  );
  let image = decode_bytes(&png).unwrap();
  assert_eq!(image.get_rgba(0, 0), Some(RGBA8 { r: 1, g: 2, b: 3, a: 4 }));
}

#[test]
fn test_decode_split_idat() {
  let zlib = compress_to_vec_zlib(&[0, 9, 8, 7], 6);
  let (a, b) = zlib.split_at(zlib.len() / 2);
  let png = png_bytes(
    &ihdr(1, 1, PixelLayout::RGB8, false),
    &[(ChunkType::IDAT, a), (ChunkType(*b"teXt"), b"x"), (ChunkType::IDAT, b)],
  );
  assert_eq!(decode_bytes(&png).unwrap().get_rgba(0, 0), Some(RGBA8 { r: 9, g: 8, b: 7, a: 255 }));
}

#[test]
fn test_crc_strict_and_relaxed() {
  let mut png = png_bytes(
    &ihdr(1, 1, PixelLayout::Y8, false),
    &[(ChunkType::IDAT, &compress_to_vec_zlib(&[0, 77], 6))],
  );
  // corrupt the IEND crc
  let last = png.len() - 1;
  png[last] ^= 0xFF;
  assert!(decode_bytes(&png).is_ok());
  let strict = DecodeSettings { verify_crc: true, ..DecodeSettings::default() };
  assert_eq!(decode_with(SliceSource::new(&png), &strict), Err(PngError::ChecksumMismatch));
  png[last] ^= 0xFF;
  assert!(decode_with(SliceSource::new(&png), &strict).is_ok());
}

#[test]
fn test_bad_adler32_in_both_modes() {
  let strict = DecodeSettings { verify_crc: true, ..DecodeSettings::default() };
  for level in [0, 6] {
    let mut zlib = compress_to_vec_zlib(&[0, 1, 2, 0, 3, 4], level);
    let last = zlib.len() - 1;
    zlib[last] ^= 0xFF;
    let header = ihdr(2, 2, PixelLayout::Y8, false);
    // the chunk CRCs are all good, only the zlib trailer is wrong
    let one_idat = png_bytes(&header, &[(ChunkType::IDAT, &zlib)]);
    let (body, trailer) = zlib.split_at(zlib.len() - 4);
    let split_idat = png_bytes(&header, &[(ChunkType::IDAT, body), (ChunkType::IDAT, trailer)]);
    for png in [one_idat, split_idat] {
      assert_eq!(decode_bytes(&png), Err(PngError::DecompressionFailure));
      assert_eq!(decode_with(SliceSource::new(&png), &strict), Err(PngError::ChecksumMismatch));
    }
  }
}

#[test]
fn test_indexed_needs_palette() {
  let idat = compress_to_vec_zlib(&[0, 0], 6);
  let png = png_bytes(&ihdr(1, 1, PixelLayout::I8, false), &[(ChunkType::IDAT, &idat)]);
  assert_eq!(decode_bytes(&png), Err(PngError::MissingPalette));
  let png = png_bytes(
    &ihdr(1, 1, PixelLayout::I8, false),
    &[(ChunkType::PLTE, &[1, 2, 3]), (ChunkType::IDAT, &idat)],
  );
  assert_eq!(decode_bytes(&png).unwrap().get_rgba(0, 0), Some(RGBA8 { r: 1, g: 2, b: 3, a: 255 }));
}

#[test]
fn test_palette_ignored_for_truecolor() {
  let png = png_bytes(
    &ihdr(1, 1, PixelLayout::RGB8, false),
    &[(ChunkType::PLTE, &[1, 2, 3, 4]), (ChunkType::IDAT, &compress_to_vec_zlib(&[0, 5, 6, 7], 6))],
  );
  assert!(decode_bytes(&png).is_ok());
}

#[test]
fn test_missing_idat_or_iend() {
  let png = png_bytes(&ihdr(1, 1, PixelLayout::Y8, false), &[]);
  assert_eq!(decode_bytes(&png), Err(PngError::TruncatedStream));
  let png = png_bytes(
    &ihdr(1, 1, PixelLayout::Y8, false),
    &[(ChunkType::IDAT, &compress_to_vec_zlib(&[0, 1], 6))],
  );
  assert_eq!(decode_bytes(&png[..png.len() - 12]), Err(PngError::TruncatedStream));
}

#[test]
fn test_inflated_length_checks() {
  let header = ihdr(2, 2, PixelLayout::Y8, false);
  // one line short
  let png = png_bytes(&header, &[(ChunkType::IDAT, &compress_to_vec_zlib(&[0, 1, 2], 6))]);
  assert_eq!(decode_bytes(&png), Err(PngError::TruncatedStream));
  // one line extra is tolerated
  let lines = [0, 1, 2, 0, 3, 4, 0, 5, 6];
  let png = png_bytes(&header, &[(ChunkType::IDAT, &compress_to_vec_zlib(&lines, 6))]);
  let ys: Vec<u8> = decode_bytes(&png).unwrap().as_rgba().unwrap().iter().map(|p| p.r).collect();
  assert_eq!(ys, [1, 2, 3, 4]);
  // not zlib at all
  let png = png_bytes(&header, &[(ChunkType::IDAT, &[1, 2, 3, 4, 5, 6])]);
  assert_eq!(decode_bytes(&png), Err(PngError::DecompressionFailure));
}

#[test]
fn test_invalid_filter_byte() {
  let png = png_bytes(
    &ihdr(1, 1, PixelLayout::Y8, false),
    &[(ChunkType::IDAT, &compress_to_vec_zlib(&[5, 1], 6))],
  );
  assert_eq!(decode_bytes(&png), Err(PngError::InvalidFilter));
}

#[test]
fn test_unsupported_format_before_idat() {
  let mut header = ihdr(1, 1, PixelLayout::I8, false);
  header[8] = 16;
  // the IDAT is garbage, and never looked at
  let png = png_bytes(&header, &[(ChunkType::IDAT, &[0xFF; 7])]);
  assert_eq!(decode_bytes(&png), Err(PngError::UnsupportedFormat));
  assert_eq!(decode_info(SliceSource::new(&png)), Err(PngError::UnsupportedFormat));
}

#[test]
fn test_decode_info_rewinds() {
  let png = encode_to_vec(&[1, 2, 3], 1, 1, ImageFormat::RGB).unwrap();
  let mut src = SliceSource::new(&png);
  let info = decode_info(&mut src).unwrap();
  assert_eq!(info.format, ImageFormat::RGB);
  assert_eq!((info.width, info.height), (1, 1));
  assert_eq!(src.tell(), Ok(0));
  let image = decode(&mut src).unwrap();
  assert_eq!(image.get_rgba(0, 0), Some(RGBA8 { r: 1, g: 2, b: 3, a: 255 }));
}

#[test]
fn test_decode_info_errors() {
  assert_eq!(decode_info(SliceSource::new(b"not a png at all")), Err(PngError::InvalidSignature));
  assert_eq!(decode_info(SliceSource::new(&PNG_SIGNATURE[..5])), Err(PngError::TruncatedStream));
  let mut png = PNG_SIGNATURE.to_vec();
  write_chunk(&mut png, ChunkType::IDAT, &[0; 13]).unwrap();
  assert_eq!(decode_info(SliceSource::new(&png)), Err(PngError::InvalidHeader));
}
