use super::*;

use miniz_oxide::deflate::compress_to_vec_zlib;

/// Encodes pixels as a PNG, using the default settings.
#[inline]
pub fn encode<K: ByteSink>(
  pixels: &[u8], width: u32, height: u32, format: ImageFormat, sink: K,
) -> PngResult<()> {
  encode_with(pixels, width, height, format, sink, &EncodeSettings::default())
}

/// Encodes pixels as a PNG into a new byte vector, using the default settings.
#[inline]
pub fn encode_to_vec(
  pixels: &[u8], width: u32, height: u32, format: ImageFormat,
) -> PngResult<Vec<u8>> {
  build_png(pixels, width, height, format, &EncodeSettings::default())
}

/// Encodes pixels as a PNG.
///
/// * `pixels` are tightly packed rows, top to bottom, in the given `format`.
/// * The output is 8-bit, non-interlaced, and every scanline uses filter type
///   None.
///
/// The sink receives the complete stream in one `write_bytes` call, and
/// receives nothing at all if encoding fails.
pub fn encode_with<K: ByteSink>(
  pixels: &[u8], width: u32, height: u32, format: ImageFormat, mut sink: K,
  settings: &EncodeSettings,
) -> PngResult<()> {
  let bytes = build_png(pixels, width, height, format, settings)?;
  let written = sink.write_bytes(&bytes)?;
  if written != bytes.len() {
    return Err(PngError::WriteFailure);
  }
  Ok(())
}

fn build_png(
  pixels: &[u8], width: u32, height: u32, format: ImageFormat, settings: &EncodeSettings,
) -> PngResult<Vec<u8>> {
  if !(1..=MAX_DIMENSION).contains(&width) || !(1..=MAX_DIMENSION).contains(&height) {
    return Err(PngError::InvalidHeader);
  }
  let stride = (width as usize) * format.bytes_per_pixel();
  if pixels.len() != stride * (height as usize) {
    return Err(PngError::SizeMismatch);
  }
  let layout = match format {
    ImageFormat::RGB => PixelLayout::RGB8,
    ImageFormat::RGBA => PixelLayout::RGBA8,
  };
  let header = Header { width, height, layout, is_interlaced: false };

  let mut filtered: Vec<u8> = Vec::new();
  filtered.try_reserve_exact(header.filtered_data_len())?;
  for row in pixels.chunks_exact(stride) {
    filtered.push(FilterType::None as u8);
    filtered.extend_from_slice(row);
  }
  let level = settings.compression_level.min(10);
  let zlib = compress_to_vec_zlib(&filtered, level);
  drop(filtered);

  let max_idat_len = match settings.max_idat_len {
    0 => EncodeSettings::DEFAULT_MAX_IDAT_LEN,
    n => n.min(MAX_CHUNK_LEN as usize),
  };
  let idat_count = (zlib.len() + max_idat_len - 1) / max_idat_len;
  let mut out: Vec<u8> = Vec::new();
  out.try_reserve(PNG_SIGNATURE.len() + (12 + Header::LEN) + zlib.len() + 12 * (idat_count + 1))?;
  out.extend_from_slice(&PNG_SIGNATURE);
  write_chunk(&mut out, ChunkType::IHDR, &header.to_bytes())?;
  for part in zlib.chunks(max_idat_len) {
    write_chunk(&mut out, ChunkType::IDAT, part)?;
  }
  write_chunk(&mut out, ChunkType::IEND, &[])?;
  debug!(
    "encoded {width}x{height} {format:?}: {} zlib bytes in {idat_count} IDAT, {} total",
    zlib.len(),
    out.len()
  );
  Ok(out)
}

#[test]
fn test_encode_rejects_bad_input() {
  assert_eq!(encode_to_vec(&[], 0, 1, ImageFormat::RGB), Err(PngError::InvalidHeader));
  assert_eq!(
    encode_to_vec(&[0; 3], 1, MAX_DIMENSION + 1, ImageFormat::RGB),
    Err(PngError::InvalidHeader)
  );
  assert_eq!(encode_to_vec(&[0; 5], 1, 1, ImageFormat::RGBA), Err(PngError::SizeMismatch));
  assert_eq!(encode_to_vec(&[0; 4], 1, 1, ImageFormat::RGB), Err(PngError::SizeMismatch));
}

#[test]
fn test_encode_layout() {
  let png = encode_to_vec(&[1, 2, 3, 4], 1, 1, ImageFormat::RGBA).unwrap();
  assert_eq!(png[..8], PNG_SIGNATURE);
  let types: Vec<ChunkType> =
    ChunkReader::new(SliceSource::new(&png)).map(|c| c.unwrap().chunk_type).collect();
  assert_eq!(types, [ChunkType::IHDR, ChunkType::IDAT, ChunkType::IEND]);
  let info = decode_info(SliceSource::new(&png)).unwrap();
  assert_eq!(info.color_type, ColorType::TrueColorAlpha);
  assert_eq!(info.bit_depth, 8);
  assert!(!info.is_interlaced);
}

#[test]
fn test_encode_splits_idat() {
  let pixels: Vec<u8> = (0..64 * 64 * 3).map(|i| (i * 7 % 251) as u8).collect();
  let settings = EncodeSettings { compression_level: 0, max_idat_len: 100 };
  let mut png = Vec::new();
  encode_with(&pixels, 64, 64, ImageFormat::RGB, &mut png, &settings).unwrap();
  let idat: Vec<usize> = ChunkReader::new(SliceSource::new(&png))
    .map(|c| c.unwrap())
    .filter(|c| c.chunk_type == ChunkType::IDAT)
    .map(|c| c.data.len())
    .collect();
  assert!(idat.len() > 1);
  assert!(idat.iter().all(|&len| len <= 100));
  assert!(idat[..idat.len() - 1].iter().all(|&len| len == 100));
}
