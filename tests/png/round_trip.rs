use super::*;

fn round_trip(format: ImageFormat, width: u32, height: u32) {
  let rgba = rgba_pattern(width, height);
  let source = DecodedImage::from_rgba(width, height, rgba).unwrap().into_format(format).unwrap();
  let png = encode_to_vec(&source.pixels, width, height, format).unwrap();
  let decoded = DecodedImage::try_from_png_bytes(&png).unwrap();
  assert_eq!(decoded.format, ImageFormat::RGBA);
  assert_eq!((decoded.width, decoded.height), (width, height));
  assert_eq!(decoded.into_format(format).unwrap(), source, "{format:?} {width}x{height}");
}

#[test]
fn test_round_trip_rgb() {
  for (w, h) in [(1, 1), (3, 5), (256, 256)] {
    round_trip(ImageFormat::RGB, w, h);
  }
}

#[test]
fn test_round_trip_rgba() {
  for (w, h) in [(1, 1), (3, 5), (256, 256)] {
    round_trip(ImageFormat::RGBA, w, h);
  }
}

#[test]
fn test_round_trip_every_compression_level() {
  let pixels: Vec<u8> = rand_bytes(17 * 9 * 3);
  for compression_level in 0..=12 {
    let settings = EncodeSettings { compression_level, ..EncodeSettings::default() };
    let mut png = Vec::new();
    encode_with(&pixels, 17, 9, ImageFormat::RGB, &mut png, &settings).unwrap();
    let decoded = decode(SliceSource::new(&png)).unwrap().into_format(ImageFormat::RGB).unwrap();
    assert_eq!(decoded.pixels, pixels, "level {compression_level}");
  }
}

#[test]
fn test_round_trip_through_io() {
  let rgba = rgba_pattern(31, 7);
  let bytes: &[u8] = bytemuck::cast_slice(&rgba);
  let mut sink = IoSink::new(std::io::Cursor::new(Vec::new()));
  encode(bytes, 31, 7, ImageFormat::RGBA, &mut sink).unwrap();
  let file = sink.into_inner().into_inner();
  let mut source = IoSource::new(std::io::Cursor::new(file));
  let info = decode_info(&mut source).unwrap();
  assert_eq!((info.width, info.height, info.format), (31, 7, ImageFormat::RGBA));
  let decoded = decode(&mut source).unwrap();
  assert_eq!(decoded.as_rgba().unwrap(), rgba.as_slice());
}

#[test]
fn test_idat_split_round_trip() {
  let pixels = rand_bytes(40 * 40 * 4);
  for max_idat_len in [0, 1, 7, 100, 1 << 20] {
    let settings = EncodeSettings { compression_level: 1, max_idat_len };
    let mut png = Vec::new();
    encode_with(&pixels, 40, 40, ImageFormat::RGBA, &mut png, &settings).unwrap();
    let limit = if max_idat_len == 0 { EncodeSettings::DEFAULT_MAX_IDAT_LEN } else { max_idat_len };
    for chunk in ChunkReader::new(SliceSource::new(&png)) {
      let chunk = chunk.unwrap();
      assert!(chunk.verify_crc().is_ok());
      if chunk.chunk_type == ChunkType::IDAT {
        assert!(chunk.data.len() <= limit);
      }
    }
    let strict = DecodeSettings { verify_crc: true, ..DecodeSettings::default() };
    assert_eq!(decode_with(SliceSource::new(&png), &strict).unwrap().pixels, pixels);
  }
}

/// Records every write, and optionally refuses them.
#[derive(Default)]
struct RecordingSink {
  calls: usize,
  bytes: Vec<u8>,
  refuse: bool,
}
impl ByteSink for RecordingSink {
  fn write_bytes(&mut self, bytes: &[u8]) -> PngResult<usize> {
    self.calls += 1;
    if self.refuse {
      return Err(PngError::WriteFailure);
    }
    self.bytes.extend_from_slice(bytes);
    Ok(bytes.len())
  }
}

#[test]
fn test_encoder_writes_once_or_never() {
  let mut sink = RecordingSink::default();
  encode(&[1, 2, 3, 4, 5, 6], 2, 1, ImageFormat::RGB, &mut sink).unwrap();
  assert_eq!(sink.calls, 1);
  assert_eq!(sink.bytes[..8], PNG_SIGNATURE);

  let mut sink = RecordingSink::default();
  assert_eq!(encode(&[1, 2, 3], 2, 1, ImageFormat::RGB, &mut sink), Err(PngError::SizeMismatch));
  assert_eq!(encode(&[], 0, 0, ImageFormat::RGBA, &mut sink), Err(PngError::InvalidHeader));
  assert_eq!(sink.calls, 0);

  let mut sink = RecordingSink { refuse: true, ..RecordingSink::default() };
  assert_eq!(encode(&[1, 2, 3], 1, 1, ImageFormat::RGB, &mut sink), Err(PngError::WriteFailure));
  assert!(sink.bytes.is_empty());
}

#[test]
fn test_short_write_is_failure() {
  struct HalfSink;
  impl ByteSink for HalfSink {
    fn write_bytes(&mut self, bytes: &[u8]) -> PngResult<usize> {
      Ok(bytes.len() / 2)
    }
  }
  assert_eq!(encode(&[1, 2, 3], 1, 1, ImageFormat::RGB, HalfSink), Err(PngError::WriteFailure));
}
