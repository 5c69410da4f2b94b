use super::*;

fn rgb8_2x2() -> (Header, Vec<u8>) {
  let header = Header { width: 2, height: 2, layout: PixelLayout::RGB8, is_interlaced: false };
  let lines = [0, 1, 1, 1, 2, 2, 2, 0, 3, 3, 3, 4, 4, 4];
  (header, compress_to_vec_zlib(&lines, 6))
}

#[test]
fn test_phys_stretches_height() {
  let (header, zlib) = rgb8_2x2();
  let phys = [0, 0, 0x0B, 0x12, 0, 0, 0x05, 0x89, 1];
  let png = png_from_chunks(header, &[(ChunkType::pHYs, &phys), (ChunkType::IDAT, &zlib)]);
  let image = decode(SliceSource::new(&png)).unwrap();
  assert_eq!((image.width, image.height), (2, 4));
  let column: Vec<u8> = (0..4).map(|y| image.get_rgba(0, y).unwrap().r).collect();
  assert_eq!(column, [1, 1, 3, 3]);

  let settings = DecodeSettings { correct_aspect: false, ..DecodeSettings::default() };
  let image = decode_with(SliceSource::new(&png), &settings).unwrap();
  assert_eq!((image.width, image.height), (2, 2));
}

#[test]
fn test_phys_stretches_width() {
  let (header, zlib) = rgb8_2x2();
  let phys = [0, 0, 0, 1, 0, 0, 0, 3, 0];
  let png = png_from_chunks(header, &[(ChunkType::pHYs, &phys), (ChunkType::IDAT, &zlib)]);
  let image = decode(SliceSource::new(&png)).unwrap();
  assert_eq!((image.width, image.height), (6, 2));
  let row: Vec<u8> = (0..6).map(|x| image.get_rgba(x, 1).unwrap().r).collect();
  assert_eq!(row, [3, 3, 3, 4, 4, 4]);
}

#[test]
fn test_square_or_bad_phys_is_ignored() {
  let (header, zlib) = rgb8_2x2();
  for phys in [&[0, 0, 0, 5, 0, 0, 0, 5, 1][..], &[0, 0, 0, 0, 0, 0, 0, 5, 1], &[1, 2, 3]] {
    let png = png_from_chunks(header, &[(ChunkType::pHYs, phys), (ChunkType::IDAT, &zlib)]);
    let image = decode(SliceSource::new(&png)).unwrap();
    assert_eq!((image.width, image.height), (2, 2));
  }
}

#[test]
fn test_indexed_with_transparency() {
  let header = Header { width: 4, height: 1, layout: PixelLayout::I2, is_interlaced: false };
  let plte = [255, 0, 0, 0, 255, 0, 0, 0, 255];
  let zlib = compress_to_vec_zlib(&[0, 0b00_01_10_11], 6);
  let png = png_from_chunks(
    header,
    &[(ChunkType::PLTE, &plte), (ChunkType::tRNS, &[255, 0, 255]), (ChunkType::IDAT, &zlib)],
  );
  let image = decode(SliceSource::new(&png)).unwrap();
  assert_eq!(
    image.as_rgba().unwrap(),
    [
      RGBA8 { r: 255, g: 0, b: 0, a: 255 },
      RGBA8 { r: 0, g: 255, b: 0, a: 0 },
      RGBA8 { r: 0, g: 0, b: 255, a: 255 },
      RGBA8 { r: 0, g: 0, b: 0, a: 255 },
    ]
  );
}

#[test]
fn test_rgb_transparency_key() {
  let (header, zlib) = rgb8_2x2();
  let trns = [0, 3, 0, 3, 0, 3];
  let png = png_from_chunks(header, &[(ChunkType::tRNS, &trns), (ChunkType::IDAT, &zlib)]);
  let alphas: Vec<u8> =
    decode(SliceSource::new(&png)).unwrap().as_rgba().unwrap().iter().map(|p| p.a).collect();
  assert_eq!(alphas, [255, 255, 0, 255]);
  // a gray key makes no sense for RGB and is ignored
  let png = png_from_chunks(header, &[(ChunkType::tRNS, &[0, 3]), (ChunkType::IDAT, &zlib)]);
  let image = decode(SliceSource::new(&png)).unwrap();
  assert!(image.as_rgba().unwrap().iter().all(|p| p.a == 255));
}

#[test]
fn test_gray16_key_uses_full_sample() {
  let header = Header { width: 2, height: 1, layout: PixelLayout::Y16, is_interlaced: false };
  let zlib = compress_to_vec_zlib(&[0, 0x80, 0x01, 0x80, 0x02], 6);
  let png = png_from_chunks(header, &[(ChunkType::tRNS, &[0x80, 0x02]), (ChunkType::IDAT, &zlib)]);
  let image = decode(SliceSource::new(&png)).unwrap();
  assert_eq!(image.as_rgba().unwrap(), [RGBA8::gray(0x80, 255), RGBA8::gray(0x80, 0)]);
}

#[test]
fn test_unknown_chunks_are_skipped() {
  let (header, zlib) = rgb8_2x2();
  let png = png_from_chunks(
    header,
    &[
      (ChunkType(*b"gAMA"), &[0, 0, 0xB1, 0x8F]),
      (ChunkType(*b"acTL"), &[0, 0, 0, 1, 0, 0, 0, 0]),
      (ChunkType::IDAT, &zlib),
      (ChunkType(*b"tEXt"), b"Comment\0hi"),
    ],
  );
  assert_eq!(decode(SliceSource::new(&png)).unwrap().get_rgba(1, 1).unwrap().r, 4);
}
