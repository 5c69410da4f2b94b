use super::*;

use walkdir::WalkDir;

#[test]
fn test_ChunkReader_and_decode_no_panics() {
  // iter ALL files in the test folder, even non-png files shouldn't panic.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    println!("{}", entry.path().display());
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(e) => {
        println!("Error reading file: {e:?}");
        continue;
      }
    };
    for _ in ChunkReader::new(SliceSource::new(&v)) {
      //
    }
    let _ = decode_info(SliceSource::new(&v));
    let _ = DecodedImage::try_from_png_bytes(&v);
  }
  // even totally random data should never panic!
  for _ in 0..10 {
    let v = rand_bytes(1024);
    for _ in ChunkReader::new(SliceSource::new(&v)) {
      //
    }
    assert!(DecodedImage::try_from_png_bytes(&v).is_err());
  }
}

#[test]
fn test_random_image_data_no_panics() {
  // a valid header followed by garbage gets past the signature checks.
  for layout in [PixelLayout::Y1, PixelLayout::I4, PixelLayout::RGB16, PixelLayout::RGBA8] {
    for is_interlaced in [false, true] {
      let header = Header { width: 9, height: 7, layout, is_interlaced };
      let raw = rand_bytes(header.filtered_data_len());
      let zlib = compress_to_vec_zlib(&raw, 1);
      let png = png_from_chunks(
        header,
        &[(ChunkType::PLTE, &[7; 48]), (ChunkType::IDAT, &zlib)],
      );
      match DecodedImage::try_from_png_bytes(&png) {
        Ok(image) => assert_eq!(image.pixels.len(), 9 * 7 * 4),
        Err(e) => assert_eq!(e, PngError::InvalidFilter),
      }
      let _ = DecodedImage::try_from_png_bytes(&rand_bytes(200));
    }
  }
}

#[test]
fn test_truncated_files_fail_cleanly() {
  let png = encode_to_vec(&rand_bytes(20 * 20 * 3), 20, 20, ImageFormat::RGB).unwrap();
  for len in 0..png.len() {
    assert!(DecodedImage::try_from_png_bytes(&png[..len]).is_err(), "len {len}");
  }
  assert!(DecodedImage::try_from_png_bytes(&png).is_ok());
}
