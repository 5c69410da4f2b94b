use super::*;

/// Filters the rows of an image (or of each Adam7 pass) the way an encoder
/// would, cycling through all five filter types line by line.
///
/// `row_bytes` turns a row of full-image positions into that row's packed
/// pixel bytes.
fn filtered_data(
  header: Header, row_bytes: impl Fn(&[(u32, u32)]) -> Vec<u8>,
) -> Vec<u8> {
  let unit = header.layout.filter_unit();
  let passes: Vec<PassGeometry> = if header.is_interlaced {
    (1..=7).map(|p| pass_dimensions(p, header.width, header.height)).collect()
  } else {
    vec![PassGeometry {
      x_offset: 0,
      y_offset: 0,
      x_stride: 1,
      y_stride: 1,
      width: header.width,
      height: header.height,
    }]
  };
  let mut out = Vec::new();
  let mut line_number = 0_u8;
  for g in passes.into_iter().filter(|g| !g.is_empty()) {
    let mut prev: Option<Vec<u8>> = None;
    for ly in 0..g.height {
      let positions: Vec<(u32, u32)> = (0..g.width)
        .map(|lx| (g.x_offset + lx * g.x_stride, g.y_offset + ly * g.y_stride))
        .collect();
      let raw = row_bytes(&positions);
      let filter = line_number % 5;
      line_number = line_number.wrapping_add(1);
      out.push(filter);
      for i in 0..raw.len() {
        let a = if i >= unit { raw[i - unit] } else { 0 };
        let b = prev.as_ref().map_or(0, |p| p[i]);
        let c = if i >= unit { prev.as_ref().map_or(0, |p| p[i - unit]) } else { 0 };
        let predicted = match filter {
          0 => 0,
          1 => a,
          2 => b,
          3 => ((u16::from(a) + u16::from(b)) / 2) as u8,
          _ => paeth_predict(a, b, c),
        };
        out.push(raw[i].wrapping_sub(predicted));
      }
      prev = Some(raw);
    }
  }
  out
}

fn encode_test_png(header: Header, row_bytes: impl Fn(&[(u32, u32)]) -> Vec<u8>) -> Vec<u8> {
  let zlib = compress_to_vec_zlib(&filtered_data(header, row_bytes), 6);
  png_from_chunks(header, &[(ChunkType::IDAT, &zlib)])
}

const SMALL_SIZES: &[(u32, u32)] = &[
  (1, 1),
  (1, 4),
  (4, 1),
  (2, 3),
  (3, 2),
  (4, 4),
  (2, 9),
  (9, 2),
  (4, 13),
  (13, 3),
  (1, 12),
  (12, 1),
  (8, 8),
  (11, 7),
];

#[test]
fn test_interlaced_rgba8_matches_plain() {
  for &(width, height) in SMALL_SIZES {
    let expected = rgba_pattern(width, height);
    let row_bytes = |row: &[(u32, u32)]| -> Vec<u8> {
      row
        .iter()
        .flat_map(|&(x, y)| {
          let p = expected[(y * width + x) as usize];
          [p.r, p.g, p.b, p.a]
        })
        .collect()
    };
    let plain = Header { width, height, layout: PixelLayout::RGBA8, is_interlaced: false };
    let adam7 = Header { is_interlaced: true, ..plain };
    let plain = DecodedImage::try_from_png_bytes(&encode_test_png(plain, row_bytes)).unwrap();
    let adam7 = DecodedImage::try_from_png_bytes(&encode_test_png(adam7, row_bytes)).unwrap();
    assert_eq!(plain.as_rgba().unwrap(), expected.as_slice(), "plain {width}x{height}");
    assert_eq!(adam7, plain, "interlaced {width}x{height}");
  }
}

#[test]
fn test_interlaced_gray1_matches_plain() {
  let bit = |x: u32, y: u32| u8::from((x * 3 + y * 5) % 7 < 3);
  for &(width, height) in SMALL_SIZES {
    let row_bytes = |row: &[(u32, u32)]| -> Vec<u8> {
      let mut out = vec![0_u8; (row.len() + 7) / 8];
      for (i, &(x, y)) in row.iter().enumerate() {
        out[i / 8] |= bit(x, y) << (7 - (i % 8));
      }
      out
    };
    let plain = Header { width, height, layout: PixelLayout::Y1, is_interlaced: false };
    let adam7 = Header { is_interlaced: true, ..plain };
    let plain = DecodedImage::try_from_png_bytes(&encode_test_png(plain, row_bytes)).unwrap();
    let adam7 = DecodedImage::try_from_png_bytes(&encode_test_png(adam7, row_bytes)).unwrap();
    for y in 0..height {
      for x in 0..width {
        let y8 = if bit(x, y) == 1 { 255 } else { 0 };
        assert_eq!(plain.get_rgba(x, y), Some(RGBA8::gray(y8, 255)), "({x},{y})");
      }
    }
    assert_eq!(adam7, plain, "interlaced {width}x{height}");
  }
}

#[test]
fn test_interlaced_rgb16_matches_plain() {
  let (width, height) = (6, 5);
  let sample = |x: u32, y: u32| -> [u16; 3] { [(x * 4000) as u16, (y * 9000) as u16, 0xABCD] };
  let row_bytes = |row: &[(u32, u32)]| -> Vec<u8> {
    row.iter().flat_map(|&(x, y)| sample(x, y)).flat_map(u16::to_be_bytes).collect()
  };
  let plain = Header { width, height, layout: PixelLayout::RGB16, is_interlaced: false };
  let adam7 = Header { is_interlaced: true, ..plain };
  let plain = DecodedImage::try_from_png_bytes(&encode_test_png(plain, row_bytes)).unwrap();
  let adam7 = DecodedImage::try_from_png_bytes(&encode_test_png(adam7, row_bytes)).unwrap();
  assert_eq!(adam7, plain);
  let [r, g, b] = sample(5, 4);
  assert_eq!(
    plain.get_rgba(5, 4),
    Some(RGBA8 { r: (r >> 8) as u8, g: (g >> 8) as u8, b: (b >> 8) as u8, a: 255 })
  );
}

#[test]
fn test_truncated_interlaced_data() {
  let header = Header { width: 5, height: 5, layout: PixelLayout::Y8, is_interlaced: true };
  let mut filtered = filtered_data(header, |row: &[(u32, u32)]| vec![9; row.len()]);
  filtered.pop();
  let zlib = compress_to_vec_zlib(&filtered, 6);
  let png = png_from_chunks(header, &[(ChunkType::IDAT, &zlib)]);
  assert_eq!(DecodedImage::try_from_png_bytes(&png), Err(PngError::TruncatedStream));
}
