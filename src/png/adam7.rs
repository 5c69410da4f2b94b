//! Adam7 interlacing.
//!
//! An interlaced image is stored as seven "reduced" images, one per pass.
//! Within each 8x8 block the pixels belong to these passes:
//!
//! ```text
//! 1 6 4 6 2 6 4 6
//! 7 7 7 7 7 7 7 7
//! 5 6 5 6 5 6 5 6
//! 7 7 7 7 7 7 7 7
//! 3 6 4 6 3 6 4 6
//! 7 7 7 7 7 7 7 7
//! 5 6 5 6 5 6 5 6
//! 7 7 7 7 7 7 7 7
//! ```

const X_OFFSET: [u32; 7] = [0, 4, 0, 2, 0, 1, 0];
const Y_OFFSET: [u32; 7] = [0, 0, 4, 0, 2, 0, 1];
const X_STRIDE: [u32; 7] = [8, 8, 4, 4, 2, 2, 1];
const Y_STRIDE: [u32; 7] = [8, 8, 8, 4, 4, 2, 2];

/// Placement and size of one pass's reduced image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassGeometry {
  /// Full-image column of the pass's first pixel.
  pub x_offset: u32,
  /// Full-image row of the pass's first row.
  pub y_offset: u32,
  /// Full-image columns between neighboring pass pixels.
  pub x_stride: u32,
  /// Full-image rows between neighboring pass rows.
  pub y_stride: u32,
  /// Reduced image width, possibly 0.
  pub width: u32,
  /// Reduced image height, possibly 0.
  pub height: u32,
}
impl PassGeometry {
  /// If this pass holds no pixels at all.
  #[inline]
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.width == 0 || self.height == 0
  }
}

#[inline]
const fn reduced_len(full: u32, offset: u32, stride: u32) -> u32 {
  if full <= offset {
    0
  } else {
    (full - offset + stride - 1) / stride
  }
}

/// Geometry of `pass` (1 through 7) for a full image of the given size.
///
/// ## Panics
/// * If the pass isn't 1 through 7.
#[inline]
#[must_use]
pub const fn pass_dimensions(pass: usize, full_width: u32, full_height: u32) -> PassGeometry {
  assert!(pass >= 1 && pass <= 7, "Adam7 pass must be 1 through 7");
  let i = pass - 1;
  PassGeometry {
    x_offset: X_OFFSET[i],
    y_offset: Y_OFFSET[i],
    x_stride: X_STRIDE[i],
    y_stride: Y_STRIDE[i],
    width: reduced_len(full_width, X_OFFSET[i], X_STRIDE[i]),
    height: reduced_len(full_height, Y_OFFSET[i], Y_STRIDE[i]),
  }
}

/// Converts a position within the reduced image of `pass` into the full image
/// position.
///
/// ## Panics
/// * If the pass isn't 1 through 7.
#[inline]
#[must_use]
pub const fn map_to_final(pass: usize, local_x: u32, local_y: u32) -> (u32, u32) {
  assert!(pass >= 1 && pass <= 7, "Adam7 pass must be 1 through 7");
  let i = pass - 1;
  (local_x * X_STRIDE[i] + X_OFFSET[i], local_y * Y_STRIDE[i] + Y_OFFSET[i])
}

/// Given the dimensions of the full image, computes the size of each reduced
/// image.
///
/// The output uses index 0 as the base image size, and indexes 1 through 7 for
/// the size of reduced images 1 through 7.
#[must_use]
pub const fn reduced_image_dimensions(full_width: u32, full_height: u32) -> [(u32, u32); 8] {
  let mut out = [(full_width, full_height); 8];
  let mut pass = 1;
  while pass <= 7 {
    let g = pass_dimensions(pass, full_width, full_height);
    out[pass] = (g.width, g.height);
    pass += 1;
  }
  out
}

#[test]
fn test_reduced_image_dimensions() {
  assert_eq!(reduced_image_dimensions(0, 0), [(0, 0); 8]);
  // one
  for (w, ex) in (1..=8).zip([1, 1, 1, 1, 1, 1, 1, 1]) {
    assert_eq!(reduced_image_dimensions(w, 0)[1].0, ex, "failed w:{w}");
  }
  for (h, ex) in (1..=8).zip([1, 1, 1, 1, 1, 1, 1, 1]) {
    assert_eq!(reduced_image_dimensions(0, h)[1].1, ex, "failed h:{h}");
  }
  // two
  for (w, ex) in (1..=8).zip([0, 0, 0, 0, 1, 1, 1, 1]) {
    assert_eq!(reduced_image_dimensions(w, 0)[2].0, ex, "failed w:{w}");
  }
  // three
  for (h, ex) in (1..=8).zip([0, 0, 0, 0, 1, 1, 1, 1]) {
    assert_eq!(reduced_image_dimensions(0, h)[3].1, ex, "failed h: {h}");
  }
  // four
  for (w, ex) in (1..=8).zip([0, 0, 1, 1, 1, 1, 2, 2]) {
    assert_eq!(reduced_image_dimensions(w, 0)[4].0, ex, "failed w: {w}");
  }
  // five
  for (h, ex) in (1..=8).zip([0, 0, 1, 1, 1, 1, 2, 2]) {
    assert_eq!(reduced_image_dimensions(0, h)[5].1, ex, "failed h: {h}");
  }
  // six
  for (w, ex) in (1..=8).zip([0, 1, 1, 2, 2, 3, 3, 4]) {
    assert_eq!(reduced_image_dimensions(w, 0)[6].0, ex, "failed w: {w}");
  }
  // seven
  for (h, ex) in (1..=8).zip([0, 1, 1, 2, 2, 3, 3, 4]) {
    assert_eq!(reduced_image_dimensions(0, h)[7].1, ex, "failed h: {h}");
  }
  //
  assert_eq!(
    reduced_image_dimensions(8, 8),
    [
      (8, 8), // full
      (1, 1), // one
      (1, 1), // two
      (2, 1), // three
      (2, 2), // four
      (4, 2), // five
      (4, 4), // six
      (8, 4), // seven
    ]
  );
}

#[test]
fn test_adam7_covers_8x8_once() {
  let mut hits = [[0_u8; 8]; 8];
  for pass in 1..=7 {
    let g = pass_dimensions(pass, 8, 8);
    for ly in 0..g.height {
      for lx in 0..g.width {
        let (x, y) = map_to_final(pass, lx, ly);
        hits[y as usize][x as usize] += 1;
      }
    }
  }
  assert_eq!(hits, [[1_u8; 8]; 8]);
}

#[test]
fn test_adam7_covers_odd_sizes_once() {
  for (w, h) in [(1, 1), (1, 7), (3, 2), (5, 5), (13, 9)] {
    let mut hits = alloc::vec![0_u8; (w * h) as usize];
    for pass in 1..=7 {
      let g = pass_dimensions(pass, w, h);
      for ly in 0..g.height {
        for lx in 0..g.width {
          let (x, y) = map_to_final(pass, lx, ly);
          assert!(x < w && y < h, "pass {pass} maps outside {w}x{h}");
          hits[(y * w + x) as usize] += 1;
        }
      }
    }
    assert!(hits.iter().all(|&n| n == 1), "{w}x{h}: {hits:?}");
  }
}

#[test]
fn test_small_images_have_empty_passes() {
  // a 1x1 image only has data in the first pass
  for pass in 2..=7 {
    assert!(pass_dimensions(pass, 1, 1).is_empty(), "pass {pass}");
  }
  assert!(!pass_dimensions(1, 1, 1).is_empty());
}
