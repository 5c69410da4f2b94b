use super::*;

/// The per-scanline filter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FilterType {
  /// Bytes are stored as-is.
  None = 0,
  /// Difference from the byte one filter unit to the left.
  Sub = 1,
  /// Difference from the byte above.
  Up = 2,
  /// Difference from the mean of left and above.
  Average = 3,
  /// Difference from the Paeth predictor of left, above, and upper-left.
  Paeth = 4,
}
impl TryFrom<u8> for FilterType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::None,
      1 => Self::Sub,
      2 => Self::Up,
      3 => Self::Average,
      4 => Self::Paeth,
      _ => return Err(PngError::InvalidFilter),
    })
  }
}

/// The Paeth predictor.
#[inline]
#[must_use]
pub const fn paeth_predict(a: u8, b: u8, c: u8) -> u8 {
  let a_ = a as i16;
  let b_ = b as i16;
  let c_ = c as i16;
  let p: i16 = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // The order of these tests is fixed by the PNG format, ties must resolve
  // exactly this way.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

/// Reverses one scanline's filter in place.
///
/// * `cur` is the scanline's pixel bytes (without the filter byte).
/// * `prev` is the already reconstructed scanline above, or `None` for the
///   first scanline of an image or pass, which acts as a line of zeroes.
/// * `filter_unit` is how many bytes to the left the "left" byte is.
///
/// ## Panics
/// * If `prev` is shorter than `cur`.
pub fn unfilter_scanline(
  filter: FilterType, cur: &mut [u8], prev: Option<&[u8]>, filter_unit: usize,
) {
  if let Some(prev) = prev {
    assert!(prev.len() >= cur.len(), "previous scanline is shorter than the current one");
  }
  let unit = filter_unit.min(cur.len());
  match (filter, prev) {
    (FilterType::None, _) | (FilterType::Up, None) => (),
    (FilterType::Sub, _) | (FilterType::Paeth, None) => {
      // with no line above, Paeth always picks the left byte.
      for i in unit..cur.len() {
        cur[i] = cur[i].wrapping_add(cur[i - unit]);
      }
    }
    (FilterType::Up, Some(prev)) => {
      cur.iter_mut().zip(prev.iter().copied()).for_each(|(p, b)| *p = p.wrapping_add(b));
    }
    (FilterType::Average, None) => {
      for i in unit..cur.len() {
        cur[i] = cur[i].wrapping_add(cur[i - unit] / 2);
      }
    }
    (FilterType::Average, Some(prev)) => {
      for i in 0..cur.len() {
        let a = if i >= unit { u16::from(cur[i - unit]) } else { 0 };
        let b = u16::from(prev[i]);
        cur[i] = cur[i].wrapping_add(((a + b) / 2) as u8);
      }
    }
    (FilterType::Paeth, Some(prev)) => {
      for i in 0..cur.len() {
        let (a, c) = if i >= unit { (cur[i - unit], prev[i - unit]) } else { (0, 0) };
        cur[i] = cur[i].wrapping_add(paeth_predict(a, prev[i], c));
      }
    }
  }
}

#[test]
fn test_paeth_predict_ties() {
  // p = 10, all distances 0 except... a wins ties.
  assert_eq!(paeth_predict(10, 10, 10), 10);
  // p = 20 + 30 - 25 = 25: pa = 5, pb = 5, pc = 0 -> c
  assert_eq!(paeth_predict(20, 30, 25), 25);
  // p = 0 + 100 - 0 = 100: pa = 100, pb = 0 -> b
  assert_eq!(paeth_predict(0, 100, 0), 100);
  // p = 50 + 50 - 100 = 0: pa = 50, pb = 50, pc = 100 -> a
  assert_eq!(paeth_predict(50, 50, 100), 50);
  assert_eq!(paeth_predict(255, 255, 0), 255);
}

#[test]
fn test_unfilter_none() {
  let mut cur = [1, 2, 3];
  unfilter_scanline(FilterType::None, &mut cur, Some(&[9, 9, 9]), 1);
  assert_eq!(cur, [1, 2, 3]);
}

#[test]
fn test_unfilter_sub() {
  let mut cur = [10, 10, 10];
  unfilter_scanline(FilterType::Sub, &mut cur, None, 1);
  assert_eq!(cur, [10, 20, 30]);
  // two byte units, wrapping
  let mut cur = [200, 1, 100, 2, 1, 3];
  unfilter_scanline(FilterType::Sub, &mut cur, Some(&[0; 6]), 2);
  assert_eq!(cur, [200, 1, 44, 3, 45, 6]);
}

#[test]
fn test_unfilter_up() {
  let mut cur = [1, 2, 250];
  unfilter_scanline(FilterType::Up, &mut cur, Some(&[10, 20, 10]), 1);
  assert_eq!(cur, [11, 22, 4]);
  let mut cur = [1, 2, 3];
  unfilter_scanline(FilterType::Up, &mut cur, None, 1);
  assert_eq!(cur, [1, 2, 3]);
}

#[test]
fn test_unfilter_average() {
  // left starts as 0, up is given
  // i0: 5 + (0 + 10)/2 = 10
  // i1: 5 + (10 + 21)/2 = 20
  // i2: 1 + (20 + 255)/2 = 138
  let mut cur = [5, 5, 1];
  unfilter_scanline(FilterType::Average, &mut cur, Some(&[10, 21, 255]), 1);
  assert_eq!(cur, [10, 20, 138]);
  // first line: only half the left byte
  let mut cur = [8, 8, 8];
  unfilter_scanline(FilterType::Average, &mut cur, None, 1);
  assert_eq!(cur, [8, 12, 14]);
}

#[test]
fn test_unfilter_paeth() {
  // prev = [10, 20, 30]
  // i0: a=0, b=10, c=0 -> p=10, pa=10, pb=0 -> b=10, 1+10 = 11
  // i1: a=11, b=20, c=10 -> p=21, pa=10, pb=1, pc=11 -> b=20, 2+20 = 22
  // i2: a=22, b=30, c=20 -> p=32, pa=10, pb=2, pc=12 -> b=30, 3+30 = 33
  let mut cur = [1, 2, 3];
  unfilter_scanline(FilterType::Paeth, &mut cur, Some(&[10, 20, 30]), 1);
  assert_eq!(cur, [11, 22, 33]);
  // first line: acts like Sub
  let mut cur = [10, 10, 10];
  unfilter_scanline(FilterType::Paeth, &mut cur, None, 1);
  assert_eq!(cur, [10, 20, 30]);
}

#[test]
fn test_filter_type_parse() {
  assert_eq!(FilterType::try_from(4), Ok(FilterType::Paeth));
  assert_eq!(FilterType::try_from(5), Err(PngError::InvalidFilter));
}

#[test]
#[should_panic]
fn test_unfilter_short_prev_panics() {
  let mut cur = [1, 2, 3];
  unfilter_scanline(FilterType::Up, &mut cur, Some(&[1, 2]), 1);
}
