use super::*;

/// Palette data
///
/// Stored palette entries are always RGB. The alpha of every entry starts
/// fully opaque and can be overwritten by the transparency chunk.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Palette {
  entries: Vec<RGBA8>,
}
impl Debug for Palette {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    // currently prints no more than 4 palette entries
    f.debug_tuple("Palette")
      .field(&&self.entries[..self.entries.len().min(4)])
      .field(&self.entries.len())
      .finish()
  }
}
impl Palette {
  /// The most entries a palette can have.
  pub const MAX_ENTRIES: usize = 256;

  /// Parses a `PLTE` payload.
  ///
  /// The length must be a non-zero multiple of 3, and at most 256 entries.
  pub fn parse(data: &[u8]) -> PngResult<Self> {
    if data.is_empty() || data.len() % 3 != 0 || data.len() / 3 > Self::MAX_ENTRIES {
      return Err(PngError::InvalidHeader);
    }
    let rgb: &[RGB8] = bytemuck::try_cast_slice(data).map_err(|_| PngError::InvalidHeader)?;
    let mut entries = Vec::new();
    entries.try_reserve_exact(rgb.len())?;
    entries.extend(rgb.iter().copied().map(RGBA8::from));
    Ok(Self { entries })
  }

  /// Overwrites entry alphas, in index order, with the values given.
  ///
  /// Extra alpha values past the end of the palette are ignored.
  pub fn apply_alphas(&mut self, alphas: &[u8]) {
    if alphas.len() > self.entries.len() {
      warn!("tRNS has {} alphas for {} palette entries", alphas.len(), self.entries.len());
    }
    self.entries.iter_mut().zip(alphas.iter().copied()).for_each(|(e, a)| e.a = a);
  }

  /// Gets the entries as a slice.
  #[inline]
  #[must_use]
  pub fn entries(&self) -> &[RGBA8] {
    &self.entries
  }

  /// Looks up an index. Indexes past the end of the palette are opaque black.
  #[inline]
  #[must_use]
  pub fn get(&self, index: u8) -> RGBA8 {
    self.entries.get(usize::from(index)).copied().unwrap_or(RGBA8::OPAQUE_BLACK)
  }
}
impl From<&[RGBA8]> for Palette {
  #[inline]
  fn from(entries: &[RGBA8]) -> Self {
    Self { entries: entries.to_vec() }
  }
}

/// Transparency data
///
/// * `Gray` and `Rgb` each store a single color. All samples of that color in
///   the image are fully transparent (alpha 0), while the rest are fully
///   opaque. The chunk always uses a `u16` to store the value, even if the
///   image's bit depth is less than 16.
/// * `Alphas` is the per-entry alpha data that goes along with the palette.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Transparency {
  /// Transparent gray sample.
  Gray(u16),
  /// Transparent RGB sample.
  Rgb([u16; 3]),
  /// Alpha per palette index.
  Alphas(Vec<u8>),
}
impl Transparency {
  /// Parses a `tRNS` payload for an image of the given color type.
  ///
  /// Gives `None` (and logs it) when the chunk doesn't fit the color type,
  /// since a bad transparency chunk doesn't stop the image from displaying.
  pub fn parse(data: &[u8], color_type: ColorType) -> PngResult<Option<Self>> {
    Ok(match (color_type, data) {
      (ColorType::Grayscale, [y0, y1]) => Some(Self::Gray(u16::from_be_bytes([*y0, *y1]))),
      (ColorType::TrueColor, [r0, r1, g0, g1, b0, b1]) => Some(Self::Rgb([
        u16::from_be_bytes([*r0, *r1]),
        u16::from_be_bytes([*g0, *g1]),
        u16::from_be_bytes([*b0, *b1]),
      ])),
      (ColorType::Indexed, alphas) if alphas.len() <= Palette::MAX_ENTRIES => {
        let mut v = Vec::new();
        v.try_reserve_exact(alphas.len())?;
        v.extend_from_slice(alphas);
        Some(Self::Alphas(v))
      }
      _ => {
        warn!("ignoring {} byte tRNS for {:?}", data.len(), color_type);
        None
      }
    })
  }

  /// The gray key, if this is one.
  #[inline]
  #[must_use]
  pub const fn gray_key(&self) -> Option<u16> {
    match self {
      Self::Gray(y) => Some(*y),
      _ => None,
    }
  }

  /// The RGB key, if this is one.
  #[inline]
  #[must_use]
  pub const fn rgb_key(&self) -> Option<[u16; 3]> {
    match self {
      Self::Rgb(rgb) => Some(*rgb),
      _ => None,
    }
  }
}

/// `pHYs`: Physical pixel dimensions
///
/// When `is_meters` is set then `ppu_x` and `ppu_y` are in pixels per meter.
/// Otherwise they have no unit and define an aspect ratio only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AspectHint {
  /// pixels per unit, horizontally
  pub ppu_x: u32,
  /// pixels per unit, vertically
  pub ppu_y: u32,
  /// if the unit is the meter
  pub is_meters: bool,
}
impl AspectHint {
  /// Parses a `pHYs` payload. Malformed or zero-valued hints are `None`.
  #[must_use]
  pub fn parse(data: &[u8]) -> Option<Self> {
    match *data {
      [x0, x1, x2, x3, y0, y1, y2, y3, unit @ (0 | 1)] => {
        let ppu_x = u32::from_be_bytes([x0, x1, x2, x3]);
        let ppu_y = u32::from_be_bytes([y0, y1, y2, y3]);
        if ppu_x == 0 || ppu_y == 0 {
          warn!("ignoring pHYs with a zero density");
          return None;
        }
        Some(Self { ppu_x, ppu_y, is_meters: unit == 1 })
      }
      _ => {
        warn!("ignoring malformed pHYs");
        None
      }
    }
  }

  /// If pixels are physically square.
  #[inline]
  #[must_use]
  pub const fn is_square(&self) -> bool {
    self.ppu_x == self.ppu_y
  }

  /// The dimensions that give square pixels for an image of the given size.
  ///
  /// Only one axis ever grows: the one with the lower pixel density is
  /// stretched. The result is capped at [`MAX_DIMENSION`].
  #[must_use]
  pub fn corrected_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
    let scale = |len: u32, num: u32, den: u32| -> u32 {
      let (len, num, den) = (u64::from(len), u64::from(num), u64::from(den));
      ((len * num + den / 2) / den).clamp(1, u64::from(MAX_DIMENSION)) as u32
    };
    match self.ppu_x.cmp(&self.ppu_y) {
      core::cmp::Ordering::Equal => (width, height),
      core::cmp::Ordering::Greater => (width, scale(height, self.ppu_x, self.ppu_y)),
      core::cmp::Ordering::Less => (scale(width, self.ppu_y, self.ppu_x), height),
    }
  }
}

#[test]
fn test_palette_with_alphas() {
  let mut plte = Palette::parse(&[255, 0, 0, 0, 255, 0, 0, 0, 255]).unwrap();
  let trns = Transparency::parse(&[255, 0, 255], ColorType::Indexed).unwrap().unwrap();
  if let Transparency::Alphas(a) = &trns {
    plte.apply_alphas(a);
  }
  assert_eq!(plte.get(1), RGBA8 { r: 0, g: 255, b: 0, a: 0 });
  assert_eq!(plte.get(2), RGBA8 { r: 0, g: 0, b: 255, a: 255 });
  assert_eq!(plte.get(3), RGBA8::OPAQUE_BLACK);
}

#[test]
fn test_palette_rejects_bad_lengths() {
  assert_eq!(Palette::parse(&[]), Err(PngError::InvalidHeader));
  assert_eq!(Palette::parse(&[1, 2, 3, 4]), Err(PngError::InvalidHeader));
  assert_eq!(Palette::parse(&[0; 3 * 257]), Err(PngError::InvalidHeader));
  assert_eq!(Palette::parse(&[0; 3 * 256]).map(|p| p.entries().len()), Ok(256));
}

#[test]
fn test_transparency_by_color_type() {
  assert_eq!(Transparency::parse(&[0, 7], ColorType::Grayscale), Ok(Some(Transparency::Gray(7))));
  assert_eq!(
    Transparency::parse(&[0, 1, 0, 2, 1, 0], ColorType::TrueColor),
    Ok(Some(Transparency::Rgb([1, 2, 256])))
  );
  assert_eq!(Transparency::parse(&[0, 7], ColorType::TrueColor), Ok(None));
  assert_eq!(Transparency::parse(&[0, 7], ColorType::TrueColorAlpha), Ok(None));
}

#[test]
fn test_aspect_correction() {
  let hint = AspectHint::parse(&[0, 0, 0, 2, 0, 0, 0, 1, 0]).unwrap();
  assert_eq!(hint.corrected_dimensions(10, 10), (10, 20));
  let hint = AspectHint { ppu_x: 2, ppu_y: 3, is_meters: true };
  assert_eq!(hint.corrected_dimensions(10, 10), (15, 10));
  let hint = AspectHint { ppu_x: 3000, ppu_y: 1, is_meters: false };
  assert_eq!(hint.corrected_dimensions(10, 10), (10, MAX_DIMENSION));
  assert_eq!(AspectHint::parse(&[0, 0, 0, 0, 0, 0, 0, 1, 0]), None);
  assert_eq!(AspectHint::parse(&[0, 0, 0, 1, 0, 0, 0, 1, 2]), None);
}
