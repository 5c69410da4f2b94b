use super::*;

/// Widths and heights above this are rejected.
pub const MAX_DIMENSION: u32 = 0x4000;

/// The types of color that PNG supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ColorType {
  /// Greyscale
  Grayscale = 0,
  /// Red, Green, Blue
  TrueColor = 2,
  /// Index into a palette.
  Indexed = 3,
  /// Greyscale + Alpha
  GrayscaleAlpha = 4,
  /// Red, Green, Blue, Alpha
  TrueColorAlpha = 6,
}
impl ColorType {
  /// The number of channels in this type of color.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Grayscale => 1,
      Self::TrueColor => 3,
      Self::Indexed => 1,
      Self::GrayscaleAlpha => 2,
      Self::TrueColorAlpha => 4,
    }
  }
}
impl TryFrom<u8> for ColorType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::Grayscale,
      2 => Self::TrueColor,
      3 => Self::Indexed,
      4 => Self::GrayscaleAlpha,
      6 => Self::TrueColorAlpha,
      _ => return Err(PngError::UnsupportedFormat),
    })
  }
}

/// The pixel layouts allowed in a PNG file.
///
/// This combines a color type with a bit depth per channel. Only the legal
/// combinations exist as variants.
///
/// * The Greyscale (`Y`) and Indexed (`I`) formats allow for pixels that are
///   only 1, 2, or 4 bits each. In this case, the pixels are tightly packed
///   into bytes, with the left-most pixel being the highest bits of the byte.
/// * 16-bit channels are stored big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum PixelLayout {
  Y1,
  Y2,
  Y4,
  Y8,
  Y16,
  RGB8,
  RGB16,
  I1,
  I2,
  I4,
  I8,
  YA8,
  YA16,
  RGBA8,
  RGBA16,
}
impl PixelLayout {
  /// Checks a `(color_type, bit_depth)` pair from an `IHDR`.
  pub fn new(color_type: ColorType, bit_depth: u8) -> PngResult<Self> {
    use ColorType::*;
    Ok(match (color_type, bit_depth) {
      (Grayscale, 1) => Self::Y1,
      (Grayscale, 2) => Self::Y2,
      (Grayscale, 4) => Self::Y4,
      (Grayscale, 8) => Self::Y8,
      (Grayscale, 16) => Self::Y16,
      (TrueColor, 8) => Self::RGB8,
      (TrueColor, 16) => Self::RGB16,
      (Indexed, 1) => Self::I1,
      (Indexed, 2) => Self::I2,
      (Indexed, 4) => Self::I4,
      (Indexed, 8) => Self::I8,
      (GrayscaleAlpha, 8) => Self::YA8,
      (GrayscaleAlpha, 16) => Self::YA16,
      (TrueColorAlpha, 8) => Self::RGBA8,
      (TrueColorAlpha, 16) => Self::RGBA16,
      _ => return Err(PngError::UnsupportedFormat),
    })
  }

  /// The color type part of the layout.
  #[inline]
  #[must_use]
  pub const fn color_type(self) -> ColorType {
    match self {
      Self::Y1 | Self::Y2 | Self::Y4 | Self::Y8 | Self::Y16 => ColorType::Grayscale,
      Self::RGB8 | Self::RGB16 => ColorType::TrueColor,
      Self::I1 | Self::I2 | Self::I4 | Self::I8 => ColorType::Indexed,
      Self::YA8 | Self::YA16 => ColorType::GrayscaleAlpha,
      Self::RGBA8 | Self::RGBA16 => ColorType::TrueColorAlpha,
    }
  }

  /// Bits per channel.
  #[inline]
  #[must_use]
  pub const fn bit_depth(self) -> u8 {
    match self {
      Self::Y1 | Self::I1 => 1,
      Self::Y2 | Self::I2 => 2,
      Self::Y4 | Self::I4 => 4,
      Self::Y8 | Self::I8 | Self::RGB8 | Self::YA8 | Self::RGBA8 => 8,
      Self::Y16 | Self::RGB16 | Self::YA16 | Self::RGBA16 => 16,
    }
  }

  /// Bits per complete pixel.
  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(self) -> usize {
    (self.bit_depth() as usize) * self.color_type().channel_count()
  }

  /// The byte distance that the Sub, Average, and Paeth filters look back.
  ///
  /// Filtering is per byte within a pixel when pixels are more than 1 byte
  /// each, and per byte when pixels are 1 byte or less.
  #[inline]
  #[must_use]
  pub const fn filter_unit(self) -> usize {
    let bytes = self.bits_per_pixel() / 8;
    if bytes == 0 {
      1
    } else {
      bytes
    }
  }

  /// Bytes of pixel data in one scanline of the given width (no filter byte).
  ///
  /// When pixels are less than 8 bits it's possible to end up with partial
  /// bytes on the end, so we must round up.
  #[inline]
  #[must_use]
  pub const fn bytes_per_scanline(self, width: u32) -> usize {
    ((width as usize) * self.bits_per_pixel() + 7) / 8
  }
}

/// Image Header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// pixel color type and bit depth
  pub layout: PixelLayout,
  /// if the image data is stored interlaced.
  pub is_interlaced: bool,
}
impl Header {
  /// Length of the `IHDR` payload.
  pub const LEN: usize = 13;

  /// Parses an `IHDR` payload.
  ///
  /// Bad dimensions and bad method bytes are
  /// [`InvalidHeader`](PngError::InvalidHeader), bad color info is
  /// [`UnsupportedFormat`](PngError::UnsupportedFormat).
  pub fn parse(data: &[u8]) -> PngResult<Self> {
    match *data {
      [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression_method, filter_method, interlace_method] =>
      {
        let width = u32::from_be_bytes([w0, w1, w2, w3]);
        let height = u32::from_be_bytes([h0, h1, h2, h3]);
        if !(1..=MAX_DIMENSION).contains(&width) || !(1..=MAX_DIMENSION).contains(&height) {
          return Err(PngError::InvalidHeader);
        }
        if compression_method != 0 || filter_method != 0 {
          return Err(PngError::InvalidHeader);
        }
        let is_interlaced = match interlace_method {
          0 => false,
          1 => true,
          _ => return Err(PngError::InvalidHeader),
        };
        let layout = PixelLayout::new(ColorType::try_from(color_type)?, bit_depth)?;
        Ok(Self { width, height, layout, is_interlaced })
      }
      _ => Err(PngError::InvalidHeader),
    }
  }

  /// The 13-byte `IHDR` payload for this header.
  #[must_use]
  pub fn to_bytes(&self) -> [u8; Self::LEN] {
    let mut out = [0_u8; Self::LEN];
    out[0..4].copy_from_slice(&self.width.to_be_bytes());
    out[4..8].copy_from_slice(&self.height.to_be_bytes());
    out[8] = self.layout.bit_depth();
    out[9] = self.layout.color_type() as u8;
    // compression and filter method are always 0
    out[12] = u8::from(self.is_interlaced);
    out
  }

  /// The pixel format that holds this image's data without loss (ignoring
  /// 16-bit precision and `tRNS` keys).
  #[inline]
  #[must_use]
  pub const fn natural_format(&self) -> ImageFormat {
    match self.layout.color_type() {
      ColorType::Grayscale | ColorType::TrueColor => ImageFormat::RGB,
      ColorType::Indexed | ColorType::GrayscaleAlpha | ColorType::TrueColorAlpha => {
        ImageFormat::RGBA
      }
    }
  }

  /// Gets the buffer size the zlib data should inflate to.
  ///
  /// Interlaced images add up the filter lines of all non-empty passes.
  #[must_use]
  pub fn filtered_data_len(&self) -> usize {
    let line_total = |w: u32, h: u32| -> usize {
      if w == 0 || h == 0 {
        0
      } else {
        (self.layout.bytes_per_scanline(w) + 1) * (h as usize)
      }
    };
    if self.is_interlaced {
      reduced_image_dimensions(self.width, self.height)[1..]
        .iter()
        .map(|&(w, h)| line_total(w, h))
        .sum()
    } else {
      line_total(self.width, self.height)
    }
  }
}

/// The header-only summary returned by [`decode_info`](super::decode_info).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageInfo {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// see [`Header::natural_format`]
  pub format: ImageFormat,
  /// stored color type
  pub color_type: ColorType,
  /// stored bits per channel
  pub bit_depth: u8,
  /// if the stored data is Adam7 interlaced
  pub is_interlaced: bool,
}
impl From<Header> for ImageInfo {
  #[inline]
  fn from(h: Header) -> Self {
    Self {
      width: h.width,
      height: h.height,
      format: h.natural_format(),
      color_type: h.layout.color_type(),
      bit_depth: h.layout.bit_depth(),
      is_interlaced: h.is_interlaced,
    }
  }
}

#[cfg(test)]
fn ihdr(w: u32, h: u32, depth: u8, color: u8, interlace: u8) -> [u8; 13] {
  let mut d = [0_u8; 13];
  d[0..4].copy_from_slice(&w.to_be_bytes());
  d[4..8].copy_from_slice(&h.to_be_bytes());
  d[8] = depth;
  d[9] = color;
  d[12] = interlace;
  d
}

#[test]
fn test_header_parse_legal_pairs() {
  let legal: &[(u8, &[u8])] =
    &[(0, &[1, 2, 4, 8, 16]), (2, &[8, 16]), (3, &[1, 2, 4, 8]), (4, &[8, 16]), (6, &[8, 16])];
  for color in 0..=7_u8 {
    for depth in [0, 1, 2, 3, 4, 8, 16, 32] {
      let ok = legal.iter().any(|(c, ds)| *c == color && ds.contains(&depth));
      let res = Header::parse(&ihdr(3, 5, depth, color, 0));
      if ok {
        let h = res.unwrap();
        assert_eq!(h.layout.bit_depth(), depth);
        assert_eq!(h.layout.color_type() as u8, color);
        assert_eq!(Header::parse(&h.to_bytes()), Ok(h));
      } else {
        assert_eq!(res, Err(PngError::UnsupportedFormat), "color {color} depth {depth}");
      }
    }
  }
}

#[test]
fn test_header_parse_rejects() {
  assert_eq!(Header::parse(&ihdr(3, 5, 8, 3, 0)[..12]), Err(PngError::InvalidHeader));
  assert_eq!(Header::parse(&ihdr(0, 5, 8, 2, 0)), Err(PngError::InvalidHeader));
  assert_eq!(Header::parse(&ihdr(5, 0x4001, 8, 2, 0)), Err(PngError::InvalidHeader));
  assert_eq!(Header::parse(&ihdr(5, 5, 8, 2, 2)), Err(PngError::InvalidHeader));
  let mut bad_method = ihdr(5, 5, 8, 2, 0);
  bad_method[10] = 1;
  assert_eq!(Header::parse(&bad_method), Err(PngError::InvalidHeader));
  assert!(Header::parse(&ihdr(0x4000, 0x4000, 8, 2, 1)).is_ok());
}

#[test]
fn test_layout_sizes() {
  assert_eq!(PixelLayout::Y1.bytes_per_scanline(5), 1);
  assert_eq!(PixelLayout::Y1.bytes_per_scanline(9), 2);
  assert_eq!(PixelLayout::I2.bytes_per_scanline(5), 2);
  assert_eq!(PixelLayout::Y4.bytes_per_scanline(3), 2);
  assert_eq!(PixelLayout::RGB16.bytes_per_scanline(3), 18);
  assert_eq!(PixelLayout::Y1.filter_unit(), 1);
  assert_eq!(PixelLayout::Y16.filter_unit(), 2);
  assert_eq!(PixelLayout::RGB8.filter_unit(), 3);
  assert_eq!(PixelLayout::YA16.filter_unit(), 4);
  assert_eq!(PixelLayout::RGBA16.filter_unit(), 8);
}

#[test]
fn test_filtered_data_len() {
  let h = Header { width: 8, height: 8, layout: PixelLayout::RGBA8, is_interlaced: false };
  assert_eq!(h.filtered_data_len(), 8 * (1 + 32));
  let h = Header { is_interlaced: true, ..h };
  // passes: 1x1, 1x1, 2x1, 2x2, 4x2, 4x4, 8x4
  let expected = (1 + 4) + (1 + 4) + (1 + 8) + 2 * (1 + 8) + 2 * (1 + 16) + 4 * (1 + 16) + 4 * (1 + 32);
  assert_eq!(h.filtered_data_len(), expected);
}
