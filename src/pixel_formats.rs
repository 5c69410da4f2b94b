//! Module for pixel formats.
//!
//! All decoded output is 8 bits per channel. Internally the decoder always
//! produces [`RGBA8`] pixels, and the encoder accepts either [`RGB8`] or
//! [`RGBA8`] data as plain bytes.
//!
//! ## Bit Depth Changes
//! To *increase* bit depth use the current bit pattern as the top bits and
//! then copy that bit pattern down however many times is required to fill in
//! all newly added bits (a 2-bit `0b01` becomes `0b0101_0101`). To *reduce* bit
//! depth just keep the top bits, which is how 16-bit samples become 8-bit.

use bytemuck::{Pod, Zeroable};

/// An RGB value, 8-bits per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(C)]
#[allow(missing_docs)]
pub struct RGB8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

/// An 8-bits per channel RGBA pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(C)]
#[allow(missing_docs)]
pub struct RGBA8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}
impl RGBA8 {
  /// Opaque black, the color of any pixel nothing was written to.
  pub const OPAQUE_BLACK: Self = Self { r: 0, g: 0, b: 0, a: 255 };

  /// A gray pixel.
  #[inline]
  #[must_use]
  pub const fn gray(y: u8, a: u8) -> Self {
    Self { r: y, g: y, b: y, a }
  }
}
impl From<RGB8> for RGBA8 {
  #[inline]
  fn from(RGB8 { r, g, b }: RGB8) -> Self {
    Self { r, g, b, a: 255 }
  }
}
impl From<RGBA8> for RGB8 {
  #[inline]
  fn from(RGBA8 { r, g, b, a: _ }: RGBA8) -> Self {
    Self { r, g, b }
  }
}

/// The layout of a flat pixel buffer handed to, or returned from, the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImageFormat {
  /// Three bytes per pixel: red, green, blue.
  RGB,
  /// Four bytes per pixel: red, green, blue, alpha.
  RGBA,
}
impl Default for ImageFormat {
  #[inline]
  fn default() -> Self {
    ImageFormat::RGBA
  }
}
impl ImageFormat {
  /// The number of bytes each pixel uses.
  #[inline]
  #[must_use]
  pub const fn bytes_per_pixel(self) -> usize {
    match self {
      Self::RGB => 3,
      Self::RGBA => 4,
    }
  }
}

#[test]
fn test_image_format_default_is_rgba() {
  assert_eq!(ImageFormat::default(), ImageFormat::RGBA);
  assert_eq!(ImageFormat::default().bytes_per_pixel(), 4);
}
