//! Provides the heap-allocated decode output.

use alloc::vec::Vec;

use crate::{ImageFormat, PngError, PngResult, RGB8, RGBA8};

/// Converts an `(x,y)` position within a given `width` 2D space into a linear
/// pixel index.
#[inline]
#[must_use]
pub const fn xy_width_to_index(x: u32, y: u32, width: u32) -> usize {
  (y as usize) * (width as usize) + (x as usize)
}

/// A decoded image: flat pixel bytes plus their dimensions and layout.
///
/// Rows are stored top to bottom, with no padding between them, so the
/// stride is `width * format.bytes_per_pixel()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub struct DecodedImage {
  pub width: u32,
  pub height: u32,
  pub format: ImageFormat,
  pub pixels: Vec<u8>,
}
impl DecodedImage {
  /// Builds an RGBA image from a pixel vector.
  ///
  /// Fails with [`SizeMismatch`](PngError::SizeMismatch) if the vector isn't
  /// exactly `width * height` long.
  pub fn from_rgba(width: u32, height: u32, pixels: Vec<RGBA8>) -> PngResult<Self> {
    if pixels.len() != (width as usize) * (height as usize) {
      return Err(PngError::SizeMismatch);
    }
    let mut bytes: Vec<u8> = Vec::new();
    bytes.try_reserve_exact(pixels.len() * 4)?;
    bytes.extend_from_slice(bytemuck::cast_slice(&pixels));
    Ok(Self { width, height, format: ImageFormat::RGBA, pixels: bytes })
  }

  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds or the image isn't RGBA.
  #[inline]
  #[must_use]
  pub fn get_rgba(&self, x: u32, y: u32) -> Option<RGBA8> {
    if self.format != ImageFormat::RGBA || x >= self.width || y >= self.height {
      return None;
    }
    let i = xy_width_to_index(x, y, self.width) * 4;
    self.pixels.get(i..i + 4).map(bytemuck::pod_read_unaligned)
  }

  /// Views the pixels as `RGBA8` values, if that's the current format.
  #[inline]
  #[must_use]
  pub fn as_rgba(&self) -> Option<&[RGBA8]> {
    match self.format {
      ImageFormat::RGBA => bytemuck::try_cast_slice(&self.pixels).ok(),
      ImageFormat::RGB => None,
    }
  }

  /// Converts the image to the given format.
  ///
  /// Going from RGBA to RGB drops the alpha channel, going from RGB to RGBA
  /// makes every pixel fully opaque.
  pub fn into_format(self, format: ImageFormat) -> PngResult<Self> {
    if self.format == format {
      return Ok(self);
    }
    let count = (self.width as usize) * (self.height as usize);
    let mut pixels: Vec<u8> = Vec::new();
    pixels.try_reserve_exact(count * format.bytes_per_pixel())?;
    match format {
      ImageFormat::RGB => {
        for px in self.pixels.chunks_exact(4) {
          let RGB8 { r, g, b } = RGB8::from(bytemuck::pod_read_unaligned::<RGBA8>(px));
          pixels.extend_from_slice(&[r, g, b]);
        }
      }
      ImageFormat::RGBA => {
        for px in self.pixels.chunks_exact(3) {
          let RGBA8 { r, g, b, a } = RGBA8::from(bytemuck::pod_read_unaligned::<RGB8>(px));
          pixels.extend_from_slice(&[r, g, b, a]);
        }
      }
    }
    Ok(Self { width: self.width, height: self.height, format, pixels })
  }

  /// Nearest-neighbor resamples the image to a new size.
  pub fn resize_nearest(&self, new_width: u32, new_height: u32) -> PngResult<Self> {
    if new_width == 0 || new_height == 0 || self.width == 0 || self.height == 0 {
      return Err(PngError::SizeMismatch);
    }
    let bpp = self.format.bytes_per_pixel();
    let stride = self.width as usize * bpp;
    let mut pixels: Vec<u8> = Vec::new();
    pixels.try_reserve_exact((new_width as usize) * (new_height as usize) * bpp)?;
    for y in 0..new_height {
      let src_y = (u64::from(y) * u64::from(self.height) / u64::from(new_height)) as usize;
      let row = &self.pixels[src_y * stride..(src_y + 1) * stride];
      for x in 0..new_width {
        let src_x = (u64::from(x) * u64::from(self.width) / u64::from(new_width)) as usize;
        pixels.extend_from_slice(&row[src_x * bpp..(src_x + 1) * bpp]);
      }
    }
    Ok(Self { width: new_width, height: new_height, format: self.format, pixels })
  }
}

#[test]
fn test_resize_nearest_doubles_rows() {
  let px = |v: u8| RGBA8 { r: v, g: v, b: v, a: 255 };
  let img = DecodedImage::from_rgba(2, 2, alloc::vec![px(1), px(2), px(3), px(4)]).unwrap();
  let tall = img.resize_nearest(2, 4).unwrap();
  let got: Vec<u8> = tall.as_rgba().unwrap().iter().map(|p| p.r).collect();
  assert_eq!(got, [1, 2, 1, 2, 3, 4, 3, 4]);
}

#[test]
fn test_into_format_round_trip() {
  let img = DecodedImage::from_rgba(1, 2, alloc::vec![RGBA8 { r: 1, g: 2, b: 3, a: 4 }; 2]).unwrap();
  let rgb = img.into_format(ImageFormat::RGB).unwrap();
  assert_eq!(rgb.pixels, [1, 2, 3, 1, 2, 3]);
  let rgba = rgb.into_format(ImageFormat::RGBA).unwrap();
  assert_eq!(rgba.get_rgba(0, 1), Some(RGBA8 { r: 1, g: 2, b: 3, a: 255 }));
  assert_eq!(rgba.get_rgba(1, 0), None);
}
