use super::*;

use bitfrob::u8_replicate_bits;

/// The palette and transparency info that some layouts need to make colors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorContext<'a> {
  /// Palette, with any `tRNS` alphas already applied.
  pub palette: Option<&'a Palette>,
  /// Transparency for the gray and RGB layouts.
  pub transparency: Option<&'a Transparency>,
}

/// Turns one unfiltered scanline into `width` RGBA pixels.
///
/// `out` must have room for at least `width` pixels.
pub type UnpackFn =
  fn(src: &[u8], width: usize, ctx: &ColorContext<'_>, out: &mut [RGBA8]) -> PngResult<()>;

/// Picks the unpacking routine for a pixel layout.
#[must_use]
pub fn unpacker_for(layout: PixelLayout) -> UnpackFn {
  match layout {
    PixelLayout::Y1 => unpack_y_sub_byte::<1>,
    PixelLayout::Y2 => unpack_y_sub_byte::<2>,
    PixelLayout::Y4 => unpack_y_sub_byte::<4>,
    PixelLayout::Y8 => unpack_y8,
    PixelLayout::Y16 => unpack_y16,
    PixelLayout::RGB8 => unpack_rgb8,
    PixelLayout::RGB16 => unpack_rgb16,
    PixelLayout::I1 => unpack_i_sub_byte::<1>,
    PixelLayout::I2 => unpack_i_sub_byte::<2>,
    PixelLayout::I4 => unpack_i_sub_byte::<4>,
    PixelLayout::I8 => unpack_i8,
    PixelLayout::YA8 => unpack_ya8,
    PixelLayout::YA16 => unpack_ya16,
    PixelLayout::RGBA8 => unpack_rgba8,
    PixelLayout::RGBA16 => unpack_rgba16,
  }
}

/// Gets the part of `src` and `out` that a row of `width` pixels uses.
#[inline]
fn row_parts<'s, 'o>(
  src: &'s [u8], width: usize, bits_per_pixel: usize, out: &'o mut [RGBA8],
) -> PngResult<(&'s [u8], &'o mut [RGBA8])> {
  let need = (width * bits_per_pixel + 7) / 8;
  let src = src.get(..need).ok_or(PngError::TruncatedStream)?;
  let out = out.get_mut(..width).ok_or(PngError::SizeMismatch)?;
  Ok((src, out))
}

/// Packed samples of `D` bits each, leftmost pixel in the high bits.
#[inline]
fn sub_byte_samples<const D: u32>(src: &[u8]) -> impl Iterator<Item = u8> + '_ {
  let mask = ((1_u16 << D) - 1) as u8;
  src.iter().flat_map(move |&b| (1..=(8 / D)).map(move |i| (b >> (8 - D * i)) & mask))
}

#[inline]
fn be16(pair: &[u8]) -> u16 {
  u16::from_be_bytes([pair[0], pair[1]])
}

fn unpack_y_sub_byte<const D: u32>(
  src: &[u8], width: usize, ctx: &ColorContext<'_>, out: &mut [RGBA8],
) -> PngResult<()> {
  let (src, out) = row_parts(src, width, D as usize, out)?;
  let key = ctx.transparency.and_then(Transparency::gray_key);
  for (p, raw) in out.iter_mut().zip(sub_byte_samples::<D>(src)) {
    let a = if key == Some(u16::from(raw)) { 0 } else { 255 };
    *p = RGBA8::gray(u8_replicate_bits(D, raw), a);
  }
  Ok(())
}

fn unpack_y8(src: &[u8], width: usize, ctx: &ColorContext<'_>, out: &mut [RGBA8]) -> PngResult<()> {
  let (src, out) = row_parts(src, width, 8, out)?;
  let key = ctx.transparency.and_then(Transparency::gray_key);
  for (p, &y) in out.iter_mut().zip(src) {
    let a = if key == Some(u16::from(y)) { 0 } else { 255 };
    *p = RGBA8::gray(y, a);
  }
  Ok(())
}

fn unpack_y16(src: &[u8], width: usize, ctx: &ColorContext<'_>, out: &mut [RGBA8]) -> PngResult<()> {
  let (src, out) = row_parts(src, width, 16, out)?;
  let key = ctx.transparency.and_then(Transparency::gray_key);
  for (p, y) in out.iter_mut().zip(src.chunks_exact(2)) {
    let a = if key == Some(be16(y)) { 0 } else { 255 };
    *p = RGBA8::gray(y[0], a);
  }
  Ok(())
}

fn unpack_rgb8(src: &[u8], width: usize, ctx: &ColorContext<'_>, out: &mut [RGBA8]) -> PngResult<()> {
  let (src, out) = row_parts(src, width, 24, out)?;
  let key = ctx.transparency.and_then(Transparency::rgb_key);
  for (p, rgb) in out.iter_mut().zip(src.chunks_exact(3)) {
    let [r, g, b] = [rgb[0], rgb[1], rgb[2]];
    let full = [u16::from(r), u16::from(g), u16::from(b)];
    let a = if key == Some(full) { 0 } else { 255 };
    *p = RGBA8 { r, g, b, a };
  }
  Ok(())
}

fn unpack_rgb16(src: &[u8], width: usize, ctx: &ColorContext<'_>, out: &mut [RGBA8]) -> PngResult<()> {
  let (src, out) = row_parts(src, width, 48, out)?;
  let key = ctx.transparency.and_then(Transparency::rgb_key);
  for (p, rgb) in out.iter_mut().zip(src.chunks_exact(6)) {
    let full = [be16(&rgb[0..2]), be16(&rgb[2..4]), be16(&rgb[4..6])];
    let a = if key == Some(full) { 0 } else { 255 };
    *p = RGBA8 { r: rgb[0], g: rgb[2], b: rgb[4], a };
  }
  Ok(())
}

fn unpack_i_sub_byte<const D: u32>(
  src: &[u8], width: usize, ctx: &ColorContext<'_>, out: &mut [RGBA8],
) -> PngResult<()> {
  let (src, out) = row_parts(src, width, D as usize, out)?;
  for (p, i) in out.iter_mut().zip(sub_byte_samples::<D>(src)) {
    *p = ctx.palette.map_or(RGBA8::OPAQUE_BLACK, |plte| plte.get(i));
  }
  Ok(())
}

fn unpack_i8(src: &[u8], width: usize, ctx: &ColorContext<'_>, out: &mut [RGBA8]) -> PngResult<()> {
  let (src, out) = row_parts(src, width, 8, out)?;
  for (p, &i) in out.iter_mut().zip(src) {
    *p = ctx.palette.map_or(RGBA8::OPAQUE_BLACK, |plte| plte.get(i));
  }
  Ok(())
}

fn unpack_ya8(src: &[u8], width: usize, _: &ColorContext<'_>, out: &mut [RGBA8]) -> PngResult<()> {
  let (src, out) = row_parts(src, width, 16, out)?;
  for (p, ya) in out.iter_mut().zip(src.chunks_exact(2)) {
    *p = RGBA8::gray(ya[0], ya[1]);
  }
  Ok(())
}

fn unpack_ya16(src: &[u8], width: usize, _: &ColorContext<'_>, out: &mut [RGBA8]) -> PngResult<()> {
  let (src, out) = row_parts(src, width, 32, out)?;
  for (p, ya) in out.iter_mut().zip(src.chunks_exact(4)) {
    *p = RGBA8::gray(ya[0], ya[2]);
  }
  Ok(())
}

fn unpack_rgba8(src: &[u8], width: usize, _: &ColorContext<'_>, out: &mut [RGBA8]) -> PngResult<()> {
  let (src, out) = row_parts(src, width, 32, out)?;
  out.copy_from_slice(bytemuck::cast_slice(src));
  Ok(())
}

fn unpack_rgba16(src: &[u8], width: usize, _: &ColorContext<'_>, out: &mut [RGBA8]) -> PngResult<()> {
  let (src, out) = row_parts(src, width, 64, out)?;
  for (p, px) in out.iter_mut().zip(src.chunks_exact(8)) {
    *p = RGBA8 { r: px[0], g: px[2], b: px[4], a: px[6] };
  }
  Ok(())
}

#[cfg(test)]
fn unpack_row(
  layout: PixelLayout, src: &[u8], width: usize, ctx: &ColorContext<'_>,
) -> PngResult<Vec<RGBA8>> {
  let mut out = alloc::vec![RGBA8::default(); width];
  unpacker_for(layout)(src, width, ctx, &mut out)?;
  Ok(out)
}

#[test]
fn test_unpack_y1() {
  let out = unpack_row(PixelLayout::Y1, &[0b1011_0000], 5, &ColorContext::default()).unwrap();
  let ys: Vec<u8> = out.iter().map(|p| p.r).collect();
  assert_eq!(ys, [255, 0, 255, 255, 0]);
  assert!(out.iter().all(|p| p.a == 255));
}

#[test]
fn test_unpack_y2_y4_scaling() {
  let out = unpack_row(PixelLayout::Y2, &[0b00_01_10_11], 4, &ColorContext::default()).unwrap();
  let ys: Vec<u8> = out.iter().map(|p| p.g).collect();
  assert_eq!(ys, [0, 85, 170, 255]);
  let out = unpack_row(PixelLayout::Y4, &[0x0F, 0x80], 3, &ColorContext::default()).unwrap();
  let ys: Vec<u8> = out.iter().map(|p| p.b).collect();
  assert_eq!(ys, [0, 255, 0x88]);
}

#[test]
fn test_unpack_gray_key() {
  let trns = Transparency::Gray(2);
  let ctx = ColorContext { palette: None, transparency: Some(&trns) };
  let out = unpack_row(PixelLayout::Y2, &[0b10_01_10_00], 4, &ctx).unwrap();
  let alphas: Vec<u8> = out.iter().map(|p| p.a).collect();
  assert_eq!(alphas, [0, 255, 0, 255]);
  // 16-bit compares the whole sample, not just the top byte
  let trns = Transparency::Gray(0x1234);
  let ctx = ColorContext { palette: None, transparency: Some(&trns) };
  let out = unpack_row(PixelLayout::Y16, &[0x12, 0x34, 0x12, 0x35], 2, &ctx).unwrap();
  assert_eq!(out, [RGBA8::gray(0x12, 0), RGBA8::gray(0x12, 255)]);
}

#[test]
fn test_unpack_rgb_key() {
  let trns = Transparency::Rgb([1, 2, 3]);
  let ctx = ColorContext { palette: None, transparency: Some(&trns) };
  let out = unpack_row(PixelLayout::RGB8, &[1, 2, 3, 1, 2, 4], 2, &ctx).unwrap();
  assert_eq!(out, [RGBA8 { r: 1, g: 2, b: 3, a: 0 }, RGBA8 { r: 1, g: 2, b: 4, a: 255 }]);
  let out = unpack_row(PixelLayout::RGB16, &[0, 1, 0, 2, 0, 3], 1, &ctx).unwrap();
  assert_eq!(out, [RGBA8 { r: 0, g: 0, b: 0, a: 0 }]);
}

#[test]
fn test_unpack_indexed() {
  let mut plte = Palette::parse(&[255, 0, 0, 0, 255, 0, 0, 0, 255]).unwrap();
  plte.apply_alphas(&[255, 0, 255]);
  let ctx = ColorContext { palette: Some(&plte), transparency: None };
  let out = unpack_row(PixelLayout::I2, &[0b00_01_10_11], 4, &ctx).unwrap();
  assert_eq!(
    out,
    [
      RGBA8 { r: 255, g: 0, b: 0, a: 255 },
      RGBA8 { r: 0, g: 255, b: 0, a: 0 },
      RGBA8 { r: 0, g: 0, b: 255, a: 255 },
      RGBA8::OPAQUE_BLACK,
    ]
  );
  let out = unpack_row(PixelLayout::I8, &[1, 200], 2, &ctx).unwrap();
  assert_eq!(out[0].g, 255);
  assert_eq!(out[1], RGBA8::OPAQUE_BLACK);
}

#[test]
fn test_unpack_alpha_layouts() {
  let ctx = ColorContext::default();
  assert_eq!(unpack_row(PixelLayout::YA8, &[7, 9], 1, &ctx).unwrap(), [RGBA8::gray(7, 9)]);
  assert_eq!(unpack_row(PixelLayout::YA16, &[7, 0, 9, 0], 1, &ctx).unwrap(), [RGBA8::gray(7, 9)]);
  assert_eq!(
    unpack_row(PixelLayout::RGBA8, &[1, 2, 3, 4], 1, &ctx).unwrap(),
    [RGBA8 { r: 1, g: 2, b: 3, a: 4 }]
  );
  assert_eq!(
    unpack_row(PixelLayout::RGBA16, &[1, 0, 2, 0, 3, 0, 4, 0], 1, &ctx).unwrap(),
    [RGBA8 { r: 1, g: 2, b: 3, a: 4 }]
  );
}

#[test]
fn test_unpack_short_source() {
  let ctx = ColorContext::default();
  assert_eq!(unpack_row(PixelLayout::RGB8, &[1, 2, 3, 4], 2, &ctx), Err(PngError::TruncatedStream));
  assert_eq!(unpack_row(PixelLayout::Y1, &[0xFF], 9, &ctx), Err(PngError::TruncatedStream));
}
