use super::*;

use miniz_oxide::inflate::{decompress_slice_iter_to_slice, TINFLStatus};

/// Reads the signature and `IHDR` from the current position.
fn read_header<S: ByteSource>(source: &mut S) -> PngResult<Header> {
  if !check_signature(source)? {
    return Err(PngError::InvalidSignature);
  }
  let chunk = read_chunk(source)?;
  header_from_chunk(&chunk)
}

fn header_from_chunk(chunk: &Chunk) -> PngResult<Header> {
  if chunk.chunk_type != ChunkType::IHDR || chunk.data.len() != Header::LEN {
    return Err(PngError::InvalidHeader);
  }
  Header::parse(&chunk.data)
}

/// Reads just the image header.
///
/// The source is put back at the position it started at (even on error), so
/// the same source can be handed to [`decode`] afterwards.
pub fn decode_info<S: ByteSource>(mut source: S) -> PngResult<ImageInfo> {
  let start = source.tell()?;
  let header = read_header(&mut source);
  source.seek(SeekFrom::Start(start))?;
  let header = header?;
  debug!("PNG info: {header:?}");
  Ok(ImageInfo::from(header))
}

/// Decodes a full PNG into RGBA pixels, using the default settings.
#[inline]
pub fn decode<S: ByteSource>(source: S) -> PngResult<DecodedImage> {
  decode_with(source, &DecodeSettings::default())
}

/// Everything the chunk pass collects before pixel work begins.
struct ChunkSummary {
  header: Header,
  palette: Option<Palette>,
  transparency: Option<Transparency>,
  aspect: Option<AspectHint>,
  idat: Vec<Vec<u8>>,
}

fn gather_chunks<S: ByteSource>(source: S, settings: &DecodeSettings) -> PngResult<ChunkSummary> {
  let mut reader = ChunkReader::new(source);
  let mut next_chunk = || -> PngResult<Option<Chunk>> {
    match reader.next().transpose()? {
      Some(chunk) => {
        if settings.verify_crc {
          chunk.verify_crc()?;
        }
        Ok(Some(chunk))
      }
      None => Ok(None),
    }
  };
  let header = header_from_chunk(&next_chunk()?.ok_or(PngError::TruncatedStream)?)?;
  debug!("PNG header: {header:?}");
  let color_type = header.layout.color_type();
  let mut summary =
    ChunkSummary { header, palette: None, transparency: None, aspect: None, idat: Vec::new() };
  let mut saw_iend = false;
  while let Some(chunk) = next_chunk()? {
    match chunk.chunk_type {
      ChunkType::IDAT => {
        summary.idat.try_reserve(1)?;
        summary.idat.push(chunk.data);
      }
      ChunkType::PLTE if color_type == ColorType::Indexed => {
        if summary.palette.is_some() {
          warn!("ignoring a second PLTE");
        } else {
          summary.palette = Some(Palette::parse(&chunk.data)?);
        }
      }
      ChunkType::tRNS => summary.transparency = Transparency::parse(&chunk.data, color_type)?,
      ChunkType::pHYs => summary.aspect = AspectHint::parse(&chunk.data),
      ChunkType::IEND => saw_iend = true,
      other => trace!("skipping chunk {other:?} ({} bytes)", chunk.data.len()),
    }
  }
  if !saw_iend {
    return Err(PngError::TruncatedStream);
  }
  if color_type == ColorType::Indexed && summary.palette.is_none() {
    return Err(PngError::MissingPalette);
  }
  if summary.idat.is_empty() {
    return Err(PngError::TruncatedStream);
  }
  Ok(summary)
}

/// Inflates the `IDAT` stream into a buffer of exactly `len` bytes.
///
/// The zlib Adler-32 is always checked. A bad one is a
/// [`ChecksumMismatch`](PngError::ChecksumMismatch) in strict mode and a
/// [`DecompressionFailure`](PngError::DecompressionFailure) otherwise.
fn inflate_idat(idat: &[Vec<u8>], len: usize, strict: bool) -> PngResult<Vec<u8>> {
  let mut filtered: Vec<u8> = Vec::new();
  filtered.try_reserve_exact(len)?;
  filtered.resize(len, 0);
  match decompress_slice_iter_to_slice(&mut filtered, idat.iter().map(Vec::as_slice), true, false) {
    Ok(count) if count < len => {
      debug!("zlib stream ended after {count} of {len} bytes");
      Err(PngError::TruncatedStream)
    }
    Ok(_) => Ok(filtered),
    Err(TINFLStatus::HasMoreOutput) => {
      warn!("ignoring zlib data past the {len} bytes the image needs");
      Ok(filtered)
    }
    Err(TINFLStatus::Adler32Mismatch) => {
      debug!("zlib Adler-32 mismatch");
      Err(if strict { PngError::ChecksumMismatch } else { PngError::DecompressionFailure })
    }
    Err(status) => {
      debug!("inflate failed: {status:?}");
      Err(PngError::DecompressionFailure)
    }
  }
}

/// Walks the inflated scanlines, unfiltering each one in place.
struct DecodeCursor {
  filtered: Vec<u8>,
  pos: usize,
  filter_unit: usize,
  /// Start of the previous line's pixel bytes, `None` at the top of a pass.
  prev_line: Option<usize>,
  pass: usize,
  placed: usize,
}
impl DecodeCursor {
  fn new(filtered: Vec<u8>, filter_unit: usize) -> Self {
    Self { filtered, pos: 0, filter_unit, prev_line: None, pass: 0, placed: 0 }
  }

  fn begin_pass(&mut self, pass: usize) {
    self.pass = pass;
    self.prev_line = None;
  }

  /// Unfilters the next line of `line_len` pixel bytes and returns them.
  fn next_line(&mut self, line_len: usize) -> PngResult<&[u8]> {
    let start = self.pos;
    let end = start
      .checked_add(1 + line_len)
      .filter(|&end| end <= self.filtered.len())
      .ok_or(PngError::TruncatedStream)?;
    let filter = FilterType::try_from(self.filtered[start])?;
    let (before, rest) = self.filtered.split_at_mut(start + 1);
    let cur_line = &mut rest[..line_len];
    let prev_line = self.prev_line.map(|p| &before[p..p + line_len]);
    unfilter_scanline(filter, cur_line, prev_line, self.filter_unit);
    self.prev_line = Some(start + 1);
    self.pos = end;
    Ok(&self.filtered[start + 1..end])
  }
}

/// Decodes a full PNG into RGBA pixels.
///
/// The output is always [`ImageFormat::RGBA`]. Sub-byte samples are scaled up
/// to 8 bits and 16-bit samples keep only their high byte.
pub fn decode_with<S: ByteSource>(source: S, settings: &DecodeSettings) -> PngResult<DecodedImage> {
  let ChunkSummary { header, mut palette, transparency, aspect, idat } =
    gather_chunks(source, settings)?;
  if let (Some(plte), Some(Transparency::Alphas(alphas))) = (palette.as_mut(), &transparency) {
    plte.apply_alphas(alphas);
  }
  let ctx = ColorContext { palette: palette.as_ref(), transparency: transparency.as_ref() };

  let filtered_len = header.filtered_data_len();
  let filtered = inflate_idat(&idat, filtered_len, settings.verify_crc)?;
  drop(idat);

  let (width, height) = (header.width, header.height);
  let pixel_count = (width as usize) * (height as usize);
  let mut pixels: Vec<RGBA8> = Vec::new();
  pixels.try_reserve_exact(pixel_count)?;
  pixels.resize(pixel_count, RGBA8::OPAQUE_BLACK);
  let mut row: Vec<RGBA8> = Vec::new();
  row.try_reserve_exact(width as usize)?;
  row.resize(width as usize, RGBA8::default());

  let unpack = unpacker_for(header.layout);
  let mut cursor = DecodeCursor::new(filtered, header.layout.filter_unit());
  let passes: &[usize] = if header.is_interlaced { &[1, 2, 3, 4, 5, 6, 7] } else { &[0] };
  for &pass in passes {
    let (pass_w, pass_h) = if pass == 0 {
      (width, height)
    } else {
      let g = pass_dimensions(pass, width, height);
      trace!("pass {pass}: {g:?}");
      if g.is_empty() {
        continue;
      }
      (g.width, g.height)
    };
    cursor.begin_pass(pass);
    let line_len = header.layout.bytes_per_scanline(pass_w);
    for local_y in 0..pass_h {
      let line = cursor.next_line(line_len)?;
      unpack(line, pass_w as usize, &ctx, &mut row)?;
      for (local_x, px) in (0..pass_w).zip(row.iter().copied()) {
        let (x, y) =
          if cursor.pass == 0 { (local_x, local_y) } else { map_to_final(pass, local_x, local_y) };
        if let Some(out) = pixels.get_mut(crate::xy_width_to_index(x, y, width)) {
          *out = px;
          cursor.placed += 1;
        }
      }
    }
  }
  if cursor.placed != pixel_count {
    debug!("placed {} pixels for a {width}x{height} image", cursor.placed);
    return Err(PngError::SizeMismatch);
  }
  debug!("decoded {width}x{height} {:?}, interlaced: {}", header.layout, header.is_interlaced);

  let image = DecodedImage::from_rgba(width, height, pixels)?;
  match aspect {
    Some(hint) if settings.correct_aspect && !hint.is_square() => {
      let (new_w, new_h) = hint.corrected_dimensions(width, height);
      debug!("pHYs {}:{}, resizing to {new_w}x{new_h}", hint.ppu_x, hint.ppu_y);
      image.resize_nearest(new_w, new_h)
    }
    _ => Ok(image),
  }
}

impl DecodedImage {
  /// Decodes PNG bytes held in memory.
  #[inline]
  pub fn try_from_png_bytes(bytes: &[u8]) -> PngResult<Self> {
    decode(SliceSource::new(bytes))
  }
}

#[test]
fn test_decode_cursor_unfilters_in_order() {
  let filtered = alloc::vec![1, 10, 10, 10, 2, 1, 1, 1];
  let mut cursor = DecodeCursor::new(filtered, 1);
  cursor.begin_pass(0);
  assert_eq!(cursor.next_line(3).unwrap(), [10, 20, 30]);
  assert_eq!(cursor.next_line(3).unwrap(), [11, 21, 31]);
  assert_eq!(cursor.next_line(3), Err(PngError::TruncatedStream));
}

#[test]
fn test_decode_cursor_resets_each_pass() {
  // Up on the first line of a pass must not see the previous pass.
  let filtered = alloc::vec![0, 50, 2, 7];
  let mut cursor = DecodeCursor::new(filtered, 1);
  cursor.begin_pass(1);
  assert_eq!(cursor.next_line(1).unwrap(), [50]);
  cursor.begin_pass(2);
  assert_eq!(cursor.next_line(1).unwrap(), [7]);
}
