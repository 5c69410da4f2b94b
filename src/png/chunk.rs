use super::*;

/// The first eight bytes of a PNG datastream should match these bytes.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// The largest chunk length the PNG format allows.
pub const MAX_CHUNK_LEN: u32 = (1 << 31) - 1;

/// A chunk's 4-byte type tag.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ChunkType(pub [u8; 4]);
#[allow(nonstandard_style)]
#[allow(missing_docs)]
impl ChunkType {
  pub const IHDR: Self = Self(*b"IHDR");
  pub const PLTE: Self = Self(*b"PLTE");
  pub const IDAT: Self = Self(*b"IDAT");
  pub const IEND: Self = Self(*b"IEND");
  pub const tRNS: Self = Self(*b"tRNS");
  pub const pHYs: Self = Self(*b"pHYs");
}
impl ChunkType {
  /// Ancillary chunks (lowercase first letter) can be skipped safely.
  #[inline]
  #[must_use]
  pub const fn is_ancillary(self) -> bool {
    (self.0[0] & 0x20) != 0
  }
}
impl Debug for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    for b in self.0 {
      f.write_char(if b.is_ascii_graphic() { b as char } else { '?' })?;
    }
    Ok(())
  }
}

/// One length-tagged record of the PNG container.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Chunk {
  /// The type tag.
  pub chunk_type: ChunkType,
  /// The payload. The chunk's length field is this slice's length.
  pub data: Vec<u8>,
  /// The CRC stored in the stream, as read.
  pub declared_crc: u32,
}
impl Debug for Chunk {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Chunk")
      .field("chunk_type", &self.chunk_type)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("declared_crc", &self.declared_crc)
      .finish()
  }
}
impl Chunk {
  /// The CRC that the type and data actually produce.
  #[inline]
  #[must_use]
  pub fn compute_crc(&self) -> u32 {
    Crc32::new().update(&self.chunk_type.0).update(&self.data).finish()
  }

  /// Checks the declared CRC against the content.
  #[inline]
  pub fn verify_crc(&self) -> PngResult<()> {
    if self.compute_crc() == self.declared_crc {
      Ok(())
    } else {
      Err(PngError::ChecksumMismatch)
    }
  }
}

/// Reads 8 bytes and checks them against [`PNG_SIGNATURE`].
///
/// This must be the first read on a fresh stream, otherwise every chunk
/// boundary after it is off.
pub fn check_signature<S: ByteSource>(source: &mut S) -> PngResult<bool> {
  let mut sig = [0_u8; 8];
  source.read_exact(&mut sig)?;
  Ok(sig == PNG_SIGNATURE)
}

/// Reads exactly one chunk.
///
/// The CRC is read and stored, but not checked.
pub fn read_chunk<S: ByteSource>(source: &mut S) -> PngResult<Chunk> {
  const READ_STEP: usize = 64 * 1024;

  let len = source.read_u32(Endian::Big)?;
  if len > MAX_CHUNK_LEN {
    return Err(PngError::InvalidHeader);
  }
  let mut chunk_type = [0_u8; 4];
  source.read_exact(&mut chunk_type)?;
  // The length is untrusted, so the buffer grows as the bytes actually show
  // up instead of being allocated up front.
  let len = len as usize;
  let mut data: Vec<u8> = Vec::new();
  while data.len() < len {
    let start = data.len();
    let step = (len - start).min(READ_STEP);
    data.try_reserve(step)?;
    data.resize(start + step, 0);
    source.read_exact(&mut data[start..])?;
  }
  let declared_crc = source.read_u32(Endian::Big)?;
  Ok(Chunk { chunk_type: ChunkType(chunk_type), data, declared_crc })
}

/// Appends a complete chunk (length, type, data, CRC) to `out`.
pub fn write_chunk(out: &mut Vec<u8>, chunk_type: ChunkType, data: &[u8]) -> PngResult<()> {
  let len = u32::try_from(data.len()).ok().filter(|l| *l <= MAX_CHUNK_LEN).ok_or(PngError::SizeMismatch)?;
  out.try_reserve(12 + data.len())?;
  out.extend_from_slice(&len.to_be_bytes());
  out.extend_from_slice(&chunk_type.0);
  out.extend_from_slice(data);
  let crc = Crc32::new().update(&chunk_type.0).update(data).finish();
  out.extend_from_slice(&crc.to_be_bytes());
  Ok(())
}

/// An iterator that produces successive chunks from a PNG stream.
///
/// The signature is checked on the first call to `next`. Iteration ends after
/// `IEND`, or after the first error is returned.
#[derive(Debug)]
pub struct ChunkReader<S> {
  source: S,
  state: ReaderState,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
  Fresh,
  Chunks,
  Done,
}
impl<S: ByteSource> ChunkReader<S> {
  /// The source should be positioned at the signature.
  #[inline]
  pub const fn new(source: S) -> Self {
    Self { source, state: ReaderState::Fresh }
  }

  /// Gives back the source, positioned after the last chunk read.
  #[inline]
  pub fn into_inner(self) -> S {
    self.source
  }

  fn next_chunk(&mut self) -> PngResult<Chunk> {
    if self.state == ReaderState::Fresh {
      if !check_signature(&mut self.source)? {
        return Err(PngError::InvalidSignature);
      }
      self.state = ReaderState::Chunks;
    }
    read_chunk(&mut self.source)
  }
}
impl<S: ByteSource> Iterator for ChunkReader<S> {
  type Item = PngResult<Chunk>;
  fn next(&mut self) -> Option<Self::Item> {
    if self.state == ReaderState::Done {
      return None;
    }
    let out = self.next_chunk();
    match &out {
      Ok(chunk) if chunk.chunk_type != ChunkType::IEND => (),
      _ => self.state = ReaderState::Done,
    }
    Some(out)
  }
}

#[test]
fn test_write_then_read_chunk() {
  let mut bytes = Vec::new();
  write_chunk(&mut bytes, ChunkType::IEND, &[]).unwrap();
  assert_eq!(bytes, [0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]);
  let chunk = read_chunk(&mut SliceSource::new(&bytes)).unwrap();
  assert_eq!(chunk.chunk_type, ChunkType::IEND);
  assert!(chunk.verify_crc().is_ok());
}

#[test]
fn test_read_chunk_truncated() {
  // declares 10 bytes of data but only has 3
  let bytes = [0, 0, 0, 10, b't', b'E', b'X', b't', 1, 2, 3];
  assert_eq!(read_chunk(&mut SliceSource::new(&bytes)), Err(PngError::TruncatedStream));
  // missing the CRC
  let bytes = [0, 0, 0, 1, b't', b'E', b'X', b't', 1];
  assert_eq!(read_chunk(&mut SliceSource::new(&bytes)), Err(PngError::TruncatedStream));
}

#[test]
fn test_chunk_reader_stops_at_iend() {
  let mut bytes = PNG_SIGNATURE.to_vec();
  write_chunk(&mut bytes, ChunkType(*b"abCD"), &[1, 2]).unwrap();
  write_chunk(&mut bytes, ChunkType::IEND, &[]).unwrap();
  bytes.extend_from_slice(b"trailing garbage");
  let types: Vec<ChunkType> =
    ChunkReader::new(SliceSource::new(&bytes)).map(|c| c.unwrap().chunk_type).collect();
  assert_eq!(types, [ChunkType(*b"abCD"), ChunkType::IEND]);
  assert!(types[0].is_ancillary());
  assert!(!types[1].is_ancillary());
}

#[test]
fn test_chunk_reader_bad_signature() {
  let mut it = ChunkReader::new(SliceSource::new(b"GIF89a\0\0\0\0\0\0"));
  assert_eq!(it.next(), Some(Err(PngError::InvalidSignature)));
  assert_eq!(it.next(), None);
}
