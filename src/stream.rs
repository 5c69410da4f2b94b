//! Byte sources and sinks that the codec reads from and writes to.
//!
//! The codec never owns I/O. Decoding pulls bytes through a [`ByteSource`]
//! and encoding hands the finished stream to a [`ByteSink`] in one call.

use alloc::vec::Vec;

use crate::{PngError, PngResult};

/// Byte order for multi-byte integer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
  /// Most significant byte first (all PNG integers).
  Big,
  /// Least significant byte first.
  Little,
}

/// A seek target, relative to one of three origins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekFrom {
  /// From the start of the stream.
  Start(u64),
  /// From the end of the stream.
  End(i64),
  /// From the current position.
  Current(i64),
}

/// A sequential, seekable source of bytes.
pub trait ByteSource {
  /// Fills `buf` completely, or fails with
  /// [`TruncatedStream`](PngError::TruncatedStream).
  fn read_exact(&mut self, buf: &mut [u8]) -> PngResult<()>;

  /// Moves the read position, returning the new position.
  fn seek(&mut self, pos: SeekFrom) -> PngResult<u64>;

  /// The current read position.
  fn tell(&mut self) -> PngResult<u64>;

  /// If there's no more data to read.
  fn eof(&mut self) -> bool;

  /// Reads one byte.
  #[inline]
  fn read_u8(&mut self) -> PngResult<u8> {
    let mut b = [0_u8; 1];
    self.read_exact(&mut b)?;
    Ok(b[0])
  }

  /// Reads a two byte integer.
  #[inline]
  fn read_u16(&mut self, endian: Endian) -> PngResult<u16> {
    let mut b = [0_u8; 2];
    self.read_exact(&mut b)?;
    Ok(match endian {
      Endian::Big => u16::from_be_bytes(b),
      Endian::Little => u16::from_le_bytes(b),
    })
  }

  /// Reads a four byte integer.
  #[inline]
  fn read_u32(&mut self, endian: Endian) -> PngResult<u32> {
    let mut b = [0_u8; 4];
    self.read_exact(&mut b)?;
    Ok(match endian {
      Endian::Big => u32::from_be_bytes(b),
      Endian::Little => u32::from_le_bytes(b),
    })
  }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
  #[inline]
  fn read_exact(&mut self, buf: &mut [u8]) -> PngResult<()> {
    (**self).read_exact(buf)
  }
  #[inline]
  fn seek(&mut self, pos: SeekFrom) -> PngResult<u64> {
    (**self).seek(pos)
  }
  #[inline]
  fn tell(&mut self) -> PngResult<u64> {
    (**self).tell()
  }
  #[inline]
  fn eof(&mut self) -> bool {
    (**self).eof()
  }
}

/// Reads from an in-memory byte slice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SliceSource<'b> {
  bytes: &'b [u8],
  pos: usize,
}
impl<'b> SliceSource<'b> {
  /// Starts reading at the beginning of `bytes`.
  #[inline]
  #[must_use]
  pub const fn new(bytes: &'b [u8]) -> Self {
    Self { bytes, pos: 0 }
  }

  /// The bytes not yet read.
  #[inline]
  #[must_use]
  pub fn remaining(&self) -> &'b [u8] {
    &self.bytes[self.pos..]
  }
}
impl ByteSource for SliceSource<'_> {
  #[inline]
  fn read_exact(&mut self, buf: &mut [u8]) -> PngResult<()> {
    let rest = self.remaining();
    if rest.len() < buf.len() {
      // a failed read still consumes what was there, like a real stream.
      self.pos = self.bytes.len();
      return Err(PngError::TruncatedStream);
    }
    buf.copy_from_slice(&rest[..buf.len()]);
    self.pos += buf.len();
    Ok(())
  }

  fn seek(&mut self, pos: SeekFrom) -> PngResult<u64> {
    let target: i128 = match pos {
      SeekFrom::Start(n) => i128::from(n),
      SeekFrom::End(n) => self.bytes.len() as i128 + i128::from(n),
      SeekFrom::Current(n) => self.pos as i128 + i128::from(n),
    };
    if target < 0 || target > self.bytes.len() as i128 {
      return Err(PngError::TruncatedStream);
    }
    self.pos = target as usize;
    Ok(self.pos as u64)
  }

  #[inline]
  fn tell(&mut self) -> PngResult<u64> {
    Ok(self.pos as u64)
  }

  #[inline]
  fn eof(&mut self) -> bool {
    self.pos >= self.bytes.len()
  }
}

/// Adapts any `std::io` reader that can seek.
#[cfg(feature = "std")]
#[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
#[derive(Debug)]
pub struct IoSource<R> {
  inner: R,
}
#[cfg(feature = "std")]
impl<R: std::io::Read + std::io::Seek> IoSource<R> {
  /// Wraps the reader.
  #[inline]
  pub const fn new(inner: R) -> Self {
    Self { inner }
  }

  /// Unwraps the reader.
  #[inline]
  pub fn into_inner(self) -> R {
    self.inner
  }
}
#[cfg(feature = "std")]
impl<R: std::io::Read + std::io::Seek> ByteSource for IoSource<R> {
  #[inline]
  fn read_exact(&mut self, buf: &mut [u8]) -> PngResult<()> {
    self.inner.read_exact(buf).map_err(|_| PngError::TruncatedStream)
  }

  fn seek(&mut self, pos: SeekFrom) -> PngResult<u64> {
    let pos = match pos {
      SeekFrom::Start(n) => std::io::SeekFrom::Start(n),
      SeekFrom::End(n) => std::io::SeekFrom::End(n),
      SeekFrom::Current(n) => std::io::SeekFrom::Current(n),
    };
    self.inner.seek(pos).map_err(|_| PngError::TruncatedStream)
  }

  #[inline]
  fn tell(&mut self) -> PngResult<u64> {
    self.inner.stream_position().map_err(|_| PngError::TruncatedStream)
  }

  fn eof(&mut self) -> bool {
    let mut probe = [0_u8; 1];
    match self.inner.read(&mut probe) {
      Ok(0) | Err(_) => true,
      Ok(_) => self.inner.seek(std::io::SeekFrom::Current(-1)).is_err(),
    }
  }
}

/// A destination for encoded bytes.
pub trait ByteSink {
  /// Writes all of `bytes`, returning how many were written.
  fn write_bytes(&mut self, bytes: &[u8]) -> PngResult<usize>;
}

impl ByteSink for Vec<u8> {
  #[inline]
  fn write_bytes(&mut self, bytes: &[u8]) -> PngResult<usize> {
    self.try_reserve(bytes.len())?;
    self.extend_from_slice(bytes);
    Ok(bytes.len())
  }
}

impl<K: ByteSink + ?Sized> ByteSink for &mut K {
  #[inline]
  fn write_bytes(&mut self, bytes: &[u8]) -> PngResult<usize> {
    (**self).write_bytes(bytes)
  }
}

/// Adapts any `std::io` writer.
#[cfg(feature = "std")]
#[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
#[derive(Debug)]
pub struct IoSink<W> {
  inner: W,
}
#[cfg(feature = "std")]
impl<W: std::io::Write> IoSink<W> {
  /// Wraps the writer.
  #[inline]
  pub const fn new(inner: W) -> Self {
    Self { inner }
  }

  /// Unwraps the writer.
  #[inline]
  pub fn into_inner(self) -> W {
    self.inner
  }
}
#[cfg(feature = "std")]
impl<W: std::io::Write> ByteSink for IoSink<W> {
  fn write_bytes(&mut self, bytes: &[u8]) -> PngResult<usize> {
    self.inner.write_all(bytes).map_err(|_| PngError::WriteFailure)?;
    self.inner.flush().map_err(|_| PngError::WriteFailure)?;
    Ok(bytes.len())
  }
}

#[test]
fn test_slice_source_reads() {
  let mut src = SliceSource::new(&[0x12, 0x34, 0x56, 0x78, 0x9A]);
  assert_eq!(src.read_u32(Endian::Big), Ok(0x1234_5678));
  assert_eq!(src.tell(), Ok(4));
  assert!(!src.eof());
  assert_eq!(src.read_u8(), Ok(0x9A));
  assert!(src.eof());
  assert_eq!(src.read_u8(), Err(PngError::TruncatedStream));
  assert_eq!(src.seek(SeekFrom::Start(0)), Ok(0));
  assert_eq!(src.read_u16(Endian::Little), Ok(0x3412));
  assert_eq!(src.seek(SeekFrom::End(-1)), Ok(4));
  assert_eq!(src.seek(SeekFrom::Current(2)), Err(PngError::TruncatedStream));
}

#[test]
fn test_short_read_is_truncation() {
  let mut src = SliceSource::new(&[1, 2, 3]);
  let mut buf = [0_u8; 4];
  assert_eq!(src.read_exact(&mut buf), Err(PngError::TruncatedStream));
  assert!(src.eof());
}
