use core::fmt;

/// An error from the `pngkit` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PngError {
  /// The first 8 bytes are not the PNG signature.
  InvalidSignature,

  /// The `IHDR` chunk is missing, has the wrong length, or holds values that
  /// the PNG format doesn't allow (zero or oversized dimensions, unknown
  /// compression / filter / interlace methods). Malformed `PLTE` data is also
  /// reported this way.
  InvalidHeader,

  /// The color type and bit depth combination is illegal or unknown.
  UnsupportedFormat,

  /// Fewer bytes were available than a chunk or scanline declares.
  TruncatedStream,

  /// The zlib compressor or decompressor reported a failure.
  DecompressionFailure,

  /// The pixel byte count doesn't match `width * height * bytes_per_pixel`.
  SizeMismatch,

  /// A scanline started with a filter byte other than 0 through 4.
  InvalidFilter,

  /// An indexed color image has no `PLTE` chunk.
  MissingPalette,

  /// A chunk's declared CRC, or the zlib Adler-32, doesn't match its content.
  ///
  /// Only reported when CRC checking was requested.
  ChecksumMismatch,

  /// The byte sink refused the output.
  WriteFailure,

  /// The allocator couldn't give us enough space.
  Alloc,
}

/// Result alias used throughout the crate.
pub type PngResult<T> = Result<T, PngError>;

impl fmt::Display for PngError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::InvalidSignature => "not a PNG signature",
      Self::InvalidHeader => "invalid PNG header",
      Self::UnsupportedFormat => "unsupported color type and bit depth",
      Self::TruncatedStream => "unexpected end of PNG data",
      Self::DecompressionFailure => "zlib stream failure",
      Self::SizeMismatch => "pixel data size does not match the image dimensions",
      Self::InvalidFilter => "illegal scanline filter type",
      Self::MissingPalette => "indexed image without a palette",
      Self::ChecksumMismatch => "checksum mismatch",
      Self::WriteFailure => "could not write PNG data",
      Self::Alloc => "allocation failure",
    })
  }
}

#[cfg(feature = "std")]
impl std::error::Error for PngError {}

impl From<alloc::collections::TryReserveError> for PngError {
  #[inline]
  fn from(_: alloc::collections::TryReserveError) -> Self {
    Self::Alloc
  }
}
