//! Holds all the tools for decoding and encoding PNG data.
//!
//! ## Automated PNG Decoding
//! If you don't need full control over the decoding process there's
//! [`decode`], which takes a PNG data stream and just gives you the pixels as
//! an RGBA [`DecodedImage`]. [`decode_info`] reads only the header, and leaves
//! the source where it found it.
//!
//! ## Decoding a PNG Yourself
//! The general format of a PNG is that the information is stored in "chunks".
//! You iterate the chunks and each one gives you some info that you might
//! decide to use. There's four "critical" chunk types:
//! * **Header** (`IHDR`) - This has all the important information about the
//!   image's dimensions, pixel format, and if the image is interlaced or not.
//! * **Palette** (`PLTE`) - If an image uses indexed color it will have a
//!   palette of what index values map to what colors.
//! * **Image Data** (`IDAT`) - One or more chunks of compressed data. All of
//!   the compressed data forms a single zlib data stream.
//! * **End** (`IEND`) - The last chunk, lets you know you had the full PNG and
//!   your data wasn't truncated accidentally.
//!
//! Between the header and the image data there are also zero or more
//! "ancillary" chunks. Of those, this crate reads the transparency (`tRNS`)
//! and physical pixel size (`pHYs`) chunks, and skips everything else.
//!
//! ```no_run
//! use pngkit::{png::*, SliceSource};
//! # fn or_png_error(png: &[u8]) -> Result<(), pngkit::PngError> {
//! for chunk in ChunkReader::new(SliceSource::new(png)) {
//!   let chunk = chunk?;
//!   if chunk.chunk_type == ChunkType::IHDR {
//!     let header = Header::parse(&chunk.data)?;
//!   }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! When storing the PNG, the raw pixel values are first "filtered" (to try and
//! make them more compression-friendly), and then compressed into a zlib data
//! stream. To decode the PNG you have to reverse the operations: first
//! decompress, then [unfilter](unfilter_scanline) each line, then
//! [unpack](unpacker_for) the pixels. If the image is interlaced the lines
//! belong to seven "reduced" images (see [`pass_dimensions`]) instead of one.
//!
//! ## Encoding
//! [`encode`] writes 8-bit RGB or RGBA pixels as a non-interlaced PNG. The
//! whole stream is built in memory first, so a failure never leaves a partial
//! file in the sink.

use alloc::vec::Vec;
use core::fmt::{Debug, Write};

use log::{debug, trace, warn};

use crate::{
  ByteSink, ByteSource, DecodedImage, Endian, ImageFormat, PngError, PngResult, SeekFrom,
  SliceSource, RGB8, RGBA8,
};

mod crc32;
use crc32::Crc32;
pub use crc32::png_crc;

mod chunk;
pub use chunk::*;

mod header;
pub use header::*;

mod ancillary;
pub use ancillary::*;

mod adam7;
pub use adam7::*;

mod unfilter;
pub use unfilter::*;

mod unpack;
pub use unpack::*;

mod decoder;
pub use decoder::*;

mod encoder;
pub use encoder::*;

/// Options for [`decode_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeSettings {
  /// Check every chunk's CRC, failing with
  /// [`ChecksumMismatch`](PngError::ChecksumMismatch) on the first bad one.
  ///
  /// The zlib Adler-32 is checked either way. This only picks the error a bad
  /// one gets: `ChecksumMismatch` when set, `DecompressionFailure` when not.
  ///
  /// Off by default, many real world files have bad CRCs and still display
  /// fine.
  pub verify_crc: bool,

  /// Stretch the output so that pixels are square when the file has a
  /// non-square `pHYs` hint.
  pub correct_aspect: bool,
}
impl Default for DecodeSettings {
  #[inline]
  fn default() -> Self {
    Self { verify_crc: false, correct_aspect: true }
  }
}

/// Options for [`encode_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodeSettings {
  /// zlib compression level, 0 (store) through 10 (slowest). Values above 10
  /// are treated as 10.
  pub compression_level: u8,

  /// The most compressed bytes to put in a single `IDAT` chunk. 0 means the
  /// default.
  pub max_idat_len: usize,
}
impl EncodeSettings {
  /// The `IDAT` size used when none is given.
  pub const DEFAULT_MAX_IDAT_LEN: usize = 8192;
}
impl Default for EncodeSettings {
  #[inline]
  fn default() -> Self {
    Self { compression_level: 6, max_idat_len: Self::DEFAULT_MAX_IDAT_LEN }
  }
}

#[cfg(test)]
mod tests;
