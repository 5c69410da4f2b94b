#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! A crate for PNG decoding and encoding.
//!
//! Decoding turns any static PNG (every legal color type and bit depth,
//! interlaced or not) into 8-bit RGBA pixels. Encoding writes 8-bit RGB or
//! RGBA pixels as a plain, non-interlaced PNG.
//!
//! ```no_run
//! use pngkit::{png, ImageFormat, SliceSource};
//! # fn main() -> Result<(), pngkit::PngError> {
//! let bytes: &[u8] = unimplemented!("data from somewhere");
//! let image = png::decode(&mut SliceSource::new(bytes))?;
//! assert_eq!(image.format, ImageFormat::RGBA);
//! let encoded = png::encode_to_vec(&image.pixels, image.width, image.height, image.format)?;
//! # Ok(())
//! # }
//! ```

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

mod error;
pub use error::*;

pub mod pixel_formats;
pub use pixel_formats::*;

pub mod stream;
pub use stream::*;

pub mod image;
pub use image::*;

pub mod png;
