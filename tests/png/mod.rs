use super::*;

use miniz_oxide::deflate::compress_to_vec_zlib;
use pngkit::{ByteSink, DecodedImage, ImageFormat, IoSink, IoSource, PngError, PngResult, SliceSource};

mod ancillary;
mod interlace;
mod no_panics;
mod round_trip;
