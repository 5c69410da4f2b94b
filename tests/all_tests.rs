#![allow(bad_style)]

use pngkit::{png::*, RGBA8};

mod png;

fn rand_bytes(count: usize) -> Vec<u8> {
  let mut buffer = vec![0; count];
  getrandom::getrandom(&mut buffer).unwrap();
  buffer
}

/// A deterministic test image, with every channel varying.
fn rgba_pattern(width: u32, height: u32) -> Vec<RGBA8> {
  (0..height)
    .flat_map(|y| {
      (0..width).map(move |x| RGBA8 {
        r: (x * 7 + y) as u8,
        g: (y * 13) as u8,
        b: (x ^ y) as u8,
        a: (255 - (x + y * 3) % 256) as u8,
      })
    })
    .collect()
}

/// Assembles a PNG from an IHDR and the other chunks, adding the signature and
/// IEND.
fn png_from_chunks(header: Header, chunks: &[(ChunkType, &[u8])]) -> Vec<u8> {
  let mut out = PNG_SIGNATURE.to_vec();
  write_chunk(&mut out, ChunkType::IHDR, &header.to_bytes()).unwrap();
  for (chunk_type, data) in chunks {
    write_chunk(&mut out, *chunk_type, data).unwrap();
  }
  write_chunk(&mut out, ChunkType::IEND, &[]).unwrap();
  out
}
