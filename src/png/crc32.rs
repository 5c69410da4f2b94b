const CRC_TABLE: [u32; 256] = make_crc_table();

const fn make_crc_table() -> [u32; 256] {
  let mut out = [0; 256];
  let mut n = 0;
  while n < 256 {
    let mut c = n as u32;
    let mut k = 0;
    while k < 8 {
      c = if (c & 1) != 0 { 0xEDB8_8320_u32 ^ (c >> 1) } else { c >> 1 };
      k += 1;
    }
    out[n] = c;
    n += 1;
  }
  out
}

/// Running CRC32 over a chunk's type and data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Crc32(u32);
impl Crc32 {
  #[inline]
  pub(crate) const fn new() -> Self {
    Self(u32::MAX)
  }

  #[inline]
  pub(crate) fn update(mut self, bytes: &[u8]) -> Self {
    for &byte in bytes {
      let i = (self.0 ^ u32::from(byte)) as u8 as usize;
      self.0 = CRC_TABLE[i] ^ (self.0 >> 8);
    }
    self
  }

  #[inline]
  pub(crate) const fn finish(self) -> u32 {
    self.0 ^ u32::MAX
  }
}

/// The PNG chunk CRC of the bytes given.
#[inline]
#[must_use]
pub fn png_crc(bytes: &[u8]) -> u32 {
  Crc32::new().update(bytes).finish()
}

#[test]
fn test_png_crc_known_values() {
  assert_eq!(png_crc(b""), 0);
  assert_eq!(png_crc(b"123456789"), 0xCBF4_3926);
  // every PNG ends with the same IEND chunk.
  assert_eq!(png_crc(b"IEND"), 0xAE42_6082);
  assert_eq!(Crc32::new().update(b"IE").update(b"ND").finish(), 0xAE42_6082);
}
