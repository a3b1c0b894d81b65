//! Bitstream plumbing used by the k-d tree codecs.
//!
//! - [`buffer`]: byte buffers for fixed-width little-endian primitives and
//!   length-prefixed byte ranges
//! - [`direct_bits`]: fixed-width bit packing (leaf residuals, low-level
//!   split counts)
//! - [`range_coder`]: adaptive binary range coder (split counts and axes at
//!   higher compression levels)

pub mod buffer;
pub mod direct_bits;
pub mod range_coder;

pub use buffer::{DecoderBuffer, EncoderBuffer};
pub use direct_bits::{DirectBitDecoder, DirectBitEncoder};
pub use range_coder::{AdaptiveBitDecoder, AdaptiveBitEncoder, BitProbability};

/// Number of bits needed to represent `value` (0 for 0).
#[inline(always)]
pub const fn bits_for(value: u32) -> u32 {
  u32::BITS - value.leading_zeros()
}

/// Largest value representable in `bit_length` bits (`bit_length` in 0..=32).
#[inline(always)]
pub const fn max_value(bit_length: u32) -> u32 {
  if bit_length == 0 {
    0
  } else {
    u32::MAX >> (32 - bit_length)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_bits_for() {
    assert_eq!(bits_for(0), 0);
    assert_eq!(bits_for(1), 1);
    assert_eq!(bits_for(2), 2);
    assert_eq!(bits_for(3), 2);
    assert_eq!(bits_for(4), 3);
    assert_eq!(bits_for(u32::MAX), 32);
  }

  #[test]
  fn test_max_value() {
    assert_eq!(max_value(0), 0);
    assert_eq!(max_value(1), 1);
    assert_eq!(max_value(2), 3);
    assert_eq!(max_value(16), 0xFFFF);
    assert_eq!(max_value(32), u32::MAX);
  }
}
