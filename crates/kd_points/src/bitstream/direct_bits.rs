//! Fixed-width bit packing, most significant bit first.

use crate::error::{KdTreeError, Result};

/// Packs values of arbitrary bit width (0..=32) into bytes.
#[derive(Clone, Debug, Default)]
pub struct DirectBitEncoder {
  bytes: Vec<u8>,
  acc: u64,
  acc_bits: u32,
  bits_written: u64,
}

impl DirectBitEncoder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append the low `nbits` bits of `value`.
  #[inline]
  pub fn encode_least_significant_bits(&mut self, nbits: u32, value: u32) {
    debug_assert!(nbits <= 32);
    if nbits == 0 {
      return;
    }
    let mask = (1u64 << nbits) - 1;
    // acc_bits < 8 here, so the accumulator never exceeds 40 bits
    self.acc = (self.acc << nbits) | (value as u64 & mask);
    self.acc_bits += nbits;
    self.bits_written += nbits as u64;
    while self.acc_bits >= 8 {
      self.acc_bits -= 8;
      self.bytes.push((self.acc >> self.acc_bits) as u8);
    }
    self.acc &= (1u64 << self.acc_bits) - 1;
  }

  #[inline]
  pub fn encode_bit(&mut self, bit: bool) {
    self.encode_least_significant_bits(1, bit as u32);
  }

  /// Total payload bits written so far (excluding padding).
  pub fn bits_written(&self) -> u64 {
    self.bits_written
  }

  /// Flush the partial byte (zero padded) and return the packed bytes.
  pub fn finish(mut self) -> Vec<u8> {
    if self.acc_bits > 0 {
      self.bytes.push((self.acc << (8 - self.acc_bits)) as u8);
    }
    self.bytes
  }
}

/// Reads values written by [`DirectBitEncoder`].
#[derive(Clone, Debug)]
pub struct DirectBitDecoder<'a> {
  data: &'a [u8],
  bit_pos: usize,
}

impl<'a> DirectBitDecoder<'a> {
  pub fn new(data: &'a [u8]) -> Self {
    Self { data, bit_pos: 0 }
  }

  pub fn decode_least_significant_bits(&mut self, nbits: u32) -> Result<u32> {
    debug_assert!(nbits <= 32);
    let end = self.bit_pos + nbits as usize;
    if end > self.data.len() * 8 {
      return Err(KdTreeError::UnexpectedEnd);
    }
    let mut value = 0u64;
    for i in self.bit_pos..end {
      let bit = (self.data[i / 8] >> (7 - i % 8)) & 1;
      value = (value << 1) | bit as u64;
    }
    self.bit_pos = end;
    Ok(value as u32)
  }

  pub fn decode_bit(&mut self) -> Result<bool> {
    Ok(self.decode_least_significant_bits(1)? == 1)
  }

  /// Verify the stream was consumed exactly: no whole unread byte, zero
  /// padding.
  pub fn finish(self) -> Result<()> {
    let used_bytes = self.bit_pos.div_ceil(8);
    if used_bytes != self.data.len() {
      return Err(KdTreeError::corrupt(format!(
        "direct bit stream has {} unread bytes",
        self.data.len() - used_bytes
      )));
    }
    let tail = self.bit_pos % 8;
    if tail != 0 && self.data[used_bytes - 1] & (0xFF >> tail) != 0 {
      return Err(KdTreeError::corrupt("non-zero padding in direct bit stream"));
    }
    Ok(())
  }
}
