//! Adaptive binary range coder.
//!
//! Each coded decision carries a [`BitProbability`] context that adapts
//! towards the observed bits. Equiprobable "direct" bits bypass the model.
//!
//! # Stream properties
//!
//! - The first output byte is always zero.
//! - The encoder flush writes exactly the bytes the decoder will read, so a
//!   decoder that reaches the end of a valid stream has consumed every byte and
//!   holds a zero code value. [`AdaptiveBitDecoder::finish`] checks both.

use crate::error::{KdTreeError, Result};

/// Probability precision in bits.
const PROB_BITS: u32 = 11;
/// Probability scale (`1 << PROB_BITS`).
const PROB_ONE: u16 = 1 << PROB_BITS;
/// Renormalize once the range drops below this.
const TOP: u32 = 1 << 24;

/// Adaptive probability that the next bit is zero, in units of `1/2048`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitProbability(u16);

impl BitProbability {
  /// Even odds.
  pub const HALF: Self = Self(PROB_ONE / 2);

  /// Probability of a zero bit as a fraction.
  #[cfg(test)]
  pub(crate) fn p_zero(self) -> f32 {
    self.0 as f32 / PROB_ONE as f32
  }

  #[inline]
  fn update(&mut self, bit: bool, shift: u32) {
    if bit {
      self.0 -= self.0 >> shift;
    } else {
      self.0 += (PROB_ONE - self.0) >> shift;
    }
  }
}

impl Default for BitProbability {
  fn default() -> Self {
    Self::HALF
  }
}

/// Range encoder producing a byte vector.
#[derive(Clone, Debug)]
pub struct AdaptiveBitEncoder {
  low: u64,
  range: u32,
  cache: u8,
  cache_size: u64,
  out: Vec<u8>,
  adaptation_shift: u32,
}

impl AdaptiveBitEncoder {
  /// `adaptation_shift` controls how fast contexts adapt (smaller = faster).
  pub fn new(adaptation_shift: u32) -> Self {
    debug_assert!((1..PROB_BITS).contains(&adaptation_shift));
    Self {
      low: 0,
      range: u32::MAX,
      cache: 0,
      cache_size: 1,
      out: Vec::new(),
      adaptation_shift,
    }
  }

  /// Code one bit under an adaptive context.
  #[inline]
  pub fn encode_bit(&mut self, prob: &mut BitProbability, bit: bool) {
    let bound = (self.range >> PROB_BITS) * prob.0 as u32;
    if bit {
      self.low += bound as u64;
      self.range -= bound;
    } else {
      self.range = bound;
    }
    prob.update(bit, self.adaptation_shift);
    self.normalize();
  }

  /// Code the low `nbits` bits of `value` with even odds, MSB first.
  pub fn encode_direct_bits(&mut self, nbits: u32, value: u32) {
    for i in (0..nbits).rev() {
      self.range >>= 1;
      if (value >> i) & 1 == 1 {
        self.low += self.range as u64;
      }
      self.normalize();
    }
  }

  pub fn finish(mut self) -> Vec<u8> {
    for _ in 0..5 {
      self.shift_low();
    }
    self.out
  }

  #[inline]
  fn normalize(&mut self) {
    while self.range < TOP {
      self.range <<= 8;
      self.shift_low();
    }
  }

  fn shift_low(&mut self) {
    if (self.low as u32) < 0xFF00_0000 || (self.low >> 32) != 0 {
      let carry = (self.low >> 32) as u8;
      let mut pending = self.cache;
      loop {
        self.out.push(pending.wrapping_add(carry));
        pending = 0xFF;
        self.cache_size -= 1;
        if self.cache_size == 0 {
          break;
        }
      }
      self.cache = (self.low >> 24) as u8;
    }
    self.cache_size += 1;
    self.low = (self.low & 0x00FF_FFFF) << 8;
  }
}

/// Range decoder mirroring [`AdaptiveBitEncoder`].
#[derive(Clone, Debug)]
pub struct AdaptiveBitDecoder<'a> {
  data: &'a [u8],
  pos: usize,
  range: u32,
  code: u32,
  adaptation_shift: u32,
}

impl<'a> AdaptiveBitDecoder<'a> {
  pub fn new(data: &'a [u8], adaptation_shift: u32) -> Result<Self> {
    let mut decoder = Self {
      data,
      pos: 0,
      range: u32::MAX,
      code: 0,
      adaptation_shift,
    };
    if decoder.next_byte()? != 0 {
      return Err(KdTreeError::corrupt("range coder stream must start with zero"));
    }
    for _ in 0..4 {
      decoder.code = (decoder.code << 8) | decoder.next_byte()? as u32;
    }
    Ok(decoder)
  }

  #[inline]
  pub fn decode_bit(&mut self, prob: &mut BitProbability) -> Result<bool> {
    let bound = (self.range >> PROB_BITS) * prob.0 as u32;
    let bit = if self.code < bound {
      self.range = bound;
      false
    } else {
      self.code -= bound;
      self.range -= bound;
      true
    };
    prob.update(bit, self.adaptation_shift);
    self.normalize()?;
    Ok(bit)
  }

  pub fn decode_direct_bits(&mut self, nbits: u32) -> Result<u32> {
    let mut value = 0u32;
    for _ in 0..nbits {
      self.range >>= 1;
      let bit = self.code >= self.range;
      if bit {
        self.code -= self.range;
      }
      value = (value << 1) | bit as u32;
      self.normalize()?;
    }
    Ok(value)
  }

  /// Verify the whole stream was consumed and ended cleanly.
  pub fn finish(self) -> Result<()> {
    if self.pos != self.data.len() {
      return Err(KdTreeError::corrupt(format!(
        "range coder stream has {} unread bytes",
        self.data.len() - self.pos
      )));
    }
    if self.code != 0 {
      return Err(KdTreeError::corrupt("range coder stream ended mid-symbol"));
    }
    Ok(())
  }

  #[inline]
  fn normalize(&mut self) -> Result<()> {
    while self.range < TOP {
      self.range <<= 8;
      self.code = (self.code << 8) | self.next_byte()? as u32;
    }
    Ok(())
  }

  #[inline]
  fn next_byte(&mut self) -> Result<u8> {
    let b = *self.data.get(self.pos).ok_or(KdTreeError::UnexpectedEnd)?;
    self.pos += 1;
    Ok(b)
  }
}

#[cfg(test)]
#[path = "range_coder_test.rs"]
mod range_coder_test;
