//! Coding of the tree structure: split counts and (for spread levels) split
//! axes.
//!
//! # Adaptive count code
//!
//! For a node of `n` points with `c` points on the left, the encoder codes the
//! deviation from a balanced split:
//!
//! ```text
//! s = c - floor(n / 2)              in [-floor(n/2), ceil(n/2)]
//! u = zigzag(s)                     in [0, n + 1]
//! k = bits_for(u)                   truncated unary, max bits_for(n + 1)
//! mantissa = u without its leading one (k - 1 bits)
//! ```
//!
//! Unary magnitude bits always use adaptive contexts. The top
//! `modeled_mantissa_bits` mantissa bits use contexts keyed by `k`, the rest
//! are direct bits.

use super::level::{AdaptiveCountParams, CountCoding, LevelPolicy, MAX_MODELED_MANTISSA_BITS};
use crate::bitstream::{
  bits_for, AdaptiveBitDecoder, AdaptiveBitEncoder, BitProbability, DirectBitDecoder,
  DirectBitEncoder,
};
use crate::error::{KdTreeError, Result};

/// Magnitude slots: `k` ranges over `0..=33` for 32-bit node sizes.
const MAGNITUDE_SLOTS: usize = 34;
/// Size buckets: `bits_for(n)` for `n` in `2..=u32::MAX`.
const SIZE_BUCKETS: usize = 33;
/// Axis contexts per parent axis (x, y, z, none).
const AXIS_ROWS: usize = 4;

#[inline]
fn bits_for_u64(value: u64) -> u32 {
  u64::BITS - value.leading_zeros()
}

#[inline]
fn zigzag(s: i64) -> u64 {
  if s >= 0 {
    (s as u64) << 1
  } else {
    ((-s as u64) << 1) - 1
  }
}

#[inline]
fn unzigzag(u: u64) -> i64 {
  if u & 1 == 0 {
    (u >> 1) as i64
  } else {
    -(((u + 1) >> 1) as i64)
  }
}

#[inline]
fn axis_row(parent_axis: Option<usize>) -> usize {
  parent_axis.unwrap_or(AXIS_ROWS - 1)
}

/// Per-call probability state of the adaptive structure code.
///
/// Created fresh for every encode/decode call so both sides start from the
/// same even-odds state.
#[derive(Clone, Debug)]
pub(crate) struct SplitModel {
  params: AdaptiveCountParams,
  magnitude: Vec<[BitProbability; MAGNITUDE_SLOTS]>,
  mantissa: Vec<[BitProbability; MAX_MODELED_MANTISSA_BITS as usize]>,
  axis: [[BitProbability; 2]; AXIS_ROWS],
}

impl SplitModel {
  pub(crate) fn new(params: AdaptiveCountParams) -> Self {
    let buckets = if params.size_contexts { SIZE_BUCKETS } else { 1 };
    Self {
      params,
      magnitude: vec![[BitProbability::HALF; MAGNITUDE_SLOTS]; buckets],
      mantissa: vec![[BitProbability::HALF; MAX_MODELED_MANTISSA_BITS as usize]; MAGNITUDE_SLOTS],
      axis: [[BitProbability::HALF; 2]; AXIS_ROWS],
    }
  }

  #[inline]
  fn bucket(&self, total: u32) -> usize {
    if self.params.size_contexts {
      bits_for(total) as usize
    } else {
      0
    }
  }

  #[inline]
  fn modeled_bits(&self, mantissa_bits: u32) -> u32 {
    mantissa_bits.min(self.params.modeled_mantissa_bits)
  }

  fn encode_count(&mut self, coder: &mut AdaptiveBitEncoder, count: u32, total: u32) {
    let half = (total / 2) as i64;
    let u = zigzag(count as i64 - half);
    let max_k = bits_for_u64(total as u64 + 1) as usize;
    let k = bits_for_u64(u) as usize;

    let bucket = self.bucket(total);
    let magnitude = &mut self.magnitude[bucket];
    for prob in &mut magnitude[..k] {
      coder.encode_bit(prob, true);
    }
    if k < max_k {
      coder.encode_bit(&mut magnitude[k], false);
    }

    if k > 1 {
      let mantissa_bits = k as u32 - 1;
      let modeled = self.modeled_bits(mantissa_bits);
      for j in 0..modeled {
        let bit = (u >> (mantissa_bits - 1 - j)) & 1 == 1;
        coder.encode_bit(&mut self.mantissa[k][j as usize], bit);
      }
      let rest = mantissa_bits - modeled;
      let low = u & ((1u64 << rest) - 1);
      coder.encode_direct_bits(rest, low as u32);
    }
  }

  fn decode_count(&mut self, coder: &mut AdaptiveBitDecoder<'_>, total: u32) -> Result<u32> {
    let max_k = bits_for_u64(total as u64 + 1) as usize;
    let bucket = self.bucket(total);
    let magnitude = &mut self.magnitude[bucket];
    let mut k = 0;
    while k < max_k && coder.decode_bit(&mut magnitude[k])? {
      k += 1;
    }

    let mut u = u64::from(k > 0);
    if k > 1 {
      let mantissa_bits = k as u32 - 1;
      let modeled = self.modeled_bits(mantissa_bits);
      for j in 0..modeled {
        let bit = coder.decode_bit(&mut self.mantissa[k][j as usize])?;
        u = (u << 1) | bit as u64;
      }
      let rest = mantissa_bits - modeled;
      u = (u << rest) | coder.decode_direct_bits(rest)? as u64;
    }

    let count = (total / 2) as i64 + unzigzag(u);
    if !(0..=total as i64).contains(&count) {
      return Err(KdTreeError::corrupt(format!(
        "split count {} out of range for node of {} points",
        count, total
      )));
    }
    Ok(count as u32)
  }

  fn encode_axis(&mut self, coder: &mut AdaptiveBitEncoder, axis: usize, parent_axis: Option<usize>) {
    let probs = &mut self.axis[axis_row(parent_axis)];
    coder.encode_bit(&mut probs[0], axis != 0);
    if axis != 0 {
      coder.encode_bit(&mut probs[1], axis == 2);
    }
  }

  fn decode_axis(&mut self, coder: &mut AdaptiveBitDecoder<'_>, parent_axis: Option<usize>) -> Result<usize> {
    let probs = &mut self.axis[axis_row(parent_axis)];
    if !coder.decode_bit(&mut probs[0])? {
      return Ok(0);
    }
    Ok(if coder.decode_bit(&mut probs[1])? { 2 } else { 1 })
  }
}

/// Writes split counts and axes according to the level policy.
pub(crate) enum StructureEncoder {
  Direct(DirectBitEncoder),
  Adaptive {
    coder: AdaptiveBitEncoder,
    model: Box<SplitModel>,
  },
}

impl StructureEncoder {
  pub(crate) fn new(policy: &LevelPolicy) -> Self {
    match policy.count_coding {
      CountCoding::Fixed => Self::Direct(DirectBitEncoder::new()),
      CountCoding::Adaptive(params) => Self::Adaptive {
        coder: AdaptiveBitEncoder::new(params.adaptation_shift),
        model: Box::new(SplitModel::new(params)),
      },
    }
  }

  /// Code the left-child count `count` of a node holding `total >= 2` points.
  pub(crate) fn encode_count(&mut self, count: u32, total: u32) {
    debug_assert!(count <= total);
    match self {
      Self::Direct(bits) => bits.encode_least_significant_bits(bits_for(total), count),
      Self::Adaptive { coder, model } => model.encode_count(coder, count, total),
    }
  }

  pub(crate) fn encode_axis(&mut self, axis: usize, parent_axis: Option<usize>) {
    debug_assert!(axis < 3);
    match self {
      Self::Direct(bits) => bits.encode_least_significant_bits(2, axis as u32),
      Self::Adaptive { coder, model } => model.encode_axis(coder, axis, parent_axis),
    }
  }

  pub(crate) fn finish(self) -> Vec<u8> {
    match self {
      Self::Direct(bits) => bits.finish(),
      Self::Adaptive { coder, .. } => coder.finish(),
    }
  }
}

/// Reads what [`StructureEncoder`] wrote.
pub(crate) enum StructureDecoder<'a> {
  Direct(DirectBitDecoder<'a>),
  Adaptive {
    coder: AdaptiveBitDecoder<'a>,
    model: Box<SplitModel>,
  },
}

impl<'a> StructureDecoder<'a> {
  pub(crate) fn new(policy: &LevelPolicy, data: &'a [u8]) -> Result<Self> {
    Ok(match policy.count_coding {
      CountCoding::Fixed => Self::Direct(DirectBitDecoder::new(data)),
      CountCoding::Adaptive(params) => Self::Adaptive {
        coder: AdaptiveBitDecoder::new(data, params.adaptation_shift)?,
        model: Box::new(SplitModel::new(params)),
      },
    })
  }

  /// Left-child count of a node holding `total >= 2` points.
  pub(crate) fn decode_count(&mut self, total: u32) -> Result<u32> {
    match self {
      Self::Direct(bits) => {
        let count = bits.decode_least_significant_bits(bits_for(total))?;
        if count > total {
          return Err(KdTreeError::corrupt(format!(
            "split count {} out of range for node of {} points",
            count, total
          )));
        }
        Ok(count)
      }
      Self::Adaptive { coder, model } => model.decode_count(coder, total),
    }
  }

  pub(crate) fn decode_axis(&mut self, parent_axis: Option<usize>) -> Result<usize> {
    match self {
      Self::Direct(bits) => {
        let axis = bits.decode_least_significant_bits(2)? as usize;
        if axis > 2 {
          return Err(KdTreeError::corrupt(format!("invalid split axis {}", axis)));
        }
        Ok(axis)
      }
      Self::Adaptive { coder, model } => model.decode_axis(coder, parent_axis),
    }
  }

  pub(crate) fn finish(self) -> Result<()> {
    match self {
      Self::Direct(bits) => bits.finish(),
      Self::Adaptive { coder, .. } => coder.finish(),
    }
  }
}

#[cfg(test)]
#[path = "split_coding_test.rs"]
mod split_coding_test;
