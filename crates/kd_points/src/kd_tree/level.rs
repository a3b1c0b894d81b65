//! Compression levels and the per-level coding policy table.
//!
//! A single encoder/decoder implementation reads its behavior from
//! [`LEVEL_POLICIES`]; the level never selects a separate code path.
//!
//! | level | axis   | split count code                          |
//! |-------|--------|-------------------------------------------|
//! | 0-1   | cycle  | fixed width, `bits_for(n)` bits           |
//! | 2-3   | cycle  | adaptive exp-Golomb, shared contexts      |
//! | 4-5   | cycle  | adaptive, contexts bucketed by node size  |
//! | 6-10  | spread | adaptive, finer mantissa modeling         |

use crate::error::{KdTreeError, Result};

/// Highest supported compression level.
pub const MAX_COMPRESSION_LEVEL: u8 = 10;

/// Upper bound for [`AdaptiveCountParams::modeled_mantissa_bits`].
pub const MAX_MODELED_MANTISSA_BITS: u32 = 8;

/// How the split axis of an internal node is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisSelection {
  /// Cycle x, y, z by depth, skipping collapsed axes. Nothing is transmitted.
  Cycle,
  /// Axis with the widest spread of point values; transmitted per node.
  Spread,
}

/// Parameters of the adaptive split-count code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdaptiveCountParams {
  /// Keep separate magnitude contexts per node size class (`bits_for(n)`).
  pub size_contexts: bool,
  /// Mantissa bits (below the leading one) coded with adaptive contexts; the
  /// rest are coded with even odds.
  pub modeled_mantissa_bits: u32,
  /// Context adaptation rate (smaller adapts faster).
  pub adaptation_shift: u32,
}

/// How the left-child count of an internal node is coded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountCoding {
  /// Raw `bits_for(n)`-bit value.
  Fixed,
  /// Deviation from a balanced split, adaptive exp-Golomb on the range coder.
  Adaptive(AdaptiveCountParams),
}

/// Coding policy for one compression level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelPolicy {
  pub axis_selection: AxisSelection,
  pub count_coding: CountCoding,
}

impl LevelPolicy {
  const fn fixed(axis_selection: AxisSelection) -> Self {
    Self {
      axis_selection,
      count_coding: CountCoding::Fixed,
    }
  }

  const fn adaptive(
    axis_selection: AxisSelection,
    size_contexts: bool,
    modeled_mantissa_bits: u32,
    adaptation_shift: u32,
  ) -> Self {
    Self {
      axis_selection,
      count_coding: CountCoding::Adaptive(AdaptiveCountParams {
        size_contexts,
        modeled_mantissa_bits,
        adaptation_shift,
      }),
    }
  }

  /// True when the structure stream goes through the range coder.
  #[inline]
  pub fn is_adaptive(&self) -> bool {
    matches!(self.count_coding, CountCoding::Adaptive(_))
  }
}

/// Policy per compression level, indexed by level.
pub const LEVEL_POLICIES: [LevelPolicy; MAX_COMPRESSION_LEVEL as usize + 1] = [
  LevelPolicy::fixed(AxisSelection::Cycle),
  LevelPolicy::fixed(AxisSelection::Cycle),
  LevelPolicy::adaptive(AxisSelection::Cycle, false, 0, 5),
  LevelPolicy::adaptive(AxisSelection::Cycle, false, 1, 5),
  LevelPolicy::adaptive(AxisSelection::Cycle, true, 1, 5),
  LevelPolicy::adaptive(AxisSelection::Cycle, true, 2, 5),
  LevelPolicy::adaptive(AxisSelection::Spread, true, 2, 5),
  LevelPolicy::adaptive(AxisSelection::Spread, true, 3, 5),
  LevelPolicy::adaptive(AxisSelection::Spread, true, 4, 4),
  LevelPolicy::adaptive(AxisSelection::Spread, true, 6, 4),
  LevelPolicy::adaptive(AxisSelection::Spread, true, 8, 4),
];

/// Validated compression level in `0..=10`.
///
/// Higher levels spend more encode time for smaller split-count codes. The
/// level never affects decoded geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
  pub const FASTEST: Self = Self(0);
  pub const DEFAULT: Self = Self(5);
  pub const BEST: Self = Self(MAX_COMPRESSION_LEVEL);

  pub fn new(level: u8) -> Result<Self> {
    if level > MAX_COMPRESSION_LEVEL {
      return Err(KdTreeError::UnsupportedCompressionLevel(level));
    }
    Ok(Self(level))
  }

  /// Level derived from an encoder speed setting: `10 - speed`.
  pub fn from_speed(speed: u8) -> Result<Self> {
    MAX_COMPRESSION_LEVEL
      .checked_sub(speed)
      .map(Self)
      .ok_or(KdTreeError::UnsupportedSpeed(speed))
  }

  #[inline]
  pub fn value(self) -> u8 {
    self.0
  }

  #[inline]
  pub fn policy(self) -> LevelPolicy {
    LEVEL_POLICIES[self.0 as usize]
  }

  /// Every supported level, fastest first.
  pub fn all() -> impl Iterator<Item = Self> {
    (0..=MAX_COMPRESSION_LEVEL).map(Self)
  }
}

impl Default for CompressionLevel {
  fn default() -> Self {
    Self::DEFAULT
  }
}

impl TryFrom<u8> for CompressionLevel {
  type Error = KdTreeError;

  fn try_from(level: u8) -> Result<Self> {
    Self::new(level)
  }
}

#[cfg(test)]
#[path = "level_test.rs"]
mod level_test;
