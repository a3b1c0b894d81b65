//! Integer point k-d tree encoder.

use glam::UVec3;

use super::bounds::NodeBounds;
use super::level::{AxisSelection, CompressionLevel};
use super::split_coding::StructureEncoder;
use crate::bitstream::{max_value, DirectBitEncoder, EncoderBuffer};
use crate::error::{KdTreeError, Result};

/// Largest supported integer bit length.
pub const MAX_BIT_LENGTH: u32 = 32;

/// Statistics from one encode call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodeStats {
  /// Points in the input set.
  pub num_points: u32,
  /// Nodes that emitted a split count.
  pub internal_nodes: usize,
  /// Single-point nodes that emitted residual coordinates.
  pub leaves: usize,
  /// Multi-point nodes whose bounds collapsed to one cell (identical points).
  pub degenerate_nodes: usize,
  /// Internal nodes with all points on one side of the split.
  pub one_sided_splits: usize,
  /// Deepest node visited (root = 0).
  pub max_depth: u32,
  /// Bytes of the split structure stream.
  pub structure_bytes: usize,
  /// Bytes of the leaf residual stream.
  pub leaf_bytes: usize,
}

impl EncodeStats {
  /// Size of both k-d tree sub-streams.
  #[inline]
  pub fn stream_bytes(&self) -> usize {
    self.structure_bytes + self.leaf_bytes
  }

  /// Average coded bits per point (0 for an empty set).
  pub fn bits_per_point(&self) -> f64 {
    if self.num_points == 0 {
      0.0
    } else {
      (self.stream_bytes() * 8) as f64 / self.num_points as f64
    }
  }
}

pub(crate) fn check_bit_length(bit_length: u32) -> Result<()> {
  if (1..=MAX_BIT_LENGTH).contains(&bit_length) {
    Ok(())
  } else {
    Err(KdTreeError::UnsupportedBitLength(bit_length))
  }
}

/// Cycle x, y, z by depth, skipping axes whose bounds already collapsed.
///
/// Depends only on state the decoder has too. `None` means a single cell.
#[inline]
pub(crate) fn cycle_axis(bounds: &NodeBounds, depth: u32) -> Option<usize> {
  (0..3)
    .map(|i| (depth as usize + i) % 3)
    .find(|&axis| bounds.extent(axis) > 0)
}

/// Axis with the widest spread of point values among splittable axes.
/// Ties go to the lower axis index.
fn spread_axis(points: &[UVec3], bounds: &NodeBounds) -> Option<usize> {
  let mut lo = UVec3::MAX;
  let mut hi = UVec3::ZERO;
  for &p in points {
    lo = lo.min(p);
    hi = hi.max(p);
  }
  let spread = hi - lo;

  let mut best: Option<usize> = None;
  for axis in (0..3).filter(|&axis| bounds.extent(axis) > 0) {
    if best.map_or(true, |b| spread[axis] > spread[b]) {
      best = Some(axis);
    }
  }
  best
}

/// Encodes sets of `UVec3` points with a fixed compression level and bit
/// length.
///
/// # Payload
///
/// ```text
/// u8   bit length
/// u8   compression level
/// u32  point count            (0 ends the payload)
/// u32  structure length, structure bytes
/// u32  leaf length, leaf bytes
/// ```
#[derive(Clone, Copy, Debug)]
pub struct IntegerPointsKdTreeEncoder {
  level: CompressionLevel,
  bit_length: u32,
}

impl IntegerPointsKdTreeEncoder {
  /// `bit_length` must be in `1..=32`; every coordinate must fit in it.
  pub fn new(level: CompressionLevel, bit_length: u32) -> Result<Self> {
    check_bit_length(bit_length)?;
    Ok(Self { level, bit_length })
  }

  pub fn level(&self) -> CompressionLevel {
    self.level
  }

  pub fn bit_length(&self) -> u32 {
    self.bit_length
  }

  /// Encode `points` into `out`.
  ///
  /// The slice is reordered in place; its multiset of values is unchanged.
  /// Nothing is written when a precondition fails.
  #[tracing::instrument(
    skip_all,
    name = "kd_tree::encode_points",
    fields(level = self.level.value(), bit_length = self.bit_length, num_points = points.len())
  )]
  pub fn encode_points(&self, points: &mut [UVec3], out: &mut EncoderBuffer) -> Result<EncodeStats> {
    let num_points =
      u32::try_from(points.len()).map_err(|_| KdTreeError::TooManyPoints(points.len()))?;

    let limit = max_value(self.bit_length);
    if let Some(value) = points.iter().flat_map(|p| p.to_array()).find(|&v| v > limit) {
      tracing::warn!(value, bit_length = self.bit_length, "coordinate exceeds bit length");
      return Err(KdTreeError::CoordinateOutOfRange {
        value,
        bit_length: self.bit_length,
      });
    }

    out.encode_u8(self.bit_length as u8);
    out.encode_u8(self.level.value());
    out.encode_u32(num_points);

    let mut stats = EncodeStats {
      num_points,
      ..Default::default()
    };
    if num_points == 0 {
      return Ok(stats);
    }

    let mut state = EncodeState::new(self.level, stats);
    state.encode_node(points, NodeBounds::from_bit_length(self.bit_length), 0, None);

    stats = state.stats;
    let leaf_bits = state.leaves.bits_written();
    let structure = state.structure.finish();
    let leaves = state.leaves.finish();
    stats.structure_bytes = structure.len();
    stats.leaf_bytes = leaves.len();
    out.encode_sized_bytes(&structure)?;
    out.encode_sized_bytes(&leaves)?;

    tracing::debug!(
      internal_nodes = stats.internal_nodes,
      leaves = stats.leaves,
      degenerate_nodes = stats.degenerate_nodes,
      structure_bytes = stats.structure_bytes,
      leaf_bytes = stats.leaf_bytes,
      leaf_bits,
      bits_per_point = stats.bits_per_point(),
      "encoded k-d tree"
    );
    Ok(stats)
  }
}

/// Mutable state of one encode call.
struct EncodeState {
  axis_selection: AxisSelection,
  structure: StructureEncoder,
  leaves: DirectBitEncoder,
  stats: EncodeStats,
  /// `(left, right, total)` of every internal node, in visit order.
  #[cfg(test)]
  splits: Vec<(usize, usize, usize)>,
}

impl EncodeState {
  fn new(level: CompressionLevel, stats: EncodeStats) -> Self {
    let policy = level.policy();
    Self {
      axis_selection: policy.axis_selection,
      structure: StructureEncoder::new(&policy),
      leaves: DirectBitEncoder::new(),
      stats,
      #[cfg(test)]
      splits: Vec::new(),
    }
  }

  fn encode_node(
    &mut self,
    points: &mut [UVec3],
    bounds: NodeBounds,
    depth: u32,
    parent_axis: Option<usize>,
  ) {
    self.stats.max_depth = self.stats.max_depth.max(depth);

    let point = match &*points {
      [] => return,
      [point] => Some(*point),
      _ => None,
    };
    if let Some(point) = point {
      debug_assert!(bounds.contains_point(point));
      self.stats.leaves += 1;
      for axis in 0..3 {
        self
          .leaves
          .encode_least_significant_bits(bounds.residual_bits(axis), point[axis] - bounds.min[axis]);
      }
      return;
    }

    let axis = match self.axis_selection {
      AxisSelection::Cycle => cycle_axis(&bounds, depth),
      AxisSelection::Spread => spread_axis(points, &bounds),
    };
    let Some(axis) = axis else {
      // Bounds collapsed to one cell: every point equals bounds.min.
      self.stats.degenerate_nodes += 1;
      return;
    };
    if self.axis_selection == AxisSelection::Spread {
      self.structure.encode_axis(axis, parent_axis);
    }

    let (mid, left_bounds, right_bounds) = bounds.split(axis);
    // Stable partition: values <= mid first, relative order kept.
    points.sort_by_key(|p| p[axis] > mid);
    let left_count = points.partition_point(|p| p[axis] <= mid);

    let total = points.len() as u32;
    self.structure.encode_count(left_count as u32, total);
    self.stats.internal_nodes += 1;
    if left_count == 0 || left_count == points.len() {
      self.stats.one_sided_splits += 1;
    }
    tracing::trace!(depth, axis, mid, left_count, total, "split");

    let (left, right) = points.split_at_mut(left_count);
    #[cfg(test)]
    self.splits.push((left.len(), right.len(), total as usize));
    self.encode_node(left, left_bounds, depth + 1, Some(axis));
    self.encode_node(right, right_bounds, depth + 1, Some(axis));
  }
}

#[cfg(test)]
#[path = "encoder_test.rs"]
mod encoder_test;
