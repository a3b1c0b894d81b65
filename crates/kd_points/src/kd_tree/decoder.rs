//! Integer point k-d tree decoder.

use glam::UVec3;

use super::bounds::NodeBounds;
use super::encoder::{check_bit_length, cycle_axis};
use super::level::{AxisSelection, CompressionLevel};
use super::split_coding::StructureDecoder;
use crate::bitstream::{DecoderBuffer, DirectBitDecoder};
use crate::error::{KdTreeError, Result};

/// Upper bound on the up-front allocation; larger clouds grow as they decode.
const MAX_PREALLOCATED_POINTS: u32 = 1 << 20;

/// Output of [`IntegerPointsKdTreeDecoder::decode_points`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedPoints {
  /// Bit length read from the payload header.
  pub bit_length: u32,
  /// Points in tree traversal order.
  pub points: Vec<UVec3>,
}

/// Reads payloads written by
/// [`IntegerPointsKdTreeEncoder`](super::IntegerPointsKdTreeEncoder).
#[derive(Clone, Copy, Debug)]
pub struct IntegerPointsKdTreeDecoder {
  level: CompressionLevel,
  point_limit: u32,
}

impl IntegerPointsKdTreeDecoder {
  pub fn new(level: CompressionLevel) -> Self {
    Self {
      level,
      point_limit: u32::MAX,
    }
  }

  /// Reject payloads declaring more than `limit` points.
  ///
  /// A few bytes of structure can expand into `N` copies of one point, so
  /// callers decoding untrusted input should bound `N`.
  pub fn with_point_limit(mut self, limit: u32) -> Self {
    self.point_limit = limit;
    self
  }

  pub fn level(&self) -> CompressionLevel {
    self.level
  }

  pub fn point_limit(&self) -> u32 {
    self.point_limit
  }

  /// Decode exactly `num_points` points from `buffer`.
  ///
  /// The buffer cursor ends right after the payload. Both sub-streams must be
  /// consumed exactly.
  #[tracing::instrument(
    skip_all,
    name = "kd_tree::decode_points",
    fields(level = self.level.value(), num_points = num_points)
  )]
  pub fn decode_points(&self, buffer: &mut DecoderBuffer<'_>, num_points: u32) -> Result<DecodedPoints> {
    let bit_length = u32::from(buffer.decode_u8()?);
    check_bit_length(bit_length)
      .map_err(|_| KdTreeError::corrupt(format!("invalid bit length {}", bit_length)))?;

    let level = buffer.decode_u8()?;
    if level != self.level.value() {
      return Err(KdTreeError::corrupt(format!(
        "payload level {} does not match decoder level {}",
        level,
        self.level.value()
      )));
    }

    if num_points > self.point_limit {
      tracing::warn!(num_points, limit = self.point_limit, "point count over limit");
      return Err(KdTreeError::TooManyPoints(num_points as usize));
    }

    let count = buffer.decode_u32()?;
    if count != num_points {
      return Err(KdTreeError::corrupt(format!(
        "payload holds {} points, expected {}",
        count, num_points
      )));
    }
    if count == 0 {
      return Ok(DecodedPoints {
        bit_length,
        points: Vec::new(),
      });
    }

    let structure_bytes = buffer.decode_sized_bytes()?;
    let leaf_bytes = buffer.decode_sized_bytes()?;

    let policy = self.level.policy();
    let mut state = DecodeState {
      axis_selection: policy.axis_selection,
      structure: StructureDecoder::new(&policy, structure_bytes)?,
      leaves: DirectBitDecoder::new(leaf_bytes),
      points: Vec::with_capacity(count.min(MAX_PREALLOCATED_POINTS) as usize),
    };
    state.decode_node(count, NodeBounds::from_bit_length(bit_length), 0, None)?;

    let DecodeState {
      structure,
      leaves,
      points,
      ..
    } = state;
    structure.finish()?;
    leaves.finish()?;

    tracing::debug!(
      bit_length,
      structure_bytes = structure_bytes.len(),
      leaf_bytes = leaf_bytes.len(),
      end = buffer.position(),
      "decoded k-d tree"
    );
    Ok(DecodedPoints { bit_length, points })
  }
}

/// Mutable state of one decode call.
struct DecodeState<'a> {
  axis_selection: AxisSelection,
  structure: StructureDecoder<'a>,
  leaves: DirectBitDecoder<'a>,
  points: Vec<UVec3>,
}

impl DecodeState<'_> {
  fn decode_node(
    &mut self,
    num_points: u32,
    bounds: NodeBounds,
    depth: u32,
    parent_axis: Option<usize>,
  ) -> Result<()> {
    match num_points {
      0 => return Ok(()),
      1 => {
        let mut point = bounds.min;
        for axis in 0..3 {
          let residual = self.leaves.decode_least_significant_bits(bounds.residual_bits(axis))?;
          if residual > bounds.extent(axis) {
            return Err(KdTreeError::corrupt("leaf residual outside node bounds"));
          }
          point[axis] += residual;
        }
        self.points.push(point);
        return Ok(());
      }
      _ => {}
    }

    let axis = match self.axis_selection {
      AxisSelection::Cycle => cycle_axis(&bounds, depth),
      AxisSelection::Spread if bounds.is_single_cell() => None,
      AxisSelection::Spread => {
        let axis = self.structure.decode_axis(parent_axis)?;
        if bounds.extent(axis) == 0 {
          return Err(KdTreeError::corrupt(format!(
            "split axis {} has zero extent at depth {}",
            axis, depth
          )));
        }
        Some(axis)
      }
    };
    let Some(axis) = axis else {
      let count = num_points as usize;
      self
        .points
        .try_reserve(count)
        .map_err(|_| KdTreeError::TooManyPoints(count))?;
      self.points.extend(std::iter::repeat(bounds.min).take(count));
      return Ok(());
    };

    let left_count = self.structure.decode_count(num_points)?;
    let (_, left_bounds, right_bounds) = bounds.split(axis);
    self.decode_node(left_count, left_bounds, depth + 1, Some(axis))?;
    self.decode_node(num_points - left_count, right_bounds, depth + 1, Some(axis))
  }
}

#[cfg(test)]
#[path = "decoder_test.rs"]
mod decoder_test;
