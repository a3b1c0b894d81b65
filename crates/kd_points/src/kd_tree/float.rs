//! Quantized float front-end for the integer k-d tree codec.
//!
//! Float coordinates are mapped onto a `2^Q - 1` lattice spanning the bounding
//! box of the whole input, then coded with the integer codec at bit length
//! `Q`.
//!
//! # Payload
//!
//! ```text
//! u8      quantization bits Q
//! 3 x f32 bounds min
//! 3 x f32 bounds max
//! ...     integer payload with bit length Q
//! ```

use glam::{UVec3, Vec3};

use super::decoder::IntegerPointsKdTreeDecoder;
use super::encoder::{EncodeStats, IntegerPointsKdTreeEncoder};
use super::level::CompressionLevel;
use crate::bitstream::{max_value, DecoderBuffer, EncoderBuffer};
use crate::error::{KdTreeError, Result};

/// Largest supported quantization bit depth.
pub const MAX_QUANTIZATION_BITS: u32 = 30;

/// Axis-aligned float bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatBounds {
  pub min: Vec3,
  pub max: Vec3,
}

impl FloatBounds {
  /// Create bounds with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: Vec3::INFINITY,
      max: Vec3::NEG_INFINITY,
    }
  }

  pub fn new(min: Vec3, max: Vec3) -> Self {
    Self { min, max }
  }

  /// Expand to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: Vec3) {
    self.min = self.min.min(point);
    self.max = self.max.max(point);
  }

  /// Check if bounds are finite and min <= max on all axes.
  pub fn is_valid(&self) -> bool {
    self.min.is_finite() && self.max.is_finite() && self.min.cmple(self.max).all()
  }

  pub fn extent(&self) -> Vec3 {
    self.max - self.min
  }
}

impl Default for FloatBounds {
  fn default() -> Self {
    Self::empty()
  }
}

/// Linear mapping between a float box and the `[0, 2^Q - 1]` lattice.
///
/// Arithmetic runs in `f64` so that 30-bit lattices keep their precision.
#[derive(Clone, Copy, Debug)]
pub struct PointQuantizer {
  bounds: FloatBounds,
  quantization_bits: u32,
  max_quantized: f64,
}

impl PointQuantizer {
  pub fn new(bounds: FloatBounds, quantization_bits: u32) -> Self {
    debug_assert!((1..=MAX_QUANTIZATION_BITS).contains(&quantization_bits));
    Self {
      bounds,
      quantization_bits,
      max_quantized: max_value(quantization_bits) as f64,
    }
  }

  pub fn bounds(&self) -> FloatBounds {
    self.bounds
  }

  pub fn quantization_bits(&self) -> u32 {
    self.quantization_bits
  }

  /// Map a point inside the bounds onto the lattice. Axes with zero extent
  /// map to 0.
  pub fn quantize(&self, point: Vec3) -> UVec3 {
    let mut out = UVec3::ZERO;
    for axis in 0..3 {
      let min = self.bounds.min[axis] as f64;
      let extent = self.bounds.max[axis] as f64 - min;
      if extent > 0.0 {
        let q = ((point[axis] as f64 - min) / extent * self.max_quantized).round();
        out[axis] = q.clamp(0.0, self.max_quantized) as u32;
      }
    }
    out
  }

  pub fn dequantize(&self, point: UVec3) -> Vec3 {
    let mut out = self.bounds.min;
    for axis in 0..3 {
      let min = self.bounds.min[axis] as f64;
      let extent = self.bounds.max[axis] as f64 - min;
      out[axis] = (min + point[axis] as f64 / self.max_quantized * extent) as f32;
    }
    out
  }

  /// Worst-case per-axis reconstruction error, ignoring `f32` rounding.
  pub fn max_error(&self) -> Vec3 {
    let cells = (1u64 << self.quantization_bits) as f64;
    let mut out = Vec3::ZERO;
    for axis in 0..3 {
      let extent = self.bounds.max[axis] as f64 - self.bounds.min[axis] as f64;
      out[axis] = (extent / cells) as f32;
    }
    out
  }
}

/// Quantizes float point clouds and encodes them with the integer codec.
#[derive(Clone, Debug)]
pub struct FloatPointsKdTreeEncoder {
  level: CompressionLevel,
  quantization_bits: u32,
  buffer: EncoderBuffer,
}

impl FloatPointsKdTreeEncoder {
  /// `quantization_bits` must be in `1..=30`.
  pub fn new(quantization_bits: i32, level: CompressionLevel) -> Result<Self> {
    let bits = u32::try_from(quantization_bits)
      .ok()
      .filter(|bits| (1..=MAX_QUANTIZATION_BITS).contains(bits))
      .ok_or(KdTreeError::InvalidQuantizationBits(quantization_bits))?;
    Ok(Self {
      level,
      quantization_bits: bits,
      buffer: EncoderBuffer::new(),
    })
  }

  pub fn quantization_bits(&self) -> u32 {
    self.quantization_bits
  }

  pub fn level(&self) -> CompressionLevel {
    self.level
  }

  /// Encode a point cloud, replacing the previous contents of
  /// [`Self::buffer`].
  ///
  /// The iterator is walked twice: once for the bounds, once to quantize.
  #[tracing::instrument(
    skip_all,
    name = "kd_tree::encode_point_cloud",
    fields(level = self.level.value(), quantization_bits = self.quantization_bits)
  )]
  pub fn encode_point_cloud<I>(&mut self, points: I) -> Result<EncodeStats>
  where
    I: IntoIterator<Item = Vec3>,
    I::IntoIter: Clone,
  {
    self.buffer.clear();
    let points = points.into_iter();

    let mut bounds = FloatBounds::empty();
    let mut num_points = 0usize;
    for point in points.clone() {
      if !point.is_finite() {
        tracing::warn!(?point, "non-finite coordinate");
        return Err(KdTreeError::NonFiniteCoordinate);
      }
      bounds.encapsulate(point);
      num_points += 1;
    }
    if num_points == 0 {
      bounds = FloatBounds::new(Vec3::ZERO, Vec3::ZERO);
    }
    if u32::try_from(num_points).is_err() {
      return Err(KdTreeError::TooManyPoints(num_points));
    }

    let quantizer = PointQuantizer::new(bounds, self.quantization_bits);
    let mut quantized: Vec<UVec3> = points.map(|p| quantizer.quantize(p)).collect();

    let integer = IntegerPointsKdTreeEncoder::new(self.level, self.quantization_bits)?;
    let mut staged = EncoderBuffer::with_capacity(1 + 24 + num_points * 4);
    staged.encode_u8(self.quantization_bits as u8);
    for v in bounds.min.to_array().into_iter().chain(bounds.max.to_array()) {
      staged.encode_f32(v);
    }
    let stats = integer.encode_points(&mut quantized, &mut staged)?;
    self.buffer = staged;

    tracing::debug!(
      num_points,
      min = ?bounds.min,
      max = ?bounds.max,
      bytes = self.buffer.len(),
      "encoded float point cloud"
    );
    Ok(stats)
  }

  /// Output of the last successful encode.
  pub fn buffer(&self) -> &EncoderBuffer {
    &self.buffer
  }

  pub fn into_bytes(self) -> Vec<u8> {
    self.buffer.into_bytes()
  }
}

/// Reads payloads written by [`FloatPointsKdTreeEncoder`].
#[derive(Clone, Copy, Debug)]
pub struct FloatPointsKdTreeDecoder {
  integer: IntegerPointsKdTreeDecoder,
}

impl FloatPointsKdTreeDecoder {
  pub fn new(level: CompressionLevel) -> Self {
    Self {
      integer: IntegerPointsKdTreeDecoder::new(level),
    }
  }

  /// See [`IntegerPointsKdTreeDecoder::with_point_limit`].
  pub fn with_point_limit(mut self, limit: u32) -> Self {
    self.integer = self.integer.with_point_limit(limit);
    self
  }

  #[tracing::instrument(
    skip_all,
    name = "kd_tree::decode_point_cloud",
    fields(level = self.integer.level().value(), num_points = num_points)
  )]
  pub fn decode_point_cloud(&self, buffer: &mut DecoderBuffer<'_>, num_points: u32) -> Result<Vec<Vec3>> {
    let quantization_bits = u32::from(buffer.decode_u8()?);
    if !(1..=MAX_QUANTIZATION_BITS).contains(&quantization_bits) {
      return Err(KdTreeError::corrupt(format!(
        "invalid quantization bits {}",
        quantization_bits
      )));
    }

    let mut corners = [0f32; 6];
    for v in &mut corners {
      *v = buffer.decode_f32()?;
    }
    let bounds = FloatBounds::new(
      Vec3::new(corners[0], corners[1], corners[2]),
      Vec3::new(corners[3], corners[4], corners[5]),
    );
    if !bounds.is_valid() {
      return Err(KdTreeError::corrupt("invalid quantization bounds"));
    }

    let decoded = self.integer.decode_points(buffer, num_points)?;
    if decoded.bit_length != quantization_bits {
      return Err(KdTreeError::corrupt(format!(
        "integer payload uses {} bits, expected {}",
        decoded.bit_length, quantization_bits
      )));
    }

    let quantizer = PointQuantizer::new(bounds, quantization_bits);
    Ok(decoded.points.into_iter().map(|p| quantizer.dequantize(p)).collect())
  }
}

#[cfg(test)]
#[path = "float_test.rs"]
mod float_test;
