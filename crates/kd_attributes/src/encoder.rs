//! Attribute encoder driving the k-d tree point codecs.
//!
//! # Stream layout
//!
//! ```text
//! u8   method        0 = integer, 1 = quantized float
//! u8   level         0..=10
//! u32  point count
//! ...  k-d tree payload (float payloads start with Q and the bounding box)
//! ```

use glam::{UVec3, Vec3};
use kd_points::{
  bits_for, CodecMetrics, CompressionLevel, EncodeStats, EncoderBuffer, FloatPointsKdTreeEncoder,
  IntegerPointsKdTreeEncoder,
};
use web_time::Instant;

use crate::attribute::{DataType, PointAttribute, PointCloud};
use crate::config::EncoderOptions;
use crate::error::{AttributeCodecError, Result};
use crate::iterator::PointAttributeVectorIter;

/// Payload variant tag written first in the stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KdTreeAttributesEncodingMethod {
  /// Unsigned integer coordinates, coded losslessly.
  Integer = 0,
  /// Float coordinates quantized to `quantization_bits`.
  Quantization = 1,
}

impl TryFrom<u8> for KdTreeAttributesEncodingMethod {
  type Error = AttributeCodecError;

  fn try_from(tag: u8) -> Result<Self> {
    match tag {
      0 => Ok(Self::Integer),
      1 => Ok(Self::Quantization),
      other => Err(AttributeCodecError::UnknownMethod(other)),
    }
  }
}

/// Encodes one 3-component position-like attribute of a point cloud.
#[derive(Debug, Clone, Default)]
pub struct KdTreeAttributesEncoder {
  attribute_ids: Vec<usize>,
  metrics: CodecMetrics,
}

impl KdTreeAttributesEncoder {
  pub fn new(attribute_ids: Vec<usize>) -> Self {
    Self {
      attribute_ids,
      metrics: CodecMetrics::new(),
    }
  }

  pub fn attribute_ids(&self) -> &[usize] {
    &self.attribute_ids
  }

  pub fn metrics(&self) -> &CodecMetrics {
    &self.metrics
  }

  /// Append the encoded attribute to `out`.
  ///
  /// `out` is left untouched on error.
  #[tracing::instrument(skip_all, name = "kd_attributes::encode", fields(num_points = point_cloud.num_points()))]
  pub fn encode_attributes(
    &mut self,
    point_cloud: &PointCloud,
    options: &EncoderOptions,
    out: &mut EncoderBuffer,
  ) -> Result<EncodeStats> {
    let start = Instant::now();

    let &[attribute_id] = self.attribute_ids.as_slice() else {
      tracing::warn!(count = self.attribute_ids.len(), "kd-tree encoder takes exactly one attribute");
      return Err(AttributeCodecError::AttributeCount(self.attribute_ids.len()));
    };
    let attribute = point_cloud
      .attribute(attribute_id)
      .ok_or(AttributeCodecError::MissingAttribute(attribute_id))?;
    if attribute.num_components() != 3 {
      return Err(AttributeCodecError::ComponentCount(attribute.num_components()));
    }
    let num_points = point_cloud.num_points();
    if !attribute.covers_points(num_points) {
      return Err(AttributeCodecError::ValueCount(attribute_id));
    }

    let level = options.compression_level();
    let mut staged = EncoderBuffer::new();
    let stats = match attribute.data_type() {
      DataType::Float32 => {
        let quantization_bits = options
          .quantization_bits(attribute_id)
          .filter(|&bits| bits > 0)
          .ok_or(AttributeCodecError::MissingQuantization)?;
        // Constructing the encoder validates the bit depth before any output
        let mut encoder = FloatPointsKdTreeEncoder::new(quantization_bits, level)?;
        let stats = encoder.encode_point_cloud(PointAttributeVectorIter::<Vec3>::new(attribute, num_points))?;
        write_header(&mut staged, KdTreeAttributesEncodingMethod::Quantization, level, num_points);
        staged.encode_bytes(encoder.buffer().data());
        stats
      }
      DataType::UInt32 => {
        write_header(&mut staged, KdTreeAttributesEncodingMethod::Integer, level, num_points);
        encode_integer(attribute, num_points, level, &mut staged)?
      }
      other => {
        tracing::warn!(data_type = %other, "unsupported attribute data type");
        return Err(AttributeCodecError::UnsupportedDataType(other));
      }
    };
    out.encode_bytes(staged.data());

    let timing_us = start.elapsed().as_micros() as u64;
    self.metrics.record_encode(&stats, timing_us);
    tracing::debug!(
      attribute_id,
      level = level.value(),
      bytes = staged.len(),
      timing_us,
      "encoded attribute"
    );
    Ok(stats)
  }
}

fn write_header(
  out: &mut EncoderBuffer,
  method: KdTreeAttributesEncodingMethod,
  level: CompressionLevel,
  num_points: u32,
) {
  out.encode_u8(method as u8);
  out.encode_u8(level.value());
  out.encode_u32(num_points);
}

/// The integer codec reorders its input, so the values are copied out of the
/// attribute first.
fn encode_integer(
  attribute: &PointAttribute,
  num_points: u32,
  level: CompressionLevel,
  out: &mut EncoderBuffer,
) -> Result<EncodeStats> {
  let mut points: Vec<UVec3> = PointAttributeVectorIter::new(attribute, num_points).collect();
  let max_coordinate = points.iter().map(|p| p.max_element()).max().unwrap_or(0);
  let bit_length = bits_for(max_coordinate).max(1);

  let encoder = IntegerPointsKdTreeEncoder::new(level, bit_length)?;
  Ok(encoder.encode_points(&mut points, out)?)
}

#[cfg(test)]
#[path = "encoder_test.rs"]
mod encoder_test;
