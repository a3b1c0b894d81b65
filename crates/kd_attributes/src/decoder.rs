//! Attribute decoder for streams written by
//! [`KdTreeAttributesEncoder`](crate::KdTreeAttributesEncoder).

use kd_points::{
  CodecMetrics, CompressionLevel, DecoderBuffer, FloatPointsKdTreeDecoder,
  IntegerPointsKdTreeDecoder, KdTreeError,
};
use web_time::Instant;

use crate::attribute::{AttributeValues, PointAttribute};
use crate::encoder::KdTreeAttributesEncodingMethod;
use crate::error::Result;

/// A decoded attribute with the header fields it was stored with.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedAttribute {
  pub method: KdTreeAttributesEncodingMethod,
  pub level: CompressionLevel,
  pub num_points: u32,
  /// 3 components per point, in decoded (not original) point order.
  pub attribute: PointAttribute,
}

#[derive(Debug, Clone)]
pub struct KdTreeAttributesDecoder {
  point_limit: u32,
  metrics: CodecMetrics,
}

impl Default for KdTreeAttributesDecoder {
  fn default() -> Self {
    Self {
      point_limit: u32::MAX,
      metrics: CodecMetrics::default(),
    }
  }
}

impl KdTreeAttributesDecoder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Reject attributes declaring more than `limit` points.
  pub fn with_point_limit(mut self, limit: u32) -> Self {
    self.point_limit = limit;
    self
  }

  pub fn metrics(&self) -> &CodecMetrics {
    &self.metrics
  }

  /// Read one attribute. Bytes after the payload are left in `buffer`.
  #[tracing::instrument(skip_all, name = "kd_attributes::decode")]
  pub fn decode_attribute(&mut self, buffer: &mut DecoderBuffer<'_>) -> Result<DecodedAttribute> {
    let start = Instant::now();

    let method = KdTreeAttributesEncodingMethod::try_from(buffer.decode_u8()?)?;
    let level_tag = buffer.decode_u8()?;
    let level = CompressionLevel::new(level_tag)
      .map_err(|_| KdTreeError::CorruptStream(format!("invalid compression level {}", level_tag)))?;
    let num_points = buffer.decode_u32()?;

    let values = match method {
      KdTreeAttributesEncodingMethod::Quantization => {
        let points = FloatPointsKdTreeDecoder::new(level)
          .with_point_limit(self.point_limit)
          .decode_point_cloud(buffer, num_points)?;
        AttributeValues::Float32(points.iter().flat_map(|p| p.to_array()).collect())
      }
      KdTreeAttributesEncodingMethod::Integer => {
        let decoded = IntegerPointsKdTreeDecoder::new(level)
          .with_point_limit(self.point_limit)
          .decode_points(buffer, num_points)?;
        AttributeValues::UInt32(decoded.points.iter().flat_map(|p| p.to_array()).collect())
      }
    };

    let timing_us = start.elapsed().as_micros() as u64;
    self.metrics.record_decode(num_points, timing_us);
    tracing::debug!(?method, level = level.value(), num_points, timing_us, "decoded attribute");

    Ok(DecodedAttribute {
      method,
      level,
      num_points,
      attribute: PointAttribute::new(3, values),
    })
  }
}
