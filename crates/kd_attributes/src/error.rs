//! Error types for the attribute codec layer.

use std::path::PathBuf;

use kd_points::KdTreeError;
use thiserror::Error;

use crate::attribute::DataType;

/// Errors produced by the attribute encoder/decoder and its options.
#[derive(Debug, Error)]
pub enum AttributeCodecError {
  /// The k-d tree attribute codec handles exactly one attribute.
  #[error("expected exactly one attribute, got {0}")]
  AttributeCount(usize),

  /// Attribute id not present in the point cloud.
  #[error("attribute {0} does not exist")]
  MissingAttribute(usize),

  /// Only 3-component attributes are supported.
  #[error("expected 3 components, got {0}")]
  ComponentCount(u8),

  #[error("unsupported data type {0:?}")]
  UnsupportedDataType(DataType),

  /// Float attributes need a positive `quantization_bits` option.
  #[error("float attribute requires quantization_bits > 0")]
  MissingQuantization,

  /// Attribute storage cannot provide a value for every point.
  #[error("attribute {0} does not hold a value for every point")]
  ValueCount(usize),

  /// Unknown encoding method tag in the stream header.
  #[error("unknown encoding method {0}")]
  UnknownMethod(u8),

  #[error("invalid encoder options: {0}")]
  Config(String),

  #[error("failed to read {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error(transparent)]
  Codec(#[from] KdTreeError),
}

/// Result alias used throughout the crate.
pub type Result<T, E = AttributeCodecError> = std::result::Result<T, E>;
