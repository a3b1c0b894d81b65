//! Error types for the k-d tree codec.

use thiserror::Error;

/// Errors produced while encoding or decoding k-d tree point streams.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KdTreeError {
  /// Compression level outside `0..=10`.
  #[error("unsupported compression level {0} (expected 0..=10)")]
  UnsupportedCompressionLevel(u8),

  /// Encoder speed outside `0..=10`.
  #[error("unsupported encoder speed {0} (expected 0..=10)")]
  UnsupportedSpeed(u8),

  /// Integer bit length outside `1..=32`.
  #[error("unsupported bit length {0} (expected 1..=32)")]
  UnsupportedBitLength(u32),

  /// Quantization bit depth missing, non-positive or too large.
  #[error("invalid quantization bits {0}")]
  InvalidQuantizationBits(i32),

  /// A point coordinate does not fit the declared bit length.
  #[error("coordinate {value} does not fit in {bit_length} bits")]
  CoordinateOutOfRange {
    /// Offending coordinate value.
    value: u32,
    /// Declared bit length.
    bit_length: u32,
  },

  /// NaN or infinite float coordinate.
  #[error("non-finite coordinate in float point cloud")]
  NonFiniteCoordinate,

  /// Point count does not fit the 32-bit count field, or exceeds the
  /// decoder's point limit.
  #[error("too many points: {0}")]
  TooManyPoints(usize),

  /// A length-prefixed byte range does not fit the 32-bit length field.
  #[error("byte range of {0} bytes exceeds the u32 length prefix")]
  StreamTooLong(usize),

  /// The input ended before the stream was complete.
  #[error("unexpected end of stream")]
  UnexpectedEnd,

  /// The stream contents are inconsistent.
  #[error("corrupt stream: {0}")]
  CorruptStream(String),
}

impl KdTreeError {
  pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
    Self::CorruptStream(msg.into())
  }
}

/// Result alias used throughout the crate.
pub type Result<T, E = KdTreeError> = std::result::Result<T, E>;
