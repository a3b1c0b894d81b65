//! kd_points - k-d tree geometry codec for point clouds
//!
//! Compresses 3-component point positions by recursively splitting the point
//! set at the midpoint of its bounding box. Internal nodes store only how many
//! points went left; leaves store the coordinate bits their ancestors did not
//! already determine.
//!
//! # Features
//!
//! - **Integer codec**: lossless for coordinates in `[0, 2^B - 1]`, `B` up to
//!   32
//! - **Float codec**: quantizes to a `Q`-bit lattice over the cloud's bounding
//!   box, then runs the integer codec
//! - **Compression levels 0-10**: one policy table picks the split-count code
//!   and axis selection; the level never changes decoded geometry
//! - **Metrics** (`metrics` feature): encode/decode timings and sizes
//!
//! # Example
//!
//! ```ignore
//! use glam::UVec3;
//! use kd_points::{CompressionLevel, DecoderBuffer, EncoderBuffer};
//! use kd_points::{IntegerPointsKdTreeDecoder, IntegerPointsKdTreeEncoder};
//!
//! let mut points = vec![UVec3::new(1, 1, 1), UVec3::new(2, 2, 2), UVec3::new(3, 3, 3)];
//! let level = CompressionLevel::DEFAULT;
//!
//! let mut out = EncoderBuffer::new();
//! IntegerPointsKdTreeEncoder::new(level, 2)?.encode_points(&mut points, &mut out)?;
//!
//! let mut buffer = DecoderBuffer::new(out.data());
//! let decoded = IntegerPointsKdTreeDecoder::new(level).decode_points(&mut buffer, 3)?;
//! assert_eq!(decoded.points.len(), 3);
//! ```

pub mod bitstream;
pub mod error;
pub mod kd_tree;
pub mod metrics;

// Re-export commonly used items
pub use bitstream::{bits_for, DecoderBuffer, EncoderBuffer};
pub use error::{KdTreeError, Result};
pub use kd_tree::{
  CompressionLevel, DecodedPoints, EncodeStats, FloatBounds, FloatPointsKdTreeDecoder,
  FloatPointsKdTreeEncoder, IntegerPointsKdTreeDecoder, IntegerPointsKdTreeEncoder,
  MAX_BIT_LENGTH, MAX_COMPRESSION_LEVEL, MAX_QUANTIZATION_BITS,
};
pub use metrics::CodecMetrics;
