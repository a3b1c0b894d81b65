//! k-d tree point codecs.
//!
//! Points are split recursively at the midpoint of the node bounds. Internal
//! nodes emit only the size of their left child; single-point leaves emit the
//! coordinate bits not already pinned by ancestor splits. No tree is ever
//! allocated: a node is a slice of the input plus its [`NodeBounds`].
//!
//! - [`IntegerPointsKdTreeEncoder`] / [`IntegerPointsKdTreeDecoder`]: points
//!   with coordinates in `[0, 2^B - 1]`
//! - [`FloatPointsKdTreeEncoder`] / [`FloatPointsKdTreeDecoder`]: float points,
//!   quantized to `Q` bits first
//! - [`CompressionLevel`]: selects a row of [`LEVEL_POLICIES`]

pub mod bounds;
pub mod decoder;
pub mod encoder;
pub mod float;
pub mod level;
mod split_coding;

pub use bounds::NodeBounds;
pub use decoder::{DecodedPoints, IntegerPointsKdTreeDecoder};
pub use encoder::{EncodeStats, IntegerPointsKdTreeEncoder, MAX_BIT_LENGTH};
pub use float::{
  FloatBounds, FloatPointsKdTreeDecoder, FloatPointsKdTreeEncoder, PointQuantizer,
  MAX_QUANTIZATION_BITS,
};
pub use level::{
  AdaptiveCountParams, AxisSelection, CompressionLevel, CountCoding, LevelPolicy, LEVEL_POLICIES,
  MAX_COMPRESSION_LEVEL,
};
