//! kd_attributes - attribute-level front-end for the `kd_points` codec
//!
//! Validates a point cloud attribute, picks the integer or quantized-float
//! k-d tree codec for it, and frames the result with a small header.
//!
//! # Example
//!
//! ```ignore
//! use kd_attributes::{EncoderOptions, KdTreeAttributesEncoder, KdTreeAttributesDecoder};
//!
//! let options = EncoderOptions::new().with_speed(3).with_quantization(position_id, 14);
//! let mut encoder = KdTreeAttributesEncoder::new(vec![position_id]);
//! let mut out = EncoderBuffer::new();
//! encoder.encode_attributes(&point_cloud, &options, &mut out)?;
//!
//! let decoded = KdTreeAttributesDecoder::new().decode_attribute(&mut DecoderBuffer::new(out.data()))?;
//! ```

pub mod attribute;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod iterator;

pub use attribute::{AttributeValues, DataType, PointAttribute, PointCloud};
pub use config::{AttributeOptions, EncoderOptions};
pub use decoder::{DecodedAttribute, KdTreeAttributesDecoder};
pub use encoder::{KdTreeAttributesEncoder, KdTreeAttributesEncodingMethod};
pub use error::{AttributeCodecError, Result};
pub use iterator::{AttributeVector, PointAttributeVectorIter};
