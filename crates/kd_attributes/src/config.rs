//! Encoder options, loadable from TOML.
//!
//! ```toml
//! speed = 3
//!
//! [[attribute]]
//! id = 0
//! quantization_bits = 14
//! ```

use std::path::Path;

use kd_points::{CompressionLevel, MAX_COMPRESSION_LEVEL};
use serde::Deserialize;

use crate::error::{AttributeCodecError, Result};

/// Per-attribute options.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct AttributeOptions {
	/// Attribute id within the point cloud.
	pub id: usize,
	/// Quantization bit depth for float attributes.
	#[serde(default)]
	pub quantization_bits: Option<i32>,
}

/// Options consumed by [`KdTreeAttributesEncoder`](crate::KdTreeAttributesEncoder).
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct EncoderOptions {
	/// Encoding speed 0 (smallest output) to 10 (fastest). Out-of-range values
	/// are clamped.
	#[serde(default = "default_speed")]
	pub speed: i32,
	/// Attribute-specific options.
	#[serde(default, rename = "attribute")]
	pub attributes: Vec<AttributeOptions>,
}

fn default_speed() -> i32 {
	5
}

impl Default for EncoderOptions {
	fn default() -> Self {
		Self {
			speed: default_speed(),
			attributes: Vec::new(),
		}
	}
}

impl EncoderOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_speed(mut self, speed: i32) -> Self {
		self.speed = speed;
		self
	}

	/// Set the quantization bit depth of attribute `id`.
	pub fn with_quantization(mut self, id: usize, quantization_bits: i32) -> Self {
		match self.attributes.iter_mut().find(|a| a.id == id) {
			Some(options) => options.quantization_bits = Some(quantization_bits),
			None => self.attributes.push(AttributeOptions {
				id,
				quantization_bits: Some(quantization_bits),
			}),
		}
		self
	}

	/// Speed clamped to `0..=10`.
	pub fn speed(&self) -> u8 {
		self.speed.clamp(0, MAX_COMPRESSION_LEVEL as i32) as u8
	}

	/// Compression level `10 - speed`.
	pub fn compression_level(&self) -> CompressionLevel {
		CompressionLevel::from_speed(self.speed()).unwrap_or_default()
	}

	pub fn attribute(&self, id: usize) -> Option<&AttributeOptions> {
		self.attributes.iter().find(|a| a.id == id)
	}

	pub fn quantization_bits(&self, id: usize) -> Option<i32> {
		self.attribute(id).and_then(|a| a.quantization_bits)
	}

	/// Parse options from a TOML string.
	pub fn from_toml_str(content: &str) -> Result<Self> {
		let options: EncoderOptions =
			toml::from_str(content).map_err(|e| AttributeCodecError::Config(e.to_string()))?;
		options.validate()?;
		Ok(options)
	}

	/// Load options from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path).map_err(|source| AttributeCodecError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&content)
	}

	fn validate(&self) -> Result<()> {
		for (i, a) in self.attributes.iter().enumerate() {
			if self.attributes[..i].iter().any(|b| b.id == a.id) {
				return Err(AttributeCodecError::Config(format!(
					"attribute {} listed more than once",
					a.id
				)));
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let options = EncoderOptions::from_toml_str("").unwrap();
		assert_eq!(options, EncoderOptions::default());
		assert_eq!(options.speed(), 5);
		assert_eq!(options.compression_level(), CompressionLevel::DEFAULT);
		assert_eq!(options.quantization_bits(0), None);
	}

	#[test]
	fn test_parse_attributes() {
		let options = EncoderOptions::from_toml_str(
			r#"
			speed = 2

			[[attribute]]
			id = 0
			quantization_bits = 11

			[[attribute]]
			id = 3
			"#,
		)
		.unwrap();
		assert_eq!(options.speed(), 2);
		assert_eq!(options.compression_level().value(), 8);
		assert_eq!(options.quantization_bits(0), Some(11));
		assert_eq!(options.quantization_bits(3), None);
		assert_eq!(options.quantization_bits(1), None);
	}

	#[test]
	fn test_speed_clamped() {
		assert_eq!(EncoderOptions::new().with_speed(-4).speed(), 0);
		assert_eq!(EncoderOptions::new().with_speed(42).speed(), 10);
		assert_eq!(
			EncoderOptions::new().with_speed(42).compression_level(),
			CompressionLevel::FASTEST
		);
	}

	#[test]
	fn test_with_quantization_overrides() {
		let options = EncoderOptions::new().with_quantization(1, 8).with_quantization(1, 12);
		assert_eq!(options.attributes.len(), 1);
		assert_eq!(options.quantization_bits(1), Some(12));
	}

	#[test]
	fn test_duplicate_attribute_rejected() {
		let result = EncoderOptions::from_toml_str(
			"[[attribute]]\nid = 0\n\n[[attribute]]\nid = 0\n",
		);
		assert!(matches!(result, Err(AttributeCodecError::Config(_))));
	}

	#[test]
	fn test_malformed_toml() {
		let result = EncoderOptions::from_toml_str("speed = \"fast\"");
		assert!(matches!(result, Err(AttributeCodecError::Config(_))));
	}

	#[test]
	fn test_load_missing_file() {
		let result = EncoderOptions::load(Path::new("/nonexistent/kd_options.toml"));
		assert!(matches!(result, Err(AttributeCodecError::Io { .. })));
	}
}
