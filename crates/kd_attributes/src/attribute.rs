//! Minimal point cloud storage: typed attribute buffers addressed by point.

use std::fmt;

/// Scalar type of an attribute's components.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
  UInt8,
  UInt16,
  UInt32,
  Int32,
  Float32,
}

impl fmt::Display for DataType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      DataType::UInt8 => "u8",
      DataType::UInt16 => "u16",
      DataType::UInt32 => "u32",
      DataType::Int32 => "i32",
      DataType::Float32 => "f32",
    };
    f.write_str(name)
  }
}

/// Flat component storage, `num_components` scalars per value.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValues {
  Float32(Vec<f32>),
  UInt32(Vec<u32>),
  UInt16(Vec<u16>),
  UInt8(Vec<u8>),
  Int32(Vec<i32>),
}

impl AttributeValues {
  pub fn data_type(&self) -> DataType {
    match self {
      AttributeValues::Float32(_) => DataType::Float32,
      AttributeValues::UInt32(_) => DataType::UInt32,
      AttributeValues::UInt16(_) => DataType::UInt16,
      AttributeValues::UInt8(_) => DataType::UInt8,
      AttributeValues::Int32(_) => DataType::Int32,
    }
  }

  /// Number of scalars stored.
  pub fn len(&self) -> usize {
    match self {
      AttributeValues::Float32(v) => v.len(),
      AttributeValues::UInt32(v) => v.len(),
      AttributeValues::UInt16(v) => v.len(),
      AttributeValues::UInt8(v) => v.len(),
      AttributeValues::Int32(v) => v.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Scalar at `index`, converted with a numeric `as` cast.
  #[inline]
  pub fn component<T: AttributeComponent>(&self, index: usize) -> T {
    match self {
      AttributeValues::Float32(v) => T::from_f32(v[index]),
      AttributeValues::UInt32(v) => T::from_u32(v[index]),
      AttributeValues::UInt16(v) => T::from_u32(v[index] as u32),
      AttributeValues::UInt8(v) => T::from_u32(v[index] as u32),
      AttributeValues::Int32(v) => T::from_i32(v[index]),
    }
  }
}

/// Scalar types an attribute component can be converted into.
pub trait AttributeComponent: Copy {
  fn from_f32(value: f32) -> Self;
  fn from_u32(value: u32) -> Self;
  fn from_i32(value: i32) -> Self;
}

impl AttributeComponent for f32 {
  #[inline]
  fn from_f32(value: f32) -> Self {
    value
  }
  #[inline]
  fn from_u32(value: u32) -> Self {
    value as f32
  }
  #[inline]
  fn from_i32(value: i32) -> Self {
    value as f32
  }
}

impl AttributeComponent for u32 {
  #[inline]
  fn from_f32(value: f32) -> Self {
    value as u32
  }
  #[inline]
  fn from_u32(value: u32) -> Self {
    value
  }
  #[inline]
  fn from_i32(value: i32) -> Self {
    value as u32
  }
}

/// A per-point attribute (position, normal, color...).
///
/// Values are addressed through an optional point-to-value mapping so that
/// several points can share one stored value. Without a mapping, point `i`
/// uses value `i`.
#[derive(Clone, Debug, PartialEq)]
pub struct PointAttribute {
  num_components: u8,
  values: AttributeValues,
  point_to_value: Option<Vec<u32>>,
}

impl PointAttribute {
  pub fn new(num_components: u8, values: AttributeValues) -> Self {
    debug_assert!(num_components > 0);
    debug_assert_eq!(values.len() % num_components.max(1) as usize, 0);
    Self {
      num_components,
      values,
      point_to_value: None,
    }
  }

  /// Route point `i` to value `mapping[i]`.
  pub fn with_mapping(mut self, mapping: Vec<u32>) -> Self {
    self.point_to_value = Some(mapping);
    self
  }

  pub fn num_components(&self) -> u8 {
    self.num_components
  }

  pub fn data_type(&self) -> DataType {
    self.values.data_type()
  }

  pub fn values(&self) -> &AttributeValues {
    &self.values
  }

  /// Number of stored values (not scalars).
  pub fn num_values(&self) -> usize {
    match self.num_components {
      0 => 0,
      n => self.values.len() / n as usize,
    }
  }

  /// Value index used by `point`.
  #[inline]
  pub fn mapped_index(&self, point: u32) -> usize {
    match &self.point_to_value {
      Some(mapping) => mapping[point as usize] as usize,
      None => point as usize,
    }
  }

  /// True when every point in `0..num_points` maps to a stored value.
  pub fn covers_points(&self, num_points: u32) -> bool {
    let num_values = self.num_values();
    match &self.point_to_value {
      Some(mapping) => {
        mapping.len() >= num_points as usize
          && mapping[..num_points as usize]
            .iter()
            .all(|&v| (v as usize) < num_values)
      }
      None => num_points as usize <= num_values,
    }
  }

  /// Component `component` of value `value_index`, converted to `T`.
  #[inline]
  pub fn component<T: AttributeComponent>(&self, value_index: usize, component: usize) -> T {
    self
      .values
      .component(value_index * self.num_components as usize + component)
  }
}

/// A set of points and the attributes stored for them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointCloud {
  num_points: u32,
  attributes: Vec<PointAttribute>,
}

impl PointCloud {
  pub fn new(num_points: u32) -> Self {
    Self {
      num_points,
      attributes: Vec::new(),
    }
  }

  pub fn num_points(&self) -> u32 {
    self.num_points
  }

  /// Add an attribute and return its id.
  pub fn add_attribute(&mut self, attribute: PointAttribute) -> usize {
    self.attributes.push(attribute);
    self.attributes.len() - 1
  }

  pub fn attribute(&self, id: usize) -> Option<&PointAttribute> {
    self.attributes.get(id)
  }

  pub fn num_attributes(&self) -> usize {
    self.attributes.len()
  }
}
