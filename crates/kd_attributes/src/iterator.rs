//! Random-access view of an attribute as a sequence of 3-component vectors.

use std::iter::FusedIterator;
use std::marker::PhantomData;

use glam::{UVec3, Vec3};

use crate::attribute::{AttributeComponent, PointAttribute};

/// Vector type produced by [`PointAttributeVectorIter`].
pub trait AttributeVector: Copy {
  type Component: AttributeComponent;

  fn from_components(components: [Self::Component; 3]) -> Self;
}

impl AttributeVector for Vec3 {
  type Component = f32;

  #[inline]
  fn from_components(components: [f32; 3]) -> Self {
    Vec3::from_array(components)
  }
}

impl AttributeVector for UVec3 {
  type Component = u32;

  #[inline]
  fn from_components(components: [u32; 3]) -> Self {
    UVec3::from_array(components)
  }
}

/// Lazily converts the values of points `0..num_points` into `V`.
///
/// Every element is computed on demand from the point index, so the iterator
/// is cheap to clone (restart) and [`Iterator::nth`] is O(1).
pub struct PointAttributeVectorIter<'a, V> {
  attribute: &'a PointAttribute,
  front: u32,
  back: u32,
  _marker: PhantomData<fn() -> V>,
}

impl<'a, V: AttributeVector> PointAttributeVectorIter<'a, V> {
  /// The attribute must have 3 components and cover every point.
  pub fn new(attribute: &'a PointAttribute, num_points: u32) -> Self {
    debug_assert_eq!(attribute.num_components(), 3);
    debug_assert!(attribute.covers_points(num_points));
    Self {
      attribute,
      front: 0,
      back: num_points,
      _marker: PhantomData,
    }
  }

  /// Value of `point` (0-based, relative to the attribute, not the cursor).
  pub fn get(&self, point: u32) -> V {
    let value = self.attribute.mapped_index(point);
    V::from_components([
      self.attribute.component(value, 0),
      self.attribute.component(value, 1),
      self.attribute.component(value, 2),
    ])
  }
}

impl<V> Clone for PointAttributeVectorIter<'_, V> {
  fn clone(&self) -> Self {
    Self {
      attribute: self.attribute,
      front: self.front,
      back: self.back,
      _marker: PhantomData,
    }
  }
}

impl<V: AttributeVector> Iterator for PointAttributeVectorIter<'_, V> {
  type Item = V;

  #[inline]
  fn next(&mut self) -> Option<V> {
    if self.front >= self.back {
      return None;
    }
    let item = self.get(self.front);
    self.front += 1;
    Some(item)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let len = (self.back - self.front) as usize;
    (len, Some(len))
  }

  fn nth(&mut self, n: usize) -> Option<V> {
    let remaining = (self.back - self.front) as usize;
    if n >= remaining {
      self.front = self.back;
      return None;
    }
    self.front += n as u32;
    self.next()
  }
}

impl<V: AttributeVector> DoubleEndedIterator for PointAttributeVectorIter<'_, V> {
  fn next_back(&mut self) -> Option<V> {
    if self.front >= self.back {
      return None;
    }
    self.back -= 1;
    Some(self.get(self.back))
  }
}

impl<V: AttributeVector> ExactSizeIterator for PointAttributeVectorIter<'_, V> {}

impl<V: AttributeVector> FusedIterator for PointAttributeVectorIter<'_, V> {}

#[cfg(test)]
#[path = "iterator_test.rs"]
mod iterator_test;
