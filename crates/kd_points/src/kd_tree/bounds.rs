//! Integer axis-aligned bounds of an implicit k-d tree node.

use glam::UVec3;

use crate::bitstream::{bits_for, max_value};

/// Inclusive integer bounding box of a k-d tree node.
///
/// The root box spans the whole `[0, 2^B - 1]` cube. Every split halves one
/// axis, so per-axis extents stay of the form `2^k - 1` and a leaf residual
/// `value - min` always fills exactly [`NodeBounds::residual_bits`] bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeBounds {
	/// Minimum corner (inclusive).
	pub min: UVec3,
	/// Maximum corner (inclusive).
	pub max: UVec3,
}

impl NodeBounds {
	/// Create bounds from min and max corners.
	///
	/// # Panics
	/// Debug-asserts that min <= max on all axes.
	pub fn new(min: UVec3, max: UVec3) -> Self {
		debug_assert!(min.cmple(max).all(), "bounds min must be <= max on all axes");
		Self { min, max }
	}

	/// Root bounds for a given coordinate bit length.
	pub fn from_bit_length(bit_length: u32) -> Self {
		Self {
			min: UVec3::ZERO,
			max: UVec3::splat(max_value(bit_length)),
		}
	}

	/// Number of distinct values along `axis`, minus one.
	#[inline]
	pub fn extent(&self, axis: usize) -> u32 {
		self.max[axis] - self.min[axis]
	}

	/// True once the box has shrunk to a single lattice point.
	#[inline]
	pub fn is_single_cell(&self) -> bool {
		self.min == self.max
	}

	/// Check if these bounds contain a point.
	#[inline]
	pub fn contains_point(&self, point: UVec3) -> bool {
		point.cmpge(self.min).all() && point.cmple(self.max).all()
	}

	/// Bits needed for a leaf coordinate on `axis` once ancestor splits are
	/// known.
	#[inline]
	pub fn residual_bits(&self, axis: usize) -> u32 {
		bits_for(self.extent(axis))
	}

	/// Split at the midpoint of `axis`.
	///
	/// Returns `(mid, left, right)`: the left box keeps values `<= mid`, the
	/// right box values `> mid`. Requires a non-zero extent on `axis`.
	pub fn split(&self, axis: usize) -> (u32, Self, Self) {
		debug_assert!(self.extent(axis) > 0, "cannot split a collapsed axis");
		let mid = self.min[axis] + self.extent(axis) / 2;
		let mut left = *self;
		let mut right = *self;
		left.max[axis] = mid;
		right.min[axis] = mid + 1;
		(mid, left, right)
	}
}
