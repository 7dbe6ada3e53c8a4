//! Orthant - one of the eight axis-aligned octants of 3-space.

use super::vector::AXES;

/// Octant index packing the sign of each axis.
///
/// Bit *i* holds the alignment of axis *i*: 0 = aligned (positive side),
/// 1 = anti-aligned (negative side). Zero-initialisation therefore means all
/// axes aligned, and the index runs over `0..8`:
///
/// ```text
/// 0 : 0b000 : (+x, +y, +z)
/// 1 : 0b001 : (-x, +y, +z)
/// 2 : 0b010 : (+x, -y, +z)
/// ...
/// 7 : 0b111 : (-x, -y, -z)
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct Orthant(u8);

impl Orthant {
	/// Number of orthants of a 3-dimensional box.
	pub const COUNT: usize = 1 << AXES;

	/// The all-axes-aligned orthant.
	pub fn new() -> Self {
		Self(0)
	}

	/// Set the alignment of an axis. `true` = aligned/positive side.
	pub fn align_axis(&mut self, axis: usize, aligned: bool) {
		debug_assert!(axis < AXES, "axis out of range");
		if aligned {
			self.0 &= !(1 << axis);
		} else {
			self.0 |= 1 << axis;
		}
	}

	/// Alignment of an axis. `true` = aligned/positive side.
	pub fn is_axis_aligned(self, axis: usize) -> bool {
		debug_assert!(axis < AXES, "axis out of range");
		self.0 & (1 << axis) == 0
	}

	/// Flip every axis alignment, mirroring the orthant through the centre.
	#[must_use]
	pub fn invert(self) -> Self {
		Self(!self.0 & (Self::COUNT as u8 - 1))
	}

	/// Index in `[0, 8)` for addressing child arrays.
	pub fn index(self) -> usize {
		self.0 as usize
	}

	/// Iterate all eight orthants in index order.
	pub fn all() -> impl Iterator<Item = Self> {
		(0..Self::COUNT as u8).map(Self)
	}
}

impl From<usize> for Orthant {
	fn from(index: usize) -> Self {
		debug_assert!(index < Self::COUNT, "orthant index out of range");
		Self(index as u8 & (Self::COUNT as u8 - 1))
	}
}
