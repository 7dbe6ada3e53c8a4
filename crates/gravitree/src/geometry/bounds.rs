//! Axis-aligned bounding box stored as centre + half-extents.

use crate::error::Error;

use super::orthant::Orthant;
use super::vector::{Vector, AXES};

/// Axis-aligned box described by its centre and half-extents.
///
/// Extents are half-widths and must be strictly positive. A "loose" reading
/// of the box dilates the extents by a factor `looseness > 1` at query time;
/// the stored extents never change. Looseness values of 1 or below mean no
/// dilation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
	centre: Vector,
	extents: Vector,
}

impl BoundingBox {
	/// Create a box from its centre and half-extents.
	///
	/// Fails with [`Error::InvalidArgument`] unless every extent is positive
	/// and finite.
	pub fn new(centre: Vector, extents: Vector) -> Result<Self, Error> {
		if !extents.is_finite() || !extents.cmpgt(Vector::ZERO).all() {
			return Err(Error::InvalidArgument("extents must be positive and finite"));
		}
		Ok(Self { centre, extents })
	}

	/// Construct without validation. Extents must already be positive.
	pub(crate) fn new_unchecked(centre: Vector, extents: Vector) -> Self {
		debug_assert!(extents.cmpgt(Vector::ZERO).all(), "extents must be positive");
		Self { centre, extents }
	}

	/// Centre of the box.
	#[inline]
	pub fn centre(&self) -> Vector {
		self.centre
	}

	/// Half-widths of the box.
	#[inline]
	pub fn extents(&self) -> Vector {
		self.extents
	}

	/// Full side lengths (2x extents).
	#[inline]
	pub fn width(&self) -> Vector {
		self.extents * 2.0
	}

	/// Minimum corner.
	#[inline]
	pub fn min(&self) -> Vector {
		self.centre - self.extents
	}

	/// Maximum corner.
	#[inline]
	pub fn max(&self) -> Vector {
		self.centre + self.extents
	}

	#[inline]
	fn loose_extents(&self, looseness: f64) -> Vector {
		if looseness > 1.0 {
			self.extents * looseness
		} else {
			self.extents
		}
	}

	/// Per-axis overlap of this box (dilated by `looseness` if > 1) with
	/// `other`. Touching boundaries count as intersecting.
	pub fn intersects(&self, other: &BoundingBox, looseness: f64) -> bool {
		let extents = self.loose_extents(looseness);
		let this_min = self.centre - extents;
		let this_max = self.centre + extents;
		this_min.cmple(other.max()).all() && this_max.cmpge(other.min()).all()
	}

	/// Inclusive containment of a point against the dilated extents.
	pub fn contains_point(&self, point: Vector, looseness: f64) -> bool {
		let extents = self.loose_extents(looseness);
		(point - self.centre).abs().cmple(extents).all()
	}

	/// Whole-box containment: `other`'s min and max corners both lie inside
	/// this box dilated by `looseness`.
	pub fn contains(&self, other: &BoundingBox, looseness: f64) -> bool {
		let extents = self.loose_extents(looseness);
		let this_min = self.centre - extents;
		let this_max = self.centre + extents;
		other.min().cmpge(this_min).all() && other.max().cmple(this_max).all()
	}

	/// Orthant of `point` relative to the centre. Points on a boundary plane
	/// belong to the positive side.
	pub fn orthant_of(&self, point: Vector) -> Orthant {
		let mut orthant = Orthant::new();
		for axis in 0..AXES {
			orthant.align_axis(axis, point[axis] >= self.centre[axis]);
		}
		orthant
	}

	/// The sub-box covering the given orthant: extents halved, centre offset
	/// by a quarter width towards the orthant's signs.
	#[must_use]
	pub fn shrink_to(&self, orthant: Orthant) -> BoundingBox {
		let extents = self.extents * 0.5;
		let mut centre = self.centre;
		for axis in 0..AXES {
			if orthant.is_axis_aligned(axis) {
				centre[axis] += extents[axis];
			} else {
				centre[axis] -= extents[axis];
			}
		}
		Self::new_unchecked(centre, extents)
	}

	/// The super-box in which this box sits as the given orthant: extents
	/// doubled, centre moved a full half-width away from the orthant's signs.
	/// Exact inverse of [`BoundingBox::shrink_to`].
	#[must_use]
	pub fn expand_from(&self, orthant: Orthant) -> BoundingBox {
		let extents = self.extents * 2.0;
		let mut centre = self.centre;
		for axis in 0..AXES {
			if orthant.is_axis_aligned(axis) {
				centre[axis] -= self.extents[axis];
			} else {
				centre[axis] += self.extents[axis];
			}
		}
		Self::new_unchecked(centre, extents)
	}
}
