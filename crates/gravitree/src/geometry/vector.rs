//! Vector alias and element-wise comparison helpers.

use glam::DVec3;

/// Number of spatial axes.
pub const AXES: usize = 3;

/// Double-precision 3-vector used for positions, velocities and extents.
pub type Vector = DVec3;

/// True if any component of `v` is strictly less than `scalar`.
#[inline]
pub fn any_less_than(v: Vector, scalar: f64) -> bool {
	v.cmplt(Vector::splat(scalar)).any()
}

/// True if any component of `v` is less than or equal to `scalar`.
#[inline]
pub fn any_less_or_equal(v: Vector, scalar: f64) -> bool {
	v.cmple(Vector::splat(scalar)).any()
}
