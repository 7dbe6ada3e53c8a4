//! Axis-aligned geometry primitives.
//!
//! - [`vector`]: `Vector` - double-precision 3-vector plus element-wise
//!   comparison helpers
//! - [`orthant`]: `Orthant` - sign-of-axis index into the eight octants
//! - [`bounds`]: `BoundingBox` - centre + half-extents box with the loose
//!   containment queries the octree is built on

pub mod bounds;
pub mod orthant;
pub mod vector;

// Re-exports
pub use bounds::BoundingBox;
pub use orthant::Orthant;
pub use vector::{any_less_or_equal, any_less_than, Vector, AXES};
