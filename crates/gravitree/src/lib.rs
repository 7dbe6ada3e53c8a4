//! gravitree - engine-independent spatial indexing for N-body simulation
//!
//! This crate maintains a dynamic loose octree of massive particles and
//! evaluates gravitational accelerations on query particles with the
//! Barnes-Hut approximation.
//!
//! # Features
//!
//! - **Dynamic loose octree**: branches and merges on its own as particles
//!   are inserted, removed, or drift between updates; the root grows and
//!   shrinks within configurable limits
//! - **Memoised mass cache**: thread-safe per-subtree mass and
//!   centre-of-mass with at-most-one computation per node
//! - **Barnes-Hut evaluation**: multipole acceptance under a pluggable
//!   pairwise force law (Newtonian and Plummer-softened included)
//! - **Thread pool**: fixed worker set with blocking task handles and a
//!   chunked parallel for-each, used to parallelise tree updates
//!
//! # Example
//!
//! ```ignore
//! use gravitree::{BarnesHut, BoundingBox, Newtonian, Octree, Particle, ParticleRef, Vector};
//!
//! let bounds = BoundingBox::new(Vector::ZERO, Vector::splat(100.0))?;
//! let mut tree = Octree::with_defaults(bounds);
//!
//! let body = ParticleRef::new(Particle::new(5.0, bounds_of_body)?);
//! tree.insert(&body);
//!
//! let gravity = BarnesHut::new(1.0)?
//!     .with_tree(tree)
//!     .with_field(Box::new(Newtonian::new(6.674e-11)));
//!
//! // Each step: integrate positions externally, then
//! let lost = gravity.update(None);
//! let acceleration = gravity.acceleration(&body);
//! ```

pub mod error;
pub mod geometry;

// Re-export commonly used items
pub use error::{Error, ErrorList};
pub use geometry::{BoundingBox, Orthant, Vector};

// Particle state and shared handles
pub mod particle;
pub use particle::{Particle, ParticleRef};

// Dynamic loose octree
pub mod octree;
pub use octree::{Node, Octree, OctreeConfig};

// Memoised subtree masses
pub mod mass;
pub use mass::{MassCalculator, PointMass};

// Force laws
pub mod forces;
pub use forces::{Field, Newtonian, Plummer};

// Barnes-Hut evaluation
pub mod barnes_hut;
pub use barnes_hut::BarnesHut;

// Thread pool for parallel updates
pub mod threads;
pub use threads::{TaskHandle, TaskQueue, ThreadPool};

// Tree statistics (timing windows, counters)
#[cfg(feature = "metrics")]
pub mod metrics;
