//! Particle state and the shared handles the octree stores.

use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Error;
use crate::geometry::{BoundingBox, Vector};

/// A massive body tracked by the octree.
///
/// Position is the centre of `bounds`; radius is its extents. Velocity and
/// acceleration are carried for the caller's integrator and never read by
/// the tree itself.
#[derive(Clone, Debug)]
pub struct Particle {
  pub mass: f64,
  pub bounds: BoundingBox,
  pub velocity: Vector,
  pub acceleration: Vector,
}

impl Particle {
  /// Create a particle with the given mass and bounds, at rest.
  ///
  /// Fails with [`Error::InvalidArgument`] unless the mass is positive and
  /// finite.
  pub fn new(mass: f64, bounds: BoundingBox) -> Result<Self, Error> {
    if !mass.is_finite() || mass <= 0.0 {
      return Err(Error::InvalidArgument("mass must be positive and finite"));
    }
    Ok(Self {
      mass,
      bounds,
      velocity: Vector::ZERO,
      acceleration: Vector::ZERO,
    })
  }

  /// Create a particle with an initial velocity.
  pub fn with_velocity(mass: f64, bounds: BoundingBox, velocity: Vector) -> Result<Self, Error> {
    if !velocity.is_finite() {
      return Err(Error::InvalidArgument("velocity must be finite"));
    }
    let mut particle = Self::new(mass, bounds)?;
    particle.velocity = velocity;
    Ok(particle)
  }

  /// Position of the particle (centre of its bounds).
  #[inline]
  pub fn position(&self) -> Vector {
    self.bounds.centre()
  }
}

/// Shared, identity-stable handle to a [`Particle`].
///
/// The octree stores handles, never particle copies. Equality and hashing
/// follow the allocation, not the particle values: two handles compare equal
/// only when they refer to the same particle. Callers mutate the particle in
/// place through [`ParticleRef::write`] between tree updates.
#[derive(Clone, Debug)]
pub struct ParticleRef(Arc<RwLock<Particle>>);

impl ParticleRef {
  pub fn new(particle: Particle) -> Self {
    Self(Arc::new(RwLock::new(particle)))
  }

  /// Shared read access to the particle state.
  pub fn read(&self) -> RwLockReadGuard<'_, Particle> {
    self.0.read().unwrap()
  }

  /// Exclusive write access to the particle state.
  pub fn write(&self) -> RwLockWriteGuard<'_, Particle> {
    self.0.write().unwrap()
  }

  /// True when both handles refer to the same particle.
  pub fn ptr_eq(&self, other: &ParticleRef) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }

  /// Snapshot of the particle's bounds.
  pub fn bounds(&self) -> BoundingBox {
    self.read().bounds
  }

  /// Snapshot of the particle's position.
  pub fn position(&self) -> Vector {
    self.read().bounds.centre()
  }

  /// Snapshot of the particle's mass.
  pub fn mass(&self) -> f64 {
    self.read().mass
  }
}

impl From<Particle> for ParticleRef {
  fn from(particle: Particle) -> Self {
    Self::new(particle)
  }
}

impl PartialEq for ParticleRef {
  fn eq(&self, other: &Self) -> bool {
    self.ptr_eq(other)
  }
}

impl Eq for ParticleRef {}

impl Hash for ParticleRef {
  fn hash<H: Hasher>(&self, state: &mut H) {
    Arc::as_ptr(&self.0).hash(state);
  }
}
