//! Barnes-Hut acceleration evaluation over the dynamic octree.

use std::sync::RwLock;

use crate::error::Error;
use crate::forces::Field;
use crate::geometry::{any_less_than, BoundingBox, Vector};
use crate::mass::{MassCalculator, PointMass};
use crate::octree::{Node, Octree};
use crate::particle::ParticleRef;
use crate::threads::ThreadPool;

/// Everything guarded by the facade's reader-writer lock.
struct State {
  tree: Option<Octree>,
  field: Option<Box<dyn Field>>,
  threshold: f64,
}

/// Barnes-Hut evaluator combining the octree, a force law and the mass
/// cache.
///
/// Read operations (`acceleration`, `force`, `threshold`) take the lock
/// shared and may run concurrently from many threads against an unchanged
/// tree. Mutations (`set_*`, `take_*`, `update`) take it exclusively and
/// clear the mass cache, since any reorganisation of the tree can recycle
/// the node identities the cache is keyed by.
pub struct BarnesHut {
  state: RwLock<State>,
  masses: MassCalculator,
}

impl BarnesHut {
  /// Create an evaluator with no tree or force law attached.
  ///
  /// `threshold` is the multipole acceptance parameter: 0 forces exact
  /// direct summation, larger values trade accuracy for speed (1.0 to 2.0
  /// is typical). Negative thresholds are an [`Error::InvalidArgument`].
  pub fn new(threshold: f64) -> Result<Self, Error> {
    if !threshold.is_finite() || threshold < 0.0 {
      return Err(Error::InvalidArgument("threshold must be finite and >= 0"));
    }
    Ok(Self {
      state: RwLock::new(State {
        tree: None,
        field: None,
        threshold,
      }),
      masses: MassCalculator::new(),
    })
  }

  /// Attach a tree at construction.
  #[must_use]
  pub fn with_tree(self, tree: Octree) -> Self {
    self.state.write().unwrap().tree = Some(tree);
    self
  }

  /// Attach a force law at construction.
  #[must_use]
  pub fn with_field(self, field: Box<dyn Field>) -> Self {
    self.state.write().unwrap().field = Some(field);
    self
  }

  /// Gravitational acceleration on `particle` due to everything else in the
  /// tree. Returns zero when no tree or force law is attached.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "barnes_hut::acceleration"))]
  pub fn acceleration(&self, particle: &ParticleRef) -> Vector {
    let state = self.state.read().unwrap();
    let (Some(tree), Some(field)) = (&state.tree, &state.field) else {
      return Vector::ZERO;
    };

    let position = particle.position();
    let mut acceleration = Vector::ZERO;
    self.accumulate(
      tree.root(),
      particle,
      position,
      field.as_ref(),
      state.threshold,
      &mut acceleration,
    );
    acceleration
  }

  /// Force on `particle`: its mass times its acceleration.
  pub fn force(&self, particle: &ParticleRef) -> Vector {
    particle.mass() * self.acceleration(particle)
  }

  /// Current multipole acceptance threshold.
  pub fn threshold(&self) -> f64 {
    self.state.read().unwrap().threshold
  }

  /// Replace the multipole acceptance threshold.
  pub fn set_threshold(&self, threshold: f64) -> Result<(), Error> {
    if !threshold.is_finite() || threshold < 0.0 {
      return Err(Error::InvalidArgument("threshold must be finite and >= 0"));
    }
    self.state.write().unwrap().threshold = threshold;
    Ok(())
  }

  /// Attach a tree, invalidating the mass cache.
  pub fn set_tree(&self, tree: Octree) {
    let mut state = self.state.write().unwrap();
    self.masses.clear();
    state.tree = Some(tree);
  }

  /// Detach and return the tree, invalidating the mass cache.
  ///
  /// The caller may mutate the returned tree freely; node identities cached
  /// here would dangle otherwise.
  pub fn take_tree(&self) -> Option<Octree> {
    let mut state = self.state.write().unwrap();
    self.masses.clear();
    state.tree.take()
  }

  /// Attach a force law.
  pub fn set_field(&self, field: Box<dyn Field>) {
    self.state.write().unwrap().field = Some(field);
  }

  /// Detach and return the force law.
  pub fn take_field(&self) -> Option<Box<dyn Field>> {
    self.state.write().unwrap().field.take()
  }

  /// Re-settle the attached tree after particle movement, optionally in
  /// parallel on `pool`. Returns the particles that no longer fit; the mass
  /// cache is cleared in the same exclusive section.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "barnes_hut::update"))]
  pub fn update(&self, pool: Option<&ThreadPool>) -> Vec<ParticleRef> {
    let mut state = self.state.write().unwrap();
    self.masses.clear();
    match &mut state.tree {
      Some(tree) => tree.update_with(pool),
      None => Vec::new(),
    }
  }

  /// Total mass and centre of mass of the attached tree.
  ///
  /// Fails with [`Error::InvalidState`] when no tree is attached.
  pub fn mass(&self) -> Result<PointMass, Error> {
    let state = self.state.read().unwrap();
    match &state.tree {
      Some(tree) => Ok(self.masses.calculate(tree.root())),
      None => Err(Error::InvalidState("no tree attached".to_string())),
    }
  }

  /// Multipole acceptance: the node is far enough away when any of its
  /// extents is smaller than `threshold` times the distance to the query.
  /// A threshold of 0 never accepts, forcing exact summation.
  fn should_approximate(&self, position: Vector, bounds: &BoundingBox, threshold: f64) -> bool {
    let distance = position.distance(bounds.centre());
    any_less_than(bounds.extents(), threshold * distance)
  }

  fn accumulate(
    &self,
    node: &Node,
    query: &ParticleRef,
    position: Vector,
    field: &dyn Field,
    threshold: f64,
    acceleration: &mut Vector,
  ) {
    if self.should_approximate(position, node.bounds(), threshold) {
      let source = self.masses.calculate(node);
      field.add_acceleration(&source, position, acceleration);
      return;
    }

    for other in node.particles() {
      if other.ptr_eq(query) {
        continue;
      }
      let source = {
        let other = other.read();
        PointMass {
          mass: other.mass,
          displacement: other.position(),
        }
      };
      field.add_acceleration(&source, position, acceleration);
    }

    for child in node.children() {
      self.accumulate(child, query, position, field, threshold, acceleration);
    }
  }
}

#[cfg(test)]
#[path = "barnes_hut_test.rs"]
mod barnes_hut_test;
