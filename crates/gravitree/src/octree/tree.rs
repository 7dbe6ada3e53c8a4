//! Octree - facade owning the root node and the resize policy.

use std::collections::VecDeque;

use crate::error::Error;
use crate::geometry::BoundingBox;
#[cfg(feature = "metrics")]
use crate::metrics::TreeMetrics;
use crate::particle::ParticleRef;
use crate::threads::ThreadPool;

use super::config::OctreeConfig;
use super::node::Node;

/// A dynamic loose octree which automatically branches and merges its nodes
/// as particles are inserted, removed, or move between updates.
///
/// The facade enforces the resize policy: the root may grow outward up to
/// `growth_limit` levels when an insert misses, and shrink back down up to
/// `shrink_limit` levels when the occupied region contracts. The `resized`
/// counter tracks the net number of resizes from the original bounds and
/// never leaves `[-shrink_limit, +growth_limit]`.
///
/// Tree mutations are not internally synchronised; callers sharing a tree
/// across threads serialise writes externally. Read-only traversal is safe
/// concurrently while no writer runs.
#[derive(Debug)]
pub struct Octree {
  root: Node,
  config: OctreeConfig,
  resized: i64,
  #[cfg(feature = "metrics")]
  metrics: TreeMetrics,
}

impl Octree {
  /// Create a tree over `bounds` with the given parameters.
  ///
  /// Fails with [`Error::InvalidArgument`] when any parameter is out of
  /// range.
  pub fn new(bounds: BoundingBox, config: OctreeConfig) -> Result<Self, Error> {
    config.validate()?;
    Ok(Self {
      root: Node::new(bounds),
      config,
      resized: 0,
      #[cfg(feature = "metrics")]
      metrics: TreeMetrics::default(),
    })
  }

  /// Create a tree over `bounds` with [`OctreeConfig::DEFAULT`].
  pub fn with_defaults(bounds: BoundingBox) -> Self {
    Self {
      root: Node::new(bounds),
      config: OctreeConfig::DEFAULT,
      resized: 0,
      #[cfg(feature = "metrics")]
      metrics: TreeMetrics::default(),
    }
  }

  /// The tree's parameters.
  pub fn config(&self) -> &OctreeConfig {
    &self.config
  }

  /// Read access to the root node.
  pub fn root(&self) -> &Node {
    &self.root
  }

  /// Current root bounds.
  pub fn bounds(&self) -> &BoundingBox {
    self.root.bounds()
  }

  /// Net number of resizes from the original bounds: positive when grown,
  /// negative when shrunk.
  pub fn resized(&self) -> i64 {
    self.resized
  }

  /// True when the tree holds no particles.
  pub fn is_empty(&self) -> bool {
    self.root.is_empty()
  }

  /// Number of particles in the tree.
  pub fn len(&self) -> usize {
    self.root.len()
  }

  /// Every particle handle in the tree.
  pub fn particles(&self) -> Vec<ParticleRef> {
    let mut particles = Vec::with_capacity(self.root.len());
    self.root.collect_particles(&mut particles);
    particles
  }

  /// Insert a particle, growing the root toward it if necessary.
  ///
  /// Returns `false` when the particle cannot be accommodated even at the
  /// growth limit; any growth performed for the attempt is then undone as
  /// far as the tree's structure allows.
  pub fn insert(&mut self, particle: &ParticleRef) -> bool {
    let OctreeConfig {
      looseness,
      min_width,
      capacity,
      ..
    } = self.config;

    if self.root.insert(particle, looseness, min_width, capacity) {
      return true;
    }

    let entry_bounds = *self.root.bounds();
    let entry_resized = self.resized;

    while self.resized < i64::from(self.config.growth_limit) {
      self.root.grow(particle.position(), looseness, min_width, capacity);
      self.resized += 1;
      #[cfg(feature = "metrics")]
      self.metrics.record_grow();

      if self.root.insert(particle, looseness, min_width, capacity) {
        return true;
      }
    }

    // Out of growth: restore the prior topology before reporting failure.
    // A grown leaf keeps no record of which octant it came from, so its
    // entry bounds are reinstated directly; a grown branch collapses back
    // through its single occupied octant per shrink.
    if self.root.is_leaf() {
      self.root.set_bounds(entry_bounds);
      self.resized = entry_resized;
    } else {
      self.shrink_while_possible();
    }

    false
  }

  /// Remove a particle by identity, opportunistically shrinking the root.
  pub fn remove(&mut self, particle: &ParticleRef) -> bool {
    if !self.root.remove(particle, self.config.capacity) {
      return false;
    }

    self.shrink_while_possible();

    true
  }

  /// Re-settle particles whose bounds changed since insertion.
  ///
  /// Particles that no longer fit are re-inserted (growing the root when
  /// needed); whatever still does not fit is returned to the caller.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "octree::update"))]
  pub fn update(&mut self) -> Vec<ParticleRef> {
    #[cfg(feature = "metrics")]
    let start = web_time::Instant::now();

    let OctreeConfig {
      looseness,
      min_width,
      capacity,
      ..
    } = self.config;

    let removed = self.root.update(looseness, min_width, capacity);
    let unhoused = self.reinsert_removed(removed);

    #[cfg(feature = "metrics")]
    self.metrics.record_update_timing(start.elapsed().as_micros() as u64);

    unhoused
  }

  /// Like [`Octree::update`], processing the root's subtrees on the given
  /// pool. Subtrees are disjoint, so one task per child needs no
  /// synchronisation; the re-insertion phase stays serial.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "octree::update_with"))]
  pub fn update_with(&mut self, pool: Option<&ThreadPool>) -> Vec<ParticleRef> {
    let Some(pool) = pool else {
      return self.update();
    };
    if self.root.is_leaf() {
      return self.update();
    }

    #[cfg(feature = "metrics")]
    let start = web_time::Instant::now();

    let OctreeConfig {
      looseness,
      min_width,
      capacity,
      ..
    } = self.config;

    let handles: Vec<_> = self
      .root
      .take_children()
      .into_iter()
      .map(|mut child| {
        pool.submit(move || {
          let mut removed = VecDeque::new();
          child.update_into(&mut removed, looseness, min_width, capacity);
          (child, removed)
        })
      })
      .collect();

    let mut children = Vec::with_capacity(handles.len());
    let mut removed = VecDeque::new();
    for handle in handles {
      let (child, child_removed) = handle
        .join()
        .unwrap_or_else(|error| panic!("worker failed during octree update: {error}"));
      children.push(child);
      removed.extend(child_removed);
    }

    self.root.put_children(children);
    self.root.settle(&mut removed, looseness, min_width, capacity);
    let unhoused = self.reinsert_removed(removed.into_iter().collect());

    #[cfg(feature = "metrics")]
    self.metrics.record_update_timing(start.elapsed().as_micros() as u64);

    unhoused
  }

  /// True if the tree's (loose) bounds wholly contain `bounds`.
  pub fn contains(&self, bounds: &BoundingBox) -> bool {
    self.root.bounds().contains(bounds, self.config.looseness)
  }

  /// True if any particle in the tree intersects `bounds`.
  pub fn is_colliding(&self, bounds: &BoundingBox) -> bool {
    self.root.is_colliding(bounds, self.config.looseness)
  }

  /// Every particle in the tree intersecting `bounds`.
  pub fn colliding(&self, bounds: &BoundingBox) -> Vec<ParticleRef> {
    let mut hits = Vec::new();
    self.root.colliding(bounds, &mut hits, self.config.looseness);
    hits
  }

  /// Tree metrics recorded so far.
  #[cfg(feature = "metrics")]
  pub fn metrics(&self) -> &TreeMetrics {
    &self.metrics
  }

  /// Try to re-insert updated particles; growing is allowed, so an insert
  /// failure here means the growth limit is exhausted for that particle.
  fn reinsert_removed(&mut self, removed: Vec<ParticleRef>) -> Vec<ParticleRef> {
    let mut unhoused = removed;
    unhoused.retain(|particle| !self.insert(particle));
    unhoused
  }

  fn shrink_while_possible(&mut self) {
    while self.resized > -i64::from(self.config.shrink_limit) && self.root.shrink() {
      self.resized -= 1;
      #[cfg(feature = "metrics")]
      self.metrics.record_shrink();
    }
  }
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
