//! Concurrent memoised computation of subtree mass and centre of mass.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, RwLock};

use crate::geometry::Vector;
use crate::octree::Node;

/// Total mass and mass-weighted centroid of a subtree.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointMass {
  pub mass: f64,
  pub displacement: Vector,
}

/// Cache key: the node's address.
///
/// Addresses are stable exactly as long as the tree is structurally
/// unchanged, which is the only window a cache is allowed to live across;
/// any mutation of the tree must be paired with [`MassCalculator::clear`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
struct NodeKey(usize);

impl NodeKey {
  fn of(node: &Node) -> Self {
    Self(node as *const Node as usize)
  }
}

/// One cache slot. The slot is created empty by the winning thread and
/// filled exactly once; waiters block on the condvar until the result lands.
#[derive(Default)]
struct CacheEntry {
  result: Mutex<Option<PointMass>>,
  ready: Condvar,
}

impl CacheEntry {
  fn wait(&self) -> PointMass {
    let mut result = self.result.lock().unwrap();
    loop {
      if let Some(point_mass) = *result {
        return point_mass;
      }
      result = self.ready.wait(result).unwrap();
    }
  }

  fn fill(&self, point_mass: PointMass) {
    *self.result.lock().unwrap() = Some(point_mass);
    self.ready.notify_all();
  }
}

/// Thread-safe memoised mass calculator.
///
/// `calculate` performs at most one physical computation per distinct node
/// identity per cache lifetime, no matter how many threads ask. The map
/// itself sits behind a reader-writer lock so concurrent lookups do not
/// serialise; each entry carries its own mutex and condvar so threads that
/// lose the insertion race block only on the entry they need.
///
/// Entries are shared `Arc`s: a thread parked on an entry is unaffected by a
/// concurrent `clear`, it still receives the winner's result.
#[derive(Default)]
pub struct MassCalculator {
  cache: RwLock<HashMap<NodeKey, Arc<CacheEntry>>>,
  calculations: AtomicU64,
}

impl MassCalculator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Total mass and centre of mass of `node`'s subtree.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "mass::calculate"))]
  pub fn calculate(&self, node: &Node) -> PointMass {
    let key = NodeKey::of(node);

    // Fast path: the entry already exists, wait on it (usually it is
    // already filled and the wait is a single lock round-trip).
    if let Some(entry) = self.cache.read().unwrap().get(&key).cloned() {
      return entry.wait();
    }

    // Slow path: race to create the entry. Whoever inserts it computes;
    // everyone else waits on the same slot.
    let (entry, winner) = {
      let mut cache = self.cache.write().unwrap();
      match cache.entry(key) {
        Entry::Occupied(occupied) => (Arc::clone(occupied.get()), false),
        Entry::Vacant(vacant) => (Arc::clone(vacant.insert(Arc::default())), true),
      }
    };

    if !winner {
      return entry.wait();
    }

    // No locks are held during the recursion, so child lookups run the
    // same protocol without contention on this entry.
    self.calculations.fetch_add(1, Ordering::Relaxed);
    let point_mass = self.compute(node);
    entry.fill(point_mass);
    point_mass
  }

  /// Drop every cached entry.
  pub fn clear(&self) {
    self.cache.write().unwrap().clear();
  }

  /// Drop the entry for one node, leaving its descendants cached.
  pub fn clear_node(&self, node: &Node) {
    self.cache.write().unwrap().remove(&NodeKey::of(node));
  }

  /// Number of physical (non-memoised) computations performed so far.
  pub fn calculation_count(&self) -> u64 {
    self.calculations.load(Ordering::Relaxed)
  }

  fn compute(&self, node: &Node) -> PointMass {
    let mut point_mass = PointMass::default();

    for child in node.children() {
      let child_mass = self.calculate(child);
      point_mass.mass += child_mass.mass;
      point_mass.displacement += child_mass.mass * child_mass.displacement;
    }

    for particle in node.particles() {
      let particle = particle.read();
      point_mass.mass += particle.mass;
      point_mass.displacement += particle.mass * particle.position();
    }

    if point_mass.mass != 0.0 {
      point_mass.displacement /= point_mass.mass;
    }

    point_mass
  }
}

#[cfg(test)]
#[path = "mass_test.rs"]
mod mass_test;
