//! Pairwise force laws.
//!
//! A force law is the one collaborator the Barnes-Hut evaluator calls out
//! to. Sources arrive already reduced to a [`PointMass`] - a direct particle
//! and an approximated subtree look the same from here.

use crate::geometry::Vector;
use crate::mass::PointMass;

/// Additive two-body acceleration contract.
///
/// Implementations add the acceleration experienced at `subject` due to
/// `source` into the accumulator. Constants of the law (gravitational
/// constant, softening length) belong to the implementation.
pub trait Field: Send + Sync {
  /// Add to `acceleration` the acceleration at `subject` due to `source`.
  fn add_acceleration(&self, source: &PointMass, subject: Vector, acceleration: &mut Vector);

  /// The bare contribution of one interaction.
  fn acceleration(&self, source: &PointMass, subject: Vector) -> Vector {
    let mut acceleration = Vector::ZERO;
    self.add_acceleration(source, subject, &mut acceleration);
    acceleration
  }
}

/// Newton's law of universal gravitation: `a = -G m r / |r|^3` with
/// `r = subject - source`, attracting the subject toward the source.
///
/// Coincident pairs contribute nothing; this also keeps a subtree's
/// multipole from acting on a query particle that *is* that subtree.
#[derive(Clone, Copy, Debug)]
pub struct Newtonian {
  pub g: f64,
}

impl Newtonian {
  pub fn new(g: f64) -> Self {
    Self { g }
  }
}

impl Field for Newtonian {
  fn add_acceleration(&self, source: &PointMass, subject: Vector, acceleration: &mut Vector) {
    let r = subject - source.displacement;
    let distance_squared = r.length_squared();
    if distance_squared == 0.0 {
      return;
    }
    *acceleration += -self.g * source.mass * r / distance_squared.powf(1.5);
  }
}

/// Plummer-softened gravity: `a = -G m r / (|r|^2 + eps^2)^(3/2)`.
///
/// The softening length caps the force between close pairs, avoiding the
/// Newtonian singularity during tight encounters.
#[derive(Clone, Copy, Debug)]
pub struct Plummer {
  pub g: f64,
  pub epsilon: f64,
}

impl Plummer {
  pub fn new(g: f64, epsilon: f64) -> Self {
    Self { g, epsilon }
  }
}

impl Field for Plummer {
  fn add_acceleration(&self, source: &PointMass, subject: Vector, acceleration: &mut Vector) {
    let r = subject - source.displacement;
    let softened = r.length_squared() + self.epsilon * self.epsilon;
    if softened == 0.0 {
      return;
    }
    *acceleration += -self.g * source.mass * r / softened.powf(1.5);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn source(mass: f64, position: [f64; 3]) -> PointMass {
    PointMass {
      mass,
      displacement: Vector::from_array(position),
    }
  }

  #[test]
  fn test_newtonian_attracts_toward_source() {
    let field = Newtonian::new(1.0);
    let acceleration = field.acceleration(&source(2.0, [10.0, 0.0, 0.0]), Vector::ZERO);

    assert!(acceleration.x > 0.0, "subject must accelerate toward the source");
    assert!((acceleration.x - 2.0 / 100.0).abs() < 1e-12);
    assert_eq!(acceleration.y, 0.0);
    assert_eq!(acceleration.z, 0.0);
  }

  #[test]
  fn test_newtonian_inverse_square_falloff() {
    let field = Newtonian::new(1.0);
    let near = field.acceleration(&source(1.0, [1.0, 0.0, 0.0]), Vector::ZERO);
    let far = field.acceleration(&source(1.0, [2.0, 0.0, 0.0]), Vector::ZERO);

    assert!((near.length() / far.length() - 4.0).abs() < 1e-9);
  }

  #[test]
  fn test_newtonian_skips_coincident_pair() {
    let field = Newtonian::new(1.0);
    let acceleration = field.acceleration(&source(5.0, [1.0, 2.0, 3.0]), Vector::new(1.0, 2.0, 3.0));
    assert_eq!(acceleration, Vector::ZERO);
  }

  #[test]
  fn test_accumulation_is_additive() {
    let field = Newtonian::new(1.0);
    let mut acceleration = Vector::ZERO;
    field.add_acceleration(&source(1.0, [10.0, 0.0, 0.0]), Vector::ZERO, &mut acceleration);
    field.add_acceleration(&source(1.0, [-10.0, 0.0, 0.0]), Vector::ZERO, &mut acceleration);

    assert!(acceleration.length() < 1e-15, "opposed sources must cancel");
  }

  #[test]
  fn test_plummer_softening_caps_close_encounters() {
    let newtonian = Newtonian::new(1.0);
    let plummer = Plummer::new(1.0, 0.5);
    let close = source(1.0, [1e-3, 0.0, 0.0]);

    let hard = newtonian.acceleration(&close, Vector::ZERO);
    let soft = plummer.acceleration(&close, Vector::ZERO);

    assert!(soft.length() < hard.length());
    assert!(soft.length() < 1.0 / (0.5_f64.powi(3)) * 1e-2);
  }

  #[test]
  fn test_plummer_approaches_newtonian_at_distance() {
    let newtonian = Newtonian::new(1.0);
    let plummer = Plummer::new(1.0, 0.01);
    let distant = source(3.0, [50.0, 0.0, 0.0]);

    let hard = newtonian.acceleration(&distant, Vector::ZERO);
    let soft = plummer.acceleration(&distant, Vector::ZERO);

    assert!((hard - soft).length() / hard.length() < 1e-6);
  }
}
