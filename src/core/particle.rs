use crate::error::{Error, Result};
use std::hash::{Hash, Hasher};

/// Fixed spatial dimension (2D).
pub const DIM: usize = 2;

/// A circular particle of the off-lattice automaton.
///
/// Fields:
/// - `id`: stable identifier, assigned once by whoever creates the particle
/// - `r`: position vector [x, y]
/// - `radius`: disk radius (>= 0)
/// - `orientation`: heading in radians (not normalized)
/// - `speed`: displacement per tick along the heading
///
/// Equality and hashing look at `id` only, so a particle keeps its identity in maps and sets
/// while its position and heading change from tick to tick.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    /// Stable particle identifier.
    pub id: u32,
    /// Position (x, y).
    pub r: [f64; DIM],
    /// Disk radius (>= 0).
    pub radius: f64,
    /// Heading in radians.
    pub orientation: f64,
    /// Displacement per tick.
    pub speed: f64,
}

impl Particle {
    /// Create a new particle after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `radius` is negative or any field is NaN/inf.
    pub fn new(id: u32, r: [f64; DIM], radius: f64, orientation: f64, speed: f64) -> Result<Self> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(Error::InvalidParam(
                "radius must be finite and >= 0".into(),
            ));
        }
        if !r.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !orientation.is_finite() {
            return Err(Error::InvalidParam("orientation must be finite".into()));
        }
        if !speed.is_finite() {
            return Err(Error::InvalidParam("speed must be finite".into()));
        }
        Ok(Self {
            id,
            r,
            radius,
            orientation,
            speed,
        })
    }

    /// A motionless particle at `(x, y)`, handy for pure neighbor queries.
    pub fn at(id: u32, x: f64, y: f64, radius: f64) -> Result<Self> {
        Self::new(id, [x, y], radius, 0.0, 0.0)
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.r[0]
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.r[1]
    }

    /// Unit heading vector (cos θ, sin θ).
    #[inline]
    pub fn heading(&self) -> [f64; DIM] {
        let (s, c) = self.orientation.sin_cos();
        [c, s]
    }

    /// The same particle (same id, radius and speed) at a new position and heading.
    #[inline]
    pub fn advanced(&self, r: [f64; DIM], orientation: f64) -> Self {
        Self {
            r,
            orientation,
            ..*self
        }
    }
}

impl PartialEq for Particle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Particle {}

impl Hash for Particle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn new_particle_ok() -> Result<()> {
        let p = Particle::new(1, [0.5, 1.0], 0.25, 1.0, 0.03)?;
        assert_eq!(p.id, 1);
        assert_eq!(p.r, [0.5, 1.0]);
        assert_eq!(p.x(), 0.5);
        assert_eq!(p.y(), 1.0);
        assert_eq!(p.radius, 0.25);
        assert_eq!(p.orientation, 1.0);
        assert_eq!(p.speed, 0.03);
        Ok(())
    }

    #[test]
    fn zero_radius_is_allowed() -> Result<()> {
        let p = Particle::at(3, 1.0, 1.0, 0.0)?;
        assert_eq!(p.radius, 0.0);
        Ok(())
    }

    #[test]
    fn invalid_radius_rejected() {
        let err = Particle::new(0, [0.0, 0.0], -0.1, 0.0, 0.0).unwrap_err();
        assert!(err.to_string().contains("radius"));
    }

    #[test]
    fn non_finite_fields_rejected() {
        assert!(Particle::new(0, [f64::NAN, 0.0], 0.0, 0.0, 0.0).is_err());
        assert!(Particle::new(0, [0.0, 0.0], 0.0, f64::INFINITY, 0.0).is_err());
        let err = Particle::new(0, [0.0, 0.0], 0.0, 0.0, f64::NAN).unwrap_err();
        assert!(err.to_string().contains("speed"));
    }

    #[test]
    fn identity_ignores_geometry() -> Result<()> {
        let a = Particle::new(9, [1.0, 1.0], 0.5, 0.0, 1.0)?;
        let moved = a.advanced([2.0, 3.0], 1.5);
        assert_eq!(a, moved);
        assert_eq!(moved.radius, 0.5);
        assert_eq!(moved.speed, 1.0);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(moved));
        assert_eq!(set.len(), 1);

        let other = Particle::new(10, [1.0, 1.0], 0.5, 0.0, 1.0)?;
        assert_ne!(a, other);
        Ok(())
    }

    #[test]
    fn heading_is_unit_vector() -> Result<()> {
        let p = Particle::new(0, [0.0, 0.0], 0.0, std::f64::consts::FRAC_PI_2, 1.0)?;
        let h = p.heading();
        assert!(h[0].abs() < 1e-12);
        assert!((h[1] - 1.0).abs() < 1e-12);
        Ok(())
    }
}
