//! Distance predicates and domain checks shared by the neighbor finders and the automaton.

use crate::core::particle::{Particle, DIM};
use crate::error::{Error, Result};

/// Gap between two disks: center distance minus both radii.
///
/// Negative when the disks overlap.
#[inline]
pub fn distance(a: &Particle, b: &Particle) -> f64 {
    periodic_distance(a, b, [0.0, 0.0])
}

/// Gap between `a` and the periodic image of `b` translated by `offset`.
///
/// Only the distance sees the translated coordinates; `b` itself is left untouched.
#[inline]
pub fn periodic_distance(a: &Particle, b: &Particle, offset: [f64; DIM]) -> f64 {
    let dx = b.r[0] + offset[0] - a.r[0];
    let dy = b.r[1] + offset[1] - a.r[1];
    dx.hypot(dy) - a.radius - b.radius
}

/// Collision predicate used by every neighbor finder (boundary inclusive).
#[inline]
pub(crate) fn within_cutoff(gap: f64, rc: f64) -> bool {
    gap <= rc
}

/// Reject grid parameters that make the cell matrix meaningless.
pub fn validate_grid_params(l: f64, m: usize, rc: f64) -> Result<()> {
    if !l.is_finite() || l <= 0.0 {
        return Err(Error::InvalidGridGeometry(format!(
            "side length L must be finite and > 0, got {l}"
        )));
    }
    if m == 0 {
        return Err(Error::InvalidGridGeometry(
            "cell count M must be > 0".into(),
        ));
    }
    if !rc.is_finite() || rc < 0.0 {
        return Err(Error::InvalidGridGeometry(format!(
            "cutoff rc must be finite and >= 0, got {rc}"
        )));
    }
    Ok(())
}

/// Returns `true` when `L/M > rc + r_i + r_j` holds for every pair of particles.
///
/// This is the condition under which the Cell Index Method only needs to look at adjacent
/// cells. Invalid grid parameters yield `false`.
pub fn validate_geometry(l: f64, m: usize, rc: f64, particles: &[Particle]) -> bool {
    check_geometry(l, m, rc, particles).is_ok()
}

/// Like [`validate_geometry`], but reports which pair breaks the condition.
///
/// The worst pair is always the one holding the two largest radii, so a single pass suffices.
pub fn check_geometry(l: f64, m: usize, rc: f64, particles: &[Particle]) -> Result<()> {
    validate_grid_params(l, m, rc)?;
    let Some((a, b)) = two_largest(particles) else {
        return Ok(());
    };
    let cell_side = l / m as f64;
    let required = rc + a.radius + b.radius;
    if cell_side > required {
        Ok(())
    } else {
        Err(Error::GeometryPreconditionViolation {
            ids: (a.id, b.id),
            cell_side,
            required,
        })
    }
}

fn two_largest(particles: &[Particle]) -> Option<(&Particle, &Particle)> {
    let mut first: Option<&Particle> = None;
    let mut second: Option<&Particle> = None;
    for p in particles {
        match first {
            Some(f) if p.radius <= f.radius => {
                if second.is_none_or(|s| p.radius > s.radius) {
                    second = Some(p);
                }
            }
            _ => {
                second = first;
                first = Some(p);
            }
        }
    }
    first.zip(second)
}

/// Wrap a coordinate into `[0, l)` by repeatedly adding or subtracting `l`.
///
/// Errors:
/// - `Error::InvalidParam` if `v` is not finite (the loop would never settle).
/// - `Error::InvalidGridGeometry` if `l` is not finite and > 0.
pub fn wrap_coordinate(mut v: f64, l: f64) -> Result<f64> {
    if !l.is_finite() || l <= 0.0 {
        return Err(Error::InvalidGridGeometry(format!(
            "side length L must be finite and > 0, got {l}"
        )));
    }
    if !v.is_finite() {
        return Err(Error::InvalidParam(format!(
            "cannot wrap non-finite coordinate {v}"
        )));
    }
    loop {
        if v >= l {
            v -= l;
        } else if v < 0.0 {
            v += l;
        } else {
            return Ok(v);
        }
    }
}
