use crate::core::flocking::grid_size;
use crate::error::{Error, Result};

/// Parameters of a flocking run.
///
/// - `side_length`: domain side `L` (> 0)
/// - `cutoff`: interaction radius `rc` (> 0, <= L); the grid uses `M = floor(L / rc)`
/// - `disturbance`: noise amplitude; headings receive noise in `[-d/2, d/2)`
/// - `strict_geometry`: fail a tick when `L/M > rc + r_i + r_j` does not hold, instead of
///   only logging a warning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockParams {
    pub side_length: f64,
    pub cutoff: f64,
    pub disturbance: f64,
    pub strict_geometry: bool,
}

impl FlockParams {
    /// Build and validate a parameter set (lenient geometry checking).
    pub fn new(side_length: f64, cutoff: f64, disturbance: f64) -> Result<Self> {
        let params = Self {
            side_length,
            cutoff,
            disturbance,
            strict_geometry: false,
        };
        params.validate()?;
        Ok(params)
    }

    /// Same parameters with strict geometry checking toggled.
    pub fn with_strict_geometry(mut self, strict: bool) -> Self {
        self.strict_geometry = strict;
        self
    }

    /// Check every field.
    ///
    /// Errors:
    /// - `Error::InvalidGridGeometry` for an unusable `side_length`/`cutoff` combination.
    /// - `Error::InvalidParam` for a negative or non-finite `disturbance`.
    pub fn validate(&self) -> Result<()> {
        grid_size(self.side_length, self.cutoff)?;
        if !self.disturbance.is_finite() || self.disturbance < 0.0 {
            return Err(Error::InvalidParam(format!(
                "disturbance must be finite and >= 0, got {}",
                self.disturbance
            )));
        }
        Ok(())
    }

    /// Cells per side, `floor(L / rc)`.
    pub fn grid_size(&self) -> Result<usize> {
        grid_size(self.side_length, self.cutoff)
    }

    /// Particle density for `n` particles.
    pub fn density(&self, n: usize) -> f64 {
        n as f64 / (self.side_length * self.side_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_params() -> Result<()> {
        let p = FlockParams::new(25.0, 1.0, 0.1)?;
        assert_eq!(p.grid_size()?, 25);
        assert!(!p.strict_geometry);
        assert!(p.with_strict_geometry(true).strict_geometry);
        assert!((p.density(625) - 1.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn invalid_params_rejected() {
        assert!(matches!(
            FlockParams::new(0.0, 1.0, 0.1),
            Err(Error::InvalidGridGeometry(_))
        ));
        assert!(matches!(
            FlockParams::new(5.0, 0.0, 0.1),
            Err(Error::InvalidGridGeometry(_))
        ));
        assert!(matches!(
            FlockParams::new(5.0, 1.0, -0.1),
            Err(Error::InvalidParam(_))
        ));
        assert!(FlockParams::new(5.0, 1.0, f64::NAN).is_err());
    }
}
