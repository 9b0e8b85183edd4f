use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the neighbor search and the flocking automaton.
///
/// Each variant carries enough context to tell the caller which input was rejected.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Non-positive side length, non-positive cell count or negative cutoff.
    #[error("invalid grid geometry: {0}")]
    InvalidGridGeometry(String),

    /// The cell side does not exceed `rc + r_i + r_j` for the pair of particles `ids`.
    #[error(
        "geometry precondition violated for particles {ids:?}: cell side {cell_side} must exceed {required}"
    )]
    GeometryPreconditionViolation {
        ids: (u32, u32),
        cell_side: f64,
        required: f64,
    },

    /// A particle whose position maps outside the grid.
    #[error("particle {id} at ({x}, {y}) is outside the domain")]
    OutOfDomainParticle { id: u32, x: f64, y: f64 },

    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_informative() {
        let e = Error::InvalidParam("radius must be >= 0".to_string());
        let msg = format!("{e}");
        assert!(msg.contains("invalid parameter"));
        assert!(msg.contains("radius"));
    }

    #[test]
    fn out_of_domain_names_particle() {
        let e = Error::OutOfDomainParticle {
            id: 7,
            x: -1.0,
            y: 2.0,
        };
        let msg = e.to_string();
        assert!(msg.contains("particle 7"));
        assert!(msg.contains("outside the domain"));
    }

    #[test]
    fn precondition_violation_reports_pair() {
        let e = Error::GeometryPreconditionViolation {
            ids: (1, 2),
            cell_side: 1.0,
            required: 2.5,
        };
        let msg = e.to_string();
        assert!(msg.contains("(1, 2)"));
        assert!(msg.contains("2.5"));
    }

    #[test]
    fn result_type_alias_compiles() -> Result<()> {
        Ok(())
    }
}
