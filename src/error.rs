use std::fmt;
use thiserror::Error;

/// The registry a string key was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Registry {
    Ellipsoid,
    Projection,
    Transformation,
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Registry::Ellipsoid => "ellipsoid",
            Registry::Projection => "projection",
            Registry::Transformation => "transformation",
        })
    }
}

/// The fixed-point iterations that can fail to converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Solver {
    /// Footpoint latitude from the meridional arc, used by the inverse projection.
    MeridionalArc,
    /// Geodetic latitude from earth-centred cartesian coordinates.
    CartesianLatitude,
}

impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Solver::MeridionalArc => "meridional arc",
            Solver::CartesianLatitude => "cartesian latitude",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid {quantity} {value}: {reason}")]
    InvalidInput {
        quantity: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("unknown {registry} parameter set {key:?}")]
    UnknownParameterSet { registry: Registry, key: String },

    #[error("{solver} solver did not converge within {iterations} iterations (last residual {residual:e})")]
    ConvergenceFailure {
        solver: Solver,
        iterations: usize,
        residual: f64,
    },

    #[error("degenerate input: {0}")]
    DegenerateInput(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Rejects NaN and infinities at the boundary so they never reach the solvers.
pub(crate) fn finite(quantity: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidInput {
            quantity,
            value,
            reason: "must be finite",
        })
    }
}
