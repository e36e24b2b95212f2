//! Solver bounds and the behaviour of the string-keyed [`Converter`](crate::Converter).

use crate::ellipsoid::EllipsoidId;
use crate::error::{Error, Result, Solver};
use crate::helmert::TransformationId;
use crate::projection::ProjectionId;
use log::{debug, trace, warn};
use std::fmt::Display;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stopping rules for the two fixed-point iterations.
///
/// Both iterations converge in well under ten steps for any point inside a grid's extent, so
/// hitting `max_iterations` means the input is far outside the projection's valid zone.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct Convergence {
    pub max_iterations: usize,
    /// Stop the meridional arc iteration once `|N − N0 − M|` is below this many metres.
    pub arc_tolerance: f64,
    /// Stop the cartesian latitude iteration once successive estimates differ by less than this
    /// many radians.
    pub latitude_tolerance: f64,
}

impl Convergence {
    pub const DEFAULT: Self = Self {
        max_iterations: 100,
        arc_tolerance: 1e-4,
        latitude_tolerance: 1e-10,
    };
}

impl Convergence {
    /// Drives `estimates` (each an estimate paired with its residual) until the residual's
    /// magnitude drops below `tolerance`, giving up after `max_iterations` estimates.
    pub(crate) fn solve<I>(&self, solver: Solver, tolerance: f64, estimates: I) -> Result<f64>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut residual = f64::NAN;
        for (i, (estimate, r)) in estimates.into_iter().take(self.max_iterations).enumerate() {
            trace!("{solver} iteration {i}: estimate {estimate}, residual {r:e}");
            residual = r;
            if r.abs() < tolerance {
                debug!("{solver} solver converged after {} iterations", i + 1);
                return Ok(estimate);
            }
        }
        Err(Error::ConvergenceFailure {
            solver,
            iterations: self.max_iterations,
            residual: residual.abs(),
        })
    }
}

impl Default for Convergence {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What to do with a registry key that names nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UnknownKeyPolicy {
    /// Fail with [`Error::UnknownParameterSet`].
    #[default]
    Reject,
    /// Substitute the configured default and log a warning.
    FallBackToDefault,
}

/// Configuration for a [`Converter`](crate::Converter).
///
/// Every field has a default, so a configuration file only needs to name what it changes:
///
/// ```
/// # #[cfg(feature = "serde")] {
/// use osgrid::{ProjectionId, Settings, UnknownKeyPolicy};
///
/// let settings: Settings = serde_yaml::from_str(
///     "unknown_keys: fall_back_to_default\ndefault_projection: irish_national_grid\n",
/// ).unwrap();
/// assert_eq!(settings.unknown_keys, UnknownKeyPolicy::FallBackToDefault);
/// assert_eq!(settings.default_projection, ProjectionId::IrishNationalGrid);
/// assert_eq!(settings.convergence.max_iterations, 100);
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct Settings {
    pub convergence: Convergence,
    pub unknown_keys: UnknownKeyPolicy,
    /// Used when no projection is named.
    pub default_projection: ProjectionId,
    /// Used when no ellipsoid is named.
    pub default_ellipsoid: EllipsoidId,
    /// Used when no transformation is named.
    pub default_transformation: TransformationId,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            convergence: Convergence::DEFAULT,
            unknown_keys: UnknownKeyPolicy::Reject,
            default_projection: ProjectionId::NationalGrid,
            default_ellipsoid: EllipsoidId::Airy1830,
            default_transformation: TransformationId::Etrs89ToOsgb36,
        }
    }
}

impl Settings {
    /// Looks `key` up in the registry of `T`, using `default` when there is no key.
    pub(crate) fn resolve<T>(&self, key: Option<&str>, default: T) -> Result<T>
    where
        T: FromStr<Err = Error> + Display + Copy,
    {
        let Some(key) = key else {
            return Ok(default);
        };
        match (key.parse::<T>(), self.unknown_keys) {
            (Ok(id), _) => Ok(id),
            (Err(e), UnknownKeyPolicy::Reject) => Err(e),
            (Err(e), UnknownKeyPolicy::FallBackToDefault) => {
                warn!("{e}; falling back to {default}");
                Ok(default)
            }
        }
    }
}
