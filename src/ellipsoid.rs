//! Reference ellipsoids of revolution and the registry of the named ones.

use crate::error::{finite, Error, Result};
use crate::float_math::{sqrt, Trig};
use uom::si::f64::{Angle, Length};
use uom::si::{angle::radian, length::meter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ellipsoid of revolution given by its semi-major (equatorial) and semi-minor (polar) axes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "EllipsoidAxes"))]
pub struct Ellipsoid {
    #[doc(alias = "a")]
    semi_major_axis: f64,
    #[doc(alias = "b")]
    semi_minor_axis: f64,
}

impl Ellipsoid {
    /// Constructs an ellipsoid, requiring `a > b > 0`.
    pub fn new(semi_major_axis: impl Into<Length>, semi_minor_axis: impl Into<Length>) -> Result<Self> {
        let a = finite("semi-major axis", semi_major_axis.into().get::<meter>())?;
        let b = finite("semi-minor axis", semi_minor_axis.into().get::<meter>())?;
        if b <= 0. {
            return Err(Error::InvalidInput {
                quantity: "semi-minor axis",
                value: b,
                reason: "must be positive",
            });
        }
        if a <= b {
            return Err(Error::InvalidInput {
                quantity: "semi-major axis",
                value: a,
                reason: "must exceed the semi-minor axis",
            });
        }
        Ok(Self::from_axes(a, b))
    }

    /// Registry entries are known to satisfy `a > b > 0`.
    pub(crate) const fn from_axes(a: f64, b: f64) -> Self {
        Self {
            semi_major_axis: a,
            semi_minor_axis: b,
        }
    }

    #[must_use]
    pub fn semi_major_axis(&self) -> Length {
        Length::new::<meter>(self.semi_major_axis)
    }

    #[must_use]
    pub fn semi_minor_axis(&self) -> Length {
        Length::new::<meter>(self.semi_minor_axis)
    }

    pub(crate) fn a(&self) -> f64 {
        self.semi_major_axis
    }

    pub(crate) fn b(&self) -> f64 {
        self.semi_minor_axis
    }

    /// `e² = (a² − b²) / a²`
    #[doc(alias = "e2")]
    #[must_use]
    pub fn eccentricity_squared(&self) -> f64 {
        let a2 = self.a() * self.a();
        (a2 - self.b() * self.b()) / a2
    }

    /// `n = (a − b) / (a + b)`, the expansion parameter of the meridional arc series.
    #[must_use]
    pub fn third_flattening(&self) -> f64 {
        (self.a() - self.b()) / (self.a() + self.b())
    }

    /// The radius of curvature in the prime vertical, ν, at `latitude`.
    #[doc(alias = "nu")]
    #[must_use]
    pub fn prime_vertical_radius(&self, latitude: Angle) -> Length {
        Length::new::<meter>(self.nu(latitude.get::<radian>()))
    }

    pub(crate) fn nu(&self, latitude: f64) -> f64 {
        self.a() / sqrt(1. - self.eccentricity_squared() * latitude.sin2())
    }
}

/// The serialised form of [`Ellipsoid`], checked by [`Ellipsoid::new`] on the way in.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct EllipsoidAxes {
    semi_major_axis: Length,
    semi_minor_axis: Length,
}

#[cfg(feature = "serde")]
impl TryFrom<EllipsoidAxes> for Ellipsoid {
    type Error = Error;

    fn try_from(axes: EllipsoidAxes) -> Result<Self> {
        Self::new(axes.semi_major_axis, axes.semi_minor_axis)
    }
}

registry! {
    /// The named reference ellipsoids.
    pub enum EllipsoidId in Ellipsoid {
        /// Airy 1830, the ellipsoid of the OSGB36 datum.
        Airy1830 = "airy1830",
        /// Airy 1830 modified, the ellipsoid of the Ireland 1965 datum.
        Airy1830Modified = "airy1830_modified",
        /// GRS80, the ellipsoid of ETRS89.
        Grs80 = "grs80",
        /// WGS84, within a tenth of a millimetre of GRS80.
        Wgs84 = "wgs84",
    }
}

impl EllipsoidId {
    #[must_use]
    pub const fn ellipsoid(self) -> Ellipsoid {
        match self {
            EllipsoidId::Airy1830 => Ellipsoid::from_axes(6_377_563.396, 6_356_256.909),
            EllipsoidId::Airy1830Modified => Ellipsoid::from_axes(6_377_340.189, 6_356_034.447),
            EllipsoidId::Grs80 => Ellipsoid::from_axes(6_378_137.000, 6_356_752.3141),
            EllipsoidId::Wgs84 => Ellipsoid::from_axes(6_378_137.000, 6_356_752.314_245),
        }
    }
}

impl From<EllipsoidId> for Ellipsoid {
    fn from(id: EllipsoidId) -> Self {
        id.ellipsoid()
    }
}
