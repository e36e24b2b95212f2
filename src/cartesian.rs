use crate::error::{finite, Error, Result};
use crate::Point3;
use std::fmt;
use std::fmt::{Display, Formatter};
use uom::si::f64::Length;
use uom::si::length::meter;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An earth-centred, earth-fixed cartesian position.
///
/// Positive X points from the centre of the reference ellipsoid through the intersection of
/// the equator and the prime meridian, positive Z through the north pole, and Y completes the
/// right-handed system. The values only mean something alongside the ellipsoid (and datum) they
/// were computed for: converting the same point back through a different ellipsoid gives a
/// different latitude, longitude, and height.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
// serialised as a bare [x, y, z]
#[cfg_attr(feature = "serde", serde(into = "Point3", try_from = "Point3"))]
pub struct CartesianPoint {
    /// X, Y, Z in meters
    pub(crate) point: Point3,
}

impl CartesianPoint {
    pub(crate) fn from_nalgebra_point(point: Point3) -> Self {
        Self { point }
    }

    /// Constructs a point from its (x, y, z) components.
    ///
    /// Fails with [`Error::InvalidInput`](crate::Error::InvalidInput) if any component is NaN or
    /// infinite.
    pub fn new(x: impl Into<Length>, y: impl Into<Length>, z: impl Into<Length>) -> Result<Self> {
        Ok(Self::from_nalgebra_point(Point3::new(
            finite("x", x.into().get::<meter>())?,
            finite("y", y.into().get::<meter>())?,
            finite("z", z.into().get::<meter>())?,
        )))
    }

    #[must_use]
    pub fn x(&self) -> Length {
        Length::new::<meter>(self.point.x)
    }

    #[must_use]
    pub fn y(&self) -> Length {
        Length::new::<meter>(self.point.y)
    }

    #[must_use]
    pub fn z(&self) -> Length {
        Length::new::<meter>(self.point.z)
    }

    /// Returns the (x, y, z) components.
    ///
    /// To turn this into a simple (ie, unitless) `[f64; 3]`, use [`array::map`] combined with
    /// [`Length::get`]:
    ///
    /// ```rust
    /// use osgrid::CartesianPoint;
    /// use uom::si::{f64::Length, length::meter};
    ///
    /// let m = |v| Length::new::<meter>(v);
    /// let point = CartesianPoint::new(m(1.), m(2.), m(3.)).unwrap();
    /// assert_eq!(point.to_array().map(|l| l.get::<meter>()), [1., 2., 3.]);
    /// ```
    #[must_use]
    pub fn to_array(&self) -> [Length; 3] {
        [self.x(), self.y(), self.z()]
    }

    /// Computes the straight-line distance between two points.
    #[must_use]
    pub fn distance_from(&self, other: &CartesianPoint) -> Length {
        Length::new::<meter>((self.point - other.point).norm())
    }
}

impl TryFrom<Point3> for CartesianPoint {
    type Error = Error;

    fn try_from(point: Point3) -> Result<Self> {
        Self::new(
            Length::new::<meter>(point.x),
            Length::new::<meter>(point.y),
            Length::new::<meter>(point.z),
        )
    }
}

impl From<CartesianPoint> for Point3 {
    fn from(point: CartesianPoint) -> Self {
        point.point
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for CartesianPoint {
    type Epsilon = Length;

    fn default_epsilon() -> Self::Epsilon {
        Length::new::<meter>(0.001)
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        // NOTE: per-component, not the length of the difference
        self.point.abs_diff_eq(&other.point, epsilon.get::<meter>())
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for CartesianPoint {
    fn default_max_relative() -> Self::Epsilon {
        Length::new::<meter>(Point3::default_max_relative())
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.point.relative_eq(
            &other.point,
            epsilon.get::<meter>(),
            max_relative.get::<meter>(),
        )
    }
}

impl Display for CartesianPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x = {:.3}m, y = {:.3}m, z = {:.3}m",
            self.point.x, self.point.y, self.point.z
        )
    }
}
