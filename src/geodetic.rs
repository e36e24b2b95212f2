use crate::angle::{signed_longitude, Dms};
use crate::cartesian::CartesianPoint;
use crate::ellipsoid::Ellipsoid;
use crate::error::{finite, Error, Result, Solver};
use crate::float_math::{atan, atan2, cos, hypot, sin};
use crate::settings::Convergence;
use crate::Point3;
use log::debug;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::fmt;
use std::fmt::Display;
use uom::si::f64::{Angle, Length};
use uom::si::{angle::radian, length::meter};
use uom::ConstZero;

#[cfg(any(test, feature = "approx"))]
use crate::float_math::{asin, sqrt};
#[cfg(any(test, feature = "approx"))]
use approx::AbsDiffEq;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Below this distance from the polar axis (in metres) a point is treated as lying on it.
const POLAR_AXIS_TOLERANCE: f64 = 1e-12;

/// Mean earth radius in metres, only used to turn angular differences into surface distance
/// for approximate comparisons.
#[cfg(any(test, feature = "approx"))]
const MEAN_EARTH_RADIUS: f64 = 6_371_008.8;

/// A latitude, longitude, and ellipsoidal height.
///
/// Like [`CartesianPoint`], a geodetic point carries no record of the ellipsoid it is expressed
/// on: the same numbers name different places on Airy 1830 and on GRS80. The height is measured
/// along the ellipsoid normal and is not a height above sea level.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "GeodeticComponents"))]
pub struct GeodeticPoint {
    latitude: Angle,
    longitude: Angle,
    height: Length,
}

impl GeodeticPoint {
    /// Constructs a geodetic point.
    ///
    /// The latitude must be in [-90°, 90°]; all components must be finite.
    ///
    /// ```
    /// use osgrid::{Dms, GeodeticComponents, GeodeticPoint};
    ///
    /// // the height defaults to zero, ie on the surface of the ellipsoid
    /// let caister = GeodeticPoint::build(GeodeticComponents {
    ///     latitude: Dms::new(52., 39., 27.2531).into(),
    ///     longitude: Dms::new(1., 43., 4.5177).into(),
    ///     ..Default::default()
    /// })
    /// .unwrap();
    /// assert_eq!(caister.to_string(), "52°39′27.2531″N, 1°43′4.5177″E, 0.000m");
    /// ```
    pub fn build(
        GeodeticComponents {
            latitude,
            longitude,
            height,
        }: GeodeticComponents,
    ) -> Result<Self> {
        let lat = finite("latitude", latitude.get::<radian>())?;
        finite("longitude", longitude.get::<radian>())?;
        finite("height", height.get::<meter>())?;
        // leave room for rounding in degree -> radian conversions of exactly ±90°
        if lat.abs() > FRAC_PI_2 + 1e-12 {
            return Err(Error::InvalidInput {
                quantity: "latitude",
                value: lat,
                reason: "must be within [-90°, 90°]",
            });
        }
        Ok(Self {
            latitude,
            longitude,
            height,
        })
    }

    /// Solver outputs are finite by construction.
    pub(crate) fn from_radians(latitude: f64, longitude: f64, height: f64) -> Result<Self> {
        Self::build(GeodeticComponents {
            latitude: Angle::new::<radian>(latitude),
            longitude: Angle::new::<radian>(longitude),
            height: Length::new::<meter>(height),
        })
    }

    /// The angle north of the equator.
    #[must_use]
    pub fn latitude(&self) -> Angle {
        self.latitude
    }

    /// The angle east of the prime meridian, always in [-180°, 180°).
    #[must_use]
    pub fn longitude(&self) -> Angle {
        Angle::new::<radian>(signed_longitude(self.longitude))
    }

    /// The distance above the ellipsoid along its normal.
    #[must_use]
    pub fn height(&self) -> Length {
        self.height
    }

    /// Returns the same latitude and longitude at a different ellipsoidal height.
    pub fn with_height(self, height: impl Into<Length>) -> Result<Self> {
        Self::build(GeodeticComponents {
            latitude: self.latitude,
            longitude: self.longitude,
            height: height.into(),
        })
    }

    /// Converts to earth-centred cartesian coordinates on `ellipsoid`.
    ///
    /// This is closed-form:
    ///
    /// ```text
    /// ν = a / √(1 − e²·sin²φ)
    /// x = (ν + h)·cos φ·cos λ
    /// y = (ν + h)·cos φ·sin λ
    /// z = ((1 − e²)·ν + h)·sin φ
    /// ```
    #[must_use]
    pub fn to_cartesian(&self, ellipsoid: &Ellipsoid) -> CartesianPoint {
        let lat_phi = self.latitude.get::<radian>();
        let lon_lambda = self.longitude.get::<radian>();
        let height_h = self.height.get::<meter>();

        let e2 = ellipsoid.eccentricity_squared();
        let nu = ellipsoid.nu(lat_phi);

        let x = (nu + height_h) * cos(lat_phi) * cos(lon_lambda);
        let y = (nu + height_h) * cos(lat_phi) * sin(lon_lambda);
        let z = ((1. - e2) * nu + height_h) * sin(lat_phi);

        CartesianPoint::from_nalgebra_point(Point3::new(x, y, z))
    }
}

impl Display for GeodeticPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat = self.latitude();
        let lon = self.longitude();
        let ns = if lat.is_sign_negative() { 'S' } else { 'N' };
        let ew = if lon.is_sign_negative() { 'W' } else { 'E' };
        write!(
            f,
            "{}{ns}, {}{ew}, {:.3}m",
            Dms::from(lat.abs()),
            Dms::from(lon.abs()),
            self.height.get::<meter>()
        )
    }
}

/// Argument type for [`GeodeticPoint::build`].
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[must_use]
pub struct GeodeticComponents {
    /// Must be in [-90°, 90°].
    pub latitude: Angle,
    pub longitude: Angle,
    /// Defaults to zero, a point on the ellipsoid's surface.
    pub height: Length,
}

impl TryFrom<GeodeticComponents> for GeodeticPoint {
    type Error = Error;

    fn try_from(components: GeodeticComponents) -> Result<Self> {
        Self::build(components)
    }
}

/// One step of the iteration in [`CartesianPoint::latitude_iterations`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatitudeEstimate {
    pub latitude: Angle,
    /// The difference from the previous estimate.
    pub change: Angle,
}

/// The fixed-point iteration `φ ← atan((z + e²·ν(φ)·sin φ) / p)`.
///
/// Never ends on its own; see [`CartesianPoint::to_geodetic_with`] for the stopping rule.
#[derive(Debug, Clone)]
#[must_use]
pub struct LatitudeIterations {
    ellipsoid: Ellipsoid,
    z: f64,
    p: f64,
    latitude: f64,
}

impl Iterator for LatitudeIterations {
    type Item = LatitudeEstimate;

    fn next(&mut self) -> Option<Self::Item> {
        let e2 = self.ellipsoid.eccentricity_squared();
        let nu = self.ellipsoid.nu(self.latitude);
        let next = atan((self.z + e2 * nu * sin(self.latitude)) / self.p);
        let change = next - self.latitude;
        self.latitude = next;
        Some(LatitudeEstimate {
            latitude: Angle::new::<radian>(next),
            change: Angle::new::<radian>(change),
        })
    }
}

impl CartesianPoint {
    /// Starts the latitude iteration for this point on `ellipsoid`.
    ///
    /// The first estimate is `atan(z / (p·(1 − e²)))` where `p = √(x² + y²)`, and each item
    /// yielded is the next refinement. Fails with [`Error::DegenerateInput`] for points on the
    /// polar axis, where `p` is zero.
    pub fn latitude_iterations(&self, ellipsoid: &Ellipsoid) -> Result<LatitudeIterations> {
        let p = hypot(self.point.x, self.point.y);
        if p < POLAR_AXIS_TOLERANCE {
            return Err(Error::DegenerateInput(
                "latitude iteration is undefined on the polar axis",
            ));
        }
        let z = self.point.z;
        Ok(LatitudeIterations {
            ellipsoid: *ellipsoid,
            z,
            p,
            latitude: atan(z / (p * (1. - ellipsoid.eccentricity_squared()))),
        })
    }

    /// Converts earth-centred cartesian coordinates into latitude, longitude, and height on
    /// `ellipsoid` with the default [`Convergence`].
    pub fn to_geodetic(&self, ellipsoid: &Ellipsoid) -> Result<GeodeticPoint> {
        self.to_geodetic_with(ellipsoid, &Convergence::DEFAULT)
    }

    /// Converts earth-centred cartesian coordinates into latitude, longitude, and height on
    /// `ellipsoid`.
    ///
    /// Longitude is the four-quadrant `atan2(y, x)`. Latitude is iterated (see
    /// [`CartesianPoint::latitude_iterations`]) until successive estimates differ by less than
    /// [`Convergence::latitude_tolerance`].
    ///
    /// Points on the polar axis resolve to the pole on the same side as `z` with longitude 0 and
    /// height `|z| − b`. The centre of the earth fails with [`Error::DegenerateInput`], and
    /// running out of iterations with [`Error::ConvergenceFailure`].
    pub fn to_geodetic_with(
        &self,
        ellipsoid: &Ellipsoid,
        convergence: &Convergence,
    ) -> Result<GeodeticPoint> {
        let (x, y, z) = (self.point.x, self.point.y, self.point.z);
        let p = hypot(x, y);

        if p < POLAR_AXIS_TOLERANCE {
            if z == 0. {
                return Err(Error::DegenerateInput(
                    "the centre of the earth has no latitude or longitude",
                ));
            }
            debug!("point lies on the polar axis, snapping to the pole");
            return GeodeticPoint::from_radians(FRAC_PI_2.copysign(z), 0., z.abs() - ellipsoid.b());
        }

        let lon = atan2(y, x);
        let iterations = self
            .latitude_iterations(ellipsoid)?
            .map(|e| (e.latitude.get::<radian>(), e.change.get::<radian>()));
        let lat = convergence.solve(
            Solver::CartesianLatitude,
            convergence.latitude_tolerance,
            iterations,
        )?;

        let nu = ellipsoid.nu(lat);
        // p / cos φ loses precision towards the poles, z / sin φ towards the equator
        let height = if lat.abs() < FRAC_PI_4 {
            p / cos(lat) - nu
        } else {
            z / sin(lat) - nu * (1. - ellipsoid.eccentricity_squared())
        };

        GeodeticPoint::from_radians(lat, lon, height)
    }
}

/// Computes the central angle between the given lat/lon points, in radians.
///
/// The current implementation computes this [using the archaversine] (inverse haversine).
///
/// [using the archaversine]: https://en.wikipedia.org/wiki/Haversine_formula#Formulation
#[cfg(any(test, feature = "approx"))]
fn central_angle(a: &GeodeticPoint, b: &GeodeticPoint) -> f64 {
    let lat_a = a.latitude.get::<radian>();
    let lat_b = b.latitude.get::<radian>();
    let delta_lat = lat_b - lat_a;
    let delta_lon = b.longitude.get::<radian>() - a.longitude.get::<radian>();

    let inner = 1. - cos(delta_lat) + cos(lat_a) * cos(lat_b) * (1. - cos(delta_lon));
    2. * asin(sqrt(inner / 2.))
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for GeodeticPoint {
    type Epsilon = Length;

    fn default_epsilon() -> Self::Epsilon {
        Length::new::<meter>(0.001)
    }

    /// Compares the (approximate) surface distance between the points and their heights
    /// separately against `epsilon`.
    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        let epsilon = epsilon.get::<meter>();
        central_angle(self, other) * MEAN_EARTH_RADIUS < epsilon
            && (self.height - other.height).abs().get::<meter>() <= epsilon
    }
}

impl Default for GeodeticPoint {
    fn default() -> Self {
        Self {
            latitude: Angle::ZERO,
            longitude: Angle::ZERO,
            height: Length::ZERO,
        }
    }
}
