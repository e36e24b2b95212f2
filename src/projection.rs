//! Transverse Mercator projections, following the series in the Ordnance Survey's "A guide to
//! coordinate systems in Great Britain", and the registry of the named national grids.

use crate::angle::signed_longitude;
use crate::datum::Datum;
use crate::ellipsoid::{Ellipsoid, EllipsoidId};
use crate::error::{finite, Error, Result, Solver};
use crate::float_math::{cos, powf, powi, sin, tan, Trig};
use crate::geodetic::GeodeticPoint;
use crate::grid::GridPoint;
use crate::settings::Convergence;
use log::debug;
use std::f64::consts::FRAC_PI_2;
use uom::si::f64::{Angle, Length};
use uom::si::{angle::radian, length::meter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The point a grid is measured from: its latitude and longitude, and the grid coordinates
/// (the false origin offsets) assigned to it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrueOrigin {
    pub latitude: Angle,
    /// The central meridian of the projection.
    pub longitude: Angle,
    pub eastings: Length,
    pub northings: Length,
}

/// A Transverse Mercator projection of an ellipsoid onto a flat grid.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "ProjectionFields"))]
pub struct Projection {
    /// F0, the scale factor on the central meridian.
    scale_factor: f64,
    /// φ0, λ0 in radians and E0, N0 in meters.
    origin_latitude: f64,
    origin_longitude: f64,
    origin_eastings: f64,
    origin_northings: f64,
    ellipsoid: Ellipsoid,
}

impl Projection {
    /// Constructs a projection, requiring a positive scale factor and a finite true origin.
    pub fn new(scale_factor: f64, true_origin: TrueOrigin, ellipsoid: Ellipsoid) -> Result<Self> {
        let scale_factor = finite("scale factor", scale_factor)?;
        if scale_factor <= 0. {
            return Err(Error::InvalidInput {
                quantity: "scale factor",
                value: scale_factor,
                reason: "must be positive",
            });
        }
        let origin_latitude = finite("origin latitude", true_origin.latitude.get::<radian>())?;
        if origin_latitude.abs() >= FRAC_PI_2 {
            return Err(Error::InvalidInput {
                quantity: "origin latitude",
                value: origin_latitude,
                reason: "must be strictly between the poles",
            });
        }
        Ok(Self {
            scale_factor,
            origin_latitude,
            origin_longitude: finite(
                "origin longitude",
                true_origin.longitude.get::<radian>(),
            )?,
            origin_eastings: finite("origin eastings", true_origin.eastings.get::<meter>())?,
            origin_northings: finite("origin northings", true_origin.northings.get::<meter>())?,
            ellipsoid,
        })
    }

    fn from_degrees(
        scale_factor: f64,
        (latitude, longitude): (f64, f64),
        (eastings, northings): (f64, f64),
        ellipsoid: EllipsoidId,
    ) -> Self {
        Self {
            scale_factor,
            origin_latitude: latitude.to_radians(),
            origin_longitude: longitude.to_radians(),
            origin_eastings: eastings,
            origin_northings: northings,
            ellipsoid: ellipsoid.ellipsoid(),
        }
    }

    #[must_use]
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    #[must_use]
    pub fn true_origin(&self) -> TrueOrigin {
        TrueOrigin {
            latitude: Angle::new::<radian>(self.origin_latitude),
            longitude: Angle::new::<radian>(self.origin_longitude),
            eastings: Length::new::<meter>(self.origin_eastings),
            northings: Length::new::<meter>(self.origin_northings),
        }
    }

    #[must_use]
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// `a·F0`
    fn scaled_a(&self) -> f64 {
        self.ellipsoid.a() * self.scale_factor
    }

    /// The distance along the central meridian from the origin latitude to `latitude`, on the
    /// scaled ellipsoid.
    ///
    /// This is the series in the third flattening `n` truncated after `n³`.
    #[must_use]
    pub fn meridional_arc(&self, latitude: Angle) -> Length {
        Length::new::<meter>(self.m(latitude.get::<radian>()))
    }

    fn m(&self, lat: f64) -> f64 {
        let n = self.ellipsoid.third_flattening();
        let (n2, n3) = (n * n, n * n * n);
        let diff = lat - self.origin_latitude;
        let sum = lat + self.origin_latitude;

        let ma = (1. + n + 1.25 * n2 + 1.25 * n3) * diff;
        let mb = (3. * n + 3. * n2 + 21. / 8. * n3) * sin(diff) * cos(sum);
        let mc = (15. / 8. * n2 + 15. / 8. * n3) * sin(2. * diff) * cos(2. * sum);
        let md = 35. / 24. * n3 * sin(3. * diff) * cos(3. * sum);

        self.ellipsoid.b() * self.scale_factor * (ma - mb + mc - md)
    }

    /// The radius of curvature in the prime vertical, scaled by F0.
    pub(crate) fn nu(&self, lat: f64) -> f64 {
        self.scale_factor * self.ellipsoid.nu(lat)
    }

    /// The meridional radius of curvature, scaled by F0.
    pub(crate) fn rho(&self, lat: f64) -> f64 {
        let e2 = self.ellipsoid.eccentricity_squared();
        self.scaled_a() * (1. - e2) / powf(1. - e2 * lat.sin2(), 1.5)
    }

    /// `η² = ν/ρ − 1`
    pub(crate) fn eta2(&self, lat: f64) -> f64 {
        self.nu(lat) / self.rho(lat) - 1.
    }

    /// Starts the footpoint latitude iteration for grid northings `northings`.
    ///
    /// The first estimate is `(N − N0) / (a·F0) + φ0`; each estimate is yielded together with
    /// its residual `N − N0 − M`, and the next estimate adds `residual / (a·F0)`.
    pub fn meridional_arc_iterations(&self, northings: Length) -> MeridionalArcIterations {
        let northings_from_origin = northings.get::<meter>() - self.origin_northings;
        MeridionalArcIterations {
            projection: *self,
            northings_from_origin,
            latitude: northings_from_origin / self.scaled_a() + self.origin_latitude,
        }
    }

    /// Projects a grid point back onto the ellipsoid with the default [`Convergence`].
    pub fn to_geodetic(&self, grid: &GridPoint) -> Result<GeodeticPoint> {
        self.to_geodetic_with(grid, &Convergence::DEFAULT)
    }

    /// Projects a grid point back onto the ellipsoid, giving a point with zero height.
    ///
    /// Solves for the footpoint latitude φ′ (the latitude whose meridional arc matches the
    /// northings), then corrects it and the central meridian by the series VII to XIII in powers
    /// of `E − E0`.
    pub fn to_geodetic_with(
        &self,
        grid: &GridPoint,
        convergence: &Convergence,
    ) -> Result<GeodeticPoint> {
        let iterations = self
            .meridional_arc_iterations(grid.northings())
            .map(|e| (e.latitude.get::<radian>(), e.residual.get::<meter>()));
        let lat = convergence.solve(Solver::MeridionalArc, convergence.arc_tolerance, iterations)?;
        if lat.abs() >= FRAC_PI_2 {
            return Err(Error::DegenerateInput(
                "footpoint latitude lies at or beyond a pole",
            ));
        }

        let nu = self.nu(lat);
        let rho = self.rho(lat);
        let eta2 = self.eta2(lat);

        let tan_lat = tan(lat);
        let (tan2, tan4, tan6) = (lat.tan2(), lat.tan4(), lat.tan6());
        let sec = lat.sec();
        let (nu3, nu5, nu7) = (powi(nu, 3), powi(nu, 5), powi(nu, 7));

        let vii = tan_lat / (2. * rho * nu);
        let viii = tan_lat / (24. * rho * nu3) * (5. + 3. * tan2 + eta2 - 9. * tan2 * eta2);
        let ix = tan_lat / (720. * rho * nu5) * (61. + 90. * tan2 + 45. * tan4);
        let x = sec / nu;
        let xi = sec / (6. * nu3) * (nu / rho + 2. * tan2);
        let xii = sec / (120. * nu5) * (5. + 28. * tan2 + 24. * tan4);
        let xiia = sec / (5040. * nu7) * (61. + 662. * tan2 + 1320. * tan4 + 720. * tan6);

        let de = grid.eastings().get::<meter>() - self.origin_eastings;
        let latitude = lat - vii * powi(de, 2) + viii * powi(de, 4) - ix * powi(de, 6);
        let longitude = self.origin_longitude + x * de - xi * powi(de, 3) + xii * powi(de, 5)
            - xiia * powi(de, 7);
        debug!("footpoint latitude {lat} rad corrected to {latitude} rad, longitude {longitude} rad");

        GeodeticPoint::from_radians(latitude, longitude, 0.)
    }

    /// Projects a point on the ellipsoid onto the grid, ignoring its height.
    ///
    /// This is the series I to VI in powers of the longitude difference from the central
    /// meridian. Fails with [`Error::DegenerateInput`] at the poles.
    pub fn to_grid(&self, point: &GeodeticPoint) -> Result<GridPoint> {
        let lat = point.latitude().get::<radian>();
        if lat.abs() >= FRAC_PI_2 {
            return Err(Error::DegenerateInput("the poles have no grid position"));
        }
        let p = signed_longitude(point.longitude() - Angle::new::<radian>(self.origin_longitude));

        let nu = self.nu(lat);
        let rho = self.rho(lat);
        let eta2 = self.eta2(lat);
        let (sin_lat, cos_lat) = (sin(lat), cos(lat));
        let (cos3, cos5) = (powi(cos_lat, 3), powi(cos_lat, 5));
        let (tan2, tan4) = (lat.tan2(), lat.tan4());

        let i = self.m(lat) + self.origin_northings;
        let ii = nu / 2. * sin_lat * cos_lat;
        let iii = nu / 24. * sin_lat * cos3 * (5. - tan2 + 9. * eta2);
        let iiia = nu / 720. * sin_lat * cos5 * (61. - 58. * tan2 + tan4);
        let iv = nu * cos_lat;
        let v = nu / 6. * cos3 * (nu / rho - tan2);
        let vi = nu / 120. * cos5 * (5. - 18. * tan2 + tan4 + 14. * eta2 - 58. * tan2 * eta2);

        let northings = i + ii * powi(p, 2) + iii * powi(p, 4) + iiia * powi(p, 6);
        let eastings = self.origin_eastings + iv * p + v * powi(p, 3) + vi * powi(p, 5);
        GridPoint::from_meters(northings, eastings)
    }
}

/// The serialised form of [`Projection`], checked by [`Projection::new`] on the way in.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct ProjectionFields {
    scale_factor: f64,
    origin_latitude: f64,
    origin_longitude: f64,
    origin_eastings: f64,
    origin_northings: f64,
    ellipsoid: Ellipsoid,
}

#[cfg(feature = "serde")]
impl TryFrom<ProjectionFields> for Projection {
    type Error = Error;

    fn try_from(fields: ProjectionFields) -> Result<Self> {
        let true_origin = TrueOrigin {
            latitude: Angle::new::<radian>(fields.origin_latitude),
            longitude: Angle::new::<radian>(fields.origin_longitude),
            eastings: Length::new::<meter>(fields.origin_eastings),
            northings: Length::new::<meter>(fields.origin_northings),
        };
        Self::new(fields.scale_factor, true_origin, fields.ellipsoid)
    }
}

/// One step of [`Projection::meridional_arc_iterations`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcEstimate {
    /// The footpoint latitude estimate φ′.
    pub latitude: Angle,
    /// `N − N0 − M(φ′)`
    pub residual: Length,
}

/// The fixed-point iteration for the footpoint latitude of some northings.
///
/// Never ends on its own; see [`Projection::to_geodetic_with`] for the stopping rule.
#[derive(Debug, Clone)]
#[must_use]
pub struct MeridionalArcIterations {
    projection: Projection,
    northings_from_origin: f64,
    latitude: f64,
}

impl Iterator for MeridionalArcIterations {
    type Item = ArcEstimate;

    fn next(&mut self) -> Option<Self::Item> {
        let latitude = self.latitude;
        let residual = self.northings_from_origin - self.projection.m(latitude);
        self.latitude += residual / self.projection.scaled_a();
        Some(ArcEstimate {
            latitude: Angle::new::<radian>(latitude),
            residual: Length::new::<meter>(residual),
        })
    }
}

registry! {
    /// The named national grids.
    pub enum ProjectionId in Projection {
        /// The Ordnance Survey National Grid of Great Britain, on OSGB36.
        NationalGrid = "national_grid",
        /// The Irish Grid, on Ireland 1965.
        IrishNationalGrid = "irish_national_grid",
        /// Irish Transverse Mercator, on ETRS89.
        IrishTransverseMercator = "irish_transverse_mercator",
    }
}

impl ProjectionId {
    #[must_use]
    pub fn projection(self) -> Projection {
        match self {
            ProjectionId::NationalGrid => Projection::from_degrees(
                0.999_601_271_7,
                (49., -2.),
                (400_000., -100_000.),
                EllipsoidId::Airy1830,
            ),
            ProjectionId::IrishNationalGrid => Projection::from_degrees(
                1.000_035,
                (53.5, -8.),
                (200_000., 250_000.),
                EllipsoidId::Airy1830Modified,
            ),
            ProjectionId::IrishTransverseMercator => Projection::from_degrees(
                0.999_82,
                (53.5, -8.),
                (600_000., 750_000.),
                EllipsoidId::Grs80,
            ),
        }
    }

    /// The geodetic datum the grid's latitudes and longitudes are expressed in.
    #[must_use]
    pub const fn datum(self) -> Datum {
        match self {
            ProjectionId::NationalGrid => Datum::Osgb36,
            ProjectionId::IrishNationalGrid => Datum::Ireland1965,
            ProjectionId::IrishTransverseMercator => Datum::Etrs89,
        }
    }
}

impl From<ProjectionId> for Projection {
    fn from(id: ProjectionId) -> Self {
        id.projection()
    }
}
