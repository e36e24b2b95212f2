use crate::cartesian::CartesianPoint;
use crate::datum::DatumConversion;
use crate::ellipsoid::EllipsoidId;
use crate::geodetic::{GeodeticComponents, GeodeticPoint};
use crate::grid::GridPoint;
use crate::helmert::TransformationId;
use crate::projection::ProjectionId;
use crate::settings::Settings;
use crate::Result;
use log::debug;
use uom::si::f64::{Angle, Length};
use uom::si::{angle::radian, length::meter};

/// Conversions addressed by registry key, for callers that hold plain numbers and names (from
/// a configuration file or a foreign interface, say) rather than the typed API.
///
/// Angles are in radians and lengths in meters. Passing `None` for a key uses the default from
/// [`Settings`]; what happens with a key that is not registered is governed by
/// [`Settings::unknown_keys`].
///
/// ```
/// use osgrid::Converter;
///
/// let converter = Converter::default();
/// let osgb36 = converter.grid_to_geodetic(313_177.270, 651_409.903, None).unwrap();
/// let cartesian = converter
///     .geodetic_to_cartesian(osgb36.longitude().value, osgb36.latitude().value, 24.7, Some("airy1830"))
///     .unwrap();
/// assert!((cartesian.x().value - 3_874_938.849).abs() < 0.01);
///
/// assert!(converter.grid_to_geodetic(0., 0., Some("lambert93")).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Converter {
    settings: Settings,
}

impl Converter {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn projection(&self, key: Option<&str>) -> Result<ProjectionId> {
        self.settings.resolve(key, self.settings.default_projection)
    }

    fn ellipsoid(&self, key: Option<&str>) -> Result<EllipsoidId> {
        self.settings.resolve(key, self.settings.default_ellipsoid)
    }

    fn transformation(&self, key: Option<&str>) -> Result<TransformationId> {
        self.settings.resolve(key, self.settings.default_transformation)
    }

    /// Projects `(northings, eastings)` on the named grid back to latitude and longitude.
    pub fn grid_to_geodetic(
        &self,
        northings: f64,
        eastings: f64,
        projection: Option<&str>,
    ) -> Result<GeodeticPoint> {
        let projection = self.projection(projection)?;
        let grid = GridPoint::from_meters(northings, eastings)?;
        debug!("projecting {grid} from {projection}");
        projection
            .projection()
            .to_geodetic_with(&grid, &self.settings.convergence)
    }

    /// Converts a longitude, latitude, and height on the named ellipsoid to cartesian
    /// coordinates.
    pub fn geodetic_to_cartesian(
        &self,
        longitude: f64,
        latitude: f64,
        height: f64,
        ellipsoid: Option<&str>,
    ) -> Result<CartesianPoint> {
        let ellipsoid = self.ellipsoid(ellipsoid)?;
        let point = GeodeticPoint::build(GeodeticComponents {
            latitude: Angle::new::<radian>(latitude),
            longitude: Angle::new::<radian>(longitude),
            height: Length::new::<meter>(height),
        })?;
        Ok(point.to_cartesian(&ellipsoid.ellipsoid()))
    }

    /// Converts cartesian coordinates to latitude, longitude, and height on the named ellipsoid.
    pub fn cartesian_to_geodetic(
        &self,
        x: f64,
        y: f64,
        z: f64,
        ellipsoid: Option<&str>,
    ) -> Result<GeodeticPoint> {
        let ellipsoid = self.ellipsoid(ellipsoid)?;
        let point = CartesianPoint::new(
            Length::new::<meter>(x),
            Length::new::<meter>(y),
            Length::new::<meter>(z),
        )?;
        point.to_geodetic_with(&ellipsoid.ellipsoid(), &self.settings.convergence)
    }

    /// Applies the named Helmert transformation.
    ///
    /// Use [`HelmertParameters::transform`](crate::HelmertParameters::transform) directly for
    /// parameters that are not registered.
    pub fn apply_helmert(
        &self,
        point: &CartesianPoint,
        transformation: Option<&str>,
    ) -> Result<CartesianPoint> {
        let transformation = self.transformation(transformation)?;
        Ok(transformation.parameters().transform(point))
    }

    /// Takes a grid point into another datum; see [`DatumConversion`].
    ///
    /// Without keys, the source projection and the transformation are the configured defaults,
    /// the source ellipsoid is the one the source grid is defined on, and the target ellipsoid
    /// is that of the transformation's target datum.
    pub fn convert_datum(
        &self,
        (northings, eastings): (f64, f64),
        source_projection: Option<&str>,
        source_ellipsoid: Option<&str>,
        target_ellipsoid: Option<&str>,
        transformation: Option<&str>,
    ) -> Result<GeodeticPoint> {
        let source_projection = self.projection(source_projection)?;
        let transformation = self.transformation(transformation)?;
        let conversion = DatumConversion {
            source_projection,
            source_ellipsoid: self
                .settings
                .resolve(source_ellipsoid, source_projection.datum().ellipsoid())?,
            target_ellipsoid: self
                .settings
                .resolve(target_ellipsoid, transformation.target().ellipsoid())?,
            transformation,
            convergence: self.settings.convergence,
        };
        conversion.convert(&GridPoint::from_meters(northings, eastings)?)
    }
}
