use crate::datum::{Datum, DatumConversion};
use crate::error::{finite, Error, Result};
use crate::geodetic::GeodeticPoint;
use crate::projection::ProjectionId;
use std::fmt;
use std::fmt::Display;
use uom::si::f64::Length;
use uom::si::length::meter;

#[cfg(any(test, feature = "approx"))]
use approx::AbsDiffEq;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A position on a national grid, in meters east and north of the grid's false origin.
///
/// A grid point does not know which grid it is on. Every conversion out of grid coordinates
/// therefore names the [`ProjectionId`] to use, except for the shortcuts that assume the
/// Ordnance Survey National Grid ([`GridPoint::to_osgb36`], [`GridPoint::to_etrs89`], and
/// [`GridPoint::to_wgs84`]).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "GridComponents"))]
pub struct GridPoint {
    northings: f64,
    eastings: f64,
}

impl GridPoint {
    /// Constructs a grid point; both components must be finite.
    ///
    /// ```
    /// use osgrid::{GridComponents, GridPoint};
    /// use uom::si::{f64::Length, length::meter};
    ///
    /// let point = GridPoint::build(GridComponents {
    ///     northings: Length::new::<meter>(313_177.270),
    ///     eastings: Length::new::<meter>(651_409.903),
    /// })
    /// .unwrap();
    /// let osgb36 = point.to_osgb36().unwrap();
    /// assert_eq!(osgb36.to_string(), "52°39′27.2531″N, 1°43′4.5177″E, 0.000m");
    /// ```
    pub fn build(
        GridComponents {
            northings,
            eastings,
        }: GridComponents,
    ) -> Result<Self> {
        Self::from_meters(northings.get::<meter>(), eastings.get::<meter>())
    }

    /// Constructs a grid point from northings and eastings in meters.
    pub fn from_meters(northings: f64, eastings: f64) -> Result<Self> {
        Ok(Self {
            northings: finite("northings", northings)?,
            eastings: finite("eastings", eastings)?,
        })
    }

    #[must_use]
    pub fn northings(&self) -> Length {
        Length::new::<meter>(self.northings)
    }

    #[must_use]
    pub fn eastings(&self) -> Length {
        Length::new::<meter>(self.eastings)
    }

    /// The latitude and longitude of this point on `projection`'s own datum and ellipsoid.
    pub fn to_geodetic(&self, projection: ProjectionId) -> Result<GeodeticPoint> {
        projection.projection().to_geodetic(self)
    }

    /// The OSGB36 latitude and longitude of this National Grid point.
    pub fn to_osgb36(&self) -> Result<GeodeticPoint> {
        self.to_geodetic(ProjectionId::NationalGrid)
    }

    /// The ETRS89 latitude, longitude, and height of this National Grid point, assuming it lies
    /// on the Airy 1830 ellipsoid.
    pub fn to_etrs89(&self) -> Result<GeodeticPoint> {
        self.to_datum(ProjectionId::NationalGrid, Datum::Etrs89)
    }

    /// The WGS84 latitude, longitude, and height of this National Grid point.
    ///
    /// This is [`GridPoint::to_etrs89`]: the two frames have drifted apart by well under a
    /// metre since 1989, which is far below the accuracy of the Helmert transformation itself.
    pub fn to_wgs84(&self) -> Result<GeodeticPoint> {
        self.to_etrs89()
    }

    /// The latitude, longitude, and height of this point on `projection`, expressed in `target`.
    ///
    /// Fails with [`Error::UnknownParameterSet`](crate::Error::UnknownParameterSet) if no
    /// transformation is registered between `projection`'s datum and `target`.
    pub fn to_datum(&self, projection: ProjectionId, target: Datum) -> Result<GeodeticPoint> {
        if projection.datum() == target {
            return self.to_geodetic(projection);
        }
        DatumConversion::new(projection, target)?.convert(self)
    }
}

impl Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}mN, {:.3}mE", self.northings, self.eastings)
    }
}

/// Argument type for [`GridPoint::build`].
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[must_use]
pub struct GridComponents {
    pub northings: Length,
    pub eastings: Length,
}

impl TryFrom<GridComponents> for GridPoint {
    type Error = Error;

    fn try_from(components: GridComponents) -> Result<Self> {
        Self::build(components)
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for GridPoint {
    type Epsilon = Length;

    fn default_epsilon() -> Self::Epsilon {
        Length::new::<meter>(0.001)
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        let epsilon = epsilon.get::<meter>();
        self.northings.abs_diff_eq(&other.northings, epsilon)
            && self.eastings.abs_diff_eq(&other.eastings, epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dms;
    use approx::{assert_abs_diff_eq, assert_abs_diff_ne, assert_relative_eq};
    use rstest::rstest;
    use uom::si::angle::degree;

    fn caister() -> GridPoint {
        GridPoint::from_meters(313_177.270, 651_409.903).unwrap()
    }

    #[rstest]
    #[case(f64::NAN, 0.)]
    #[case(0., f64::INFINITY)]
    #[case(f64::NEG_INFINITY, f64::NAN)]
    fn rejects_non_finite_components(#[case] northings: f64, #[case] eastings: f64) {
        assert!(matches!(
            GridPoint::from_meters(northings, eastings),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn display() {
        insta::assert_snapshot!(caister(), @"313177.270mN, 651409.903mE");
    }

    #[test]
    fn to_osgb36_is_the_national_grid() {
        assert_eq!(
            caister().to_osgb36(),
            caister().to_geodetic(ProjectionId::NationalGrid)
        );
        let osgb36 = caister().to_osgb36().unwrap();
        assert_relative_eq!(
            osgb36.latitude().get::<degree>(),
            Dms::new(52., 39., 27.2531).to_decimal_degrees(),
            max_relative = 1e-5
        );
    }

    #[test]
    fn etrs89_is_shifted_from_osgb36() {
        let osgb36 = caister().to_osgb36().unwrap();
        let etrs89 = caister().to_etrs89().unwrap();
        // the two datums differ by roughly 100m around East Anglia, mostly in longitude
        let shift = (etrs89.longitude() - osgb36.longitude()).get::<degree>() * 111_000.
            * osgb36.latitude().get::<uom::si::angle::radian>().cos();
        assert!((50. ..200.).contains(&shift.abs()), "{shift}");
        assert_eq!(caister().to_wgs84(), Ok(etrs89));
    }

    #[test]
    fn to_datum_on_the_native_datum_skips_the_transformation() {
        assert_eq!(
            caister().to_datum(ProjectionId::IrishNationalGrid, Datum::Ireland1965),
            caister().to_geodetic(ProjectionId::IrishNationalGrid)
        );
    }

    #[test]
    fn to_datum_without_a_transformation() {
        assert!(matches!(
            caister().to_datum(ProjectionId::NationalGrid, Datum::Ireland1965),
            Err(Error::UnknownParameterSet { .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_validates() {
        let point: GridPoint =
            serde_yaml::from_str("northings: 313177.27\neastings: 651409.903\n").unwrap();
        assert_eq!(point, caister());
        let err = serde_yaml::from_str::<GridPoint>("northings: .nan\neastings: 651409.903\n")
            .unwrap_err();
        assert!(err.to_string().contains("invalid northings"), "{err}");
        assert!(serde_yaml::from_str::<GridPoint>("northings: 0.0\neastings: -.inf\n").is_err());
    }

    #[test]
    fn abs_diff_eq_is_per_component() {
        let a = caister();
        let b = GridPoint::from_meters(313_177.2709, 651_409.9021).unwrap();
        assert_abs_diff_eq!(a, b);
        let c = GridPoint::from_meters(313_177.272, 651_409.903).unwrap();
        assert_abs_diff_ne!(a, c);
    }
}
