//! Moving grid points from their own datum into another one.

use crate::ellipsoid::EllipsoidId;
use crate::error::{Error, Registry, Result};
use crate::geodetic::GeodeticPoint;
use crate::grid::GridPoint;
use crate::helmert::TransformationId;
use crate::projection::ProjectionId;
use crate::settings::Convergence;
use log::debug;
use std::fmt;
use uom::si::f64::Length;
use uom::si::length::meter;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A geodetic datum: an ellipsoid together with how it is tied to the earth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Datum {
    /// Ordnance Survey Great Britain 1936, the datum of the National Grid.
    Osgb36,
    /// The datum of the Irish Grid.
    Ireland1965,
    /// The European Terrestrial Reference System 1989, which GNSS positions in Europe are
    /// given in.
    Etrs89,
}

impl Datum {
    #[must_use]
    pub const fn ellipsoid(self) -> EllipsoidId {
        match self {
            Datum::Osgb36 => EllipsoidId::Airy1830,
            Datum::Ireland1965 => EllipsoidId::Airy1830Modified,
            Datum::Etrs89 => EllipsoidId::Grs80,
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Datum::Osgb36 => "osgb36",
            Datum::Ireland1965 => "ireland1965",
            Datum::Etrs89 => "etrs89",
        })
    }
}

/// Everything needed to take a grid point to latitude and longitude in another datum:
///
/// 1. project the grid point onto `source_projection`'s ellipsoid,
/// 2. convert to cartesian coordinates on `source_ellipsoid`,
/// 3. apply the Helmert `transformation`,
/// 4. convert back to latitude, longitude, and height on `target_ellipsoid`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DatumConversion {
    pub source_projection: ProjectionId,
    pub source_ellipsoid: EllipsoidId,
    pub target_ellipsoid: EllipsoidId,
    pub transformation: TransformationId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub convergence: Convergence,
}

impl DatumConversion {
    /// The conversion from grid points on `source_projection` to `target`, using the registered
    /// transformation between the two datums and their usual ellipsoids.
    pub fn new(source_projection: ProjectionId, target: Datum) -> Result<Self> {
        let source = source_projection.datum();
        let transformation = TransformationId::between(source, target).ok_or_else(|| {
            Error::UnknownParameterSet {
                registry: Registry::Transformation,
                key: format!("{source}→{target}"),
            }
        })?;
        Ok(Self {
            source_projection,
            source_ellipsoid: source.ellipsoid(),
            target_ellipsoid: target.ellipsoid(),
            transformation,
            convergence: Convergence::DEFAULT,
        })
    }

    /// Converts a grid point, taking it to be on the surface of the source ellipsoid.
    pub fn convert(&self, grid: &GridPoint) -> Result<GeodeticPoint> {
        self.convert_with_height(grid, Length::new::<meter>(0.))
    }

    /// Converts a grid point at `height` above the source ellipsoid.
    pub fn convert_with_height(
        &self,
        grid: &GridPoint,
        height: impl Into<Length>,
    ) -> Result<GeodeticPoint> {
        let source = self
            .source_projection
            .projection()
            .to_geodetic_with(grid, &self.convergence)?
            .with_height(height)?;
        debug!("{grid} on {} is {source}", self.source_projection);

        let cartesian = source.to_cartesian(&self.source_ellipsoid.ellipsoid());
        debug!("on {}: {cartesian}", self.source_ellipsoid);

        let transformed = self.transformation.parameters().transform(&cartesian);
        debug!("after {}: {transformed}", self.transformation);

        let target = transformed
            .to_geodetic_with(&self.target_ellipsoid.ellipsoid(), &self.convergence)?;
        debug!("on {}: {target}", self.target_ellipsoid);
        Ok(target)
    }
}

/// Converts `grid` on `source_projection` into latitude, longitude, and height on
/// `target_ellipsoid` via `transformation`.
///
/// ```
/// use osgrid::{convert_datum, EllipsoidId, GridPoint, ProjectionId, TransformationId};
///
/// let grid = GridPoint::from_meters(313_177.270, 651_409.903).unwrap();
/// let etrs89 = convert_datum(
///     &grid,
///     ProjectionId::NationalGrid,
///     EllipsoidId::Airy1830,
///     EllipsoidId::Grs80,
///     TransformationId::Osgb36ToEtrs89,
/// )
/// .unwrap();
/// assert_eq!(grid.to_etrs89().unwrap(), etrs89);
/// ```
pub fn convert_datum(
    grid: &GridPoint,
    source_projection: ProjectionId,
    source_ellipsoid: EllipsoidId,
    target_ellipsoid: EllipsoidId,
    transformation: TransformationId,
) -> Result<GeodeticPoint> {
    DatumConversion {
        source_projection,
        source_ellipsoid,
        target_ellipsoid,
        transformation,
        convergence: Convergence::DEFAULT,
    }
    .convert(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartesian::CartesianPoint;
    use approx::assert_abs_diff_eq;
    use quickcheck::{quickcheck, TestResult};
    use uom::si::angle::radian;

    fn m(meters: f64) -> Length {
        Length::new::<meter>(meters)
    }

    fn caister() -> GridPoint {
        GridPoint::from_meters(313_177.270, 651_409.903).unwrap()
    }

    #[test]
    fn new_picks_the_registered_transformation() {
        let conversion = DatumConversion::new(ProjectionId::NationalGrid, Datum::Etrs89).unwrap();
        assert_eq!(conversion.transformation, TransformationId::Osgb36ToEtrs89);
        assert_eq!(conversion.source_ellipsoid, EllipsoidId::Airy1830);
        assert_eq!(conversion.target_ellipsoid, EllipsoidId::Grs80);

        let conversion =
            DatumConversion::new(ProjectionId::IrishNationalGrid, Datum::Etrs89).unwrap();
        assert_eq!(conversion.transformation, TransformationId::Ireland1965ToEtrs89);
        assert_eq!(conversion.source_ellipsoid, EllipsoidId::Airy1830Modified);
    }

    #[test]
    fn new_without_a_registered_transformation() {
        let err = DatumConversion::new(ProjectionId::NationalGrid, Datum::Ireland1965).unwrap_err();
        insta::assert_snapshot!(err, @r#"unknown transformation parameter set "osgb36→ireland1965""#);
    }

    #[test]
    fn matches_the_stages_run_by_hand() {
        let osgb36 = ProjectionId::NationalGrid
            .projection()
            .to_geodetic(&caister())
            .unwrap();
        let cartesian = osgb36.to_cartesian(&EllipsoidId::Airy1830.ellipsoid());
        let shifted = TransformationId::Osgb36ToEtrs89
            .parameters()
            .transform(&cartesian);
        let expected = shifted.to_geodetic(&EllipsoidId::Grs80.ellipsoid()).unwrap();

        let conversion = DatumConversion::new(ProjectionId::NationalGrid, Datum::Etrs89).unwrap();
        assert_eq!(conversion.convert(&caister()), Ok(expected));
    }

    #[test]
    fn height_is_carried_through() {
        let conversion = DatumConversion::new(ProjectionId::NationalGrid, Datum::Etrs89).unwrap();
        let low = conversion.convert(&caister()).unwrap();
        let high = conversion.convert_with_height(&caister(), m(100.)).unwrap();
        assert_abs_diff_eq!(
            (high.height() - low.height()).get::<meter>(),
            100.,
            epsilon = 0.01
        );
        assert_abs_diff_eq!(
            high.latitude().get::<radian>(),
            low.latitude().get::<radian>(),
            epsilon = 1e-8
        );
    }

    #[test]
    fn conversion_errors_propagate() {
        let conversion = DatumConversion {
            convergence: Convergence {
                max_iterations: 1,
                ..Convergence::DEFAULT
            },
            ..DatumConversion::new(ProjectionId::NationalGrid, Datum::Etrs89).unwrap()
        };
        assert!(matches!(
            conversion.convert(&caister()),
            Err(Error::ConvergenceFailure { .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize() {
        let conversion: DatumConversion = serde_yaml::from_str(
            "source_projection: irish_national_grid\n\
             source_ellipsoid: airy1830_modified\n\
             target_ellipsoid: grs80\n\
             transformation: ireland1965->etrs89\n",
        )
        .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(
            conversion,
            DatumConversion::new(ProjectionId::IrishNationalGrid, Datum::Etrs89).unwrap()
        );
    }

    quickcheck! {
        // going there and back through both conventional transformations moves a point by
        // a few centimetres at most
        fn there_and_back_again(n: u32, e: u32) -> TestResult {
            let northings = f64::from(n) / f64::from(u32::MAX) * 1_200_000.;
            let eastings = 100_000. + f64::from(e) / f64::from(u32::MAX) * 550_000.;
            let original = GridPoint::from_meters(northings, eastings).unwrap();

            let Ok(etrs89) = original.to_etrs89() else {
                return TestResult::failed();
            };
            let cartesian: CartesianPoint = etrs89.to_cartesian(&EllipsoidId::Grs80.ellipsoid());
            let back = TransformationId::Etrs89ToOsgb36.parameters().transform(&cartesian);
            let Ok(osgb36) = back.to_geodetic(&EllipsoidId::Airy1830.ellipsoid()) else {
                return TestResult::failed();
            };
            let Ok(grid) = ProjectionId::NationalGrid.projection().to_grid(&osgb36) else {
                return TestResult::failed();
            };
            let error = (grid.northings() - original.northings())
                .get::<meter>()
                .hypot((grid.eastings() - original.eastings()).get::<meter>());
            let height = osgb36.height().get::<meter>().abs();
            if error < 0.05 && height < 0.05 {
                TestResult::passed()
            } else {
                TestResult::error(format!("{original} came back as {grid} at {height}m"))
            }
        }
    }
}
