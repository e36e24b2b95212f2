// The worked examples from the Ordnance Survey's "A guide to coordinate systems in Great
// Britain", run end to end through the public API.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use osgrid::{
    CartesianPoint, Converter, Datum, Dms, EllipsoidId, GeodeticComponents, GeodeticPoint,
    GridPoint, ProjectionId,
};
use rstest::rstest;
use uom::si::angle::{degree, radian};
use uom::si::f64::Length;
use uom::si::length::meter;

fn m(meters: f64) -> Length {
    Length::new::<meter>(meters)
}

fn caister_grid() -> GridPoint {
    GridPoint::from_meters(313_177.270, 651_409.903).unwrap()
}

fn caister_osgb36(height: f64) -> GeodeticPoint {
    GeodeticPoint::build(GeodeticComponents {
        latitude: Dms::new(52., 39., 27.2531).into(),
        longitude: Dms::new(1., 43., 4.5177).into(),
        height: m(height),
    })
    .unwrap()
}

#[test]
fn grid_to_latitude_and_longitude() {
    let osgb36 = caister_grid().to_osgb36().unwrap();
    let expected = caister_osgb36(0.);
    assert_relative_eq!(
        osgb36.latitude().get::<degree>(),
        expected.latitude().get::<degree>(),
        max_relative = 1e-5
    );
    assert_relative_eq!(
        osgb36.longitude().get::<degree>(),
        expected.longitude().get::<degree>(),
        max_relative = 1e-5
    );
    // within 10cm on the ground
    assert_abs_diff_eq!(osgb36, expected, epsilon = m(0.1));
}

#[test]
fn latitude_and_longitude_to_grid() {
    let grid = ProjectionId::NationalGrid
        .projection()
        .to_grid(&caister_osgb36(0.))
        .unwrap();
    assert_abs_diff_eq!(grid, caister_grid(), epsilon = m(0.01));
}

#[test]
fn latitude_and_longitude_to_cartesian_and_back() {
    let airy = EllipsoidId::Airy1830.ellipsoid();
    let cartesian = caister_osgb36(24.7).to_cartesian(&airy);
    let expected = CartesianPoint::new(m(3_874_938.849), m(116_218.624), m(5_047_168.208)).unwrap();
    assert_relative_eq!(cartesian, expected, max_relative = m(1e-5));

    let geodetic = expected.to_geodetic(&airy).unwrap();
    assert_abs_diff_eq!(geodetic.height().get::<meter>(), 24.7, epsilon = 2e-3);
    assert_abs_diff_eq!(geodetic, caister_osgb36(24.7), epsilon = m(0.01));
}

#[rstest]
#[case(ProjectionId::NationalGrid, 313_177.270, 651_409.903)]
#[case(ProjectionId::NationalGrid, 1_000_000., 300_000.)]
#[case(ProjectionId::NationalGrid, 50_000., 150_000.)]
#[case(ProjectionId::IrishNationalGrid, 234_567., 315_904.)]
#[case(ProjectionId::IrishTransverseMercator, 734_697., 715_830.)]
fn full_chain_round_trip(
    #[case] projection: ProjectionId,
    #[case] northings: f64,
    #[case] eastings: f64,
) {
    let ellipsoid = projection.datum().ellipsoid().ellipsoid();
    let geodetic = GridPoint::from_meters(northings, eastings)
        .unwrap()
        .to_geodetic(projection)
        .unwrap();
    let cartesian = geodetic.to_cartesian(&ellipsoid);
    let recovered = cartesian.to_geodetic(&ellipsoid).unwrap();

    assert_abs_diff_eq!(
        recovered.latitude().get::<radian>(),
        geodetic.latitude().get::<radian>(),
        epsilon = 1e-9
    );
    assert_abs_diff_eq!(
        recovered.longitude().get::<radian>(),
        geodetic.longitude().get::<radian>(),
        epsilon = 1e-9
    );
    assert_abs_diff_eq!(recovered.height().get::<meter>(), 0., epsilon = 1e-3);
    assert_abs_diff_eq!(recovered.to_cartesian(&ellipsoid), cartesian);
}

#[test]
fn irish_grid_to_etrs89_agrees_with_irish_transverse_mercator() {
    // the same place on both Irish grids; ITM is defined on ETRS89 directly, so the only
    // difference should be the accuracy of the Helmert transformation
    let irish_grid = GridPoint::from_meters(234_567., 315_904.).unwrap();
    let via_helmert = irish_grid
        .to_datum(ProjectionId::IrishNationalGrid, Datum::Etrs89)
        .unwrap();
    let itm = ProjectionId::IrishTransverseMercator
        .projection()
        .to_grid(&via_helmert)
        .unwrap();
    let direct = itm
        .to_datum(ProjectionId::IrishTransverseMercator, Datum::Etrs89)
        .unwrap();
    assert_abs_diff_eq!(
        via_helmert.with_height(m(0.)).unwrap(),
        direct,
        epsilon = m(0.01)
    );
    // ITM's false origin is 400km east and 500km north of the Irish Grid's
    assert_abs_diff_eq!(
        itm.eastings().get::<meter>() - irish_grid.eastings().get::<meter>(),
        400_000.,
        epsilon = 200.
    );
    assert_abs_diff_eq!(
        itm.northings().get::<meter>() - irish_grid.northings().get::<meter>(),
        500_000.,
        epsilon = 200.
    );
}

#[cfg(feature = "serde")]
#[test]
fn converter_configured_from_yaml() {
    let settings = serde_yaml::from_str(
        "default_projection: irish_national_grid\n\
         default_ellipsoid: airy1830_modified\n\
         unknown_keys: fall_back_to_default\n",
    )
    .unwrap();
    let converter = Converter::new(settings);

    let geodetic = converter.grid_to_geodetic(250_000., 200_000., None).unwrap();
    assert_relative_eq!(geodetic.latitude().get::<degree>(), 53.5, epsilon = 1e-12);
    assert_relative_eq!(geodetic.longitude().get::<degree>(), -8., epsilon = 1e-12);

    let fallback = converter
        .grid_to_geodetic(250_000., 200_000., Some("gauss_kruger"))
        .unwrap();
    assert_eq!(fallback, geodetic);

    let cartesian = converter
        .geodetic_to_cartesian(
            geodetic.longitude().get::<radian>(),
            geodetic.latitude().get::<radian>(),
            0.,
            None,
        )
        .unwrap();
    assert_abs_diff_eq!(
        cartesian,
        geodetic.to_cartesian(&EllipsoidId::Airy1830Modified.ellipsoid())
    );
}
