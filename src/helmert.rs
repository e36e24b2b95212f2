//! Seven-parameter Helmert transformations between earth-centred datum frames.

use crate::cartesian::CartesianPoint;
use crate::datum::Datum;
use crate::error::{finite, Error, Result};
use crate::{Matrix3, Vector3};
use uom::si::angle::{radian, second};
use uom::si::f64::{Angle, Length, Ratio};
use uom::si::length::meter;
use uom::si::ratio::{part_per_million, ratio};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A translation, a small rotation about each axis, and a scale change, applied in that
/// linearised form to earth-centred cartesian coordinates:
///
/// ```text
/// ⎡x′⎤   ⎡tx⎤   ⎡1 + s   −rz     ry ⎤ ⎡x⎤
/// ⎢y′⎥ = ⎢ty⎥ + ⎢  rz   1 + s   −rx ⎥ ⎢y⎥
/// ⎣z′⎦   ⎣tz⎦   ⎣ −ry     rx   1 + s⎦ ⎣z⎦
/// ```
///
/// The rotation matrix is only orthogonal to first order, so this must not be used for
/// rotations beyond a few arc-seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "HelmertFields"))]
pub struct HelmertParameters {
    /// tx, ty, tz in meters
    translation: [f64; 3],
    /// rx, ry, rz in radians
    rotation: [f64; 3],
    /// s, unitless
    scale: f64,
}

impl HelmertParameters {
    /// Constructs a transformation from its translation (tx, ty, tz), rotation (rx, ry, rz) and
    /// scale change. All seven must be finite.
    pub fn new(translation: [Length; 3], rotation: [Angle; 3], scale: Ratio) -> Result<Self> {
        let [tx, ty, tz] = translation;
        let [rx, ry, rz] = rotation;
        Ok(Self {
            translation: [
                finite("tx", tx.get::<meter>())?,
                finite("ty", ty.get::<meter>())?,
                finite("tz", tz.get::<meter>())?,
            ],
            rotation: [
                finite("rx", rx.get::<radian>())?,
                finite("ry", ry.get::<radian>())?,
                finite("rz", rz.get::<radian>())?,
            ],
            scale: finite("s", scale.get::<ratio>())?,
        })
    }

    /// Parameters as they are published: meters, arc-seconds, and parts per million.
    fn published(translation: [f64; 3], rotation_seconds: [f64; 3], scale_ppm: f64) -> Self {
        Self {
            translation,
            rotation: rotation_seconds.map(|r| Angle::new::<second>(r).get::<radian>()),
            scale: Ratio::new::<part_per_million>(scale_ppm).get::<ratio>(),
        }
    }

    #[must_use]
    pub fn translation(&self) -> [Length; 3] {
        self.translation.map(Length::new::<meter>)
    }

    #[must_use]
    pub fn rotation(&self) -> [Angle; 3] {
        self.rotation.map(Angle::new::<radian>)
    }

    #[must_use]
    pub fn scale(&self) -> Ratio {
        Ratio::new::<ratio>(self.scale)
    }

    /// The conventional inverse, with all seven parameters negated.
    ///
    /// This is how the reverse transformations are published, but it is not an exact inverse:
    /// composing the two leaves a residual of roughly `|K|·|t| + |K|²·|x|`, where `K` is the
    /// scale-and-rotation part of the matrix. For the British and Irish transformations that is
    /// a centimetre or two at the earth's surface. Use
    /// [`HelmertParameters::exact_inverse_transform`] to undo a transformation exactly.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            translation: self.translation.map(|t| -t),
            rotation: self.rotation.map(|r| -r),
            scale: -self.scale,
        }
    }

    fn matrix(&self) -> Matrix3 {
        let [rx, ry, rz] = self.rotation;
        let s = 1. + self.scale;
        Matrix3::new(
            s, -rz, ry, //
            rz, s, -rx, //
            -ry, rx, s,
        )
    }

    fn translation_vector(&self) -> Vector3 {
        Vector3::from(self.translation)
    }

    /// Applies the transformation to `point`.
    #[must_use]
    pub fn transform(&self, point: &CartesianPoint) -> CartesianPoint {
        CartesianPoint::from_nalgebra_point(
            self.matrix() * point.point + self.translation_vector(),
        )
    }

    /// Finds the point that [`HelmertParameters::transform`] maps onto `point` by solving the
    /// linear system rather than negating the parameters.
    pub fn exact_inverse_transform(&self, point: &CartesianPoint) -> Result<CartesianPoint> {
        let inverse = self
            .matrix()
            .try_inverse()
            .ok_or(Error::DegenerateInput("the transformation matrix is singular"))?;
        Ok(CartesianPoint::from_nalgebra_point(
            inverse * (point.point - self.translation_vector()),
        ))
    }
}

/// The serialised form of [`HelmertParameters`], in meters, radians, and a unitless scale.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct HelmertFields {
    translation: [f64; 3],
    rotation: [f64; 3],
    scale: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<HelmertFields> for HelmertParameters {
    type Error = Error;

    fn try_from(fields: HelmertFields) -> Result<Self> {
        Self::new(
            fields.translation.map(Length::new::<meter>),
            fields.rotation.map(Angle::new::<radian>),
            Ratio::new::<ratio>(fields.scale),
        )
    }
}

registry! {
    /// The named datum transformations. Each is registered together with its conventional
    /// inverse.
    pub enum TransformationId in Transformation {
        /// ETRS89 to OSGB36, the OS "national" transformation good to a few metres.
        Etrs89ToOsgb36 = "etrs89→osgb36" | "etrs89->osgb36",
        Osgb36ToEtrs89 = "osgb36→etrs89" | "osgb36->etrs89",
        /// ETRS89 to Ireland 1965, good to about a metre.
        Etrs89ToIreland1965 = "etrs89→ireland1965" | "etrs89->ireland1965",
        Ireland1965ToEtrs89 = "ireland1965→etrs89" | "ireland1965->etrs89",
    }
}

impl TransformationId {
    #[must_use]
    pub fn parameters(self) -> HelmertParameters {
        let etrs89_to_osgb36 = HelmertParameters::published(
            [-446.448, 125.157, -542.060],
            [-0.1502, -0.2470, -0.8421],
            20.4894,
        );
        let etrs89_to_ireland1965 = HelmertParameters::published(
            [-482.530, 130.596, -564.557],
            [1.042, 0.214, 0.631],
            -8.150,
        );
        match self {
            TransformationId::Etrs89ToOsgb36 => etrs89_to_osgb36,
            TransformationId::Osgb36ToEtrs89 => etrs89_to_osgb36.inverse(),
            TransformationId::Etrs89ToIreland1965 => etrs89_to_ireland1965,
            TransformationId::Ireland1965ToEtrs89 => etrs89_to_ireland1965.inverse(),
        }
    }

    /// The transformation in the opposite direction.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            TransformationId::Etrs89ToOsgb36 => TransformationId::Osgb36ToEtrs89,
            TransformationId::Osgb36ToEtrs89 => TransformationId::Etrs89ToOsgb36,
            TransformationId::Etrs89ToIreland1965 => TransformationId::Ireland1965ToEtrs89,
            TransformationId::Ireland1965ToEtrs89 => TransformationId::Etrs89ToIreland1965,
        }
    }

    #[must_use]
    pub const fn source(self) -> Datum {
        match self {
            TransformationId::Etrs89ToOsgb36 | TransformationId::Etrs89ToIreland1965 => {
                Datum::Etrs89
            }
            TransformationId::Osgb36ToEtrs89 => Datum::Osgb36,
            TransformationId::Ireland1965ToEtrs89 => Datum::Ireland1965,
        }
    }

    #[must_use]
    pub const fn target(self) -> Datum {
        self.inverse().source()
    }

    /// The registered transformation from `source` to `target`, if there is one.
    #[must_use]
    pub fn between(source: Datum, target: Datum) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.source() == source && id.target() == target)
    }
}

impl From<TransformationId> for HelmertParameters {
    fn from(id: TransformationId) -> Self {
        id.parameters()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Registry;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use quickcheck::{quickcheck, TestResult};
    use rstest::rstest;

    fn m(meters: f64) -> Length {
        Length::new::<meter>(meters)
    }

    fn point(x: f64, y: f64, z: f64) -> CartesianPoint {
        CartesianPoint::new(m(x), m(y), m(z)).unwrap()
    }

    #[test]
    fn published_units_are_converted() {
        let params = TransformationId::Etrs89ToOsgb36.parameters();
        assert_eq!(params.translation(), [m(-446.448), m(125.157), m(-542.060)]);
        assert_relative_eq!(params.rotation()[2].get::<second>(), -0.8421, max_relative = 1e-12);
        assert_relative_eq!(params.rotation()[2].get::<radian>(), -4.082_616_0e-6, max_relative = 1e-7);
        assert_relative_eq!(params.scale().get::<ratio>(), 20.4894e-6, max_relative = 1e-12);
    }

    #[test]
    fn identity_leaves_points_alone() {
        let identity =
            HelmertParameters::new([m(0.); 3], [Angle::new::<radian>(0.); 3], Ratio::new::<ratio>(0.))
                .unwrap();
        let p = point(3_874_938.849, 116_218.624, 5_047_168.208);
        assert_eq!(identity.transform(&p), p);
    }

    #[test]
    fn applies_the_linearised_model() {
        let params = HelmertParameters::new(
            [m(1.), m(2.), m(3.)],
            [
                Angle::new::<radian>(1e-6),
                Angle::new::<radian>(2e-6),
                Angle::new::<radian>(3e-6),
            ],
            Ratio::new::<part_per_million>(10.),
        )
        .unwrap();
        let transformed = params.transform(&point(1e6, 2e6, 3e6));
        // x′ = tx + (1 + s)x − rz·y + ry·z etc.
        assert_abs_diff_eq!(transformed.x().get::<meter>(), 1. + 1.00001e6 - 6. + 6., epsilon = 1e-6);
        assert_abs_diff_eq!(transformed.y().get::<meter>(), 2. + 3. + 2.00002e6 - 3., epsilon = 1e-6);
        assert_abs_diff_eq!(transformed.z().get::<meter>(), 3. - 2. + 2. + 3.00003e6, epsilon = 1e-6);
    }

    #[test]
    fn rejects_non_finite_parameters() {
        let result = HelmertParameters::new(
            [m(0.), m(f64::NAN), m(0.)],
            [Angle::new::<radian>(0.); 3],
            Ratio::new::<ratio>(0.),
        );
        assert!(matches!(result, Err(Error::InvalidInput { quantity: "ty", .. })));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_validates() {
        let yaml = serde_yaml::to_string(&TransformationId::Etrs89ToOsgb36.parameters()).unwrap();
        assert_eq!(
            serde_yaml::from_str::<HelmertParameters>(&yaml).unwrap(),
            TransformationId::Etrs89ToOsgb36.parameters()
        );

        let err = serde_yaml::from_str::<HelmertParameters>(
            "translation: [0.0, 0.0, 0.0]\nrotation: [0.0, .nan, 0.0]\nscale: 0.0\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid ry"), "{err}");
        assert!(serde_yaml::from_str::<HelmertParameters>(
            "translation: [0.0, 0.0, 0.0]\nrotation: [0.0, 0.0, 0.0]\nscale: .inf\n",
        )
        .is_err());
    }

    #[test]
    fn inverse_negates_every_parameter() {
        let forward = TransformationId::Etrs89ToOsgb36.parameters();
        let inverse = TransformationId::Osgb36ToEtrs89.parameters();
        assert_eq!(forward.inverse(), inverse);
        assert_eq!(inverse.inverse(), forward);
        assert_eq!(inverse.scale().get::<part_per_million>(), -forward.scale().get::<part_per_million>());
    }

    #[test]
    fn shift_is_of_the_expected_size() {
        let p = point(3_874_938.849, 116_218.624, 5_047_168.208);
        for id in TransformationId::ALL {
            let shift = id.parameters().transform(&p).distance_from(&p).get::<meter>();
            assert!((500. ..1000.).contains(&shift), "{id}: {shift}");
        }
    }

    #[rstest]
    #[case("etrs89→osgb36", TransformationId::Etrs89ToOsgb36)]
    #[case("etrs89->osgb36", TransformationId::Etrs89ToOsgb36)]
    #[case("osgb36->etrs89", TransformationId::Osgb36ToEtrs89)]
    #[case("etrs89→ireland1965", TransformationId::Etrs89ToIreland1965)]
    #[case("ireland1965->etrs89", TransformationId::Ireland1965ToEtrs89)]
    fn parses_keys_and_aliases(#[case] key: &str, #[case] id: TransformationId) {
        assert_eq!(key.parse(), Ok(id));
    }

    #[test]
    fn unknown_key() {
        let err = "osgb36→ireland1965".parse::<TransformationId>().unwrap_err();
        assert_eq!(
            err,
            Error::UnknownParameterSet {
                registry: Registry::Transformation,
                key: "osgb36→ireland1965".into()
            }
        );
        insta::assert_snapshot!(err, @r#"unknown transformation parameter set "osgb36→ireland1965""#);
    }

    #[test]
    fn display_uses_canonical_keys() {
        insta::assert_snapshot!(
            TransformationId::ALL.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
            @"etrs89→osgb36, osgb36→etrs89, etrs89→ireland1965, ireland1965→etrs89"
        );
    }

    #[test]
    fn datums_line_up() {
        for &id in TransformationId::ALL {
            assert_eq!(id.inverse().inverse(), id);
            assert_eq!(id.source(), id.inverse().target());
            assert_eq!(TransformationId::between(id.source(), id.target()), Some(id));
        }
        assert_eq!(TransformationId::between(Datum::Osgb36, Datum::Ireland1965), None);
    }

    fn sample(raw: i32) -> f64 {
        // ±20000 km
        f64::from(raw) / f64::from(i32::MAX) * 2e7
    }

    quickcheck! {
        fn exact_inverse_is_within_a_millimetre(x: i32, y: i32, z: i32) -> TestResult {
            let original = point(sample(x), sample(y), sample(z));
            for id in TransformationId::ALL {
                let params = id.parameters();
                let Ok(back) = params.exact_inverse_transform(&params.transform(&original)) else {
                    return TestResult::failed();
                };
                let error = back.distance_from(&original).get::<meter>();
                if error > 1e-3 {
                    return TestResult::error(format!("{id}: {original} came back {error}m off"));
                }
            }
            TestResult::passed()
        }

        fn negated_inverse_is_within_five_centimetres(x: i32, y: i32, z: i32) -> TestResult {
            let original = point(sample(x), sample(y), sample(z));
            for id in TransformationId::ALL {
                let there = id.parameters().transform(&original);
                let back = id.inverse().parameters().transform(&there);
                let error = back.distance_from(&original).get::<meter>();
                if error > 0.05 {
                    return TestResult::error(format!("{id}: {original} came back {error}m off"));
                }
            }
            TestResult::passed()
        }
    }
}
