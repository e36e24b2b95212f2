//! Degrees/minutes/seconds and longitude normalisation.

use std::fmt;
use uom::si::angle::{degree, radian};
use uom::si::f64::Angle;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Converts a sexagesimal degrees/minutes/seconds triplet to decimal degrees.
///
/// No range checking is done on `minutes` or `seconds`; `decimal_from_dms(0., 90., 0.)` is
/// simply `1.5`. A negative angle has all three parts negative.
///
/// ```
/// use osgrid::decimal_from_dms;
///
/// assert_eq!(decimal_from_dms(30., 0., 0.), 30.);
/// assert!((decimal_from_dms(15., 0., 3.) - 15.000_833_333_333_333).abs() < 1e-12);
/// ```
#[must_use]
pub fn decimal_from_dms(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60. + seconds / 3600.
}

/// An angle written as degrees, minutes, and seconds of arc.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dms {
    pub degrees: f64,
    pub minutes: f64,
    pub seconds: f64,
}

impl Dms {
    #[must_use]
    pub const fn new(degrees: f64, minutes: f64, seconds: f64) -> Self {
        Self {
            degrees,
            minutes,
            seconds,
        }
    }

    /// Splits decimal degrees into whole degrees, whole minutes, and fractional seconds.
    ///
    /// Negative input negates all three parts, so [`Dms::to_decimal_degrees`] gives the input
    /// back (up to rounding).
    #[must_use]
    pub fn from_decimal_degrees(decimal: f64) -> Self {
        let magnitude = decimal.abs();
        let degrees = magnitude.trunc();
        let minutes_with_fraction = (magnitude - degrees) * 60.;
        let minutes = minutes_with_fraction.trunc();
        let seconds = (minutes_with_fraction - minutes) * 60.;
        let sign = if decimal.is_sign_negative() { -1. } else { 1. };
        Self::new(sign * degrees, sign * minutes, sign * seconds)
    }

    #[must_use]
    pub fn to_decimal_degrees(&self) -> f64 {
        decimal_from_dms(self.degrees, self.minutes, self.seconds)
    }

    fn is_negative(&self) -> bool {
        self.degrees < 0. || self.minutes < 0. || self.seconds < 0.
    }
}

impl From<Dms> for Angle {
    fn from(dms: Dms) -> Self {
        Angle::new::<degree>(dms.to_decimal_degrees())
    }
}

impl From<Angle> for Dms {
    fn from(angle: Angle) -> Self {
        Dms::from_decimal_degrees(angle.get::<degree>())
    }
}

impl fmt::Display for Dms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut degrees = self.degrees.abs();
        let mut minutes = self.minutes.abs();
        let mut seconds = self.seconds.abs();
        // seconds that round up to a whole minute at four decimal places carry over
        if (seconds * 1e4).round() >= 60e4 {
            seconds = (seconds - 60.).max(0.);
            minutes += 1.;
            if minutes >= 60. {
                minutes -= 60.;
                degrees += 1.;
            }
        }
        write!(
            f,
            "{}{degrees}°{minutes}′{seconds:.4}″",
            if self.is_negative() { "-" } else { "" },
        )
    }
}

/// Wraps a longitude into [-180°, 180°) and returns it in radians.
pub(crate) fn signed_longitude(longitude: Angle) -> f64 {
    let turn = std::f64::consts::TAU;
    let wrapped = longitude.get::<radian>().rem_euclid(turn);
    if wrapped < std::f64::consts::PI {
        wrapped
    } else {
        wrapped - turn
    }
}
