//! Floating point math that resolves to either `std` or `libm` depending on features.
//!
//! The rest of the crate calls these free functions rather than the inherent `f64` methods, so
//! that enabling `libm` (without `std`) gives the same results on every platform. Only `trunc`,
//! `rem_euclid`, and the degree/radian conversions are used directly; those are exact.
//! [`Trig`] adds the powers and reciprocals of the trigonometric functions that the Ordnance
//! Survey transverse Mercator equations are written in terms of.

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!(
    "osgrid requires floating-point math support. \
     Enable either the `std` feature (default) or the `libm` feature."
);

#[cfg(feature = "std")]
mod imp {
    #[inline]
    pub fn sin(x: f64) -> f64 {
        x.sin()
    }

    #[inline]
    pub fn cos(x: f64) -> f64 {
        x.cos()
    }

    #[inline]
    pub fn tan(x: f64) -> f64 {
        x.tan()
    }

    #[cfg(any(test, feature = "approx"))]
    #[inline]
    pub fn asin(x: f64) -> f64 {
        x.asin()
    }

    #[inline]
    pub fn atan(x: f64) -> f64 {
        x.atan()
    }

    #[inline]
    pub fn atan2(y: f64, x: f64) -> f64 {
        y.atan2(x)
    }

    #[inline]
    pub fn sqrt(x: f64) -> f64 {
        x.sqrt()
    }

    #[inline]
    pub fn hypot(x: f64, y: f64) -> f64 {
        x.hypot(y)
    }

    #[inline]
    pub fn powf(x: f64, y: f64) -> f64 {
        x.powf(y)
    }

    #[inline]
    pub fn powi(x: f64, n: i32) -> f64 {
        x.powi(n)
    }
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
mod imp {
    #[inline]
    pub fn sin(x: f64) -> f64 {
        libm::sin(x)
    }

    #[inline]
    pub fn cos(x: f64) -> f64 {
        libm::cos(x)
    }

    #[inline]
    pub fn tan(x: f64) -> f64 {
        libm::tan(x)
    }

    #[cfg(any(test, feature = "approx"))]
    #[inline]
    pub fn asin(x: f64) -> f64 {
        libm::asin(x)
    }

    #[inline]
    pub fn atan(x: f64) -> f64 {
        libm::atan(x)
    }

    #[inline]
    pub fn atan2(y: f64, x: f64) -> f64 {
        libm::atan2(y, x)
    }

    #[inline]
    pub fn sqrt(x: f64) -> f64 {
        libm::sqrt(x)
    }

    #[inline]
    pub fn hypot(x: f64, y: f64) -> f64 {
        libm::hypot(x, y)
    }

    #[inline]
    pub fn powf(x: f64, y: f64) -> f64 {
        libm::pow(x, y)
    }

    #[inline]
    pub fn powi(x: f64, n: i32) -> f64 {
        libm::pow(x, f64::from(n))
    }
}

#[cfg(any(test, feature = "approx"))]
pub(crate) use imp::asin;
pub(crate) use imp::{atan, atan2, cos, hypot, powf, powi, sin, sqrt, tan};

/// Trigonometric shorthands for an angle in radians.
pub(crate) trait Trig {
    fn sin2(self) -> f64;
    fn tan2(self) -> f64;
    fn tan4(self) -> f64;
    fn tan6(self) -> f64;
    fn sec(self) -> f64;
}

impl Trig for f64 {
    #[inline]
    fn sin2(self) -> f64 {
        let s = sin(self);
        s * s
    }

    #[inline]
    fn tan2(self) -> f64 {
        let t = tan(self);
        t * t
    }

    #[inline]
    fn tan4(self) -> f64 {
        let t2 = self.tan2();
        t2 * t2
    }

    #[inline]
    fn tan6(self) -> f64 {
        let t2 = self.tan2();
        t2 * t2 * t2
    }

    #[inline]
    fn sec(self) -> f64 {
        1. / cos(self)
    }
}
