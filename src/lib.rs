//! This library converts between British and Irish national grid references, latitude and
//! longitude, and earth-centred cartesian coordinates, and moves positions between the datums
//! those grids are defined on.
//!
//! The building blocks are:
//!
//! - [`GridPoint`]: northings and eastings on a [`Projection`] (one of the registered
//!   [`ProjectionId`]s, or your own).
//! - [`GeodeticPoint`]: latitude, longitude, and ellipsoidal height on an [`Ellipsoid`].
//! - [`CartesianPoint`]: earth-centred, earth-fixed x, y, z.
//! - [`HelmertParameters`]: the seven-parameter similarity transformation between two datums'
//!   cartesian frames (registered ones are listed in [`TransformationId`]).
//!
//! None of the point types record which grid, ellipsoid, or datum they belong to, so every
//! conversion names the one it uses. [`DatumConversion`] bundles up the usual chain of grid to
//! latitude/longitude to cartesian, Helmert transformation, and back to latitude/longitude.
//! All quantities are [`uom`] types; [`Converter`] offers the same operations on plain `f64`s
//! (radians and meters) with string registry keys.
//!
//! # Examples
//!
//! The worked example from the Ordnance Survey's guide to coordinate systems in Great Britain:
//!
//! ```
//! use osgrid::{Dms, Ellipsoid, EllipsoidId, GridPoint, ProjectionId};
//! use uom::si::{angle::degree, length::meter};
//!
//! let grid = GridPoint::from_meters(313_177.270, 651_409.903)?;
//!
//! // national grid references are on OSGB36, ie the Airy 1830 ellipsoid
//! let osgb36 = grid.to_geodetic(ProjectionId::NationalGrid)?;
//! let expected = Dms::new(52., 39., 27.2531).to_decimal_degrees();
//! assert!((osgb36.latitude().get::<degree>() - expected).abs() < 1e-7);
//!
//! let airy: Ellipsoid = EllipsoidId::Airy1830.into();
//! let cartesian = osgb36.with_height(uom::si::f64::Length::new::<meter>(24.7))?.to_cartesian(&airy);
//! assert!((cartesian.z().get::<meter>() - 5_047_168.208).abs() < 0.01);
//!
//! // and the same place as a GNSS receiver would report it
//! let etrs89 = grid.to_etrs89()?;
//! println!("{grid} is at {etrs89}");
//! # Ok::<(), osgrid::Error>(())
//! ```
//!
//! # Features
//!
//! - `std` (default) or `libm`: where floating point math comes from.
//! - `serde` (default): (de)serialisation of the point types, registries, and [`Settings`].
//! - `approx` (default): [`approx`] comparisons of the point types with a length tolerance.
//!
//! The library logs through the [`log`] facade: solver iterations at `trace`, conversion stages
//! at `debug`, and registry fallbacks at `warn`.

#[macro_use]
mod registry;

mod angle;
mod cartesian;
mod converter;
mod datum;
mod ellipsoid;
mod error;
mod float_math;
mod geodetic;
mod grid;
mod helmert;
mod projection;
mod settings;

pub(crate) type Point3 = nalgebra::Point3<f64>;
pub(crate) type Vector3 = nalgebra::Vector3<f64>;
pub(crate) type Matrix3 = nalgebra::Matrix3<f64>;

pub use angle::{decimal_from_dms, Dms};
pub use cartesian::CartesianPoint;
pub use converter::Converter;
pub use datum::{convert_datum, Datum, DatumConversion};
pub use ellipsoid::{Ellipsoid, EllipsoidId};
pub use error::{Error, Registry, Result, Solver};
pub use geodetic::{GeodeticComponents, GeodeticPoint, LatitudeEstimate, LatitudeIterations};
pub use grid::{GridComponents, GridPoint};
pub use helmert::{HelmertParameters, TransformationId};
pub use projection::{ArcEstimate, MeridionalArcIterations, Projection, ProjectionId, TrueOrigin};
pub use settings::{Convergence, Settings, UnknownKeyPolicy};
