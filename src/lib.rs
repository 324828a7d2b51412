//! Polygon dataset reprojection, see the [`reproject`] crate for the implementation.

pub use reproject::*;
