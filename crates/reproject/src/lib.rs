#![warn(clippy::unwrap_used)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Reprojection of polygon vector datasets between spatial reference systems.
//!
//! The engine opens a vector dataset, resolves its spatial reference and a target
//! reference, replays every polygon vertex through a coordinate transform and writes
//! a new dataset with an identical attribute schema next to the input.

pub type Result<T = ()> = std::result::Result<T, Error>;

mod boundingbox;
mod coordinatetransformer;
pub mod crs;
mod error;
pub mod gdalinterop;
pub mod reprojection;
mod runtimeconfiguration;
mod spatialreference;
#[cfg(any(test, feature = "testutils"))]
pub mod testutils;
pub mod vector;

#[doc(inline)]
pub use boundingbox::{BoundingBox, LayerExtent, compute_bounding_box};
#[doc(inline)]
pub use coordinatetransformer::CoordinateTransformer;
#[doc(inline)]
pub use crs::Epsg;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use reprojection::{ReprojectionOptions, ReprojectionOutput, reproject_dataset};
pub use runtimeconfiguration::RuntimeConfiguration;
#[doc(inline)]
pub use spatialreference::{ReferencePair, SpatialReference, resolve_references};
#[doc(inline)]
pub use vector::reproject::TransformFailurePolicy;

pub type Point<T = f64> = geo_types::Point<T>;

#[cfg(test)]
mod tests {
    #[ctor::ctor]
    fn init() {
        crate::testutils::configure_gdal();
    }
}
