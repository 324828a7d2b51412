use gdal::errors::GdalError;
use gdal::spatial_ref::CoordTransform;

use crate::Error;
use crate::Point;
use crate::crs::Epsg;
use crate::spatialreference::SpatialReference;

/// Maps 2D points from a source to a target spatial reference.
///
/// The transformer keeps its own copies of the references it was built from, transforming
/// points never modifies them.
pub struct CoordinateTransformer {
    source_srs: SpatialReference,
    target_srs: SpatialReference,
    transformer: CoordTransform,
}

impl CoordinateTransformer {
    pub fn new(source_srs: SpatialReference, target_srs: SpatialReference) -> Result<Self, Error> {
        let transformer = CoordTransform::new(source_srs.srs(), target_srs.srs())
            .map_err(|err| Error::ReferenceResolution(format!("No transformation available ({err})")))?;
        Ok(Self {
            source_srs,
            target_srs,
            transformer,
        })
    }

    pub fn from_epsg(source_epsg: Epsg, target_epsg: Epsg) -> Result<Self, Error> {
        let source_srs = SpatialReference::from_epsg(source_epsg)?;
        let target_srs = SpatialReference::from_epsg(target_epsg)?;
        Self::new(source_srs, target_srs)
    }

    pub fn transform_xy(&self, x: f64, y: f64) -> Result<(f64, f64), Error> {
        let mut result_x = [x];
        let mut result_y = [y];
        self.transformer
            .transform_coords(&mut result_x, &mut result_y, &mut [])
            .map_err(|err| transform_error(x, y, err))?;

        if !result_x[0].is_finite() || !result_y[0].is_finite() {
            return Err(Error::Transform {
                feature: None,
                x,
                y,
                msg: "coordinate outside of the valid domain".to_string(),
            });
        }

        Ok((result_x[0], result_y[0]))
    }

    pub fn transform_point(&self, point: Point) -> Result<Point, Error> {
        let (x, y) = self.transform_xy(point.x(), point.y())?;
        Ok(Point::new(x, y))
    }

    pub fn transform_point_in_place(&self, point: &mut Point) -> Result<(), Error> {
        *point = self.transform_point(*point)?;
        Ok(())
    }

    /// Transform a batch of coordinates in place.
    ///
    /// On failure the contents of the slices are unspecified, the reported coordinate is the
    /// first one of the batch because the geodesy library does not tell which point failed.
    /// Use [`CoordinateTransformer::transform_xy`] to pinpoint the offending coordinate.
    pub fn transform_coords_in_place(&self, x: &mut [f64], y: &mut [f64]) -> Result<(), Error> {
        if x.len() != y.len() {
            return Err(Error::InvalidArgument(format!(
                "Coordinate slices have different lengths: {} != {}",
                x.len(),
                y.len()
            )));
        }

        if x.is_empty() {
            return Ok(());
        }

        let (first_x, first_y) = (x[0], y[0]);
        self.transformer
            .transform_coords(x, y, &mut [])
            .map_err(|err| transform_error(first_x, first_y, err))
    }

    pub fn source_srs(&self) -> &SpatialReference {
        &self.source_srs
    }

    pub fn target_srs(&self) -> &SpatialReference {
        &self.target_srs
    }

    pub fn source_projection(&self) -> Result<String, Error> {
        self.source_srs.to_wkt()
    }

    pub fn target_projection(&self) -> Result<String, Error> {
        self.target_srs.to_wkt()
    }
}

fn transform_error(x: f64, y: f64, err: GdalError) -> Error {
    let msg = match err {
        GdalError::InvalidCoordinateRange { msg: Some(msg), .. } => msg,
        GdalError::InvalidCoordinateRange { msg: None, .. } => "coordinate outside of the valid domain".to_string(),
        err => err.to_string(),
    };

    Error::Transform {
        feature: None,
        x,
        y,
        msg,
    }
}
