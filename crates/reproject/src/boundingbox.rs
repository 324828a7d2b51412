//! Dataset bounding box in the target reference, used for map framing.

use approx::{AbsDiffEq, RelativeEq};
use gdal::vector::LayerAccess;

use crate::{CoordinateTransformer, Error, Point, Result};

/// Native extent of a layer in its own spatial reference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerExtent {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl LayerExtent {
    pub fn from_layer<L: LayerAccess>(layer: &L) -> Result<Self> {
        let envelope = layer
            .get_extent()
            .map_err(|err| Error::Runtime(format!("Failed to obtain the extent of layer '{}' ({err})", layer.name())))?;

        Ok(LayerExtent {
            min_x: envelope.MinX,
            max_x: envelope.MaxX,
            min_y: envelope.MinY,
            max_y: envelope.MaxY,
        })
    }

    pub fn lower_left(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    pub fn upper_right(&self) -> Point {
        Point::new(self.max_x, self.max_y)
    }
}

/// Axis aligned box in the target reference
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox { min_x, min_y, max_x, max_y }
    }

    /// The corners are taken as given, no re-ordering is applied
    pub fn from_corners(lower_left: Point, upper_right: Point) -> Self {
        BoundingBox::new(lower_left.x(), lower_left.y(), upper_right.x(), upper_right.y())
    }

    /// Expand the box by `margin` on every side
    pub fn padded(&self, margin: f64) -> Self {
        BoundingBox::new(
            self.min_x - margin,
            self.min_y - margin,
            self.max_x + margin,
            self.max_y + margin,
        )
    }

    pub fn lower_left(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    pub fn upper_right(&self) -> Point {
        Point::new(self.max_x, self.max_y)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn is_inverted(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// `[min_x, min_y, max_x, max_y]`
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

impl AbsDiffEq for BoundingBox {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.lower_left().abs_diff_eq(&other.lower_left(), epsilon) && self.upper_right().abs_diff_eq(&other.upper_right(), epsilon)
    }
}

impl RelativeEq for BoundingBox {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        Point::relative_eq(&self.lower_left(), &other.lower_left(), epsilon, max_relative)
            && Point::relative_eq(&self.upper_right(), &other.upper_right(), epsilon, max_relative)
    }
}

/// Transform the two diagonal corners of the extent and pad the result.
///
/// Only the lower-left and upper-right corners are transformed, this is exact for
/// projections that keep the corner ordering and an approximation otherwise.
pub fn transform_extent(extent: &LayerExtent, transformer: &CoordinateTransformer, margin: f64) -> Result<BoundingBox> {
    if margin.is_nan() || margin < 0.0 {
        return Err(Error::InvalidArgument(format!("Bounding box margin must be non-negative, got {margin}")));
    }

    let lower_left = transformer.transform_point(extent.lower_left())?;
    let upper_right = transformer.transform_point(extent.upper_right())?;

    let bbox = BoundingBox::from_corners(lower_left, upper_right);
    if bbox.is_inverted() {
        log::warn!("Transformed extent corners are inverted: {bbox:?}, the bounding box is an approximation");
    }

    Ok(bbox.padded(margin))
}

/// Bounding box of the layer in the target reference of the transformer, expanded by `margin`
pub fn compute_bounding_box<L: LayerAccess>(layer: &L, transformer: &CoordinateTransformer, margin: f64) -> Result<BoundingBox> {
    let extent = LayerExtent::from_layer(layer)?;
    log::debug!("Native extent of layer '{}': {extent:?}", layer.name());
    transform_extent(&extent, transformer, margin)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::crs;

    #[test]
    fn padding() {
        let bbox = BoundingBox::new(10.0, 20.0, 30.0, 40.0);
        let padded = bbox.padded(0.1);
        assert_eq!(padded.to_array(), [10.0 - 0.1, 20.0 - 0.1, 30.0 + 0.1, 40.0 + 0.1]);
        assert_eq!(bbox.padded(0.0), bbox);
    }

    #[test]
    fn corners_are_not_reordered() {
        let bbox = BoundingBox::from_corners(Point::new(5.0, 5.0), Point::new(1.0, 1.0));
        assert!(bbox.is_inverted());
        assert_eq!(bbox.lower_left(), Point::new(5.0, 5.0));
        assert_eq!(bbox.width(), -4.0);
    }

    #[test]
    fn identity_extent() {
        let trans = CoordinateTransformer::from_epsg(crs::epsg::WGS84, crs::epsg::WGS84).unwrap();
        let extent = LayerExtent {
            min_x: 10.0,
            max_x: 30.0,
            min_y: 20.0,
            max_y: 40.0,
        };

        let bbox = transform_extent(&extent, &trans, 0.1).unwrap();
        assert_relative_eq!(bbox, BoundingBox::new(9.9, 19.9, 30.1, 40.1), epsilon = 1e-9);
    }

    #[test]
    fn projected_extent() {
        let trans = CoordinateTransformer::from_epsg(crs::epsg::WGS84_WEB_MERCATOR, crs::epsg::WGS84).unwrap();
        let extent = LayerExtent {
            min_x: 0.0,
            max_x: 111_319.490_793_273_57,
            min_y: 0.0,
            max_y: 0.0,
        };

        let bbox = transform_extent(&extent, &trans, 0.5).unwrap();
        assert_relative_eq!(bbox, BoundingBox::new(-0.5, -0.5, 1.5, 0.5), epsilon = 1e-6);
    }

    #[test]
    fn negative_margin() {
        let trans = CoordinateTransformer::from_epsg(crs::epsg::WGS84, crs::epsg::WGS84).unwrap();
        let extent = LayerExtent {
            min_x: 0.0,
            max_x: 1.0,
            min_y: 0.0,
            max_y: 1.0,
        };

        assert!(matches!(transform_extent(&extent, &trans, -1.0), Err(Error::InvalidArgument(_))));
    }
}
