//! Replay the vertices of polygon features through a coordinate transform.

use gdal::vector::{Geometry, LayerAccess, geometry_type_flatten, geometry_type_to_name};
use gdal_sys::OGRwkbGeometryType;

use crate::vector::feature::{feature_records, geometry_points};
use crate::vector::io::LayerAccessExtension;
use crate::{CoordinateTransformer, Error, Result, gdalinterop};

/// What to do when a vertex cannot be mapped to the target reference
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransformFailurePolicy {
    /// Stop the run and report the failing feature and coordinate
    #[default]
    Abort,
    /// Leave the feature out of the output
    SkipFeature,
    /// Replace the failing vertex with `(value, value)`
    Sentinel(f64),
}

/// Counts of a single pass over the input features
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSummary {
    pub features_read: usize,
    pub features_written: usize,
    /// Ids of the features left out because of transform failures
    pub skipped: Vec<Option<u64>>,
}

/// Create a reprojected deep copy of the geometry.
///
/// The ring/part structure and the vertex count are preserved, Z values are passed through unchanged.
pub fn reproject_geometry(geometry: &Geometry, transformer: &CoordinateTransformer, policy: TransformFailurePolicy) -> Result<Geometry> {
    if geometry.is_empty() {
        return Ok(geometry.clone());
    }

    let part_count = geometry.geometry_count();
    if part_count == 0 {
        return reproject_vertices(geometry, transformer, policy);
    }

    let mut result = Geometry::empty(geometry.geometry_type())?;
    for index in 0..part_count {
        let part = geometry.get_geometry(index);
        result.add_geometry(reproject_geometry(&part, transformer, policy)?)?;
    }

    Ok(result)
}

fn reproject_vertices(geometry: &Geometry, transformer: &CoordinateTransformer, policy: TransformFailurePolicy) -> Result<Geometry> {
    let points = geometry_points(geometry);
    let mut xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let mut ys: Vec<f64> = points.iter().map(|p| p.1).collect();

    // Failed vertices can be reported as infinite values instead of an error
    let batch_succeeded = match transformer.transform_coords_in_place(&mut xs, &mut ys) {
        Ok(()) => xs.iter().chain(&ys).all(|v| v.is_finite()),
        Err(err) => {
            log::debug!("Batch transform failed ({err}), transforming the vertices one by one");
            false
        }
    };

    if !batch_succeeded {
        for (index, &(x, y, _)) in points.iter().enumerate() {
            match (transformer.transform_xy(x, y), policy) {
                (Ok((tx, ty)), _) => {
                    xs[index] = tx;
                    ys[index] = ty;
                }
                (Err(err), TransformFailurePolicy::Sentinel(value)) => {
                    log::debug!("{err}, substituting ({value}, {value})");
                    xs[index] = value;
                    ys[index] = value;
                }
                (Err(err), _) => return Err(err),
            }
        }
    }

    // The clone keeps the geometry class (e.g. linear ring), only the coordinates get replaced
    let mut result = geometry.clone();
    let has_z = gdalinterop::geometry_type_has_z(geometry.geometry_type());
    for (index, &(_, _, z)) in points.iter().enumerate() {
        if has_z {
            result.set_point(index, (xs[index], ys[index], z));
        } else {
            result.set_point_2d(index, (xs[index], ys[index]));
        }
    }

    Ok(result)
}

fn ensure_polygon_geometry(geometry: &Geometry, fid: Option<u64>) -> Result<()> {
    match geometry_type_flatten(geometry.geometry_type()) {
        OGRwkbGeometryType::wkbPolygon | OGRwkbGeometryType::wkbMultiPolygon => Ok(()),
        other => Err(Error::InvalidArgument(format!(
            "Feature {} has an unsupported geometry type: {}",
            fid.map_or("-".to_string(), |fid| fid.to_string()),
            geometry_type_to_name(other)
        ))),
    }
}

/// Reproject every feature of `input` and append it to `output`.
///
/// The input is iterated once in storage order and the output order follows it. The output
/// layer must already carry the schema of the input layer.
pub fn reproject_features<I, O>(
    input: &mut I,
    output: &O,
    transformer: &CoordinateTransformer,
    policy: TransformFailurePolicy,
) -> Result<FeatureSummary>
where
    I: LayerAccess,
    O: LayerAccessExtension,
{
    let mut summary = FeatureSummary::default();

    for mut record in feature_records(input) {
        summary.features_read += 1;

        if let Some(geometry) = record.geometry() {
            ensure_polygon_geometry(geometry, record.fid())?;
        }

        match record.geometry().map(|geom| reproject_geometry(geom, transformer, policy)).transpose() {
            Ok(geometry) => record.set_geometry(geometry),
            Err(err @ Error::Transform { .. }) if policy == TransformFailurePolicy::SkipFeature => {
                let err = err.with_feature(record.fid());
                log::warn!("Skipping feature: {err}");
                summary.skipped.push(record.fid());
                continue;
            }
            Err(err) => return Err(err.with_feature(record.fid())),
        }

        record.append_to(output)?;
        summary.features_written += 1;
    }

    log::info!(
        "Reprojected {} of {} features ({} skipped)",
        summary.features_written,
        summary.features_read,
        summary.skipped.len()
    );

    Ok(summary)
}
