//! End to end reprojection of a polygon dataset to a new shapefile.

use std::path::{Path, PathBuf};

use bon::bon;
use gdal::vector::{Layer, LayerAccess};

use crate::crs::{self, Epsg};
use crate::vector::io::{LayerAccessExtension, dataset};
use crate::vector::reproject::{FeatureSummary, TransformFailurePolicy, reproject_features};
use crate::vector::schema::{FieldDefinition, copy_schema, read_schema};
use crate::vector::writer::{self, OutputDataset};
use crate::{BoundingBox, CoordinateTransformer, Error, Result, compute_bounding_box, resolve_references};

pub const DEFAULT_MARGIN: f64 = 0.1;
pub const DEFAULT_OUTPUT_SUFFIX: &str = "-reprojected";

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReprojectionOptions {
    /// Spatial reference of the output
    pub target: Epsg,
    /// Padding applied on every side of the bounding box, in target units
    pub margin: f64,
    /// Appended to the input file stem to name the output
    pub output_suffix: String,
    pub on_transform_error: TransformFailurePolicy,
    /// Layer to reproject, the first layer of the dataset when not provided
    pub layer: Option<String>,
}

#[bon]
impl ReprojectionOptions {
    #[builder]
    pub fn new(
        target: Option<Epsg>,
        margin: Option<f64>,
        output_suffix: Option<&str>,
        on_transform_error: Option<TransformFailurePolicy>,
        layer: Option<&str>,
    ) -> Self {
        Self {
            target: target.unwrap_or(crs::epsg::WGS84),
            margin: margin.unwrap_or(DEFAULT_MARGIN),
            output_suffix: output_suffix.unwrap_or(DEFAULT_OUTPUT_SUFFIX).to_string(),
            on_transform_error: on_transform_error.unwrap_or_default(),
            layer: layer.map(str::to_string),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(Error::InvalidArgument(format!("Margin must be a non-negative number, got {}", self.margin)));
        }

        if self.output_suffix.is_empty() {
            return Err(Error::InvalidArgument("Output suffix should not be empty".to_string()));
        }

        if self.output_suffix.contains(['/', '\\']) {
            return Err(Error::InvalidArgument(format!(
                "Output suffix should not contain path separators: '{}'",
                self.output_suffix
            )));
        }

        Ok(())
    }
}

impl Default for ReprojectionOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Result of a successful reprojection run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReprojectionOutput {
    pub output_path: PathBuf,
    pub projection_path: PathBuf,
    pub features_read: usize,
    pub features_written: usize,
    /// Features left out because their geometry could not be transformed
    pub skipped_features: Vec<Option<u64>>,
    pub source_wkt: String,
    pub target_wkt: String,
    /// Padded extent in the target reference, `None` for a dataset without features
    pub bounding_box: Option<BoundingBox>,
}

/// Reproject the polygon layer of `input` to a new shapefile next to it.
///
/// Nothing is written when the spatial references cannot be resolved. When a failure occurs
/// after the output was created, the output is removed again.
pub fn reproject_dataset(input: &Path, options: &ReprojectionOptions) -> Result<ReprojectionOutput> {
    options.validate()?;

    let output_path = writer::output_path(input, &options.output_suffix)?;
    if is_same_dataset(&output_path, input) {
        return Err(Error::InvalidArgument(format!(
            "Output would overwrite the input dataset '{}'",
            input.display()
        )));
    }

    let input_ds = dataset::open_read_only(input)?;
    let mut input_layer = dataset::open_layer(&input_ds, options.layer.as_deref())?;
    input_layer.ensure_polygon_layer()?;

    let references = resolve_references(&input_layer, options.target)?;
    let source_wkt = references.source.to_wkt()?;
    let target_wkt = references.target.to_wkt()?;
    let transformer = CoordinateTransformer::new(references.source, references.target)?;

    log::info!(
        "Reprojecting '{}' ({} features) to {}",
        input.display(),
        input_layer.feature_count(),
        options.target
    );

    let bounding_box = layer_bounding_box(&input_layer, &transformer, options)?;
    let fields = read_schema(&input_layer);

    let output = OutputDataset::create(&output_path, transformer.target_srs())?;
    let (summary, projection_path) = match write_output(&output, &mut input_layer, &fields, &transformer, options.on_transform_error) {
        Ok(result) => result,
        Err(err) => {
            output.discard();
            return Err(err);
        }
    };

    let output_path = output.close()?;
    log::info!("Wrote '{}'", output_path.display());

    drop(input_layer);
    input_ds.close()?;

    Ok(ReprojectionOutput {
        output_path,
        projection_path,
        features_read: summary.features_read,
        features_written: summary.features_written,
        skipped_features: summary.skipped,
        source_wkt,
        target_wkt,
        bounding_box,
    })
}

/// Case-insensitive, `x.SHP` and `x.shp` share their sidecar files
fn is_same_dataset(output: &Path, input: &Path) -> bool {
    output.to_string_lossy().to_lowercase() == input.to_string_lossy().to_lowercase()
}

fn layer_bounding_box(layer: &Layer, transformer: &CoordinateTransformer, options: &ReprojectionOptions) -> Result<Option<BoundingBox>> {
    if layer.feature_count() == 0 {
        log::warn!("Layer '{}' contains no features, no bounding box is computed", layer.name());
        return Ok(None);
    }

    match compute_bounding_box(layer, transformer, options.margin) {
        Ok(bbox) => Ok(Some(bbox)),
        Err(err @ Error::Transform { .. }) if options.on_transform_error != TransformFailurePolicy::Abort => {
            log::warn!("No bounding box available: {err}");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn write_output(
    output: &OutputDataset,
    input_layer: &mut Layer,
    fields: &[FieldDefinition],
    transformer: &CoordinateTransformer,
    policy: TransformFailurePolicy,
) -> Result<(FeatureSummary, PathBuf)> {
    let output_layer = output.layer()?;
    copy_schema(fields, &output_layer)?;

    let summary = reproject_features(input_layer, &output_layer, transformer, policy)?;
    let projection_path = output.write_projection_file(transformer.target_srs())?;
    Ok((summary, projection_path))
}
