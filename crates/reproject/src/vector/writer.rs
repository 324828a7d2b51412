//! Creation of the reprojected shapefile next to the input dataset.

use std::path::{Path, PathBuf};

use gdal::vector::{Layer, LayerOptions};
use gdal::{Dataset, DriverManager};
use gdal_sys::OGRwkbGeometryType;

use super::VectorFormat;
use crate::{Error, Result, SpatialReference};

const SHAPEFILE_SIDECARS: [&str; 7] = ["shp", "shx", "dbf", "prj", "cpg", "qix", "sbn"];

/// Attribute values are stored as UTF-8 in the dbf, a `.cpg` sidecar records the encoding
pub(crate) const SHAPEFILE_LAYER_OPTIONS: &[&str] = &["ENCODING=UTF-8"];

/// Derive the output path `<dir>/<stem><suffix>.shp` of an input dataset.
///
/// A stem that already ends with the suffix is not suffixed again.
pub fn output_path(input: &Path, suffix: &str) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| Error::InvalidPath(input.to_path_buf()))?;

    let stem = match stem.strip_suffix(suffix) {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => stem,
    };

    Ok(input.with_file_name(format!("{stem}{suffix}.shp")))
}

/// The `.prj` sidecar that holds the spatial reference of a shapefile
pub fn projection_path(shapefile: &Path) -> PathBuf {
    shapefile.with_extension("prj")
}

fn shapefile_driver() -> Result<gdal::Driver> {
    Ok(DriverManager::get_driver_by_name(VectorFormat::ShapeFile.gdal_driver_name())?)
}

/// Remove the shapefile and all of its sidecar files
pub fn delete_shapefile(path: &Path) -> Result<()> {
    if path.exists() {
        if let Err(err) = shapefile_driver().and_then(|driver| Ok(driver.delete(path)?)) {
            log::debug!("Driver delete of '{}' failed: {err}", path.display());
        }
    }

    for ext in SHAPEFILE_SIDECARS {
        let sidecar = path.with_extension(ext);
        if sidecar.exists() {
            std::fs::remove_file(&sidecar).map_err(|err| Error::write(&sidecar, err))?;
        }
    }

    Ok(())
}

/// A polygon shapefile under construction.
///
/// The dataset contains a single layer named after the file stem carrying the target spatial reference.
/// Call [`OutputDataset::close`] to finish the dataset or [`OutputDataset::discard`] to remove it again.
pub struct OutputDataset {
    path: PathBuf,
    dataset: Dataset,
}

impl OutputDataset {
    /// Create the output shapefile, an existing dataset at the location is replaced
    pub fn create(path: &Path, srs: &SpatialReference) -> Result<Self> {
        let layer_name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))?;

        if path.exists() {
            log::info!("Replacing existing output '{}'", path.display());
            delete_shapefile(path)?;
        }

        let driver = shapefile_driver()?;
        let mut dataset = driver.create_vector_only(path).map_err(|err| Error::write(path, err))?;

        let layer_options = LayerOptions {
            name: layer_name,
            srs: Some(srs.srs()),
            ty: OGRwkbGeometryType::wkbPolygon,
            options: Some(SHAPEFILE_LAYER_OPTIONS),
        };

        let created = dataset.create_layer(layer_options).map(|_| ());
        if let Err(err) = created {
            drop(dataset);
            delete_shapefile(path)?;
            return Err(Error::write(path, err));
        }

        log::debug!("Created output dataset '{}'", path.display());
        Ok(OutputDataset {
            path: path.to_path_buf(),
            dataset,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The output layer
    pub fn layer(&self) -> Result<Layer<'_>> {
        self.dataset.layer(0).map_err(|err| Error::write(&self.path, err))
    }

    /// Write the `.prj` sidecar containing the reference in the ESRI WKT dialect
    pub fn write_projection_file(&self, srs: &SpatialReference) -> Result<PathBuf> {
        let prj = projection_path(&self.path);
        std::fs::write(&prj, srs.to_esri_wkt()?).map_err(|err| Error::write(&prj, err))?;
        log::debug!("Wrote projection file '{}'", prj.display());
        Ok(prj)
    }

    /// Flush and close the dataset, when closing fails the output is removed
    pub fn close(self) -> Result<PathBuf> {
        let OutputDataset { path, dataset } = self;
        if let Err(err) = dataset.close() {
            if let Err(cleanup_err) = delete_shapefile(&path) {
                log::warn!("Failed to remove incomplete output '{}': {cleanup_err}", path.display());
            }

            return Err(Error::write(path, err));
        }

        Ok(path)
    }

    /// Close and remove the output
    pub fn discard(self) {
        let OutputDataset { path, dataset } = self;
        drop(dataset);

        match delete_shapefile(&path) {
            Ok(()) => log::info!("Removed incomplete output '{}'", path.display()),
            Err(err) => log::warn!("Failed to remove incomplete output '{}': {err}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use gdal::vector::LayerAccess;

    use super::*;
    use crate::crs;
    use crate::vector::io::{LayerAccessExtension, dataset};

    #[test]
    fn output_naming() {
        assert_eq!(
            output_path(Path::new("data/zipcodes.shp"), "-reprojected").unwrap(),
            PathBuf::from("data/zipcodes-reprojected.shp")
        );
        assert_eq!(
            output_path(Path::new("data/zipcodes-reprojected.shp"), "-reprojected").unwrap(),
            PathBuf::from("data/zipcodes-reprojected.shp")
        );
        assert_eq!(
            output_path(Path::new("/tmp/nyc.SHP"), "_correct_CRS").unwrap(),
            PathBuf::from("/tmp/nyc_correct_CRS.shp")
        );
        assert_eq!(
            output_path(Path::new("-reprojected.shp"), "-reprojected").unwrap(),
            PathBuf::from("-reprojected-reprojected.shp")
        );
        assert!(matches!(output_path(Path::new("/"), "-reprojected"), Err(Error::InvalidPath(_))));
    }

    #[test_log::test]
    fn create_output_dataset() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("out.shp");
        let srs = SpatialReference::from_epsg(crs::epsg::WGS84_WEB_MERCATOR)?;

        let output = OutputDataset::create(&path, &srs)?;
        assert_eq!(output.layer()?.name(), "out");
        let prj = output.write_projection_file(&srs)?;
        assert_eq!(output.close()?, path);

        assert_eq!(prj, tmp.path().join("out.prj"));
        assert_eq!(std::fs::read_to_string(&prj)?, srs.to_esri_wkt()?);

        let ds = dataset::open_read_only(&path)?;
        let layer = dataset::open_layer(&ds, None)?;
        assert_eq!(layer.name(), "out");
        assert_eq!(layer.geometry_type(), OGRwkbGeometryType::wkbPolygon);
        assert!(layer.spatial_ref().is_some());
        assert_eq!(std::fs::read_to_string(tmp.path().join("out.cpg"))?.trim(), "UTF-8");
        Ok(())
    }

    #[test_log::test]
    fn existing_output_is_replaced() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("out.shp");
        let srs = SpatialReference::from_epsg(crs::epsg::WGS84)?;

        {
            let output = OutputDataset::create(&path, &srs)?;
            let layer = output.layer()?;
            let mut feature = gdal::vector::Feature::new(layer.defn())?;
            feature.set_geometry(gdal::vector::Geometry::from_wkt("POLYGON ((0 0,1 0,1 1,0 0))")?)?;
            feature.create(&layer)?;
            drop(feature);
            drop(layer);
            output.close()?;
        }

        OutputDataset::create(&path, &srs)?.close()?;

        let ds = dataset::open_read_only(&path)?;
        assert_eq!(dataset::open_layer(&ds, None)?.feature_count(), 0);
        Ok(())
    }

    #[test_log::test]
    fn discard_removes_all_files() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("out.shp");
        let srs = SpatialReference::from_epsg(crs::epsg::WGS84)?;

        let output = OutputDataset::create(&path, &srs)?;
        output.write_projection_file(&srs)?;
        output.discard();

        assert_eq!(std::fs::read_dir(tmp.path())?.count(), 0);
        Ok(())
    }
}
