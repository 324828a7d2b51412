use std::path::{Path, PathBuf};

use gdal::vector::{Feature, FieldValue, Geometry, Layer, LayerAccess, LayerOptions};
use gdal::{Dataset, DriverManager};
use gdal_sys::{OGRFieldType, OGRwkbGeometryType};
use path_macro::path;

use crate::vector::schema::copy_schema;
use crate::vector::writer::SHAPEFILE_LAYER_OPTIONS;
use crate::vector::{FieldDefinition, VectorFormat};
use crate::{Epsg, Error, Result, SpatialReference, gdalinterop};

/// A feature to generate: the geometry as WKT (empty for no geometry) and the field values in schema order
pub type TestFeature<'a> = (&'a str, Vec<FieldValue>);

/// Route the GDAL logging and use the proj database from the build directory when one was provided
pub fn configure_gdal() {
    let data_dir = path!(env!("CARGO_MANIFEST_DIR") / ".." / ".." / "target" / "data");

    let gdal_config = gdalinterop::Config {
        debug_logging: false,
        proj_db_search_location: data_dir.join("proj.db").exists().then_some(data_dir),
        config_options: Vec::default(),
    };

    gdal_config.apply().expect("Failed to configure GDAL");
}

pub fn create_memory_dataset() -> Result<Dataset> {
    let mem_driver = DriverManager::get_driver_by_name(VectorFormat::Memory.gdal_driver_name())?;
    Ok(mem_driver.create_vector_only("in-mem")?)
}

/// Polygon layer without spatial reference and without fields
pub fn create_memory_layer<'a>(ds: &'a mut Dataset, name: &str) -> Result<Layer<'a>> {
    Ok(ds.create_layer(LayerOptions {
        name,
        ty: OGRwkbGeometryType::wkbPolygon,
        ..Default::default()
    })?)
}

/// Write a dataset with a single layer, the driver is derived from the file extension.
/// No spatial reference is stored when `srs` is `None`.
pub fn create_vector_dataset(
    path: &Path,
    srs: Option<Epsg>,
    geometry_type: OGRwkbGeometryType::Type,
    fields: &[FieldDefinition],
    features: &[TestFeature],
) -> Result<()> {
    let layer_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))?;
    let srs = srs.map(SpatialReference::from_epsg).transpose()?;

    let format = VectorFormat::guess_from_path(path);
    let driver = DriverManager::get_driver_by_name(format.gdal_driver_name())?;
    let mut ds = driver.create_vector_only(path)?;
    let layer = ds.create_layer(LayerOptions {
        name: layer_name,
        srs: srs.as_ref().map(SpatialReference::srs),
        ty: geometry_type,
        options: (format == VectorFormat::ShapeFile).then_some(SHAPEFILE_LAYER_OPTIONS),
    })?;

    copy_schema(fields, &layer)?;

    for (wkt, values) in features {
        let mut feature = Feature::new(layer.defn())?;
        for (index, value) in values.iter().enumerate() {
            feature.set_field(index, value)?;
        }

        if !wkt.is_empty() {
            feature.set_geometry(Geometry::from_wkt(wkt)?)?;
        }

        feature.create(&layer)?;
    }

    drop(layer);
    ds.close()?;
    Ok(())
}

pub fn district_fields() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::new("name", OGRFieldType::OFTString).with_width(32),
        FieldDefinition::new("pop", OGRFieldType::OFTInteger).with_width(9),
    ]
}

/// Three polygons (the last one with a hole) covering the extent [10, 20, 30, 40]
pub fn district_features() -> Vec<TestFeature<'static>> {
    vec![
        (
            "POLYGON ((10 20,10 30,20 30,20 20,10 20))",
            vec![FieldValue::StringValue("west".into()), FieldValue::IntegerValue(1200)],
        ),
        (
            "POLYGON ((20 20,20 30,30 30,30 20,20 20))",
            vec![FieldValue::StringValue("east".into()), FieldValue::IntegerValue(3400)],
        ),
        (
            "POLYGON ((10 30,10 40,30 40,30 30,10 30),(15 33,25 33,25 37,15 37,15 33))",
            vec![FieldValue::StringValue("north".into()), FieldValue::IntegerValue(560)],
        ),
    ]
}

/// Write the districts dataset in `dir` and return the path of the shapefile
pub fn create_districts_shapefile(dir: &Path, srs: Option<Epsg>) -> Result<PathBuf> {
    let path = dir.join("districts.shp");
    create_vector_dataset(&path, srs, OGRwkbGeometryType::wkbPolygon, &district_fields(), &district_features())?;
    Ok(path)
}
