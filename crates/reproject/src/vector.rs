//! Vector dataset access: opening, schema handling, feature reprojection and writing.

pub mod feature;
pub mod io;
pub mod reproject;
pub mod schema;
pub mod writer;

#[doc(inline)]
pub use feature::{AttributeMap, FeatureRecord};
#[doc(inline)]
pub use schema::FieldDefinition;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VectorFormat {
    Memory,
    ShapeFile,
    GeoJson,
    GeoPackage,
    Unknown,
}

impl VectorFormat {
    /// Given a file path, guess the vector type based on the file extension
    pub fn guess_from_path(file_path: &std::path::Path) -> VectorFormat {
        let ext = file_path.extension().map(|ext| ext.to_string_lossy().to_lowercase());

        match ext.as_deref() {
            Some("shp" | "dbf" | "shx") => VectorFormat::ShapeFile,
            Some("json" | "geojson") => VectorFormat::GeoJson,
            Some("gpkg") => VectorFormat::GeoPackage,
            _ => VectorFormat::Unknown,
        }
    }

    pub fn gdal_driver_name(&self) -> &str {
        match self {
            VectorFormat::Memory => "Memory",
            VectorFormat::ShapeFile => "ESRI Shapefile",
            VectorFormat::GeoJson => "GeoJSON",
            VectorFormat::GeoPackage => "GPKG",
            VectorFormat::Unknown => "Unknown",
        }
    }
}
