/// Low level functions to work with gdal vector datasets
use gdal::vector::{Layer, LayerAccess, geometry_type_flatten, geometry_type_to_name};
use gdal_sys::OGRwkbGeometryType;

use crate::{Error, Result};

use super::VectorFormat;

pub mod dataset {
    use std::path::Path;

    use super::*;

    use ::gdal::{Dataset, DatasetOptions, DriverManager, GdalOpenFlags, errors::GdalError};

    fn open_with_options(path: &Path, options: DatasetOptions) -> Result<Dataset> {
        Dataset::open_ex(path, options).map_err(|err| match err {
            // Match on the error to give a cleaner error message when the file does not exist
            GdalError::NullPointer { method_name: _, msg: _ } => {
                let vec_type = VectorFormat::guess_from_path(path);
                if vec_type != VectorFormat::Unknown && DriverManager::get_driver_by_name(vec_type.gdal_driver_name()).is_err() {
                    return Error::DatasetOpen {
                        path: path.to_path_buf(),
                        msg: format!("Gdal driver not supported: {}", vec_type.gdal_driver_name()),
                    };
                }

                if !path.exists() {
                    return Error::DatasetOpen {
                        path: path.to_path_buf(),
                        msg: "No such file".to_string(),
                    };
                }

                Error::DatasetOpen {
                    path: path.to_path_buf(),
                    msg: "Not a recognized vector dataset".to_string(),
                }
            }
            _ => Error::DatasetOpen {
                path: path.to_path_buf(),
                msg: err.to_string(),
            },
        })
    }

    /// Open a GDAL vector dataset for reading
    pub fn open_read_only(path: &Path) -> Result<Dataset> {
        let options = DatasetOptions {
            open_flags: GdalOpenFlags::GDAL_OF_READONLY | GdalOpenFlags::GDAL_OF_VECTOR,
            ..Default::default()
        };

        let ds = open_with_options(path, options)?;
        log::debug!("Opened vector dataset '{}' ({} layers)", path.display(), ds.layer_count());
        Ok(ds)
    }

    /// Open a layer of the dataset, the first layer is used when no name is provided
    pub fn open_layer<'a>(ds: &'a Dataset, layer: Option<&str>) -> Result<Layer<'a>> {
        match layer {
            Some(layer_name) => ds.layer_by_name(layer_name).map_err(|err| {
                log::debug!("{err}");
                Error::InvalidArgument(format!("Layer '{layer_name}' not found in dataset"))
            }),
            None => {
                if ds.layer_count() == 0 {
                    return Err(Error::InvalidArgument("Dataset does not contain any layers".to_string()));
                }

                Ok(ds.layer(0)?)
            }
        }
    }
}

/// [`gdal::vector::LayerAccess`] extension trait that implements missing functionality
/// for working with GDAL vector layers
pub trait LayerAccessExtension
where
    Self: LayerAccess,
{
    /// The geometry type declared by the layer
    fn geometry_type(&self) -> OGRwkbGeometryType::Type {
        unsafe { gdal_sys::OGR_L_GetGeomType(self.c_layer()) }
    }

    /// Layers declared as (multi)polygon, with or without Z, are accepted
    fn ensure_polygon_layer(&self) -> Result<()> {
        let geometry_type = self.geometry_type();
        match geometry_type_flatten(geometry_type) {
            OGRwkbGeometryType::wkbPolygon | OGRwkbGeometryType::wkbMultiPolygon => Ok(()),
            _ => Err(Error::InvalidArgument(format!(
                "Layer '{}' does not contain polygons (geometry type {})",
                self.name(),
                geometry_type_to_name(geometry_type)
            ))),
        }
    }
}

impl LayerAccessExtension for Layer<'_> {}
