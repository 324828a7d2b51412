use std::collections::HashMap;

use gdal::vector::{Feature, FieldValue, Geometry, LayerAccess};

use crate::vector::io::LayerAccessExtension;
use crate::{Error, Result, gdalinterop};

/// Attribute values of a feature keyed by field name, `None` for unset or null fields
pub type AttributeMap = HashMap<String, Option<FieldValue>>;

/// A feature detached from its layer: an owned deep copy of the geometry and the attribute values
#[derive(Clone)]
pub struct FeatureRecord {
    fid: Option<u64>,
    geometry: Option<Geometry>,
    attributes: AttributeMap,
}

impl FeatureRecord {
    pub fn new(fid: Option<u64>, geometry: Option<Geometry>, attributes: AttributeMap) -> Self {
        Self { fid, geometry, attributes }
    }

    pub fn from_feature(feature: &Feature) -> Self {
        Self {
            fid: feature.fid(),
            geometry: feature.geometry().cloned(),
            attributes: feature.fields().collect(),
        }
    }

    pub fn fid(&self) -> Option<u64> {
        self.fid
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn set_geometry(&mut self, geometry: Option<Geometry>) {
        self.geometry = geometry;
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&FieldValue> {
        self.attributes.get(name).and_then(Option::as_ref)
    }

    /// Create a new feature on the layer from this record.
    ///
    /// Attribute values are matched on field name against the schema of the target layer,
    /// a target field without a value in the record is a [`Error::SchemaMismatch`].
    /// Z coordinates are dropped when the target layer is declared 2D.
    pub fn append_to<L: LayerAccessExtension>(&self, layer: &L) -> Result<()> {
        let defn = layer.defn();
        let mut feature = Feature::new(defn)?;

        for (index, field) in defn.fields().enumerate() {
            let name = field.name();
            match self.attributes.get(&name) {
                Some(Some(value)) => feature.set_field(index, value)?,
                Some(None) => {}
                None => {
                    return Err(Error::SchemaMismatch {
                        field: name,
                        msg: format!("No value for the field in feature {}", self.fid.map_or("-".to_string(), |fid| fid.to_string())),
                    });
                }
            }
        }

        if let Some(geometry) = &self.geometry {
            let mut geometry = geometry.clone();
            if !gdalinterop::geometry_type_has_z(layer.geometry_type()) && gdalinterop::geometry_type_has_z(geometry.geometry_type()) {
                geometry.flatten_to_2d();
            }

            feature.set_geometry(geometry)?;
        }

        feature.create(layer)?;
        Ok(())
    }
}

/// The vertices of a point, line string or ring geometry
pub fn geometry_points(geometry: &Geometry) -> Vec<(f64, f64, f64)> {
    let mut points = Vec::with_capacity(geometry.point_count());
    geometry.get_points(&mut points);
    points
}

/// Lazy sequence over the features of the layer in storage order, consumed once
pub fn feature_records<L: LayerAccess>(layer: &mut L) -> impl Iterator<Item = FeatureRecord> + '_ {
    layer.features().map(|feature| FeatureRecord::from_feature(&feature))
}

#[cfg(test)]
mod tests {
    use gdal_sys::OGRFieldType;

    use super::*;
    use crate::testutils;
    use crate::vector::schema::{FieldDefinition, copy_schema};

    #[test]
    fn attributes_are_matched_by_name() -> Result<()> {
        let mut ds = testutils::create_memory_dataset()?;
        let layer = testutils::create_memory_layer(&mut ds, "target")?;
        // reversed order compared to the attribute insertion below
        copy_schema(
            &[
                FieldDefinition::new("pop", OGRFieldType::OFTInteger),
                FieldDefinition::new("name", OGRFieldType::OFTString),
            ],
            &layer,
        )?;

        let attributes = AttributeMap::from([
            ("name".to_string(), Some(FieldValue::StringValue("Brooklyn".into()))),
            ("pop".to_string(), Some(FieldValue::IntegerValue(2_736_074))),
        ]);

        let geometry = Geometry::from_wkt("POLYGON ((0 0,1 0,1 1,0 0))")?;
        FeatureRecord::new(Some(0), Some(geometry), attributes).append_to(&layer)?;

        drop(layer);
        let mut layer = ds.layer(0)?;
        let records: Vec<FeatureRecord> = feature_records(&mut layer).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].attribute("name"), Some(&FieldValue::StringValue("Brooklyn".into())));
        assert_eq!(records[0].attribute("pop"), Some(&FieldValue::IntegerValue(2_736_074)));
        Ok(())
    }

    #[test]
    fn missing_attribute() -> Result<()> {
        let mut ds = testutils::create_memory_dataset()?;
        let layer = testutils::create_memory_layer(&mut ds, "target")?;
        copy_schema(&[FieldDefinition::new("name", OGRFieldType::OFTString)], &layer)?;

        let record = FeatureRecord::new(Some(4), None, AttributeMap::new());
        assert!(matches!(record.append_to(&layer), Err(Error::SchemaMismatch { field, .. }) if field == "name"));
        Ok(())
    }

    #[test]
    fn z_is_dropped_on_a_2d_layer() -> Result<()> {
        let mut ds = testutils::create_memory_dataset()?;
        let layer = testutils::create_memory_layer(&mut ds, "target")?;

        let geometry = Geometry::from_wkt("POLYGON Z ((0 0 5,1 0 6,1 1 7,0 0 5))")?;
        FeatureRecord::new(Some(0), Some(geometry), AttributeMap::new()).append_to(&layer)?;

        drop(layer);
        let mut layer = ds.layer(0)?;
        let records: Vec<FeatureRecord> = feature_records(&mut layer).collect();
        let written = records[0].geometry().expect("geometry");
        assert!(!gdalinterop::geometry_type_has_z(written.geometry_type()));
        assert_eq!(
            geometry_points(&written.get_geometry(0)),
            vec![(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 0.0), (0.0, 0.0, 0.0)]
        );
        Ok(())
    }
}
