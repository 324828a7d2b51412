//! Attribute schema of a layer and copying it onto a new layer.

use gdal::vector::{FieldDefn, LayerAccess};
use gdal_sys::OGRFieldType;

use crate::{Error, Result};

/// Definition of a single attribute field
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDefinition {
    name: String,
    field_type: OGRFieldType::Type,
    width: i32,
    precision: i32,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, field_type: OGRFieldType::Type) -> Self {
        Self {
            name: name.into(),
            field_type,
            width: 0,
            precision: 0,
        }
    }

    pub fn with_width(mut self, width: i32) -> Self {
        self.width = width;
        self
    }

    pub fn with_precision(mut self, precision: i32) -> Self {
        self.precision = precision;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> OGRFieldType::Type {
        self.field_type
    }

    /// 0 when the width is not specified
    pub fn width(&self) -> i32 {
        self.width
    }

    /// 0 when the precision is not specified
    pub fn precision(&self) -> i32 {
        self.precision
    }

    /// The definition is compatible with the one actually created by a driver.
    /// A width or precision of 0 leaves the choice to the driver.
    fn is_satisfied_by(&self, created: &FieldDefinition) -> bool {
        self.name == created.name
            && self.field_type == created.field_type
            && (self.width == 0 || self.width == created.width)
            && (self.precision == 0 || self.precision == created.precision)
    }

    fn add_to_layer<L: LayerAccess>(&self, layer: &L) -> Result<()> {
        let mismatch = |err: gdal::errors::GdalError| Error::SchemaMismatch {
            field: self.name.clone(),
            msg: err.to_string(),
        };

        let field_defn = FieldDefn::new(&self.name, self.field_type).map_err(mismatch)?;
        field_defn.set_width(self.width);
        field_defn.set_precision(self.precision);
        field_defn.add_to_layer(layer).map_err(mismatch)
    }
}

/// The field definitions of the layer in storage order, geometry fields are not included
pub fn read_schema<L: LayerAccess>(layer: &L) -> Vec<FieldDefinition> {
    layer
        .defn()
        .fields()
        .map(|field| {
            FieldDefinition::new(field.name(), field.field_type())
                .with_width(field.width())
                .with_precision(field.precision())
        })
        .collect()
}

/// Create the fields on the (empty) target layer in the order of `fields`.
///
/// After creation the schema of the target is verified, a driver that renames a field or
/// changes its type results in a [`Error::SchemaMismatch`].
pub fn copy_schema<L: LayerAccess>(fields: &[FieldDefinition], target: &L) -> Result<()> {
    let existing = target.defn().fields().count();
    if existing != 0 {
        return Err(Error::SchemaMismatch {
            field: String::new(),
            msg: format!("Target layer '{}' already has {existing} fields", target.name()),
        });
    }

    for field in fields {
        field.add_to_layer(target)?;
    }

    let created = read_schema(target);
    if created.len() != fields.len() {
        return Err(Error::SchemaMismatch {
            field: String::new(),
            msg: format!("Expected {} fields on layer '{}', found {}", fields.len(), target.name(), created.len()),
        });
    }

    for (expected, created) in fields.iter().zip(&created) {
        if !expected.is_satisfied_by(created) {
            return Err(Error::SchemaMismatch {
                field: expected.name().to_string(),
                msg: format!("Requested {expected:?}, layer created {created:?}"),
            });
        }

        if expected != created {
            log::debug!("Field '{}' adjusted by the driver: {expected:?} -> {created:?}", expected.name());
        }
    }

    log::debug!("Copied {} fields to layer '{}'", fields.len(), target.name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils;

    #[test]
    fn copy_schema_to_memory_layer() -> Result<()> {
        let fields = vec![
            FieldDefinition::new("name", OGRFieldType::OFTString).with_width(40),
            FieldDefinition::new("pop", OGRFieldType::OFTInteger).with_width(9),
            FieldDefinition::new("area", OGRFieldType::OFTReal).with_width(24).with_precision(15),
        ];

        let mut ds = testutils::create_memory_dataset()?;
        let layer = testutils::create_memory_layer(&mut ds, "target")?;
        copy_schema(&fields, &layer)?;

        assert_eq!(read_schema(&layer), fields);
        Ok(())
    }

    #[test]
    fn copy_schema_requires_empty_layer() -> Result<()> {
        let fields = vec![FieldDefinition::new("name", OGRFieldType::OFTString)];

        let mut ds = testutils::create_memory_dataset()?;
        let layer = testutils::create_memory_layer(&mut ds, "target")?;
        copy_schema(&fields, &layer)?;

        assert!(matches!(copy_schema(&fields, &layer), Err(Error::SchemaMismatch { .. })));
        Ok(())
    }

    #[test]
    fn unspecified_width_is_left_to_the_driver() {
        let requested = FieldDefinition::new("name", OGRFieldType::OFTString);
        let created = FieldDefinition::new("name", OGRFieldType::OFTString).with_width(80);
        assert!(requested.is_satisfied_by(&created));
        assert!(!created.is_satisfied_by(&FieldDefinition::new("name", OGRFieldType::OFTString).with_width(20)));
        assert!(!requested.is_satisfied_by(&FieldDefinition::new("NAME", OGRFieldType::OFTString)));
        assert!(!requested.is_satisfied_by(&FieldDefinition::new("name", OGRFieldType::OFTInteger)));
    }
}
