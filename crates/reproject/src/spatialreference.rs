use gdal::spatial_ref::{AxisMappingStrategy, SpatialRef};
use gdal::vector::LayerAccess;

use crate::crs::Epsg;
use crate::{Error, Result};

/// Immutable description of a coordinate system.
///
/// Every instance uses the traditional GIS axis order (x = easting/longitude, y = northing/latitude)
/// so transforms between two references never swap the vertex components.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialReference {
    srs: SpatialRef,
}

impl SpatialReference {
    pub fn new(mut srs: SpatialRef) -> Self {
        srs.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
        SpatialReference { srs }
    }

    pub fn from_epsg(epsg: Epsg) -> Result<Self> {
        Ok(Self::new(SpatialRef::from_epsg(epsg.code())?))
    }

    pub fn from_definition(def: &str) -> Result<Self> {
        if def.is_empty() {
            return Err(Error::InvalidArgument("Empty projection definition".into()));
        }

        Ok(Self::new(SpatialRef::from_definition(def)?))
    }

    pub fn to_wkt(&self) -> Result<String> {
        Ok(self.srs.to_wkt()?)
    }

    /// The well-known text in the ESRI dialect, as expected in a shapefile `.prj`
    pub fn to_esri_wkt(&self) -> Result<String> {
        let esri = self.srs.clone();
        esri.morph_to_esri()?;
        Ok(esri.to_wkt()?)
    }

    pub fn to_proj(&self) -> Result<String> {
        Ok(self.srs.to_proj4()?)
    }

    pub fn is_projected(&self) -> bool {
        self.srs.is_projected()
    }

    pub fn is_geographic(&self) -> bool {
        self.srs.is_geographic()
    }

    pub fn srs(&self) -> &SpatialRef {
        &self.srs
    }
}

/// The source reference of a layer together with the requested target reference
#[derive(Debug, Clone)]
pub struct ReferencePair {
    pub source: SpatialReference,
    pub target: SpatialReference,
}

/// Read the spatial reference of the input layer and construct the target reference.
///
/// Fails with [`Error::ReferenceResolution`] when the layer has no spatial reference or the
/// target code is not known to the geodesy library.
pub fn resolve_references<L: LayerAccess>(layer: &L, target: Epsg) -> Result<ReferencePair> {
    let source = layer
        .spatial_ref()
        .ok_or_else(|| Error::ReferenceResolution(format!("Layer '{}' has no spatial reference", layer.name())))?;

    let target_srs = SpatialRef::from_epsg(target.code())
        .map_err(|err| Error::ReferenceResolution(format!("Unrecognized target spatial reference {target} ({err})")))?;

    let pair = ReferencePair {
        source: SpatialReference::new(source),
        target: SpatialReference::new(target_srs),
    };

    log::debug!(
        "Resolved spatial references for layer '{}': {} -> {target}",
        layer.name(),
        pair.source.to_proj().unwrap_or_default().trim()
    );

    Ok(pair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs;

    #[test]
    fn epsg_import() {
        let srs = SpatialReference::from_epsg(crs::epsg::BELGIAN_LAMBERT72).unwrap();
        assert!(srs.is_projected());
        assert!(!srs.is_geographic());

        let wgs84 = SpatialReference::from_epsg(crs::epsg::WGS84).unwrap();
        assert!(wgs84.is_geographic());
        assert_eq!(wgs84.srs().axis_mapping_strategy(), AxisMappingStrategy::TraditionalGisOrder);
    }

    #[test]
    fn wkt_roundtrip_is_the_same_reference() {
        let srs = SpatialReference::from_epsg(crs::epsg::WGS84_WEB_MERCATOR).unwrap();
        let from_wkt = SpatialReference::from_definition(&srs.to_wkt().unwrap()).unwrap();
        assert_eq!(srs, from_wkt);
    }

    #[test]
    fn esri_wkt_does_not_modify_reference() {
        let srs = SpatialReference::from_epsg(crs::epsg::WGS84).unwrap();
        let wkt_before = srs.to_wkt().unwrap();

        let esri = srs.to_esri_wkt().unwrap();
        assert!(esri.starts_with("GEOGCS[\"GCS_WGS_1984\""));
        assert_eq!(srs.to_wkt().unwrap(), wkt_before);
    }

    #[test]
    fn unknown_epsg_code() {
        assert!(SpatialReference::from_epsg(Epsg::new(999_999)).is_err());
    }

    #[test]
    fn empty_definition() {
        assert!(matches!(SpatialReference::from_definition(""), Err(Error::InvalidArgument(_))));
    }
}
