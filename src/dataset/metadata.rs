//! Provider metadata of the labelled slices, a GeoJSON feature collection.

use geo::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};
use std::{fs, io::BufReader, path::Path};

use super::constants::METADATA_EXTENSION;
use crate::{
    crs_geo::{CrsGeometry, Epsg},
    errors::{HkhGlacierError, Result},
};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SliceMetadata {
    pub crs: NamedCrs,
    pub features: Vec<SliceFeature>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct NamedCrs {
    pub properties: CrsName,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CrsName {
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SliceFeature {
    pub properties: SliceProperties,
    pub geometry: SliceGeometry,
}

/// References to the image and mask slice of a feature.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SliceProperties {
    pub img_slice: String,
    pub mask_slice: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SliceGeometry {
    /// Polygon rings, the first one is the outline.
    pub coordinates: Vec<Vec<Vec<f64>>>,
}

/// Reads a local `.geojson` metadata file.
pub fn get_metadata(path: impl AsRef<Path>) -> Result<SliceMetadata> {
    let path = path.as_ref();
    if path.extension().and_then(|ext| ext.to_str()) != Some(METADATA_EXTENSION) {
        return Err(HkhGlacierError::UnsupportedFormat(
            path.display().to_string(),
        ));
    }
    let reader = BufReader::new(fs::File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub fn get_epsg(metadata: &SliceMetadata) -> Result<Epsg> {
    Epsg::from_crs_name(&metadata.crs.properties.name)
}

/// Points every slice reference to the file of the same name in `slicedir`.
pub fn update_metadata_paths(
    mut metadata: SliceMetadata,
    slicedir: impl AsRef<Path>,
) -> Result<SliceMetadata> {
    let slicedir = slicedir.as_ref();
    for feature in metadata.features.iter_mut() {
        let properties = &mut feature.properties;
        properties.img_slice = relocate(&properties.img_slice, slicedir)?;
        properties.mask_slice = relocate(&properties.mask_slice, slicedir)?;
    }
    Ok(metadata)
}

fn relocate(href: &str, slicedir: &Path) -> Result<String> {
    let name = Path::new(href)
        .file_name()
        .ok_or_else(|| HkhGlacierError::InvalidFeature(format!("slice {href:?} has no file name")))?;
    Ok(slicedir.join(name).to_string_lossy().into_owned())
}

/// File name of `href` without its extension.
pub(crate) fn file_stem(href: &str) -> Result<String> {
    Path::new(href)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| HkhGlacierError::InvalidFeature(format!("slice {href:?} has no file name")))
}

impl SliceFeature {
    /// Id of the item, second and fourth `_` token of the image slice name:
    /// `slice_134040_img_0.npy` gives `134040_0`.
    pub fn item_id(&self) -> Result<String> {
        let stem = file_stem(&self.properties.img_slice)?;
        let tokens: Vec<&str> = stem.split('_').collect();
        match (tokens.get(1), tokens.get(3)) {
            (Some(tile), Some(index)) => Ok(format!("{tile}_{index}")),
            _ => Err(HkhGlacierError::InvalidFeature(format!(
                "image slice {stem:?} has fewer than four '_' tokens"
            ))),
        }
    }

    /// Outer ring of the feature, in `epsg`.
    pub fn outline(&self, epsg: Epsg) -> Result<CrsGeometry<Polygon>> {
        let ring = self
            .geometry
            .coordinates
            .first()
            .ok_or_else(|| HkhGlacierError::InvalidFeature("geometry has no ring".into()))?;
        let coords = ring
            .iter()
            .map(|position| match position.as_slice() {
                [x, y, ..] => Ok(Coord { x: *x, y: *y }),
                _ => Err(HkhGlacierError::InvalidFeature(format!(
                    "position {position:?} has fewer than two values"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(CrsGeometry::new(
            epsg,
            Polygon::new(LineString::new(coords), vec![]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn metadata() -> SliceMetadata {
        serde_json::from_value(json!({
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::32645"}},
            "features": [{
                "type": "Feature",
                "properties": {
                    "img_slice": "/datadrive/glaciers/slices/slice_134040_img_0.npy",
                    "mask_slice": "/datadrive/glaciers/slices/slice_134040_mask_0.npy",
                    "img_source": "LE07_134040_20070922_clip.tif",
                },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [400000.0, 3100000.0],
                        [415360.0, 3100000.0],
                        [415360.0, 3084640.0],
                        [400000.0, 3084640.0],
                        [400000.0, 3100000.0],
                    ]],
                },
            }],
        }))
        .unwrap()
    }

    #[rstest]
    fn reads_epsg(metadata: SliceMetadata) {
        assert_eq!(get_epsg(&metadata).unwrap(), Epsg::new(32645));
    }

    #[rstest]
    fn item_id_from_image_slice(metadata: SliceMetadata) {
        assert_eq!(metadata.features[0].item_id().unwrap(), "134040_0");
    }

    #[rstest]
    fn short_slice_name_is_invalid(mut metadata: SliceMetadata) {
        metadata.features[0].properties.img_slice = "slice_0.npy".into();
        assert!(matches!(
            metadata.features[0].item_id(),
            Err(HkhGlacierError::InvalidFeature(_))
        ));
    }

    #[rstest]
    fn relocates_slices(metadata: SliceMetadata) {
        let metadata = update_metadata_paths(metadata, "/data/slices").unwrap();
        let properties = &metadata.features[0].properties;
        assert_eq!(properties.img_slice, "/data/slices/slice_134040_img_0.npy");
        assert_eq!(properties.mask_slice, "/data/slices/slice_134040_mask_0.npy");
    }

    #[rstest]
    fn outline_keeps_ring(metadata: SliceMetadata) {
        let outline = metadata.features[0].outline(Epsg::new(32645)).unwrap();
        assert_eq!(outline.epsg(), Epsg::new(32645));
        assert_eq!(outline.vertex_count(), 4);
    }

    #[rstest]
    #[case(json!([]))]
    #[case(json!([[[400000.0]]]))]
    fn malformed_geometry_is_invalid(mut metadata: SliceMetadata, #[case] coordinates: serde_json::Value) {
        metadata.features[0].geometry.coordinates = serde_json::from_value(coordinates).unwrap();
        assert!(matches!(
            metadata.features[0].outline(Epsg::new(32645)),
            Err(HkhGlacierError::InvalidFeature(_))
        ));
    }

    #[rstest]
    #[case("metadata.json")]
    #[case("metadata.shp")]
    #[case("metadata")]
    fn only_geojson_is_supported(#[case] path: &str) {
        assert!(matches!(
            get_metadata(path),
            Err(HkhGlacierError::UnsupportedFormat(_))
        ));
    }
}
