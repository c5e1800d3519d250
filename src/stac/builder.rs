use chrono::{DateTime, Utc};
use geo::Polygon;
use serde_json::{Map, Value};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use super::{
    extensions::{EoExtension, Extension, LabelExtension, ProjectionExtension},
    Asset, Collection, CollectionExtent, Item, Link, Provider, SpatialExtent, TemporalIntervals,
    STAC_VERSION,
};
use crate::{
    components::{aggregate::Extent, aggregate::TemporalExtent, bounds::GeoBounds},
    crs_geo::{CrsGeometry, Epsg},
    errors::{HkhGlacierError, Result},
};

/// Either a single acquisition time or a time range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemDatetime {
    Instant(DateTime<Utc>),
    Range(TemporalExtent),
}

/// Extension fields given to an item when it is built.
#[derive(Debug, Clone, Default)]
pub struct ItemExtensions {
    pub projection: Option<ProjectionExtension>,
    pub label: Option<LabelExtension>,
    pub eo: Option<EoExtension>,
}

impl ItemExtensions {
    fn merge_into(&self, properties: &mut Map<String, Value>, schemas: &mut Vec<String>) -> Result<()> {
        if let Some(projection) = &self.projection {
            merge(projection, properties, schemas)?;
        }
        if let Some(label) = &self.label {
            merge(label, properties, schemas)?;
        }
        if let Some(eo) = &self.eo {
            merge(eo, properties, schemas)?;
        }
        Ok(())
    }
}

fn merge<E: Extension>(
    extension: &E,
    fields: &mut Map<String, Value>,
    schemas: &mut Vec<String>,
) -> Result<()> {
    if let Value::Object(extension_fields) = serde_json::to_value(extension)? {
        fields.extend(extension_fields);
    }
    schemas.push(E::SCHEMA_URI.to_string());
    Ok(())
}

fn record_path(destination: &Path, id: &str) -> PathBuf {
    destination.join(format!("{id}.json"))
}

fn wgs84_bbox(id: &str, bbox: &GeoBounds) -> Result<[f64; 4]> {
    let invalid = |reason: String| HkhGlacierError::InvalidRecord {
        id: id.to_string(),
        reason,
    };
    if bbox.epsg() != Epsg::WGS84 {
        return Err(invalid(format!("bbox is in {}, not {}", bbox.epsg(), Epsg::WGS84)));
    }
    let [min_x, min_y, max_x, max_y] = bbox.to_array();
    if min_x < -180. || max_x > 180. || min_y < -90. || max_y > 90. {
        return Err(invalid(format!("bbox {:?} is out of range", bbox.to_array())));
    }
    Ok(bbox.to_array())
}

#[derive(Debug)]
pub struct ItemBuilder {
    id: String,
    footprint: Option<(CrsGeometry<Polygon>, GeoBounds)>,
    datetime: Option<ItemDatetime>,
    extensions: ItemExtensions,
    assets: BTreeMap<String, Asset>,
    destination: PathBuf,
}

impl ItemBuilder {
    /// Item saved as `<destination>/<id>.json`.
    pub fn new(id: impl Into<String>, destination: impl AsRef<Path>) -> Self {
        Self {
            id: id.into(),
            footprint: None,
            datetime: None,
            extensions: ItemExtensions::default(),
            assets: BTreeMap::new(),
            destination: destination.as_ref().to_path_buf(),
        }
    }

    /// Geometry and bbox, both in EPSG:4326.
    pub fn footprint(mut self, geometry: CrsGeometry<Polygon>, bbox: GeoBounds) -> Self {
        self.footprint = Some((geometry, bbox));
        self
    }

    pub fn datetime(mut self, datetime: ItemDatetime) -> Self {
        self.datetime = Some(datetime);
        self
    }

    pub fn extensions(mut self, extensions: ItemExtensions) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn asset(mut self, key: impl Into<String>, asset: Asset) -> Self {
        self.assets.insert(key.into(), asset);
        self
    }

    pub fn build(self) -> Result<Item> {
        let invalid = |reason: &str| HkhGlacierError::InvalidRecord {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.id.is_empty() {
            return Err(invalid("empty id"));
        }
        let (geometry, bbox) = self.footprint.as_ref().ok_or_else(|| invalid("no geometry"))?;
        if geometry.epsg() != Epsg::WGS84 {
            return Err(invalid("geometry is not in EPSG:4326"));
        }
        let bbox = wgs84_bbox(&self.id, bbox)?;

        let mut properties = Map::new();
        match self.datetime.ok_or_else(|| invalid("no datetime"))? {
            ItemDatetime::Instant(datetime) => {
                properties.insert("datetime".into(), serde_json::to_value(datetime)?);
            }
            ItemDatetime::Range(range) => {
                properties.insert("datetime".into(), Value::Null);
                properties.insert("start_datetime".into(), serde_json::to_value(range.start())?);
                properties.insert("end_datetime".into(), serde_json::to_value(range.end())?);
            }
        }
        let mut stac_extensions = Vec::new();
        self.extensions
            .merge_into(&mut properties, &mut stac_extensions)?;

        let path = record_path(&self.destination, &self.id);
        Ok(Item {
            kind: "Feature",
            stac_version: STAC_VERSION,
            stac_extensions,
            geometry: geojson::Geometry::new(geojson::Value::from(geometry.geometry())),
            bbox,
            properties,
            links: vec![Link::self_json(&path)],
            assets: self.assets,
            id: self.id,
            path,
        })
    }
}

#[derive(Debug)]
pub struct CollectionBuilder {
    id: String,
    title: Option<String>,
    description: String,
    license: String,
    providers: Vec<Provider>,
    extent: Option<Extent>,
    eo_summary: Option<EoExtension>,
    links: Vec<Link>,
    destination: PathBuf,
}

impl CollectionBuilder {
    /// Collection saved as `<destination>/<id>.json`.
    pub fn new(id: impl Into<String>, destination: impl AsRef<Path>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: String::new(),
            license: String::new(),
            providers: Vec::new(),
            extent: None,
            eo_summary: None,
            links: Vec::new(),
            destination: destination.as_ref().to_path_buf(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// SPDX identifier and the link to the license text.
    pub fn license(mut self, license: impl Into<String>, link: Link) -> Self {
        self.license = license.into();
        self.links.push(link);
        self
    }

    pub fn provider(mut self, provider: Provider) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn extent(mut self, extent: Extent) -> Self {
        self.extent = Some(extent);
        self
    }

    /// Band table summarized for every item of the collection.
    pub fn eo_summary(mut self, eo: EoExtension) -> Self {
        self.eo_summary = Some(eo);
        self
    }

    pub fn build(self) -> Result<Collection> {
        let invalid = |reason: &str| HkhGlacierError::InvalidRecord {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.id.is_empty() {
            return Err(invalid("empty id"));
        }
        if self.description.is_empty() {
            return Err(invalid("empty description"));
        }
        if self.license.is_empty() {
            return Err(invalid("no license"));
        }
        let extent = self.extent.as_ref().ok_or_else(|| invalid("no extent"))?;
        let bbox = wgs84_bbox(&self.id, &extent.spatial)?;
        let interval = [Some(extent.temporal.start()), Some(extent.temporal.end())];

        let mut summaries = Map::new();
        let mut stac_extensions = Vec::new();
        if let Some(eo) = &self.eo_summary {
            merge(eo, &mut summaries, &mut stac_extensions)?;
        }

        let path = record_path(&self.destination, &self.id);
        let mut links = vec![Link::self_json(&path)];
        links.extend(self.links);
        Ok(Collection {
            kind: "Collection",
            stac_version: STAC_VERSION,
            stac_extensions,
            title: self.title,
            description: self.description,
            license: self.license,
            providers: self.providers,
            extent: CollectionExtent {
                spatial: SpatialExtent { bbox: vec![bbox] },
                temporal: TemporalIntervals {
                    interval: vec![interval],
                },
            },
            summaries,
            links,
            id: self.id,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stac::extensions::{Band, LabelType};
    use chrono::TimeZone;
    use geo::{polygon, Rect};
    use serde_json::json;

    fn wgs84_square() -> (CrsGeometry<Polygon>, GeoBounds) {
        let polygon = polygon![(x: 85., y: 27.), (x: 86., y: 27.), (x: 86., y: 28.), (x: 85., y: 28.)];
        (
            CrsGeometry::new(Epsg::WGS84, polygon),
            GeoBounds::new(Epsg::WGS84, Rect::new((85., 27.), (86., 28.))),
        )
    }

    fn window() -> TemporalExtent {
        TemporalExtent::new(
            Utc.with_ymd_and_hms(2002, 1, 1, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2008, 12, 31, 12, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn item_with_range_and_extensions() {
        let (geometry, bbox) = wgs84_square();
        let item = ItemBuilder::new("134040_0", "/tmp/catalog")
            .footprint(geometry, bbox)
            .datetime(ItemDatetime::Range(window()))
            .extensions(ItemExtensions {
                projection: Some(ProjectionExtension {
                    epsg: Some(Epsg::new(32645)),
                    ..Default::default()
                }),
                label: Some(LabelExtension {
                    properties: None,
                    description: "glaciers".into(),
                    label_type: LabelType::Raster,
                    tasks: vec!["segmentation".into()],
                    methods: vec!["automated".into()],
                }),
                eo: None,
            })
            .asset("raster", Asset::new("slices/img.npy").with_title("img"))
            .build()
            .unwrap();

        assert_eq!(item.path(), Path::new("/tmp/catalog/134040_0.json"));
        assert_eq!(item.links()[0].rel, "self");
        assert_eq!(item.bbox(), [85., 27., 86., 28.]);
        assert_eq!(item.stac_extensions().len(), 2);

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "Feature");
        assert_eq!(json["geometry"]["type"], "Polygon");
        assert_eq!(json["properties"]["datetime"], Value::Null);
        assert_eq!(json["properties"]["start_datetime"], "2002-01-01T12:00:00Z");
        assert_eq!(json["properties"]["end_datetime"], "2008-12-31T12:00:00Z");
        assert_eq!(json["properties"]["proj:epsg"], 32645);
        assert!(json["properties"].get("proj:shape").is_none());
        assert_eq!(json["properties"]["label:properties"], Value::Null);
        assert_eq!(json["properties"]["label:type"], "raster");
        assert_eq!(json["assets"]["raster"], json!({"href": "slices/img.npy", "title": "img"}));
    }

    #[test]
    fn item_needs_wgs84_geometry() {
        let (_, bbox) = wgs84_square();
        let utm = CrsGeometry::new(
            Epsg::new(32645),
            polygon![(x: 0., y: 0.), (x: 1., y: 0.), (x: 1., y: 1.)],
        );
        let result = ItemBuilder::new("a", "/tmp")
            .footprint(utm, bbox)
            .datetime(ItemDatetime::Range(window()))
            .build();
        assert!(matches!(result, Err(HkhGlacierError::InvalidRecord { .. })));
    }

    #[test]
    fn item_needs_datetime() {
        let (geometry, bbox) = wgs84_square();
        let result = ItemBuilder::new("a", "/tmp").footprint(geometry, bbox).build();
        assert!(matches!(result, Err(HkhGlacierError::InvalidRecord { .. })));
    }

    #[test]
    fn collection_with_summaries() {
        let (_, bbox) = wgs84_square();
        let collection = CollectionBuilder::new("fused", "/tmp/catalog")
            .title("Fused")
            .description("Fused images")
            .license("PDDL-1.0", Link::license("https://spdx.org/licenses/PDDL-1.0.html", "PDDL"))
            .extent(Extent {
                spatial: bbox,
                temporal: window(),
            })
            .eo_summary(EoExtension {
                bands: vec![Band::spectral("LE7 B1", "blue", 0.485), Band::named("NDVI")],
            })
            .build()
            .unwrap();

        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json["type"], "Collection");
        assert_eq!(json["extent"]["spatial"]["bbox"], json!([[85., 27., 86., 28.]]));
        assert_eq!(
            json["extent"]["temporal"]["interval"],
            json!([["2002-01-01T12:00:00Z", "2008-12-31T12:00:00Z"]])
        );
        assert_eq!(json["summaries"]["eo:bands"][0]["common_name"], "blue");
        assert!(json["summaries"]["eo:bands"][1].get("common_name").is_none());
        assert_eq!(json["links"][1]["rel"], "license");
        assert_eq!(collection.path(), Path::new("/tmp/catalog/fused.json"));
    }

    #[test]
    fn collection_needs_license() {
        let (_, bbox) = wgs84_square();
        let result = CollectionBuilder::new("fused", "/tmp")
            .description("Fused images")
            .extent(Extent {
                spatial: bbox,
                temporal: window(),
            })
            .build();
        assert!(matches!(result, Err(HkhGlacierError::InvalidRecord { .. })));
    }
}
