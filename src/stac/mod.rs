//! Catalog records: items, collections and the pieces they share.

pub mod builder;
pub mod extensions;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::{
    collections::BTreeMap,
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::errors::Result;

pub use builder::{CollectionBuilder, ItemBuilder, ItemDatetime, ItemExtensions};

pub const STAC_VERSION: &str = "1.0.0";

pub const COG_MEDIA_TYPE: &str = "image/tiff; application=geotiff; profile=cloud-optimized";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderRole {
    Licensor,
    Producer,
    Processor,
    Host,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Provider {
    pub name: String,
    pub roles: Vec<ProviderRole>,
    pub url: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            media_type: None,
            title: None,
        }
    }

    pub fn license(href: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::new("license", href)
        }
    }

    fn self_json(path: &Path) -> Self {
        Self {
            media_type: Some("application/json".into()),
            ..Self::new("self", path.display().to_string())
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Asset {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl Asset {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            title: None,
            media_type: None,
            roles: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_roles<'a>(mut self, roles: impl IntoIterator<Item = &'a str>) -> Self {
        self.roles = roles.into_iter().map(String::from).collect();
        self
    }
}

/// Catalog item, a GeoJSON feature.
#[derive(Serialize, Debug, Clone)]
pub struct Item {
    #[serde(rename = "type")]
    kind: &'static str,
    stac_version: &'static str,
    stac_extensions: Vec<String>,
    id: String,
    geometry: geojson::Geometry,
    bbox: [f64; 4],
    properties: Map<String, Value>,
    links: Vec<Link>,
    assets: BTreeMap<String, Asset>,
    #[serde(skip)]
    path: PathBuf,
}

impl Item {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bbox(&self) -> [f64; 4] {
        self.bbox
    }

    pub fn geometry(&self) -> &geojson::Geometry {
        &self.geometry
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn stac_extensions(&self) -> &[String] {
        &self.stac_extensions
    }

    pub fn assets(&self) -> &BTreeMap<String, Asset> {
        &self.assets
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// `<destination>/<id>.json`
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<&Path> {
        write_json(&self.path, self)?;
        Ok(&self.path)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SpatialExtent {
    pub bbox: Vec<[f64; 4]>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TemporalIntervals {
    pub interval: Vec<[Option<DateTime<Utc>>; 2]>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CollectionExtent {
    pub spatial: SpatialExtent,
    pub temporal: TemporalIntervals,
}

/// Catalog collection describing the whole dataset.
#[derive(Serialize, Debug, Clone)]
pub struct Collection {
    #[serde(rename = "type")]
    kind: &'static str,
    stac_version: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stac_extensions: Vec<String>,
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    description: String,
    license: String,
    providers: Vec<Provider>,
    extent: CollectionExtent,
    #[serde(skip_serializing_if = "Map::is_empty")]
    summaries: Map<String, Value>,
    links: Vec<Link>,
    #[serde(skip)]
    path: PathBuf,
}

impl Collection {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn license(&self) -> &str {
        &self.license
    }

    pub fn extent(&self) -> &CollectionExtent {
        &self.extent
    }

    pub fn summaries(&self) -> &Map<String, Value> {
        &self.summaries
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// `<destination>/<id>.json`
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<&Path> {
        write_json(&self.path, self)?;
        Ok(&self.path)
    }
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
