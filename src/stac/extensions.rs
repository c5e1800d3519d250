//! Extension fields merged into item properties or collection summaries.

use serde::Serialize;

use crate::crs_geo::Epsg;

pub const PROJECTION_SCHEMA: &str = "https://stac-extensions.github.io/projection/v1.0.0/schema.json";
pub const LABEL_SCHEMA: &str = "https://stac-extensions.github.io/label/v1.0.0/schema.json";
pub const EO_SCHEMA: &str = "https://stac-extensions.github.io/eo/v1.0.0/schema.json";

/// An extension contributing to the `properties` of an item.
pub trait Extension: Serialize {
    const SCHEMA_URI: &'static str;
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct ProjectionExtension {
    #[serde(rename = "proj:epsg")]
    pub epsg: Option<Epsg>,
    #[serde(rename = "proj:shape", skip_serializing_if = "Option::is_none")]
    pub shape: Option<[usize; 2]>,
    #[serde(rename = "proj:transform", skip_serializing_if = "Option::is_none")]
    pub transform: Option<Vec<f64>>,
    #[serde(rename = "proj:bbox", skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
}

impl Extension for ProjectionExtension {
    const SCHEMA_URI: &'static str = PROJECTION_SCHEMA;
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LabelType {
    Vector,
    Raster,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LabelExtension {
    /// `None` for raster labels, serialized as `null`.
    #[serde(rename = "label:properties")]
    pub properties: Option<Vec<String>>,
    #[serde(rename = "label:description")]
    pub description: String,
    #[serde(rename = "label:type")]
    pub label_type: LabelType,
    #[serde(rename = "label:tasks", skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<String>,
    #[serde(rename = "label:methods", skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
}

impl Extension for LabelExtension {
    const SCHEMA_URI: &'static str = LABEL_SCHEMA;
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Band {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_wavelength: Option<f64>,
}

impl Band {
    pub const fn named(name: &'static str) -> Self {
        Self {
            name,
            common_name: None,
            center_wavelength: None,
        }
    }

    pub const fn spectral(name: &'static str, common_name: &'static str, center_wavelength: f64) -> Self {
        Self {
            name,
            common_name: Some(common_name),
            center_wavelength: Some(center_wavelength),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EoExtension {
    #[serde(rename = "eo:bands")]
    pub bands: Vec<Band>,
}

impl Extension for EoExtension {
    const SCHEMA_URI: &'static str = EO_SCHEMA;
}
