use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::crs_geo::Epsg;

pub type Result<T> = std::result::Result<T, HkhGlacierError>;

#[derive(thiserror::Error, Debug)]
pub enum HkhGlacierError {
    #[error("invalid CRS {crs}: {reason}")]
    InvalidCrs { crs: String, reason: String },
    #[error("geometry is in {found}, expected {expected}")]
    CrsMismatch { expected: Epsg, found: Epsg },
    #[error("degenerate geometry: {0}")]
    Geometry(String),
    #[error("can not derive raster extent of {path}: {reason}")]
    RasterExtent { path: PathBuf, reason: String },
    #[error("no YYYYMMDD date in the third '_' token of {filename:?}")]
    DateParse { filename: String },
    #[error("interval ends at {end}, before its start {start}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("can not aggregate an extent over zero items")]
    EmptyAggregation,
    #[error("unsupported metadata source {0:?}, only .geojson is supported")]
    UnsupportedFormat(String),
    #[error("invalid metadata feature: {0}")]
    InvalidFeature(String),
    #[error("invalid catalog record {id:?}: {reason}")]
    InvalidRecord { id: String, reason: String },
    #[error("feature {index} failed")]
    Feature {
        index: usize,
        #[source]
        source: Box<HkhGlacierError>,
    },
    #[error("raster {path} failed")]
    Raster {
        path: PathBuf,
        #[source]
        source: Box<HkhGlacierError>,
    },
    #[error(transparent)]
    ProjError(#[from] proj::ProjError),
    #[error(transparent)]
    GdalError(#[from] gdal::errors::GdalError),
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl HkhGlacierError {
    pub(crate) fn in_feature(index: usize) -> impl FnOnce(HkhGlacierError) -> HkhGlacierError {
        move |source| HkhGlacierError::Feature {
            index,
            source: Box::new(source),
        }
    }

    pub(crate) fn in_raster(path: PathBuf) -> impl FnOnce(HkhGlacierError) -> HkhGlacierError {
        move |source| HkhGlacierError::Raster {
            path,
            source: Box::new(source),
        }
    }

    /// Innermost error, skipping the per feature / per raster wrappers.
    pub fn root(&self) -> &HkhGlacierError {
        match self {
            HkhGlacierError::Feature { source, .. } | HkhGlacierError::Raster { source, .. } => {
                source.root()
            }
            other => other,
        }
    }
}
