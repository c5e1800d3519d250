pub mod components;
pub mod crs_geo;
pub mod dataset;
pub mod errors;
pub mod stac;

pub use components::{
    aggregate_bounds, parse_filename_date, patch_extent, raster_extent, CoordinateTransform,
    CrsPair, Extent, GeoBounds, RegionPolicy, TemporalExtent, TransformCache,
};
pub use crs_geo::{CrsGeometry, Epsg, Precision};
pub use errors::{HkhGlacierError, Result};
