pub mod aggregate;
pub mod backends;
pub mod bounds;
pub mod dates;
pub mod extent;
pub mod file;
pub mod footprint;
pub mod transforms;

pub use aggregate::{aggregate_bounds, Extent, TemporalExtent};
pub use bounds::GeoBounds;
pub use dates::parse_filename_date;
pub use extent::{patch_extent, raster_extent, ItemExtent, PatchGrid, ProjectionParameters};
pub use file::{File, RasterPrimitives};
pub use footprint::{vectorize_mask, MaskFootprint, RegionPolicy};
pub use transforms::{CoordinateTransform, CrsPair, PixelGeoTransform, TransformCache};
