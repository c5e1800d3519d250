//! Catalog records of the LILA Hindu Kush Himalayas glacier mapping dataset.

pub mod constants;
pub mod fused;
pub mod metadata;
pub mod slices;

pub use fused::{create_fused_collection, create_fused_item, FusedRaster};
pub use metadata::{get_epsg, get_metadata, update_metadata_paths, SliceFeature, SliceMetadata};
pub use slices::{create_slice_collection, create_slice_item, create_slice_items};
