//! Items and collection of the labelled image slices.

use log::{debug, info};
use rayon::prelude::*;
use std::path::Path;

use super::{
    constants::{
        provider, slice_license_link, slice_window, LABEL_DESCRIPTION, SLICE_DESCRIPTION, SLICE_ID,
        SLICE_LICENSE, SLICE_TITLE,
    },
    metadata::{file_stem, SliceFeature, SliceMetadata},
};
use crate::{
    components::{
        aggregate::Extent,
        bounds::GeoBounds,
        extent::{patch_extent, PatchGrid},
        transforms::{CoordinateTransform, CrsPair},
    },
    errors::{HkhGlacierError, Result},
    stac::{
        extensions::{LabelExtension, LabelType},
        Asset, Collection, CollectionBuilder, Item, ItemBuilder, ItemDatetime, ItemExtensions,
    },
};

fn label_extension() -> LabelExtension {
    LabelExtension {
        properties: None,
        description: LABEL_DESCRIPTION.into(),
        label_type: LabelType::Raster,
        tasks: vec!["segmentation".into()],
        methods: vec!["automated".into()],
    }
}

/// Creates and saves the item of one slice feature.
///
/// `transform` goes from the metadata CRS to EPSG:4326.
pub fn create_slice_item(
    feature: &SliceFeature,
    destination: impl AsRef<Path>,
    transform: &CoordinateTransform,
) -> Result<Item> {
    let id = feature.item_id()?;
    let outline = feature.outline(transform.source())?;
    let extent = patch_extent(&outline, transform, PatchGrid::LANDSAT_SLICE)?;
    let properties = &feature.properties;

    let item = ItemBuilder::new(id, destination)
        .footprint(extent.footprint, extent.bbox)
        .datetime(ItemDatetime::Range(slice_window()?))
        .extensions(ItemExtensions {
            projection: Some(extent.projection.extension()),
            label: Some(label_extension()),
            eo: None,
        })
        .asset(
            "raster_labels",
            Asset::new(&properties.mask_slice)
                .with_title(file_stem(&properties.mask_slice)?)
                .with_roles(["labels-raster"]),
        )
        .asset(
            "raster",
            Asset::new(&properties.img_slice).with_title(file_stem(&properties.img_slice)?),
        )
        .build()?;
    item.save()?;
    info!("saved slice item {}", item.path().display());
    Ok(item)
}

/// Creates and saves one item per feature, stopping at the first failure.
pub fn create_slice_items(
    metadata: &SliceMetadata,
    destination: impl AsRef<Path>,
    transform: &CoordinateTransform,
) -> Result<Vec<Item>> {
    let destination = destination.as_ref();
    metadata
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            create_slice_item(feature, destination, transform)
                .map_err(HkhGlacierError::in_feature(index))
        })
        .collect()
}

fn feature_bounds(feature: &SliceFeature, transform: &CoordinateTransform) -> Result<GeoBounds> {
    let (_, bbox) = feature.outline(transform.source())?.reproject(transform, None)?;
    Ok(bbox)
}

/// Creates and saves the collection of the slices described by `metadata`.
///
/// `crs` is checked before any feature is read. Feature outlines are then
/// reprojected in parallel, each worker owning a transform built from `crs`.
pub fn create_slice_collection(
    metadata: &SliceMetadata,
    destination: impl AsRef<Path>,
    crs: CrsPair,
) -> Result<Collection> {
    let transform = crs.transformer()?;
    debug!(
        "reprojecting {} slice outlines with {transform:?}",
        metadata.features.len()
    );
    let boxes = metadata
        .features
        .par_iter()
        .enumerate()
        .map_init(
            || crs.transformer(),
            |transform, (index, feature)| match transform {
                Ok(transform) => {
                    feature_bounds(feature, transform).map_err(HkhGlacierError::in_feature(index))
                }
                Err(HkhGlacierError::InvalidCrs { crs: name, reason }) => {
                    Err(HkhGlacierError::InvalidCrs {
                        crs: name.clone(),
                        reason: reason.clone(),
                    })
                }
                Err(err) => Err(HkhGlacierError::InvalidCrs {
                    crs: crs.source.to_string(),
                    reason: err.to_string(),
                }),
            },
        )
        .collect::<Result<Vec<_>>>()?;
    let extent = Extent::with_fixed_window(&boxes, slice_window()?)?;
    debug!("{} slices cover {:?}", boxes.len(), extent.spatial.to_array());

    let collection = CollectionBuilder::new(SLICE_ID, destination)
        .title(SLICE_TITLE)
        .description(SLICE_DESCRIPTION)
        .license(SLICE_LICENSE, slice_license_link())
        .provider(provider())
        .extent(extent)
        .build()?;
    collection.save()?;
    info!("saved slice collection {}", collection.path().display());
    Ok(collection)
}
