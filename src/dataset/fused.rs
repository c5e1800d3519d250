//! Items and collection of the fused SRTM / Landsat 7 rasters.

use chrono::{DateTime, Utc};
use log::{debug, info};
use std::{
    fs,
    path::{Path, PathBuf},
};

use super::constants::{
    fused_license_link, provider, FUSED_BANDS, FUSED_DESCRIPTION, FUSED_ID, FUSED_LICENSE,
    FUSED_TITLE, RASTER_EXTENSION,
};
use crate::{
    components::{
        aggregate::Extent,
        backends::gdal_backend::GdalFile,
        dates::parse_filename_date,
        extent::{raster_extent, ItemExtent},
        file::File,
        footprint::RegionPolicy,
        transforms::{CrsPair, TransformCache},
    },
    errors::{HkhGlacierError, Result},
    stac::{
        extensions::EoExtension, Asset, Collection, CollectionBuilder, Item, ItemBuilder,
        ItemDatetime, ItemExtensions, COG_MEDIA_TYPE,
    },
};

fn eo_extension() -> EoExtension {
    EoExtension {
        bands: FUSED_BANDS.to_vec(),
    }
}

/// Extent and acquisition date of one raster.
#[derive(Debug, Clone)]
pub struct FusedRaster {
    pub path: PathBuf,
    pub extent: ItemExtent,
    pub datetime: DateTime<Utc>,
}

impl FusedRaster {
    /// Reads the raster grid and mask, the file is closed before reprojection.
    pub fn read(path: impl AsRef<Path>, transforms: &mut TransformCache) -> Result<Self> {
        let path = path.as_ref();
        let datetime = parse_filename_date(&path.to_string_lossy())?;
        let primitives = GdalFile::open(path)?.primitives()?;
        let transform = transforms.get(CrsPair::to_wgs84(primitives.epsg))?;
        let extent = raster_extent(&primitives, transform, RegionPolicy::default())?;
        Ok(Self {
            path: path.to_path_buf(),
            extent,
            datetime,
        })
    }

    /// File name without extension.
    pub fn id(&self) -> Result<String> {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| HkhGlacierError::RasterExtent {
                path: self.path.clone(),
                reason: "no file name".into(),
            })
    }

    pub fn to_item(&self, destination: impl AsRef<Path>) -> Result<Item> {
        let id = self.id()?;
        ItemBuilder::new(&id, destination)
            .footprint(self.extent.footprint.clone(), self.extent.bbox.clone())
            .datetime(ItemDatetime::Instant(self.datetime))
            .extensions(ItemExtensions {
                projection: Some(self.extent.projection.extension()),
                label: None,
                eo: Some(eo_extension()),
            })
            .asset(
                "image",
                Asset::new(self.path.to_string_lossy())
                    .with_title(id)
                    .with_media_type(COG_MEDIA_TYPE)
                    .with_roles(["data"]),
            )
            .build()
    }
}

/// Creates and saves the item of one fused raster.
pub fn create_fused_item(cog: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<Item> {
    let cog = cog.as_ref();
    let mut transforms = TransformCache::new();
    let item = FusedRaster::read(cog, &mut transforms)
        .and_then(|raster| raster.to_item(destination))
        .map_err(HkhGlacierError::in_raster(cog.to_path_buf()))?;
    item.save()?;
    info!("saved fused item {}", item.path().display());
    Ok(item)
}

/// `.tif` files of `directory`, sorted by name.
pub fn list_rasters(directory: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut rasters = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some(RASTER_EXTENSION) {
            rasters.push(path);
        }
    }
    rasters.sort();
    Ok(rasters)
}

/// Extents of every raster of `directory`, one raster open at a time.
pub fn read_rasters(directory: impl AsRef<Path>) -> Result<Vec<FusedRaster>> {
    let mut transforms = TransformCache::new();
    let rasters = list_rasters(directory)?
        .into_iter()
        .map(|path| {
            FusedRaster::read(&path, &mut transforms).map_err(HkhGlacierError::in_raster(path))
        })
        .collect::<Result<Vec<_>>>()?;
    debug!(
        "read {} rasters in {} CRS",
        rasters.len(),
        transforms.len()
    );
    Ok(rasters)
}

/// Creates and saves the collection of every fused raster in `fused_dir`.
pub fn create_fused_collection(
    fused_dir: impl AsRef<Path>,
    destination: impl AsRef<Path>,
) -> Result<Collection> {
    let rasters = read_rasters(fused_dir)?;
    let extent = Extent::covering(
        rasters
            .iter()
            .map(|raster| (&raster.extent.bbox, raster.datetime)),
    )?;

    let collection = CollectionBuilder::new(FUSED_ID, destination)
        .title(FUSED_TITLE)
        .description(FUSED_DESCRIPTION)
        .license(FUSED_LICENSE, fused_license_link())
        .provider(provider())
        .extent(extent)
        .eo_summary(eo_extension())
        .build()?;
    collection.save()?;
    info!("saved fused collection {}", collection.path().display());
    Ok(collection)
}
