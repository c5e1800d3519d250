use ndarray::Array2;
use std::{
    fmt::Debug,
    path::{Path, PathBuf},
};

use crate::{
    components::{bounds::GeoBounds, transforms::PixelGeoTransform},
    crs_geo::Epsg,
    errors::Result,
};

/// Georeferenced raster file, read only for its grid and valid-data mask.
pub trait File: Debug + Sized {
    fn open<P: AsRef<Path>>(path: P) -> Result<Self>;
    fn path(&self) -> &Path;
    /// (cols, rows)
    fn size(&self) -> (usize, usize);
    fn epsg(&self) -> Result<Epsg>;
    fn transform(&self) -> Result<PixelGeoTransform>;
    /// `true` where any band holds data, shaped (rows, cols).
    fn valid_data_mask(&self) -> Result<Array2<bool>>;

    fn primitives(&self) -> Result<RasterPrimitives> {
        let epsg = self.epsg()?;
        let transform = self.transform()?;
        let (cols, rows) = self.size();
        Ok(RasterPrimitives {
            path: self.path().to_path_buf(),
            epsg,
            transform,
            shape: (rows, cols),
            bounds: GeoBounds::from_pixel_grid(epsg, &transform, (rows, cols)),
            mask: self.valid_data_mask()?,
        })
    }
}

/// Everything extent extraction needs from a raster.
#[derive(Debug, Clone)]
pub struct RasterPrimitives {
    pub path: PathBuf,
    pub epsg: Epsg,
    pub transform: PixelGeoTransform,
    /// (rows, cols)
    pub shape: (usize, usize),
    /// Bounds in the raster CRS.
    pub bounds: GeoBounds,
    pub mask: Array2<bool>,
}
