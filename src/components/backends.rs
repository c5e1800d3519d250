use ndarray::Array2;
use std::path::Path;

use crate::{
    components::{file::File, transforms::PixelGeoTransform},
    crs_geo::Epsg,
    errors::{HkhGlacierError, Result},
};

/// Implementations for gdal
pub mod gdal_backend {
    use super::*;
    use gdal::{errors::Result as GdalResult, raster::RasterBand, Dataset as GdalDataset};
    use log::debug;
    use std::path::PathBuf;

    #[derive(Debug)]
    pub struct GdalFile {
        path: PathBuf,
        dataset: GdalDataset,
    }

    impl GdalFile {
        fn extent_error(&self, reason: impl Into<String>) -> HkhGlacierError {
            HkhGlacierError::RasterExtent {
                path: self.path.clone(),
                reason: reason.into(),
            }
        }
    }

    fn band_mask(band: &RasterBand, size: (usize, usize)) -> GdalResult<Vec<u8>> {
        let buffer = band
            .open_mask_band()?
            .read_as::<u8>((0, 0), size, size, None)?;
        Ok(buffer.data().to_vec())
    }

    impl File for GdalFile {
        fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
            Ok(GdalFile {
                path: path.as_ref().to_path_buf(),
                dataset: GdalDataset::open(&path)?,
            })
        }
        fn path(&self) -> &Path {
            &self.path
        }
        fn size(&self) -> (usize, usize) {
            self.dataset.raster_size()
        }
        fn epsg(&self) -> Result<Epsg> {
            let mut spatial_ref = self
                .dataset
                .spatial_ref()
                .map_err(|err| self.extent_error(format!("no CRS: {err}")))?;
            if spatial_ref.auth_code().is_err() {
                spatial_ref
                    .auto_identify_epsg()
                    .map_err(|err| self.extent_error(format!("CRS has no EPSG code: {err}")))?;
            }
            let code = spatial_ref
                .auth_code()
                .map_err(|err| self.extent_error(format!("CRS has no EPSG code: {err}")))?;
            u32::try_from(code)
                .map(Epsg::new)
                .map_err(|_| self.extent_error(format!("invalid EPSG code {code}")))
        }
        fn transform(&self) -> Result<PixelGeoTransform> {
            Ok(PixelGeoTransform::from_gdal(self.dataset.geo_transform()?))
        }
        fn valid_data_mask(&self) -> Result<Array2<bool>> {
            let (cols, rows) = self.size();
            let mut valid = vec![false; rows * cols];
            for band in self.dataset.rasterbands() {
                let mask = band_mask(&band?, (cols, rows))?;
                valid
                    .iter_mut()
                    .zip(mask)
                    .for_each(|(valid, mask)| *valid |= mask != 0);
            }
            debug!(
                "{}: {} of {} pixels hold data",
                self.path.display(),
                valid.iter().filter(|valid| **valid).count(),
                valid.len()
            );
            Array2::from_shape_vec((rows, cols), valid)
                .map_err(|err| self.extent_error(format!("mask shape: {err}")))
        }
    }
}
