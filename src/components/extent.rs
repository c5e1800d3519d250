use geo::{orient::Direction, AffineOps, Coord, Orient, Polygon};
use log::{debug, warn};

use crate::{
    components::{
        bounds::GeoBounds,
        file::RasterPrimitives,
        footprint::{vectorize_mask, RegionPolicy},
        transforms::{CoordinateTransform, PixelGeoTransform},
    },
    crs_geo::{CrsGeometry, Epsg, Precision},
    errors::{HkhGlacierError, Result},
    stac::extensions::ProjectionExtension,
};

/// Pixel grid of one item in its own CRS.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionParameters {
    pub epsg: Epsg,
    /// (rows, cols)
    pub shape: (usize, usize),
    pub transform: PixelGeoTransform,
    /// Bounds in `epsg`, not reprojected.
    pub bbox: GeoBounds,
}

impl ProjectionParameters {
    pub fn extension(&self) -> ProjectionExtension {
        ProjectionExtension {
            epsg: Some(self.epsg),
            shape: Some([self.shape.0, self.shape.1]),
            transform: Some(self.transform.coefficients().to_vec()),
            bbox: Some(self.bbox.to_array()),
        }
    }
}

/// Footprint, bounding box and projection of a single item.
#[derive(Debug, Clone)]
pub struct ItemExtent {
    pub footprint: CrsGeometry<Polygon>,
    pub bbox: GeoBounds,
    pub projection: ProjectionParameters,
}

/// Geometry of a raster patch described by a polygon instead of a raster file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchGrid {
    pub shape: (usize, usize),
    pub pixel_size: f64,
}

impl PatchGrid {
    /// 512 x 512 pixels of 30 m.
    pub const LANDSAT_SLICE: PatchGrid = PatchGrid {
        shape: (512, 512),
        pixel_size: 30.,
    };
}

/// Extent of a raster from its valid-data mask.
///
/// The footprint is the outline of the valid pixels, reprojected with six
/// decimals to the target of `transform`.
pub fn raster_extent(
    primitives: &RasterPrimitives,
    transform: &CoordinateTransform,
    policy: RegionPolicy,
) -> Result<ItemExtent> {
    let extent_error = |reason: &str| HkhGlacierError::RasterExtent {
        path: primitives.path.clone(),
        reason: reason.to_string(),
    };
    if primitives.mask.dim() != primitives.shape {
        return Err(extent_error("mask shape differs from raster shape"));
    }
    let mask_footprint = vectorize_mask(primitives.mask.view(), policy)
        .ok_or_else(|| extent_error("mask has no valid pixel"))?;
    if mask_footprint.regions > 1 {
        warn!(
            "{}: {} data regions, keeping the first one only",
            primitives.path.display(),
            mask_footprint.regions
        );
    }

    // Pixel rows grow downwards, so ring winding depends on the sign of the
    // transform. Exteriors are made counter-clockwise after placing them.
    let footprint = CrsGeometry::new(
        primitives.epsg,
        mask_footprint
            .polygon
            .affine_transform(&primitives.transform)
            .orient(Direction::Default),
    );
    let (footprint, bbox) = footprint.reproject(transform, Some(Precision::FOOTPRINT))?;
    debug!("{}: footprint bbox {:?}", primitives.path.display(), bbox.to_array());

    Ok(ItemExtent {
        footprint,
        bbox,
        projection: ProjectionParameters {
            epsg: primitives.epsg,
            shape: primitives.shape,
            transform: primitives.transform,
            bbox: primitives.bounds.clone(),
        },
    })
}

/// Extent of a patch whose outline is given in its native CRS.
///
/// The pixel grid is anchored at the upper left corner of the outline.
pub fn patch_extent(
    outline: &CrsGeometry<Polygon>,
    transform: &CoordinateTransform,
    grid: PatchGrid,
) -> Result<ItemExtent> {
    let (footprint, bbox) = outline.reproject(transform, None)?;
    let native_bbox = outline
        .bounding_rect()
        .ok_or_else(|| HkhGlacierError::Geometry("patch outline has no coordinates".into()))?;
    let origin = Coord {
        x: native_bbox.min().x,
        y: native_bbox.max().y,
    };

    Ok(ItemExtent {
        footprint,
        bbox,
        projection: ProjectionParameters {
            epsg: outline.epsg(),
            shape: grid.shape,
            transform: PixelGeoTransform::north_up(origin, grid.pixel_size),
            bbox: native_bbox,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, CoordsIter, Winding};
    use ndarray::Array2;
    use std::path::PathBuf;
    use test_log::test;

    const UTM_45N: Epsg = Epsg::new(32645);

    fn primitives(mask: Array2<bool>) -> RasterPrimitives {
        let transform = PixelGeoTransform::north_up(Coord { x: 400000., y: 3100000. }, 30.);
        let shape = mask.dim();
        RasterPrimitives {
            path: PathBuf::from("LE07_134040_20070922_clip.tif"),
            epsg: UTM_45N,
            transform,
            shape,
            bounds: GeoBounds::from_pixel_grid(UTM_45N, &transform, shape),
            mask,
        }
    }

    #[test]
    fn raster_extent_of_partial_mask() {
        let mut mask = Array2::from_elem((10, 20), false);
        mask.slice_mut(ndarray::s![2..8, 5..15]).fill(true);
        let primitives = primitives(mask);
        let transform = CoordinateTransform::to_wgs84(UTM_45N).unwrap();

        let extent = raster_extent(&primitives, &transform, RegionPolicy::default()).unwrap();

        assert_eq!(extent.footprint.epsg(), Epsg::WGS84);
        assert_eq!(extent.footprint.exterior().coords_count(), 5);
        assert!(extent.footprint.exterior().is_ccw());
        assert_eq!(extent.projection.epsg, UTM_45N);
        assert_eq!(extent.projection.shape, (10, 20));
        assert_eq!(
            extent.projection.bbox.to_array(),
            [400000., 3099700., 400600., 3100000.]
        );
        // The valid pixels lie strictly inside the raster.
        let (_, raster_bbox) = CrsGeometry::new(UTM_45N, primitives.bounds.to_polygon())
            .reproject(&transform, None)
            .unwrap();
        assert!(raster_bbox.contains(&extent.bbox));
        assert_ne!(raster_bbox, extent.bbox);
    }

    #[test]
    fn holed_footprint_follows_right_hand_rule() {
        let mut mask = Array2::from_elem((6, 6), true);
        mask[[2, 3]] = false;
        let primitives = primitives(mask);
        let transform = CoordinateTransform::to_wgs84(UTM_45N).unwrap();

        let extent = raster_extent(&primitives, &transform, RegionPolicy::default()).unwrap();

        assert!(extent.footprint.exterior().is_ccw());
        assert_eq!(extent.footprint.interiors().len(), 1);
        assert!(extent.footprint.interiors()[0].is_cw());
    }

    #[test]
    fn empty_mask_is_a_raster_extent_error() {
        let primitives = primitives(Array2::from_elem((4, 4), false));
        let transform = CoordinateTransform::to_wgs84(UTM_45N).unwrap();
        assert!(matches!(
            raster_extent(&primitives, &transform, RegionPolicy::default()),
            Err(HkhGlacierError::RasterExtent { .. })
        ));
    }

    #[test]
    fn projection_extension_fields() {
        let extent_params = primitives(Array2::from_elem((2, 3), true));
        let params = ProjectionParameters {
            epsg: extent_params.epsg,
            shape: extent_params.shape,
            transform: extent_params.transform,
            bbox: extent_params.bounds,
        };
        let extension = params.extension();
        assert_eq!(extension.epsg, Some(UTM_45N));
        assert_eq!(extension.shape, Some([2, 3]));
        assert_eq!(
            extension.transform,
            Some(vec![30., 0., 400000., 0., -30., 3100000.])
        );
        assert_eq!(extension.bbox, Some([400000., 3099940., 400090., 3100000.]));
    }

    #[test]
    fn patch_grid_is_anchored_upper_left() {
        let outline = CrsGeometry::new(
            UTM_45N,
            polygon![
                (x: 400000., y: 3100000.),
                (x: 415360., y: 3100000.),
                (x: 415360., y: 3084640.),
                (x: 400000., y: 3084640.),
            ],
        );
        let transform = CoordinateTransform::to_wgs84(UTM_45N).unwrap();

        let extent = patch_extent(&outline, &transform, PatchGrid::LANDSAT_SLICE).unwrap();

        assert_eq!(extent.projection.shape, (512, 512));
        assert_eq!(
            extent.projection.transform.coefficients(),
            [30., 0., 400000., 0., -30., 3100000.]
        );
        assert_eq!(
            extent.projection.bbox.to_array(),
            [400000., 3084640., 415360., 3100000.]
        );
        let [min_x, min_y, max_x, max_y] = extent.bbox.to_array();
        assert!(-180. <= min_x && max_x <= 180. && -90. <= min_y && max_y <= 90.);
    }
}
