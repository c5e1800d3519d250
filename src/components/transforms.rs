use std::{
    collections::{hash_map::Entry, HashMap},
    fmt,
};

use geo::{AffineTransform, Coord};
use log::debug;
use proj::Proj;
use shrinkwraprs::Shrinkwrap;

use crate::{
    crs_geo::Epsg,
    errors::{HkhGlacierError, Result},
};

/// Source and target CRS of a coordinate transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CrsPair {
    pub source: Epsg,
    pub target: Epsg,
}

impl CrsPair {
    pub fn new(source: Epsg, target: Epsg) -> Self {
        Self { source, target }
    }

    pub fn to_wgs84(source: Epsg) -> Self {
        Self::new(source, Epsg::WGS84)
    }

    pub fn inverse(self) -> Self {
        Self::new(self.target, self.source)
    }

    pub fn transformer(self) -> Result<CoordinateTransform> {
        CoordinateTransform::new(self.source, self.target)
    }
}

/// Reprojects `(x, y)` coordinates between two CRS.
///
/// Axis order is always x/easting/longitude first, y/northing/latitude second,
/// whatever the axis order of the CRS definitions.
pub struct CoordinateTransform {
    pair: CrsPair,
    proj: Proj,
}

impl fmt::Debug for CoordinateTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinateTransform")
            .field("source", &self.pair.source)
            .field("target", &self.pair.target)
            .finish()
    }
}

impl CoordinateTransform {
    pub fn new(source: Epsg, target: Epsg) -> Result<Self> {
        // `new_known_crs` normalizes both CRS to x/y axis order.
        let proj = Proj::new_known_crs(&source.to_string(), &target.to_string(), None).map_err(
            |err| HkhGlacierError::InvalidCrs {
                crs: source.to_string(),
                reason: format!("no transform to {target}: {err}"),
            },
        )?;
        debug!("created transform {source} -> {target}");
        Ok(Self {
            pair: CrsPair::new(source, target),
            proj,
        })
    }

    pub fn to_wgs84(source: Epsg) -> Result<Self> {
        Self::new(source, Epsg::WGS84)
    }

    pub fn pair(&self) -> CrsPair {
        self.pair
    }

    pub fn source(&self) -> Epsg {
        self.pair.source
    }

    pub fn target(&self) -> Epsg {
        self.pair.target
    }

    pub fn inverse(&self) -> Result<Self> {
        self.pair.inverse().transformer()
    }

    pub fn convert(&self, coord: Coord) -> Result<Coord> {
        let (x, y) = self.proj.convert((coord.x, coord.y))?;
        Ok(Coord { x, y })
    }
}

/// Coordinate transforms keyed by their CRS pair, built on first use.
#[derive(Debug, Default)]
pub struct TransformCache {
    transforms: HashMap<CrsPair, CoordinateTransform>,
}

impl TransformCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, pair: CrsPair) -> Result<&CoordinateTransform> {
        match self.transforms.entry(pair) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(pair.transformer()?)),
        }
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

/// Affine transform from pixel `(col, row)` space to the raster CRS.
#[derive(Shrinkwrap, Debug, Clone, Copy, PartialEq)]
pub struct PixelGeoTransform(AffineTransform);

impl PixelGeoTransform {
    pub fn new(a: f64, b: f64, xoff: f64, d: f64, e: f64, yoff: f64) -> Self {
        Self(AffineTransform::new(a, b, xoff, d, e, yoff))
    }

    /// From GDAL ordering `[xoff, a, b, yoff, d, e]`.
    pub fn from_gdal(gdal_transform: [f64; 6]) -> Self {
        Self::new(
            gdal_transform[1],
            gdal_transform[2],
            gdal_transform[0],
            gdal_transform[4],
            gdal_transform[5],
            gdal_transform[3],
        )
    }

    /// North-up grid of square pixels with `origin` as its upper left corner.
    pub fn north_up(origin: Coord, pixel_size: f64) -> Self {
        Self::new(pixel_size, 0., origin.x, 0., -pixel_size, origin.y)
    }

    /// `[a, b, xoff, d, e, yoff]`
    pub fn coefficients(&self) -> [f64; 6] {
        [
            self.0.a(),
            self.0.b(),
            self.0.xoff(),
            self.0.d(),
            self.0.e(),
            self.0.yoff(),
        ]
    }

    /// Coefficients of the 3x3 matrix, row major.
    pub fn homogeneous(&self) -> [f64; 9] {
        let [a, b, xoff, d, e, yoff] = self.coefficients();
        [a, b, xoff, d, e, yoff, 0., 0., 1.]
    }

    pub fn pixel_to_geo(&self, pixel: Coord) -> Coord {
        self.0.apply(pixel)
    }
}
