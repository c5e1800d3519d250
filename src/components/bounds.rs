use geo::{Coord, Rect};
use shrinkwraprs::Shrinkwrap;

use crate::{
    components::transforms::PixelGeoTransform,
    crs_geo::{CrsGeometry, Epsg},
    errors::{HkhGlacierError, Result},
};

/// Axis aligned bounding box in a known CRS.
#[derive(Shrinkwrap, Clone, Debug, PartialEq)]
pub struct GeoBounds(CrsGeometry<Rect>);

impl From<CrsGeometry<Rect>> for GeoBounds {
    fn from(value: CrsGeometry<Rect>) -> Self {
        Self(value)
    }
}

impl GeoBounds {
    pub fn new(epsg: Epsg, rect: Rect) -> Self {
        Self(CrsGeometry::new(epsg, rect))
    }

    /// Bounds of a `(rows, cols)` pixel grid placed by `transform`.
    pub fn from_pixel_grid(epsg: Epsg, transform: &PixelGeoTransform, shape: (usize, usize)) -> Self {
        let (rows, cols) = (shape.0 as f64, shape.1 as f64);
        let corners = [(0., 0.), (cols, 0.), (cols, rows), (0., rows)]
            .map(|(x, y)| transform.pixel_to_geo(Coord { x, y }));
        let (min, max) = corners.iter().skip(1).fold(
            (corners[0], corners[0]),
            |(min, max), corner| {
                (
                    Coord {
                        x: min.x.min(corner.x),
                        y: min.y.min(corner.y),
                    },
                    Coord {
                        x: max.x.max(corner.x),
                        y: max.y.max(corner.y),
                    },
                )
            },
        );
        Self::new(epsg, Rect::new(min, max))
    }

    /// `[min_x, min_y, max_x, max_y]`
    pub fn to_array(&self) -> [f64; 4] {
        let (min, max) = (self.min(), self.max());
        [min.x, min.y, max.x, max.y]
    }

    pub fn contains(&self, other: &GeoBounds) -> bool {
        self.epsg() == other.epsg()
            && self.min().x <= other.min().x
            && self.min().y <= other.min().y
            && self.max().x >= other.max().x
            && self.max().y >= other.max().y
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &GeoBounds) -> Result<GeoBounds> {
        if self.epsg() != other.epsg() {
            return Err(HkhGlacierError::CrsMismatch {
                expected: self.epsg(),
                found: other.epsg(),
            });
        }
        let min = Coord {
            x: self.min().x.min(other.min().x),
            y: self.min().y.min(other.min().y),
        };
        let max = Coord {
            x: self.max().x.max(other.max().x),
            y: self.max().y.max(other.max().y),
        };
        Ok(Self::new(self.epsg(), Rect::new(min, max)))
    }
}
