use std::fmt;

use geo::{BoundingRect, Coord, CoordsIter, MapCoords, Polygon, Rect};
use serde::Serialize;
use shrinkwraprs::Shrinkwrap;

use crate::{
    components::{bounds::GeoBounds, transforms::CoordinateTransform},
    errors::{HkhGlacierError, Result},
};

/// EPSG registry code of a coordinate reference system.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Epsg(u32);

impl Epsg {
    pub const WGS84: Epsg = Epsg(4326);

    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    pub fn code(&self) -> u32 {
        self.0
    }

    /// Parses CRS names such as `urn:ogc:def:crs:EPSG::32645` or `EPSG:32645`.
    pub fn from_crs_name(name: &str) -> Result<Self> {
        let invalid = |reason: &str| HkhGlacierError::InvalidCrs {
            crs: name.to_string(),
            reason: reason.to_string(),
        };
        let (_, code) = name
            .rsplit_once("EPSG:")
            .ok_or_else(|| invalid("no EPSG authority in name"))?;
        // `urn:ogc:def:crs:EPSG:<version>:<code>`, version is usually empty.
        let code = code.rsplit(':').next().unwrap_or(code);
        code.trim()
            .parse::<u32>()
            .map(Epsg)
            .map_err(|_| invalid("EPSG code is not an unsigned integer"))
    }
}

impl fmt::Display for Epsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

/// Number of decimals kept on reprojected coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision(i32);

impl Precision {
    /// Precision of raster footprints in degrees.
    pub const FOOTPRINT: Precision = Precision(6);

    pub const fn decimals(decimals: i32) -> Self {
        Self(decimals)
    }

    pub fn round(&self, coord: Coord) -> Coord {
        let scale = 10f64.powi(self.0);
        Coord {
            x: (coord.x * scale).round() / scale,
            y: (coord.y * scale).round() / scale,
        }
    }
}

/// Geometry tagged with the CRS its coordinates are expressed in.
#[derive(Shrinkwrap, Debug, Clone, PartialEq)]
pub struct CrsGeometry<G> {
    epsg: Epsg,
    #[shrinkwrap(main_field)]
    geometry: G,
}

impl<G> CrsGeometry<G> {
    pub fn new(epsg: Epsg, geometry: G) -> Self {
        Self { epsg, geometry }
    }

    pub fn epsg(&self) -> Epsg {
        self.epsg
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    pub fn into_geometry(self) -> G {
        self.geometry
    }
}

impl<G: BoundingRect<f64>> CrsGeometry<G> {
    pub fn bounding_rect(&self) -> Option<GeoBounds> {
        let rect: Option<Rect> = self.geometry.bounding_rect().into();
        Some(GeoBounds::new(self.epsg, rect?))
    }
}

impl CrsGeometry<Polygon> {
    /// Distinct vertices of the exterior ring, the closing coordinate excluded.
    pub fn vertex_count(&self) -> usize {
        let exterior = self.geometry.exterior();
        match exterior.coords_count() {
            0 => 0,
            n if exterior.is_closed() => n - 1,
            n => n,
        }
    }

    /// Reprojects every vertex of every ring and derives the bounding box
    /// from the reprojected vertices.
    pub fn reproject(
        &self,
        transform: &CoordinateTransform,
        precision: Option<Precision>,
    ) -> Result<(CrsGeometry<Polygon>, GeoBounds)> {
        if self.epsg != transform.source() {
            return Err(HkhGlacierError::CrsMismatch {
                expected: transform.source(),
                found: self.epsg,
            });
        }
        let vertices = self.vertex_count();
        if vertices < 3 {
            return Err(HkhGlacierError::Geometry(format!(
                "polygon ring has {vertices} vertices, at least 3 are needed"
            )));
        }

        let polygon = self.geometry.try_map_coords(|coord| {
            let coord = transform.convert(coord)?;
            Ok::<_, HkhGlacierError>(match precision {
                Some(precision) => precision.round(coord),
                None => coord,
            })
        })?;
        let reprojected = CrsGeometry::new(transform.target(), polygon);
        let bbox = reprojected.bounding_rect().ok_or_else(|| {
            HkhGlacierError::Geometry("reprojected polygon has no coordinates".into())
        })?;
        Ok((reprojected, bbox))
    }
}
