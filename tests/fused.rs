use chrono::{TimeZone, Utc};
use gdal::{raster::Buffer, spatial_ref::SpatialRef, DriverManager};
use geo::{polygon, Polygon};
use serde_json::Value;
use std::{fs, path::Path};
use tempfile::TempDir;
use test_log::test;

use hkh_glacier_stac::{
    dataset::{create_fused_collection, create_fused_item},
    CoordinateTransform, CrsGeometry, Epsg, GeoBounds, HkhGlacierError, Precision,
};

const UTM_45N: u32 = 32645;
const SIZE: usize = 20;
const ORIGIN: (f64, f64) = (400000., 3100000.);
const PIXEL: f64 = 30.;

fn gtiff_available() -> bool {
    DriverManager::get_driver_by_name("GTiff").is_ok()
}

/// Single band `SIZE` x `SIZE` raster, valid on `rows` x `cols` only.
fn write_raster(path: &Path, rows: std::ops::Range<usize>, cols: std::ops::Range<usize>) {
    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let mut dataset = driver
        .create_with_band_type::<u8, _>(path, SIZE, SIZE, 1)
        .unwrap();
    dataset
        .set_geo_transform(&[ORIGIN.0, PIXEL, 0., ORIGIN.1, 0., -PIXEL])
        .unwrap();
    let wkt = SpatialRef::from_epsg(UTM_45N).unwrap().to_wkt().unwrap();
    dataset.set_projection(&wkt).unwrap();

    let mut data = vec![0u8; SIZE * SIZE];
    for row in rows {
        for col in cols.clone() {
            data[row * SIZE + col] = 1;
        }
    }
    let mut band = dataset.rasterband(1).unwrap();
    band.set_no_data_value(Some(0.)).unwrap();
    let mut buffer = Buffer::new((SIZE, SIZE), data);
    band.write((0, 0), (SIZE, SIZE), &mut buffer).unwrap();
}

/// Outline of a block of pixels in UTM coordinates.
fn block(rows: std::ops::Range<usize>, cols: std::ops::Range<usize>) -> Polygon {
    let x = |col: usize| ORIGIN.0 + col as f64 * PIXEL;
    let y = |row: usize| ORIGIN.1 - row as f64 * PIXEL;
    polygon![
        (x: x(cols.start), y: y(rows.start)),
        (x: x(cols.end), y: y(rows.start)),
        (x: x(cols.end), y: y(rows.end)),
        (x: x(cols.start), y: y(rows.end)),
    ]
}

fn reprojected_bounds(outline: Polygon) -> GeoBounds {
    let transform = CoordinateTransform::to_wgs84(Epsg::new(UTM_45N)).unwrap();
    let (_, bbox) = CrsGeometry::new(Epsg::new(UTM_45N), outline)
        .reproject(&transform, Some(Precision::FOOTPRINT))
        .unwrap();
    bbox
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn fused_collection_of_disjoint_rasters() {
    if !gtiff_available() {
        eprintln!("Skipping test: GTiff driver not available");
        return;
    }
    let fused = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    write_raster(&fused.path().join("LE07_134040_20070922_clip.tif"), 10..20, 10..20);
    write_raster(&fused.path().join("LE07_134040_20070101_clip.tif"), 0..10, 0..10);

    let collection = create_fused_collection(fused.path(), destination.path()).unwrap();

    let extent = collection.extent();
    assert_eq!(
        extent.temporal.interval,
        vec![[
            Some(Utc.with_ymd_and_hms(2007, 1, 1, 0, 0, 0).unwrap()),
            Some(Utc.with_ymd_and_hms(2007, 9, 22, 0, 0, 0).unwrap()),
        ]]
    );
    let union = reprojected_bounds(block(0..10, 0..10))
        .union(&reprojected_bounds(block(10..20, 10..20)))
        .unwrap();
    assert_eq!(extent.spatial.bbox, vec![union.to_array()]);

    let json = read_json(&destination.path().join("lila-hkh-glacier-fused.json"));
    assert_eq!(json["license"], "PDDL-1.0");
    assert_eq!(json["summaries"]["eo:bands"].as_array().unwrap().len(), 15);
    assert_eq!(json["links"][1]["href"], "https://spdx.org/licenses/PDDL-1.0.html");
}

#[test]
fn fused_item_of_partial_raster() {
    if !gtiff_available() {
        eprintln!("Skipping test: GTiff driver not available");
        return;
    }
    let fused = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let cog = fused.path().join("LE07_134040_20070922_clip.tif");
    write_raster(&cog, 5..15, 2..8);

    let item = create_fused_item(&cog, destination.path()).unwrap();

    assert_eq!(item.id(), "LE07_134040_20070922_clip");
    assert_eq!(item.bbox(), reprojected_bounds(block(5..15, 2..8)).to_array());
    let json = read_json(item.path());
    assert_eq!(json["properties"]["datetime"], "2007-09-22T00:00:00Z");
    assert_eq!(json["properties"]["proj:epsg"], UTM_45N);
    assert_eq!(json["properties"]["proj:shape"], serde_json::json!([SIZE, SIZE]));
    assert_eq!(
        json["properties"]["proj:bbox"],
        serde_json::json!([400000., 3099400., 400600., 3100000.])
    );
    assert_eq!(json["properties"]["eo:bands"][0]["name"], "LE7 B1");
    assert_eq!(json["assets"]["image"]["roles"], serde_json::json!(["data"]));
    assert_eq!(json["geometry"]["coordinates"][0].as_array().unwrap().len(), 5);
}

#[test]
fn empty_raster_directory_fails() {
    let fused = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let err = create_fused_collection(fused.path(), destination.path()).unwrap_err();
    assert!(matches!(err.root(), HkhGlacierError::EmptyAggregation));
}

#[test]
fn raster_without_data_names_the_file() {
    if !gtiff_available() {
        eprintln!("Skipping test: GTiff driver not available");
        return;
    }
    let fused = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let cog = fused.path().join("LE07_134040_20070922_clip.tif");
    write_raster(&cog, 0..0, 0..0);

    let err = create_fused_item(&cog, destination.path()).unwrap_err();
    assert!(matches!(&err, HkhGlacierError::Raster { path, .. } if *path == cog));
    assert!(matches!(err.root(), HkhGlacierError::RasterExtent { .. }));
}
