//! Fixed descriptive metadata of the LILA HKH glacier mapping dataset.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    components::aggregate::TemporalExtent,
    errors::{HkhGlacierError, Result},
    stac::{extensions::Band, Link, Provider, ProviderRole},
};

pub const FUSED_ID: &str = "lila-hkh-glacier-fused";
pub const FUSED_TITLE: &str = "Hindu Kush Himalayas Glacier Mapping fused SRTM/Landsat 7 images";
pub const FUSED_DESCRIPTION: &str = "Each fused image is a spatial area measuring roughly 6km x 7.5km \
(with definitions that roughly match up with USGS quarter quadrangles). Each fused image comes with one \
corresponding GeoTIFF file. The entire glacier mapping dataset contains 35 tiles from Afghanistan, \
Bangladesh, Bhutan, China, India, Myanmar, Nepal, and Pakistan. Each GeoTIFF tile consists of 15 channels. \
All channels are aligned at 30m spatial resolution. Elevation and slope channels were upsampled from 90m \
to 30m resolution.";
pub const FUSED_LICENSE: &str = "PDDL-1.0";
const FUSED_LICENSE_HREF: &str = "https://spdx.org/licenses/PDDL-1.0.html";
const FUSED_LICENSE_TITLE: &str = "Open Data Commons Public Domain Dedication & License 1.0";

pub const SLICE_ID: &str = "lila-hkh-glacier-slices";
pub const SLICE_TITLE: &str = "Hindu Kush Himalayas Glacier Mapping labelled image slices";
pub const SLICE_DESCRIPTION: &str = "This dataset couples annotated glacier locations with multispectral \
imagery from Landsat 7 and digital elevation and slope data from SRTM. Imagery are provided as numpy \
patches. Labels are available as multichannel numpy masks. Both the labels and the masks are cropped \
according to the borders of the HKH region.";
pub const SLICE_LICENSE: &str = "CDLA-Permissive-1.0";
const SLICE_LICENSE_HREF: &str = "https://spdx.org/licenses/CDLA-Permissive-1.0.html";
const SLICE_LICENSE_TITLE: &str = "Community Data License Agreement Permissive 1.0";

pub const LABEL_DESCRIPTION: &str =
    "The two channels in the pixel-wise masks correspond to clean-iced and debris-covered glaciers.";

/// Extension of the fused rasters.
pub const RASTER_EXTENSION: &str = "tif";
/// Extension of the provider metadata.
pub const METADATA_EXTENSION: &str = "geojson";

pub const FUSED_BANDS: [Band; 15] = [
    Band::spectral("LE7 B1", "blue", 0.485),
    Band::spectral("LE7 B2", "green", 0.56),
    Band::spectral("LE7 B3", "red", 0.66),
    Band::spectral("LE7 B4", "nir", 0.835),
    Band::spectral("LE7 B5", "swir16", 1.65),
    Band::spectral("LE7 B6_VCID_1", "lwir", 11.45),
    Band::spectral("LE7 B6_VCID_2", "lwir", 11.45),
    Band::spectral("LE7 B7", "swir22", 2.215),
    Band::spectral("LE7 B8", "pan", 0.71),
    Band::named("LE7 BQA"),
    Band::named("NDVI"),
    Band::named("NDSI"),
    Band::named("NDWI"),
    Band::named("SRTM 90 elevation"),
    Band::named("SRTM 90 slope"),
];

pub fn provider() -> Provider {
    Provider {
        name: "Labeled Information Library of Alexandria: Biology and Conservation".into(),
        roles: vec![ProviderRole::Producer, ProviderRole::Processor, ProviderRole::Host],
        url: "http://lila.science/datasets/hkh-glacier-mapping".into(),
    }
}

pub fn fused_license_link() -> Link {
    Link::license(FUSED_LICENSE_HREF, FUSED_LICENSE_TITLE)
}

pub fn slice_license_link() -> Link {
    Link::license(SLICE_LICENSE_HREF, SLICE_LICENSE_TITLE)
}

fn noon(year: i32, month: u32, day: u32) -> Result<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .map(|datetime| datetime.and_utc())
        .ok_or_else(|| HkhGlacierError::InvalidRecord {
            id: SLICE_ID.into(),
            reason: format!("{year}-{month:02}-{day:02} is not a date"),
        })
}

/// 2002-01-01T12:00:00Z to 2008-12-31T12:00:00Z, the acquisition window of
/// every labelled slice.
pub fn slice_window() -> Result<TemporalExtent> {
    TemporalExtent::new(noon(2002, 1, 1)?, noon(2008, 12, 31)?)
}
