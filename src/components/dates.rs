use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::path::Path;

use crate::errors::{HkhGlacierError, Result};

/// Acquisition date of a raster named like `LE07_134040_20070922_clip.tif`.
///
/// The third `_` separated token of the file name must be exactly `YYYYMMDD`,
/// it is read as midnight UTC.
pub fn parse_filename_date(filename: &str) -> Result<DateTime<Utc>> {
    let parse_error = || HkhGlacierError::DateParse {
        filename: filename.to_string(),
    };
    let name = Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(parse_error)?;
    let token = name.split('_').nth(2).ok_or_else(parse_error)?;
    if token.len() != 8 || !token.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(parse_error());
    }
    let date = NaiveDate::parse_from_str(token, "%Y%m%d").map_err(|_| parse_error())?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}
