use chrono::{DateTime, Utc};
use itertools::{Itertools, MinMaxResult};

use crate::{
    components::bounds::GeoBounds,
    errors::{HkhGlacierError, Result},
};

/// Box covering every input box.
pub fn aggregate_bounds<'a>(boxes: impl IntoIterator<Item = &'a GeoBounds>) -> Result<GeoBounds> {
    let mut boxes = boxes.into_iter();
    let first = boxes.next().ok_or(HkhGlacierError::EmptyAggregation)?;
    boxes.try_fold(first.clone(), |union, bounds| union.union(bounds))
}

/// Closed UTC time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalExtent {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TemporalExtent {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            return Err(HkhGlacierError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Earliest to latest of `datetimes`, whatever their order.
    pub fn covering(datetimes: impl IntoIterator<Item = DateTime<Utc>>) -> Result<Self> {
        match datetimes.into_iter().minmax() {
            MinMaxResult::NoElements => Err(HkhGlacierError::EmptyAggregation),
            MinMaxResult::OneElement(datetime) => Ok(Self {
                start: datetime,
                end: datetime,
            }),
            MinMaxResult::MinMax(start, end) => Ok(Self { start, end }),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// Spatial and temporal coverage of a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Extent {
    pub spatial: GeoBounds,
    pub temporal: TemporalExtent,
}

impl Extent {
    /// Aggregates the spatial extent only, `temporal` is a fixed window.
    pub fn with_fixed_window<'a>(
        boxes: impl IntoIterator<Item = &'a GeoBounds>,
        temporal: TemporalExtent,
    ) -> Result<Self> {
        Ok(Self {
            spatial: aggregate_bounds(boxes)?,
            temporal,
        })
    }

    /// Aggregates per item boxes and datetimes.
    pub fn covering<'a>(
        items: impl IntoIterator<Item = (&'a GeoBounds, DateTime<Utc>)>,
    ) -> Result<Self> {
        let (boxes, datetimes): (Vec<_>, Vec<_>) = items.into_iter().unzip();
        Ok(Self {
            spatial: aggregate_bounds(boxes)?,
            temporal: TemporalExtent::covering(datetimes)?,
        })
    }
}
