//! Trip definition

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use super::coordinate::Coordinate;
use super::position::Ping;
use crate::error::{Result, TripError};

/// One inferred movement interval of a device
#[derive(Clone, Debug, PartialEq)]
pub struct Trip {
    device_id: String,
    /// `yyyyMMdd` of the start, always derived from `start_timestamp_millis`
    date: String,
    start_timestamp_millis: i64,
    start_coordinate: Coordinate,
    end_timestamp_millis: i64,
    end_coordinate: Coordinate,
}

impl Trip {
    /// Build a trip, the date is computed in the `offset` calendar
    pub fn new(
        device_id: String,
        start_timestamp_millis: i64,
        start_coordinate: Coordinate,
        end_timestamp_millis: i64,
        end_coordinate: Coordinate,
        offset: UtcOffset,
    ) -> Result<Self> {
        if device_id.trim().is_empty() {
            return Err(TripError::Validation("Device id is blank".to_string()));
        }
        if start_timestamp_millis > end_timestamp_millis {
            return Err(TripError::Validation(format!(
                "Trip of `{}` starts at {} after its end at {}",
                device_id, start_timestamp_millis, end_timestamp_millis
            )));
        }

        let date = date_string(start_timestamp_millis, offset)?;

        Ok(Self {
            device_id,
            date,
            start_timestamp_millis,
            start_coordinate,
            end_timestamp_millis,
            end_coordinate,
        })
    }

    /// Trip between two pings of the same device
    pub fn between(start: &Ping, end: &Ping, offset: UtcOffset) -> Result<Self> {
        Self::new(
            start.device_id().to_string(),
            start.timestamp_millis(),
            *start.coordinate(),
            end.timestamp_millis(),
            *end.coordinate(),
            offset,
        )
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn date_string(&self) -> &str {
        &self.date
    }

    pub fn start_timestamp_millis(&self) -> i64 {
        self.start_timestamp_millis
    }

    pub fn start_coordinate(&self) -> &Coordinate {
        &self.start_coordinate
    }

    pub fn end_timestamp_millis(&self) -> i64 {
        self.end_timestamp_millis
    }

    pub fn end_coordinate(&self) -> &Coordinate {
        &self.end_coordinate
    }

    /// Start instant in the UTC offset
    pub fn start_time(&self) -> Result<OffsetDateTime> {
        to_datetime(self.start_timestamp_millis)
    }

    /// End instant in the UTC offset
    pub fn end_time(&self) -> Result<OffsetDateTime> {
        to_datetime(self.end_timestamp_millis)
    }
}

fn to_datetime(timestamp_millis: i64) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(timestamp_millis as i128 * 1_000_000).map_err(|e| {
        TripError::Validation(format!("Timestamp {} out of range: {}", timestamp_millis, e))
    })
}

fn date_string(timestamp_millis: i64, offset: UtcOffset) -> Result<String> {
    let day = to_datetime(timestamp_millis)?
        .to_offset(offset)
        .format(format_description!("[year][month][day]"))
        .map_err(|e| TripError::Validation(format!("Failed on format the day: {}", e)))?;

    Ok(day)
}
