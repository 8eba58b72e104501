//! Ping definition

use super::coordinate::Coordinate;
use crate::error::{Result, TripError};

/// One observed device position
#[derive(Clone, Debug, PartialEq)]
pub struct Ping {
    device_id: String,
    /// Epoch milliseconds, UTC
    timestamp_millis: i64,
    coordinate: Coordinate,
}

impl Ping {
    pub fn new(device_id: String, timestamp_millis: i64, coordinate: Coordinate) -> Result<Self> {
        if device_id.trim().is_empty() {
            return Err(TripError::Validation("Device id is blank".to_string()));
        }

        Ok(Self {
            device_id,
            timestamp_millis,
            coordinate,
        })
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp_millis
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }
}
