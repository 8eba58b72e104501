//! Trip segmentation API

use log::{debug, info, warn};
use serde::Deserialize;
use time::UtcOffset;

use super::geodesy;
use super::position::Ping;
use super::store::TripStore;
use super::trip::Trip;
use crate::error::{Result, TripError};

/// Movement thresholds and worker pool size
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SegmentOptions {
    /// Elapsed time, in whole seconds, that must be exceeded
    pub min_elapsed_seconds: i64,
    /// Traveled distance, in meters, that must be exceeded
    pub min_distance_meters: f64,
    /// Size of the worker pool, all cores when absent
    pub workers: Option<usize>,
}

impl SegmentOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            // 80 m per minute is an average walking pace
            min_elapsed_seconds: 60,
            min_distance_meters: 80.0,
            workers: None,
        }
    }
}

/// Turns the pings of one device into trips
pub struct TripSegmenter<'a, S: TripStore + ?Sized> {
    store: &'a S,
    options: SegmentOptions,
    offset: UtcOffset,
}

impl<'a, S: TripStore + ?Sized> TripSegmenter<'a, S> {
    /// Start a new segmenter, dating trips in UTC
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            options: SegmentOptions::default(),
            offset: UtcOffset::UTC,
        }
    }

    pub fn options(&mut self, options: SegmentOptions) -> &mut Self {
        self.options = options;

        self
    }

    /// Calendar offset used for the trip dates
    pub fn offset(&mut self, offset: UtcOffset) -> &mut Self {
        self.offset = offset;

        self
    }

    /// Both the elapsed time and the traveled distance must exceed
    /// their thresholds. Pings too far apart to measure never move.
    pub fn has_moved(&self, current: &Ping, next: &Ping) -> bool {
        let elapsed = match next
            .timestamp_millis()
            .checked_sub(current.timestamp_millis())
        {
            Some(millis) => millis / 1000,
            None => {
                warn!(
                    "Elapsed time overflows between {} and {} for `{}`",
                    current.timestamp_millis(),
                    next.timestamp_millis(),
                    next.device_id()
                );
                return false;
            }
        };
        let traveled = geodesy::distance(current.coordinate(), next.coordinate());

        elapsed > self.options.min_elapsed_seconds && traveled > self.options.min_distance_meters
    }

    /// Build the trips of a device from its pings, in any order.
    ///
    /// When the store holds trips for the device the scan resumes from the
    /// end of the last one. New trips replace the stored ones; nothing is
    /// stored when no trip comes out.
    pub fn segment(&self, device_id: &str, mut pings: Vec<Ping>) -> Result<Vec<Trip>> {
        if device_id.trim().is_empty() {
            return Err(TripError::Validation(
                "Device id is blank, can't build trips".to_string(),
            ));
        }

        let seed = match self.store.last(device_id) {
            Some(last) => Some(Ping::new(
                device_id.to_string(),
                last.end_timestamp_millis(),
                *last.end_coordinate(),
            )?),
            None => None,
        };

        let available = pings.len() + usize::from(seed.is_some());
        if available < 2 {
            info!(
                "Insufficient pings for `{}`: {} available, skipping",
                device_id, available
            );
            return Ok(vec![]);
        }

        pings.sort_by_key(|p| p.timestamp_millis());

        let (mut current, rest) = match seed {
            Some(seed) => (seed, &pings[..]),
            None => (pings[0].clone(), &pings[1..]),
        };

        let mut trips = vec![];
        for next in rest {
            if self.has_moved(&current, next) {
                let trip = Trip::between(&current, next, self.offset)?;
                debug!(
                    "Trip of `{}` from {} ({}) to {} ({})",
                    device_id,
                    trip.start_coordinate(),
                    trip.start_timestamp_millis(),
                    trip.end_coordinate(),
                    trip.end_timestamp_millis()
                );
                trips.push(trip);
            }

            current = next.clone();
        }

        if trips.is_empty() {
            info!("No movement found for `{}`", device_id);
            return Ok(vec![]);
        }

        self.store.put(device_id, trips.clone());

        Ok(trips)
    }
}
