//! Default trips generator over many devices

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use rayon::prelude::*;
use time::UtcOffset;

use super::position::Ping;
use super::segmenter::{SegmentOptions, TripSegmenter};
use super::store::TripStore;
use super::trip::Trip;
use crate::error::{Result, TripError};
use crate::PingsSource;

/// Device whose segmentation failed
#[derive(Debug)]
pub struct DeviceFailure {
    pub device_id: String,
    pub error: TripError,
}

/// Merged outcome of a run
#[derive(Debug, Default)]
pub struct Aggregation {
    /// Trips of every device, chronological within a device
    pub trips: Vec<Trip>,
    /// Devices processed
    pub devices: usize,
    /// Devices skipped after a cancellation
    pub cancelled: usize,
    pub failures: Vec<DeviceFailure>,
}

enum DeviceOutcome {
    Trips(Vec<Trip>),
    Failed(DeviceFailure),
    Cancelled,
}

/// Fans the pings out per device and merges the trips
pub struct Aggregator<'a, S: TripStore + ?Sized> {
    store: &'a S,
    options: SegmentOptions,
    offset: UtcOffset,
    cancel: Arc<AtomicBool>,
}

impl<'a, S: TripStore + ?Sized> Aggregator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            options: SegmentOptions::default(),
            offset: UtcOffset::UTC,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn options(&mut self, options: SegmentOptions) -> &mut Self {
        self.options = options;

        self
    }

    pub fn offset(&mut self, offset: UtcOffset) -> &mut Self {
        self.offset = offset;

        self
    }

    /// Flag checked before each device starts, once raised the
    /// remaining devices are skipped whole
    pub fn cancellation(&mut self, cancel: Arc<AtomicBool>) -> &mut Self {
        self.cancel = cancel;

        self
    }

    /// Group the pings by exact device id
    pub fn group_by_device(pings: Vec<Ping>) -> HashMap<String, Vec<Ping>> {
        let mut devices: HashMap<String, Vec<Ping>> = HashMap::new();

        for ping in pings {
            devices
                .entry(ping.device_id().to_string())
                .or_default()
                .push(ping);
        }

        devices
    }

    /// Segment every device, in parallel
    pub fn run(&self, pings: Vec<Ping>) -> Result<Aggregation> {
        let devices = Self::group_by_device(pings);

        match self.options.workers {
            Some(workers) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .build()
                    .map_err(|e| TripError::Pool(e.to_string()))?;
                Ok(pool.install(|| self.run_devices(devices)))
            }
            None => Ok(self.run_devices(devices)),
        }
    }

    /// Fetch the source and segment everything it returned
    pub fn run_source<SU>(&self, mut source: SU) -> Result<Aggregation>
    where
        SU: PingsSource,
    {
        let pings = source.fetch()?;

        self.run(pings)
    }

    fn run_devices(&self, devices: HashMap<String, Vec<Ping>>) -> Aggregation {
        let outcomes: Vec<DeviceOutcome> = devices
            .into_par_iter()
            .map(|(device_id, pings)| self.run_device(device_id, pings))
            .collect();

        let mut aggregation = Aggregation::default();
        for outcome in outcomes {
            match outcome {
                DeviceOutcome::Trips(mut trips) => {
                    aggregation.devices += 1;
                    aggregation.trips.append(&mut trips);
                }
                DeviceOutcome::Failed(failure) => {
                    aggregation.devices += 1;
                    aggregation.failures.push(failure);
                }
                DeviceOutcome::Cancelled => aggregation.cancelled += 1,
            }
        }

        info!(
            "{} trips from {} devices, {} failed, {} cancelled",
            aggregation.trips.len(),
            aggregation.devices,
            aggregation.failures.len(),
            aggregation.cancelled
        );

        aggregation
    }

    fn run_device(&self, device_id: String, pings: Vec<Ping>) -> DeviceOutcome {
        if self.cancel.load(Ordering::Relaxed) {
            return DeviceOutcome::Cancelled;
        }

        let mut segmenter = TripSegmenter::new(self.store);
        segmenter.options(self.options.clone()).offset(self.offset);

        match segmenter.segment(&device_id, pings) {
            Ok(trips) => DeviceOutcome::Trips(trips),
            Err(error) => {
                warn!("Failed on build the trips of `{}`: {}", device_id, error);
                DeviceOutcome::Failed(DeviceFailure { device_id, error })
            }
        }
    }
}
