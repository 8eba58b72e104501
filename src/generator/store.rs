//! Per device continuation state

use std::collections::HashMap;
use std::sync::RwLock;

use super::trip::Trip;

/// Keeps the most recent trips computed for each device.
///
/// Segmentation of a device resumes from the end of its last stored trip.
/// Entries are replaced, never appended to.
pub trait TripStore: Send + Sync {
    fn get(&self, device_id: &str) -> Option<Vec<Trip>>;

    fn put(&self, device_id: &str, trips: Vec<Trip>);

    /// Last stored trip of the device
    fn last(&self, device_id: &str) -> Option<Trip> {
        self.get(device_id)
            .and_then(|trips| trips.last().cloned())
    }
}

/// In memory store, scoped to whoever owns it
#[derive(Debug, Default)]
pub struct MemoryTripStore {
    trips: RwLock<HashMap<String, Vec<Trip>>>,
}

impl MemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of devices with stored trips
    pub fn len(&self) -> usize {
        self.trips.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TripStore for MemoryTripStore {
    fn get(&self, device_id: &str) -> Option<Vec<Trip>> {
        self.trips
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(device_id)
            .cloned()
    }

    fn put(&self, device_id: &str, trips: Vec<Trip>) {
        self.trips
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(device_id.to_string(), trips);
    }
}
