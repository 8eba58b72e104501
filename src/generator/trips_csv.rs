//! CSV export of trips

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;
use log::info;

use super::trip::Trip;
use crate::error::{Result, TripError};

const HEADER: [&str; 8] = [
    "DeviceId",
    "DateString",
    "Start-TS",
    "Start-Latitude",
    "Start-Longitude",
    "End-Ts",
    "End-Latitude",
    "End-Longitude",
];

pub struct TripsCsvWriter<W: Write> {
    wtr: Writer<W>,
}

impl TripsCsvWriter<File> {
    /// Create, or truncate, the destination file
    pub fn create<P: AsRef<Path>>(destination: P) -> Result<Self> {
        let destination = destination.as_ref();
        if destination.as_os_str().is_empty() {
            return Err(TripError::Validation(
                "Destination path is blank".to_string(),
            ));
        }

        let file = File::create(destination).map_err(|e| TripError::io(destination, e))?;

        Ok(Self::new(file))
    }
}

impl<W: Write> TripsCsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            wtr: Writer::from_writer(writer),
        }
    }

    /// Header line, then one line per trip
    pub fn write(mut self, trips: &[Trip]) -> Result<W> {
        self.wtr.write_record(HEADER)?;

        for trip in trips {
            let start = trip.start_coordinate();
            let end = trip.end_coordinate();

            self.wtr.write_record([
                trip.device_id().to_string(),
                trip.date_string().to_string(),
                trip.start_timestamp_millis().to_string(),
                start.latitude().to_string(),
                start.longitude().to_string(),
                trip.end_timestamp_millis().to_string(),
                end.latitude().to_string(),
                end.longitude().to_string(),
            ])?;
        }

        info!("{} trips written", trips.len());

        self.wtr
            .into_inner()
            .map_err(|e| TripError::Csv(e.into_error().into()))
    }
}
