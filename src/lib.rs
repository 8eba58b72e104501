//! tripwise - Trips from raw device location pings
//!
//! Pings are grouped per device, ordered by time and walked pairwise: a
//! trip is emitted whenever a device covered more than 80 meters in more
//! than a minute between two consecutive observations. Segmentation
//! resumes from the last trip kept in a [`TripStore`].

mod error;
mod generator;
pub mod sources;

pub use error::{Result, TripError};
pub use generator::aggregator::{Aggregation, Aggregator, DeviceFailure};
pub use generator::coordinate::Coordinate;
pub use generator::geodesy;
pub use generator::gpx::GpxGenerator;
pub use generator::position::Ping;
pub use generator::segmenter::{SegmentOptions, TripSegmenter};
pub use generator::store::{MemoryTripStore, TripStore};
pub use generator::trip::Trip;
pub use generator::trips_csv::TripsCsvWriter;
pub use sources::{FieldsConfiguration, IngestReport, PingsSource};
