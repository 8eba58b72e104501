//! Trips generator

pub mod aggregator;
pub mod coordinate;
pub mod geodesy;
pub mod gpx;
pub mod position;
pub mod segmenter;
pub mod store;
pub mod trip;
pub mod trips_csv;
