//! Pings sources API

use serde::Deserialize;

use crate::error::Result;
use crate::Ping;

/// Ping source
pub trait PingsSource {
    /// Fetch every ping the source holds, in no particular order
    fn fetch(&mut self) -> Result<Vec<Ping>>;
}

/// Column positions of the raw tab separated lines
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldsConfiguration {
    /// Epoch seconds
    pub timestamp: usize,
    pub device_id: usize,
    pub latitude: usize,
    pub longitude: usize,
    /// First line of each file is a header
    pub skip_header: bool,
}

impl Default for FieldsConfiguration {
    fn default() -> Self {
        Self {
            timestamp: 0,
            device_id: 1,
            latitude: 3,
            longitude: 4,
            skip_header: true,
        }
    }
}

/// Counters of an ingestion
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IngestReport {
    pub files_read: usize,
    pub files_failed: usize,
    pub pings: usize,
    /// Lines skipped because they could not become a ping
    pub malformed_lines: usize,
}

impl IngestReport {
    pub(crate) fn merge(&mut self, other: &IngestReport) {
        self.files_read += other.files_read;
        self.files_failed += other.files_failed;
        self.pings += other.pings;
        self.malformed_lines += other.malformed_lines;
    }
}

mod directory;
mod gzip;
mod tsv_file;

pub use directory::DirectorySource;
pub use gzip::{decompress, working_path, Decompressed};
pub use tsv_file::TsvSource;
