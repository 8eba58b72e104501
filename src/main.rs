//! tripwise cli - Trips from raw device location pings

use std::fs::{self, File};
use std::io::BufWriter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use argopt::{cmd_group, subcmd};
use log::{error, info};
use serde::Deserialize;
use time::UtcOffset;

use tripwise::sources::DirectorySource;
use tripwise::{
    Aggregator, FieldsConfiguration, GpxGenerator, MemoryTripStore, PingsSource, SegmentOptions,
    Trip, TripsCsvWriter,
};

/// CLI of tripwise - Turn raw location pings into trips
#[cmd_group(commands = [csv, gpx])]
fn main() -> Result<(), String> {}

/// Write the trips found below a directory into a CSV file
#[subcmd]
fn csv(
    /// Root directory of the raw ping files, gzip or plain
    root: String,
    /// CSV path file destination
    destination: String,
    /// Fields and segments configuration. Default: .tripwise.yaml, ~/.tripwise.yaml
    #[opt(long)]
    config: Option<String>,
) -> Result<(), String> {
    let writer = TripsCsvWriter::create(&destination).map_err(|e| {
        format!("Failed on create the destination file: {}", e)
    })?;

    let trips = build_trips(root, config)?;

    writer.write(&trips).map_err(|e| e.to_string())?;
    info!("CSV file created: {}", destination);

    Ok(())
}

/// Write the trips found below a directory into a GPX file
#[subcmd]
fn gpx(
    /// Root directory of the raw ping files, gzip or plain
    root: String,
    /// GPX path file destination
    destination: String,
    /// Fields and segments configuration. Default: .tripwise.yaml, ~/.tripwise.yaml
    #[opt(long)]
    config: Option<String>,
) -> Result<(), String> {
    let file = File::create(&destination)
        .map_err(|e| format!("Failed on create the destination file: {}", e))?;

    let trips = build_trips(root, config)?;

    let doc = GpxGenerator::from_trips(&trips)
        .map_err(|e| e.to_string())?
        .generate();

    let mut writer = BufWriter::new(file);
    gpx::write(&doc, &mut writer).map_err(|e| e.to_string())?;
    info!("GPX file created: {}", destination);

    Ok(())
}

/// Ingest the root directory and segment every device
fn build_trips(root: String, config: Option<String>) -> Result<Vec<Trip>, String> {
    let Configs {
        fields,
        segments: options,
        local_dates,
    } = load_configs(config);

    // Must happen while the process is still single threaded
    let offset = if local_dates {
        UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
    } else {
        UtcOffset::UTC
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
        .map_err(|e| format!("Failed on install the interrupt handler: {}", e))?;

    let mut source = DirectorySource::new(root, Some(fields));
    let pings = source
        .fetch()
        .map_err(|e| format!("Failed on read the pings: {}", e))?;

    let store = MemoryTripStore::new();
    let mut aggregator = Aggregator::new(&store);
    aggregator
        .options(options)
        .offset(offset)
        .cancellation(cancel);

    let aggregation = aggregator.run(pings).map_err(|e| e.to_string())?;

    for failure in &aggregation.failures {
        error!("Device `{}` skipped: {}", failure.device_id, failure.error);
    }

    let report = source.report();
    info!(
        "{} trips, {} devices ({} failed, {} cancelled), {} files ({} failed), {} malformed lines",
        aggregation.trips.len(),
        aggregation.devices,
        aggregation.failures.len(),
        aggregation.cancelled,
        report.files_read,
        report.files_failed,
        report.malformed_lines
    );

    Ok(aggregation.trips)
}

/// Load the current config
fn load_configs(provided: Option<String>) -> Configs {
    let mut options = vec![];

    if let Some(sprovided) = provided {
        options.push(sprovided);
    }

    options.push(".tripwise.yaml".to_string());

    if let Some(home) = dirs::home_dir() {
        if let Some(shome) = home.to_str() {
            options.push(format!("{}/.tripwise.yaml", shome));
        }
    }

    let mut yaml: Option<String> = None;
    for fi in options {
        if let Ok(s) = fs::read_to_string(fi) {
            yaml = Some(s);
            break;
        }
    }

    if let Some(s) = yaml {
        if let Ok(conf) = serde_yaml::from_str::<Configs>(&s) {
            return conf;
        }
    }

    Configs::default()
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
struct Configs {
    pub fields: FieldsConfiguration,
    pub segments: SegmentOptions,
    /// Date trips in the host local calendar instead of UTC
    pub local_dates: bool,
}

impl Default for Configs {
    fn default() -> Self {
        Self {
            fields: FieldsConfiguration::default(),
            segments: SegmentOptions::default(),
            local_dates: true,
        }
    }
}

#[test]
fn parse_configs() -> Result<(), String> {
    let yaml = "{}";

    let conf: Configs = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;

    assert_eq!(
        Configs {
            fields: FieldsConfiguration {
                timestamp: 0,
                device_id: 1,
                latitude: 3,
                longitude: 4,
                skip_header: true,
            },
            segments: SegmentOptions {
                min_elapsed_seconds: 60,
                min_distance_meters: 80.0,
                workers: None,
            },
            local_dates: true,
        },
        conf
    );

    let yaml = "\nfields:\n  device_id: 2\n  skip_header: false\nsegments:\n  min_distance_meters: 120\n  workers: 4\nlocal_dates: false";

    let conf: Configs = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;

    assert_eq!(
        Configs {
            fields: FieldsConfiguration {
                timestamp: 0,
                device_id: 2,
                latitude: 3,
                longitude: 4,
                skip_header: false,
            },
            segments: SegmentOptions {
                min_elapsed_seconds: 60,
                min_distance_meters: 120.0,
                workers: Some(4),
            },
            local_dates: false,
        },
        conf
    );

    Ok(())
}
