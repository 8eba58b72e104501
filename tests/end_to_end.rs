use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use tempdir::TempDir;
use tripwise::sources::DirectorySource;
use tripwise::{
    Aggregator, MemoryTripStore, PingsSource, TripStore, TripsCsvWriter,
};

fn write_gz(path: &Path, lines: &[&str]) {
    let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    writeln!(encoder, "timestamp\tdevice\tsource\tlatitude\tlongitude\taccuracy").unwrap();
    for line in lines {
        writeln!(encoder, "{}", line).unwrap();
    }
    encoder.finish().unwrap();
}

#[test]
fn directory_to_csv() {
    let temp_dir = TempDir::new("end_to_end-directory_to_csv").unwrap();
    let root = temp_dir.path().join("pings");
    fs::create_dir_all(root.join("01")).unwrap();

    write_gz(
        &root.join("part-0.tsv.gz"),
        &[
            "0\tD1\tgps\t0\t0\t5",
            "30\tD1\tgps\t0\t0\t5",
            "1621814400\tD2\tgps\t-26.31832\t-48.8702222\t8",
            "not\ta\tping",
        ],
    );
    write_gz(
        &root.join("01").join("part-1.tsv.gz"),
        &[
            "125\tD1\tgps\t0.001\t0.001\t5",
            "130\tD1\tgps\t0.001\t0.001\t5",
            "1621814700\tD2\tgps\t-26.3185919\t-48.8619776\t8",
        ],
    );

    let mut source = DirectorySource::new(&root, None);
    let pings = source.fetch().unwrap();
    assert_eq!(6, pings.len());
    assert_eq!(2, source.report().files_read);
    assert_eq!(1, source.report().malformed_lines);

    let store = MemoryTripStore::new();
    let aggregator = Aggregator::new(&store);
    let mut aggregation = aggregator.run(pings).unwrap();
    assert_eq!(2, aggregation.devices);
    assert!(aggregation.failures.is_empty());

    aggregation.trips.sort_by(|a, b| a.device_id().cmp(b.device_id()));

    let destination = temp_dir.path().join("trips.csv");
    TripsCsvWriter::create(&destination)
        .unwrap()
        .write(&aggregation.trips)
        .unwrap();

    let text = fs::read_to_string(&destination).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        vec![
            "DeviceId,DateString,Start-TS,Start-Latitude,Start-Longitude,End-Ts,End-Latitude,End-Longitude",
            "D1,19700101,0,0,0,125000,0.001,0.001",
            "D2,20210524,1621814400000,-26.31832,-48.8702222,1621814700000,-26.3185919,-48.8619776",
        ],
        lines
    );

    // Archives were decompressed beside themselves and cleaned up
    assert!(!root.join("part-0.tsv").exists());
    assert!(!root.join("01").join("part-1.tsv").exists());
}

#[test]
fn second_run_resumes() {
    let temp_dir = TempDir::new("end_to_end-second_run_resumes").unwrap();
    let first = temp_dir.path().join("day-1");
    let second = temp_dir.path().join("day-2");
    fs::create_dir_all(&first).unwrap();
    fs::create_dir_all(&second).unwrap();

    write_gz(
        &first.join("pings.tsv.gz"),
        &["1000\tD1\tgps\t0\t0\t5", "1120\tD1\tgps\t0.01\t0\t5"],
    );
    write_gz(&second.join("pings.tsv.gz"), &["2000\tD1\tgps\t0.02\t0\t5"]);

    let store = MemoryTripStore::new();
    let aggregator = Aggregator::new(&store);

    let day1 = aggregator
        .run_source(DirectorySource::new(&first, None))
        .unwrap();
    assert_eq!(1, day1.trips.len());

    // A lone ping still makes a trip from where the device stopped
    let day2 = aggregator
        .run_source(DirectorySource::new(&second, None))
        .unwrap();
    assert_eq!(1, day2.trips.len());
    assert_eq!(1_120_000, day2.trips[0].start_timestamp_millis());
    assert_eq!(2_000_000, day2.trips[0].end_timestamp_millis());

    assert_eq!(Some(day2.trips), store.get("D1"));
}
