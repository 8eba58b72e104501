//! Tab separated file source integration

use std::io::Read;

use csv::{Reader, ReaderBuilder, StringRecord};
use log::{debug, info};

use super::{FieldsConfiguration, IngestReport, PingsSource};
use crate::error::{Result, TripError};
use crate::{Coordinate, Ping};

/// Raw pings, one per tab separated line
pub struct TsvSource<T>
where
    T: Read,
{
    rdr: Reader<T>,
    fields: FieldsConfiguration,
    report: IngestReport,
}

impl<T> TsvSource<T>
where
    T: Read,
{
    pub fn new(reader: T, fields: Option<FieldsConfiguration>) -> Self {
        let fields = fields.unwrap_or_default();

        let rdr = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(fields.skip_header)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        Self {
            rdr,
            fields,
            report: IngestReport::default(),
        }
    }

    /// Counters of the fetches made so far
    pub fn report(&self) -> &IngestReport {
        &self.report
    }
}

impl<T> PingsSource for TsvSource<T>
where
    T: Read,
{
    fn fetch(&mut self) -> Result<Vec<Ping>> {
        let mut pings = vec![];
        let mut malformed = 0;

        for row in self.rdr.records() {
            let rec = match row {
                Ok(rec) => rec,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    debug!("Skipping unreadable line: {}", e);
                    malformed += 1;
                    continue;
                }
            };

            match parse_row(&self.fields, &rec) {
                Ok(ping) => pings.push(ping),
                Err(e) => {
                    debug!("Skipping line {:?}: {}", rec, e);
                    malformed += 1;
                }
            }
        }

        if malformed > 0 {
            info!("{} malformed lines skipped", malformed);
        }

        self.report.pings += pings.len();
        self.report.malformed_lines += malformed;

        Ok(pings)
    }
}

fn field<'r>(row: &'r StringRecord, idx: usize, name: &str) -> Result<&'r str> {
    match row.get(idx).map(str::trim) {
        Some(f) if !f.is_empty() => Ok(f),
        _ => Err(TripError::Parse(format!("{} field not found", name))),
    }
}

fn parse_row(fields: &FieldsConfiguration, row: &StringRecord) -> Result<Ping> {
    let seconds = field(row, fields.timestamp, "Timestamp")?
        .parse::<i64>()
        .map_err(|e| TripError::Parse(format!("Invalid timestamp format: {}", e)))?;
    let millis = seconds
        .checked_mul(1000)
        .ok_or_else(|| TripError::Parse(format!("Timestamp {} out of range", seconds)))?;

    let device_id = field(row, fields.device_id, "Device")?;

    let lat = field(row, fields.latitude, "Latitude")?
        .parse::<f64>()
        .map_err(|e| TripError::Parse(format!("Invalid latitude format: {}", e)))?;
    let lng = field(row, fields.longitude, "Longitude")?
        .parse::<f64>()
        .map_err(|e| TripError::Parse(format!("Invalid longitude format: {}", e)))?;

    let coordinate = Coordinate::new(lat, lng).map_err(|e| TripError::Parse(e.to_string()))?;

    Ping::new(device_id.to_string(), millis, coordinate)
        .map_err(|e| TripError::Parse(e.to_string()))
}

#[cfg(test)]
pub mod tests {
    use super::TsvSource;
    use crate::{Coordinate, FieldsConfiguration, PingsSource, TripError};

    #[test]
    fn pings() -> Result<(), TripError> {
        let data = "ts\tdevice\tkind\tlat\tlng\tacc\n\
            1621814400\tAA251\tgps\t-26.31832\t-48.8702222\t5\n\
            1621814460\tAA251\tgps\t-26.3185919\t-48.8619776\n\
            1621814400\tBB300\twifi\t10.5\t20.25\t12\n";

        let mut source = TsvSource::new(data.as_bytes(), None);
        let pings = source.fetch()?;
        assert_eq!(3, pings.len());

        let ping = &pings[0];
        assert_eq!("AA251", ping.device_id());
        assert_eq!(1_621_814_400_000, ping.timestamp_millis());
        assert_eq!(&Coordinate::new(-26.31832, -48.8702222)?, ping.coordinate());
        assert_eq!("BB300", pings[2].device_id());

        assert_eq!(3, source.report().pings);
        assert_eq!(0, source.report().malformed_lines);

        Ok(())
    }

    #[test]
    fn malformed_lines_are_skipped() -> Result<(), TripError> {
        let data = "ts\tdevice\tkind\tlat\tlng\n\
            1621814400\tAA251\tgps\t-26.31832\t-48.8702222\n\
            1621814460\tAA251\tgps\n\
            abc\tAA251\tgps\t-26.31832\t-48.8702222\n\
            1621814520\tAA251\tgps\tnorth\t-48.8702222\n\
            1621814580\tAA251\tgps\t95.0\t-48.8702222\n\
            1621814640\t \tgps\t-26.31832\t-48.8702222\n\
            99999999999999999\tAA251\tgps\t-26.31832\t-48.8702222\n\
            1621814700\tAA251\tgps\t-26.3185919\t-48.8619776\n";

        let mut source = TsvSource::new(data.as_bytes(), None);
        let pings = source.fetch()?;
        assert_eq!(2, pings.len());
        assert_eq!(1_621_814_700_000, pings[1].timestamp_millis());
        assert_eq!(6, source.report().malformed_lines);

        Ok(())
    }

    #[test]
    fn custom_fields() -> Result<(), TripError> {
        let data = "AA251\t-48.8702222\t-26.31832\t1621814400\n";

        let fields = FieldsConfiguration {
            timestamp: 3,
            device_id: 0,
            latitude: 2,
            longitude: 1,
            skip_header: false,
        };
        let mut source = TsvSource::new(data.as_bytes(), Some(fields));
        let pings = source.fetch()?;
        assert_eq!(1, pings.len());
        assert_eq!(-26.31832, pings[0].coordinate().latitude());
        assert_eq!(-48.8702222, pings[0].coordinate().longitude());

        Ok(())
    }
}
