//! GPX export of trips

use std::collections::BTreeMap;

use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};

use super::trip::Trip;
use crate::error::Result;

pub struct GpxGenerator {
    pub tracks: Vec<Track>,
}

impl GpxGenerator {
    /// One track per device, with a two point segment per trip
    pub fn from_trips(trips: &[Trip]) -> Result<Self> {
        let mut devices: BTreeMap<&str, Vec<&Trip>> = BTreeMap::new();
        for trip in trips {
            devices.entry(trip.device_id()).or_default().push(trip);
        }

        let mut tracks = vec![];
        for (device_id, dev_trips) in devices {
            let mut track = Track::new();
            track.name = Some(device_id.to_string());
            track.description = Some(format!("Trips of `{}`", device_id));

            for trip in dev_trips {
                let mut start = Waypoint::new(trip.start_coordinate().point());
                start.time = Some(trip.start_time()?.into());
                let mut end = Waypoint::new(trip.end_coordinate().point());
                end.time = Some(trip.end_time()?.into());

                let mut tseg = TrackSegment::new();
                tseg.points.push(start);
                tseg.points.push(end);
                track.segments.push(tseg);
            }

            tracks.push(track);
        }

        Ok(Self { tracks })
    }

    pub fn generate(self) -> Gpx {
        let mut gpx: Gpx = Default::default();
        gpx.version = GpxVersion::Gpx11;
        gpx.creator = Some("tripwise".to_string());
        gpx.tracks = self.tracks;

        gpx
    }
}
