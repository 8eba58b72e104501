//! Coordinate definition

use std::fmt;
use std::str::FromStr;

use geo::geometry::Point;

use crate::error::{Result, TripError};

/// Validated latitude/longitude pair, in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    point: Point,
}

impl Coordinate {
    /// Build a coordinate, failing when a bound is violated
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(TripError::Validation(format!(
                "Latitude should belong to [-90, 90]: {}",
                latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(TripError::Validation(format!(
                "Longitude should belong to [-180, 180]: {}",
                longitude
            )));
        }

        Ok(Self {
            point: Point::new(longitude, latitude),
        })
    }

    /// Build from two numeric strings. Anything besides digits, sign
    /// and the decimal point is dropped before parsing.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self> {
        let lat = parse_degrees(latitude, "latitude")?;
        let lng = parse_degrees(longitude, "longitude")?;

        Self::new(lat, lng)
    }

    pub fn latitude(&self) -> f64 {
        self.point.y()
    }

    pub fn longitude(&self) -> f64 {
        self.point.x()
    }

    /// Geometry point, x = longitude and y = latitude
    pub fn point(&self) -> Point {
        self.point
    }
}

fn parse_degrees(raw: &str, name: &str) -> Result<f64> {
    if raw.trim().is_empty() {
        return Err(TripError::Validation(format!("Input {} is blank", name)));
    }

    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
        .collect();

    cleaned
        .parse::<f64>()
        .map_err(|e| TripError::Validation(format!("Invalid {} `{}`: {}", name, raw, e)))
}

/// Parses a single `lat,lng` string, whitespace anywhere is ignored
impl FromStr for Coordinate {
    type Err = TripError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(TripError::Validation(
                "Coordinate string should not be blank".to_string(),
            ));
        }

        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let parts: Vec<&str> = compact.split(',').collect();
        if parts.len() != 2 {
            return Err(TripError::Validation(format!(
                "Invalid coordinate string `{}`: expected `lat,lng`",
                s
            )));
        }

        Self::parse(parts[0], parts[1])
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude(), self.longitude())
    }
}

impl From<Coordinate> for Point {
    fn from(c: Coordinate) -> Self {
        c.point
    }
}
