//! Spherical geometry over coordinates
//!
//! Distances are in meters and angles in degrees; radians are only used
//! internally. The Earth is a sphere with the WGS-84 equatorial radius,
//! the movement thresholds of the segmenter are tuned against it.

use std::f64::consts::PI;

use log::{debug, warn};

use super::coordinate::Coordinate;
use crate::error::Result;

/// Sphere radius used by every computation, in meters
pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

/// Haversine great-circle distance in meters
pub fn distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let d_lat = (b.latitude() - a.latitude()).to_radians();
    let d_lng = (b.longitude() - a.longitude()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude().to_radians().cos()
            * b.latitude().to_radians().cos()
            * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Length of a polyline, zero with less than two coordinates
pub fn length(trace: &[Coordinate]) -> f64 {
    trace.windows(2).map(|w| distance(&w[0], &w[1])).sum()
}

/// Destination reached from `origin` after `distance_meters` on the
/// given bearing.
///
/// The bearing is applied as `2π - bearing`, which is the sense the
/// west-positive aviation formula needs to move east on a positive bearing
/// with east-positive longitudes. A destination on a pole keeps the
/// origin longitude.
pub fn terminal_coordinate(
    origin: &Coordinate,
    bearing_degrees: f64,
    distance_meters: f64,
) -> Result<Coordinate> {
    let orig_lat = origin.latitude().to_radians();
    let orig_lng = origin.longitude().to_radians();
    let radial = distance_meters / EARTH_RADIUS_METERS;
    let bearing = 2.0 * PI - bearing_degrees.to_radians();

    let lat = (orig_lat.sin() * radial.cos() + orig_lat.cos() * radial.sin() * bearing.cos())
        .asin();

    let lng = if lat.cos() == 0.0 {
        orig_lng
    } else {
        (orig_lng - (bearing.sin() * radial.sin() / lat.cos()).asin() + PI).rem_euclid(2.0 * PI)
            - PI
    };

    Coordinate::new(lat.to_degrees(), lng.to_degrees())
}

/// Side of `p` relative to the line `c1 -> c2`, on the plane where
/// longitude is x and latitude is y.
///
/// Returns 0 when collinear, 1 or -1 for either side. Only meaningful over
/// small spans.
pub fn orientation(c1: &Coordinate, c2: &Coordinate, p: &Coordinate) -> i8 {
    let (px, py) = (p.longitude(), p.latitude());
    let (c1x, c1y) = (c1.longitude(), c1.latitude());
    let (c2x, c2y) = (c2.longitude(), c2.latitude());

    let cross = (c2y - c1y) * (px - c2x) - (c2x - c1x) * (py - c2y);

    if cross == 0.0 {
        0
    } else if cross > 0.0 {
        1
    } else {
        -1
    }
}

/// Closest candidate to `point`, the first one wins on ties
pub fn nearest(point: &Coordinate, coordinates: &[Coordinate]) -> Option<Coordinate> {
    let mut nearest = None;
    let mut best = f64::MAX;

    for c in coordinates {
        let d = distance(point, c);
        if d < best {
            best = d;
            nearest = Some(*c);
        }
    }

    nearest
}

/// Projection of `from` on the segment `c1 -> c2`.
///
/// The position along the line comes from the law of cosines over the
/// three haversine distances, then latitude and longitude are interpolated
/// linearly. `None` when the projection falls outside the segment or the
/// segment has no length.
pub fn nearest_projection(from: &Coordinate, c1: &Coordinate, c2: &Coordinate) -> Option<Coordinate> {
    let ap = distance(c1, from);
    let bp = distance(c2, from);
    let ab = distance(c1, c2);

    let lambda = (ap * ap - bp * bp) / (2.0 * ab * ab) + 0.5;
    if lambda > 1.0 || lambda < 0.0 {
        return None;
    }

    let latitude = c1.latitude() + lambda * (c2.latitude() - c1.latitude());
    let longitude = c1.longitude() + lambda * (c2.longitude() - c1.longitude());
    if latitude.is_nan() || longitude.is_nan() {
        warn!(
            "NaN projecting {} between {} and {}, degenerate segment",
            from, c1, c2
        );
        return None;
    }

    let projection = Coordinate::new(latitude, longitude).ok()?;
    debug!("A: {}, B: {}, p: {}, o: {}", c1, c2, from, projection);

    Some(projection)
}

/// Closest segment projection of `from` over a whole polyline
pub fn nearest_projection_on_trace(from: &Coordinate, trace: &[Coordinate]) -> Option<Coordinate> {
    trace
        .windows(2)
        .filter_map(|w| nearest_projection(from, &w[0], &w[1]))
        .map(|proj| (distance(from, &proj), proj))
        .fold(None, |best: Option<(f64, Coordinate)>, (d, proj)| match best {
            Some((bd, _)) if bd <= d => best,
            _ => Some((d, proj)),
        })
        .map(|(_, proj)| proj)
}
