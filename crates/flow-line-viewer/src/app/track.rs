//! GPX tracks prepared for flow line rendering

use geo::{Coord, Geometry, LineString, Point, Rect};
use rayon::prelude::*;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Web Mercator bounds in meters (EPSG:3857)
pub const EARTH_MERCATOR_MAX: f64 = 20037508.34;

/// Maximum latitude that can be represented in Web Mercator
pub const MAX_LATITUDE: f64 = 85.05112878;

const LON_TO_X_FACTOR: f64 = EARTH_MERCATOR_MAX / 180.0;
const Y_FACTOR: f64 = EARTH_MERCATOR_MAX / std::f64::consts::PI;
const X_TO_LON_FACTOR: f64 = 180.0 / EARTH_MERCATOR_MAX;
const Y_TO_LAT_FACTOR: f64 = std::f64::consts::PI / EARTH_MERCATOR_MAX;

/// Errors raised while loading tracks
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GPX parsing error: {0}")]
    Gpx(#[from] gpx::errors::GpxError),

    #[error("No track with at least two points in {0}")]
    EmptyTrack(String),
}

pub type Result<T> = std::result::Result<T, ViewerError>;

/// Convert WGS84 (lat, lon) in degrees to Web Mercator (x, y) in meters
#[inline(always)]
pub fn wgs84_to_mercator(lat: f64, lon: f64) -> Point<f64> {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let lat_rad = lat.to_radians();
    let y = (lat_rad.tan() + (1.0 / lat_rad.cos())).ln() * Y_FACTOR;
    Point::new(lon * LON_TO_X_FACTOR, y)
}

/// Convert Web Mercator (x, y) in meters to WGS84 (lat, lon) in degrees
#[inline(always)]
pub fn mercator_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    let lon = x * X_TO_LON_FACTOR;
    let lat =
        (std::f64::consts::PI / 2.0 - 2.0 * ((-y * Y_TO_LAT_FACTOR).exp()).atan()).to_degrees();
    (lat, lon)
}

/// One drawable polyline: a GPX track segment or route
#[derive(Debug)]
pub struct Track {
    name: String,
    /// Longitude as x, latitude as y
    wgs84: LineString<f64>,
    /// Model geometry handed to the style, in Web Mercator meters
    mercator: Geometry<f64>,
    /// Cumulative distance fraction of each vertex, `0.0..=1.0`
    fractions: Vec<f64>,
    /// Elevation of each vertex normalized to `0.0..=1.0`, empty when the GPX has none
    relative_elevations: Vec<f64>,
}

impl Track {
    /// Build a track from waypoints, `None` if fewer than two remain
    pub fn from_waypoints(name: String, waypoints: &[gpx::Waypoint]) -> Option<Self> {
        if waypoints.len() < 2 {
            return None;
        }

        let wgs84: LineString<f64> = waypoints.iter().map(|w| w.point().0).collect();
        let mercator: Vec<Coord<f64>> = wgs84
            .coords()
            .map(|c| wgs84_to_mercator(c.y, c.x).0)
            .collect();

        let mut fractions = Vec::with_capacity(mercator.len());
        let mut total = 0.0;
        fractions.push(0.0);
        for pair in mercator.windows(2) {
            total += (pair[1].x - pair[0].x).hypot(pair[1].y - pair[0].y);
            fractions.push(total);
        }
        if total > 0.0 {
            fractions.iter_mut().for_each(|f| *f /= total);
        }

        Some(Self {
            name,
            wgs84,
            mercator: Geometry::LineString(LineString::new(mercator)),
            fractions,
            relative_elevations: relative_elevations(waypoints),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wgs84(&self) -> &LineString<f64> {
        &self.wgs84
    }

    pub fn geometry(&self) -> &Geometry<f64> {
        &self.mercator
    }

    /// First vertex in Web Mercator meters
    pub fn mercator_start(&self) -> Option<Coord<f64>> {
        match &self.mercator {
            Geometry::LineString(line) => line.0.first().copied(),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.wgs84.0.len()
    }

    /// Bounding box in WGS84 degrees
    pub fn bounding_box(&self) -> Option<Rect<f64>> {
        use geo::BoundingRect;
        self.wgs84.bounding_rect()
    }

    /// Relative elevation at `step` (fraction of the track length), interpolated between
    /// the surrounding vertices
    pub fn relative_elevation_at(&self, step: f64) -> Option<f64> {
        if self.relative_elevations.is_empty() {
            return None;
        }
        let step = step.clamp(0.0, 1.0);
        let upper = self
            .fractions
            .partition_point(|&f| f < step)
            .clamp(1, self.fractions.len() - 1);
        let (f0, f1) = (self.fractions[upper - 1], self.fractions[upper]);
        let (e0, e1) = (
            self.relative_elevations[upper - 1],
            self.relative_elevations[upper],
        );
        if f1 > f0 {
            Some(e0 + (e1 - e0) * (step - f0) / (f1 - f0))
        } else {
            Some(e1)
        }
    }
}

/// Normalize elevations to `0.0..=1.0`, filling gaps with the previous known value
fn relative_elevations(waypoints: &[gpx::Waypoint]) -> Vec<f64> {
    let Some(first_known) = waypoints.iter().find_map(|w| w.elevation) else {
        return Vec::new();
    };

    let mut last = first_known;
    let elevations: Vec<f64> = waypoints
        .iter()
        .map(|w| {
            last = w.elevation.unwrap_or(last);
            last
        })
        .collect();

    let min = elevations.iter().copied().fold(f64::INFINITY, f64::min);
    let max = elevations.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    elevations
        .into_iter()
        .map(|e| if range > 0.0 { (e - min) / range } else { 0.0 })
        .collect()
}

/// Extract every track segment and route of a parsed GPX document
pub fn tracks_from_gpx(gpx: &gpx::Gpx, source: &str) -> Result<Vec<Track>> {
    let mut tracks = Vec::new();

    for (ti, track) in gpx.tracks.iter().enumerate() {
        let base = track.name.clone().unwrap_or_else(|| format!("{} #{}", source, ti + 1));
        let many = track.segments.len() > 1;
        for (si, segment) in track.segments.iter().enumerate() {
            let name = if many { format!("{} ({})", base, si + 1) } else { base.clone() };
            tracks.extend(Track::from_waypoints(name, &segment.points));
        }
    }

    for (ri, route) in gpx.routes.iter().enumerate() {
        let name = route.name.clone().unwrap_or_else(|| format!("{} route #{}", source, ri + 1));
        tracks.extend(Track::from_waypoints(name, &route.points));
    }

    if tracks.is_empty() {
        return Err(ViewerError::EmptyTrack(source.to_string()));
    }
    Ok(tracks)
}

/// Read and parse a single GPX file
pub fn load_gpx_file(path: &Path) -> Result<Vec<Track>> {
    profiling::scope!("load_gpx_file");
    let file = File::open(path)?;
    let gpx = gpx::read(BufReader::new(file))?;
    let source = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    tracks_from_gpx(&gpx, &source)
}

/// Load many GPX files in parallel, keeping one result per input path
pub fn load_gpx_files(paths: &[PathBuf]) -> Vec<(PathBuf, Result<Vec<Arc<Track>>>)> {
    paths
        .par_iter()
        .map(|path| {
            let result = load_gpx_file(path).map(|ts| ts.into_iter().map(Arc::new).collect());
            (path.clone(), result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Morning ride</name>
    <trkseg>
      <trkpt lat="0.0" lon="0.0"><ele>100</ele></trkpt>
      <trkpt lat="0.0" lon="0.001"><ele>200</ele></trkpt>
      <trkpt lat="0.0" lon="0.002"><ele>100</ele></trkpt>
    </trkseg>
  </trk>
  <rte>
    <rtept lat="1.0" lon="1.0"/>
    <rtept lat="1.0" lon="1.001"/>
  </rte>
</gpx>"#;

    fn parse(xml: &str) -> gpx::Gpx {
        gpx::read(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_mercator_round_trip() {
        let p = wgs84_to_mercator(48.8566, 2.3522);
        let (lat, lon) = mercator_to_wgs84(p.x(), p.y());
        assert!((lat - 48.8566).abs() < 1e-9);
        assert!((lon - 2.3522).abs() < 1e-9);
    }

    #[test]
    fn test_mercator_extent() {
        let p = wgs84_to_mercator(0.0, 180.0);
        assert!((p.x() - EARTH_MERCATOR_MAX).abs() < 1e-6);
        assert!(p.y().abs() < 1e-6);

        // Clamped to the Web Mercator square
        let pole = wgs84_to_mercator(90.0, 0.0);
        assert!((pole.y() - EARTH_MERCATOR_MAX).abs() < 1.0);
    }

    #[test]
    fn test_tracks_from_gpx() {
        let tracks = tracks_from_gpx(&parse(GPX), "sample").unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].name(), "Morning ride");
        assert_eq!(tracks[0].len(), 3);
        assert_eq!(tracks[1].name(), "sample route #1");
        assert!(matches!(tracks[0].geometry(), Geometry::LineString(l) if l.0.len() == 3));
    }

    #[test]
    fn test_mercator_start_matches_wgs84_start() {
        let tracks = tracks_from_gpx(&parse(GPX), "sample").unwrap();
        let start = tracks[1].mercator_start().unwrap();
        let expected = wgs84_to_mercator(1.0, 1.0);

        assert!((start.x - expected.x()).abs() < 1e-6);
        assert!((start.y - expected.y()).abs() < 1e-6);
    }

    #[test]
    fn test_relative_elevation() {
        let tracks = tracks_from_gpx(&parse(GPX), "sample").unwrap();
        let ride = &tracks[0];

        assert_eq!(ride.relative_elevation_at(0.0), Some(0.0));
        assert!((ride.relative_elevation_at(0.5).unwrap() - 1.0).abs() < 1e-9);
        assert!((ride.relative_elevation_at(0.25).unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(ride.relative_elevation_at(1.0), Some(0.0));
        // Out of range steps are clamped
        assert_eq!(ride.relative_elevation_at(7.0), Some(0.0));

        // The route carries no elevation
        assert_eq!(tracks[1].relative_elevation_at(0.5), None);
    }

    #[test]
    fn test_single_point_track_is_empty() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1" creator="test">
  <trk><trkseg><trkpt lat="0.0" lon="0.0"/></trkseg></trk>
</gpx>"#;

        let result = tracks_from_gpx(&parse(xml), "lonely");
        assert!(matches!(result, Err(ViewerError::EmptyTrack(s)) if s == "lonely"));
    }

    #[test]
    fn test_missing_file() {
        let results = load_gpx_files(&[PathBuf::from("/definitely/not/here.gpx")]);
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0].1, Err(ViewerError::Io(_))));
    }
}
