//! Splitting of a pixel space polyline into near-equal length segments
//!
//! Each segment is the unit of styling: it is stroked with a single width and color,
//! so the number of segments controls how smooth the gradient looks.

use geo::{Coord, LineString};

/// Number of segments a line is split into by default
pub const DEFAULT_SEGMENT_COUNT: usize = 255;

/// Minimum segment length in pixels, limits the segment count on short lines
pub const DEFAULT_MIN_SEGMENT_LENGTH: f64 = 2.0;

/// Fraction of the cut edge at which the next segment starts.
///
/// The next segment starts slightly before the cut point, so consecutive segments
/// overlap by a tenth of the cut edge and no seam shows between strokes.
pub const SPLIT_OVERLAP: f64 = 0.9;

/// Euclidean distance between two pixel coordinates
#[inline(always)]
pub fn dist2d(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let delta = b - a;
    delta.x.hypot(delta.y)
}

/// Total length of a polyline
pub fn path_length(coords: &[Coord<f64>]) -> f64 {
    coords.windows(2).map(|w| dist2d(w[0], w[1])).sum()
}

/// Split a polyline into segments of approximately `max(min_length, length / count)`
///
/// Walks the line accumulating distance. When the next vertex would overshoot the target
/// length, the edge is cut at the exact target distance, the segment is closed with the
/// cut point and the next segment starts at [`SPLIT_OVERLAP`] of the way from the previous
/// point to the cut point. The last segment holds whatever remains and may be shorter.
///
/// # Returns
/// The segments from the start to the end of the line. Empty input gives no segments;
/// a zero length line gives a single segment holding all its points.
pub fn split_into(coords: &[Coord<f64>], count: usize, min_length: f64) -> Vec<LineString<f64>> {
    #[cfg(feature = "profiling")]
    profiling::scope!("segment::split_into");

    let Some(&first) = coords.first() else {
        return Vec::new();
    };

    let target = min_length.max(path_length(coords) / count as f64);
    if !(target > 0.0) {
        // Nothing to split: zero length line with a non-positive minimum
        return vec![LineString::new(coords.to_vec())];
    }

    let mut segments = Vec::with_capacity(count.min(coords.len() * 4));
    let mut current = vec![first];
    let mut p0 = first;
    let mut walked = 0.0;
    let mut i = 1;

    while i < coords.len() {
        let p = coords[i];
        let delta = p - p0;
        let dl = delta.x.hypot(delta.y);

        if walked + dl > target {
            let d = (target - walked) / dl;
            let next = p0 + delta * (d * SPLIT_OVERLAP);
            if next == p0 {
                // Step below the coordinate precision, keep the whole edge
                current.push(p);
                p0 = p;
                walked = 0.0;
                i += 1;
                continue;
            }

            current.push(p0 + delta * d);
            segments.push(LineString::new(std::mem::take(&mut current)));

            p0 = next;
            current.push(p0);
            walked = 0.0;
        } else {
            walked += dl;
            p0 = p;
            current.push(p);
            i += 1;
        }
    }
    segments.push(LineString::new(current));

    segments
}
