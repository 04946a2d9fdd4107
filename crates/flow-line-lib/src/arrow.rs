//! Arrowhead sizing and geometry

use crate::{Arrow, dist2d, path_length};
use geo::{Coord, LineString, coord};

/// Distance from the arrow tip to its base, in pixels
pub const ARROW_LENGTH: f64 = 16.0;

/// Smallest half width of the arrow base, in pixels
pub const MIN_ARROW_HALF_WIDTH: f64 = 8.0;

/// Number of segments covered by the arrowhead at each end of the line
///
/// Those segments are not stroked, the filled triangle replaces them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArrowExtent {
    /// Segments consumed at the start of the line
    pub start: usize,
    /// Segments consumed at the end of the line
    pub end: usize,
}

impl ArrowExtent {
    /// Decide how many segments each requested arrowhead consumes
    ///
    /// Only the first segment is measured: all segments but the last have the same target
    /// length, so `ARROW_LENGTH / first_length` segments span the arrowhead. An arrowhead
    /// that would cover less than half a segment, or more segments than the line has, is
    /// not drawn and consumes nothing.
    pub fn measure(segments: &[LineString<f64>], arrow: Arrow) -> Self {
        if arrow == Arrow::None {
            return Self::default();
        }
        let Some(first) = segments.first() else {
            return Self::default();
        };

        let covered = (ARROW_LENGTH / path_length(&first.0)).round();
        let consumed = if covered >= 1.0 && covered < segments.len() as f64 {
            covered as usize
        } else {
            tracing::trace!(
                "Arrowhead skipped: would cover {} of {} segments",
                covered,
                segments.len()
            );
            0
        };

        Self {
            start: if arrow.at_start() { consumed } else { 0 },
            end: if arrow.at_end() { consumed } else { 0 },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == 0 && self.end == 0
    }
}

/// Corners of an arrowhead triangle pointing at `tip`
///
/// The base is perpendicular to the direction from `toward` to `tip`, [`ARROW_LENGTH`]
/// behind the tip, with a half width of `max(MIN_ARROW_HALF_WIDTH, stroke_width / 2)`.
///
/// # Returns
/// `[tip, base_left, base_right]`, or `None` when the direction is undefined
/// (`tip == toward`).
pub fn arrow_head(tip: Coord<f64>, toward: Coord<f64>, stroke_width: f64) -> Option<[Coord<f64>; 3]> {
    let length = dist2d(tip, toward);
    if !(length > 0.0) {
        return None;
    }

    let dir = (tip - toward) / length;
    let half_width = MIN_ARROW_HALF_WIDTH.max(stroke_width / 2.0);
    let base = tip - dir * ARROW_LENGTH;

    Some([
        tip,
        coord! { x: base.x + half_width * dir.y, y: base.y - half_width * dir.x },
        coord! { x: base.x - half_width * dir.y, y: base.y + half_width * dir.x },
    ])
}
