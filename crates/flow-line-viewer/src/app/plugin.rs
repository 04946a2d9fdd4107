//! Walkers plugin drawing every loaded track as a flow line

use super::painter::PainterContext;
use super::track::{Track, mercator_to_wgs84};
use flow_line_lib::{FlowLineStyle, RenderState};
use geo::{Coord, Intersects, Line, Point, Rect, coord};
use std::sync::{Arc, Mutex};
use walkers::{Plugin, Projector};

/// Extra screen margin kept around the map when clipping, in points
const VIEWPORT_MARGIN: f32 = 64.0;

/// Mercator distance projected to measure the map scale
const SCALE_METERS: f64 = 1000.0;

/// What the last frame drew
#[derive(Clone, Copy, Debug, Default)]
pub struct RenderStats {
    pub tracks_drawn: usize,
    pub shapes: usize,
}

pub struct FlowLinePlugin {
    tracks: Vec<Arc<Track>>,
    style: FlowLineStyle<Track>,
    stats: Arc<Mutex<RenderStats>>,
}

impl FlowLinePlugin {
    pub fn new(
        tracks: Vec<Arc<Track>>,
        style: FlowLineStyle<Track>,
        stats: Arc<Mutex<RenderStats>>,
    ) -> Self {
        Self { tracks, style, stats }
    }
}

/// Keep the line up to the end of the last edge that touches `viewport`
///
/// The start is never trimmed: the style anchors a rebuilt full line on the first pixel
/// coordinate, which must stay the projection of the first model coordinate.
/// Returns `None` when neither a vertex nor an edge reaches into `viewport`.
pub(crate) fn clip_tail(screen: &[Coord<f64>], viewport: egui::Rect) -> Option<&[Coord<f64>]> {
    let rect = Rect::new(
        coord! { x: viewport.min.x as f64, y: viewport.min.y as f64 },
        coord! { x: viewport.max.x as f64, y: viewport.max.y as f64 },
    );
    let last = (0..screen.len()).rev().find(|&i| {
        rect.intersects(&Point::from(screen[i]))
            || (i > 0 && Line::new(screen[i - 1], screen[i]).intersects(&rect))
    })?;
    Some(&screen[..=last])
}

/// Model units (Web Mercator meters) per screen point around the track start
fn model_resolution(projector: &Projector, track: &Track) -> Option<f64> {
    let start = track.mercator_start()?;
    let (lat0, lon0) = mercator_to_wgs84(start.x, start.y);
    let (lat1, lon1) = mercator_to_wgs84(start.x + SCALE_METERS, start.y);

    let a = projector.project(walkers::lat_lon(lat0, lon0));
    let b = projector.project(walkers::lat_lon(lat1, lon1));
    let points = (b.x - a.x) as f64;
    (points > 0.0).then(|| SCALE_METERS / points)
}

impl Plugin for FlowLinePlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("FlowLinePlugin::run");

        let painter = ui.painter();
        let viewport = response.rect.expand(VIEWPORT_MARGIN);
        let mut context = PainterContext::new(painter);
        let mut tracks_drawn = 0;

        for track in &self.tracks {
            let screen: Vec<Coord<f64>> = track
                .wgs84()
                .coords()
                .map(|c| {
                    let v = projector.project(walkers::lat_lon(c.y, c.x));
                    coord! { x: v.x as f64, y: v.y as f64 }
                })
                .collect();

            let Some(visible) = clip_tail(&screen, viewport) else {
                continue;
            };
            let Some(resolution) = model_resolution(projector, track) else {
                tracing::trace!("Degenerate map scale, skipping {}", track.name());
                continue;
            };

            // egui paints in points, so no extra device scale
            let mut state =
                RenderState::new(track.geometry(), &mut context, resolution, 1.0, &**track);
            self.style.render(visible, &mut state);
            tracks_drawn += 1;
        }

        if let Ok(mut stats) = self.stats.lock() {
            *stats = RenderStats {
                tracks_drawn,
                shapes: context.shape_count(),
            };
        }
    }
}
