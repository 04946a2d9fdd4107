//! Painting a flow line onto a host drawing context
//!
//! The host projects the geometry, then calls [`FlowLineStyle::render`] with the pixel
//! coordinates and a [`RenderState`] once per draw cycle. Nothing is kept between calls.

use crate::{ArrowExtent, FlowLineStyle, LineCap, Rgba, arrow_head, split_into};
use geo::{Coord, Geometry, LineString, coord};
use std::ops::{Deref, DerefMut};

/// Line join style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// The subset of a canvas 2D context the style draws with
///
/// Style setters affect the following `stroke`/`fill` calls; `save`/`restore` push and pop
/// the style state like a canvas does.
pub trait DrawContext {
    fn save(&mut self);
    fn restore(&mut self);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn stroke(&mut self);
    fn fill(&mut self);

    fn set_line_width(&mut self, width: f64);
    fn set_line_cap(&mut self, cap: LineCap);
    fn set_line_join(&mut self, join: LineJoin);
    fn set_stroke_style(&mut self, color: Rgba);
    fn set_fill_style(&mut self, color: Rgba);
}

/// Saved drawing state, restored when the guard is dropped
pub struct ContextGuard<'a, C: DrawContext + ?Sized> {
    context: &'a mut C,
}

impl<'a, C: DrawContext + ?Sized> ContextGuard<'a, C> {
    pub fn new(context: &'a mut C) -> Self {
        context.save();
        Self { context }
    }
}

impl<C: DrawContext + ?Sized> Drop for ContextGuard<'_, C> {
    fn drop(&mut self) {
        self.context.restore();
    }
}

impl<C: DrawContext + ?Sized> Deref for ContextGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.context
    }
}

impl<C: DrawContext + ?Sized> DerefMut for ContextGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.context
    }
}

/// Everything the host hands over for one draw call
pub struct RenderState<'a, F: ?Sized, C: DrawContext + ?Sized> {
    /// Source geometry in model units (y up)
    pub geometry: &'a Geometry<f64>,
    /// Drawing context to paint into
    pub context: &'a mut C,
    /// Model units per pixel
    pub resolution: f64,
    /// Device pixels per pixel, scales stroke widths
    pub pixel_ratio: f64,
    /// Feature being styled
    pub feature: &'a F,
}

impl<'a, F: ?Sized, C: DrawContext + ?Sized> RenderState<'a, F, C> {
    pub fn new(
        geometry: &'a Geometry<f64>,
        context: &'a mut C,
        resolution: f64,
        pixel_ratio: f64,
        feature: &'a F,
    ) -> Self {
        Self {
            geometry,
            context,
            resolution,
            pixel_ratio,
            feature,
        }
    }
}

/// Rebuild the pixel coordinates of a whole line from its model geometry
///
/// The host contract is that `pixel_coords[0]` is the projection of the first model
/// coordinate and that the projection is a scale by `pixel_ratio / resolution` with the
/// y axis flipped. Extra vertices the host clipped away are restored this way.
///
/// # Returns
/// `None` if either coordinate list is empty.
pub fn full_pixel_coordinates(
    pixel_coords: &[Coord<f64>],
    model: &LineString<f64>,
    resolution: f64,
    pixel_ratio: f64,
) -> Option<Vec<Coord<f64>>> {
    let first_pixel = pixel_coords.first()?;
    let first_model = model.0.first()?;

    let scale = pixel_ratio / resolution;
    let origin = coord! {
        x: first_pixel.x - first_model.x * scale,
        y: first_pixel.y + first_model.y * scale,
    };

    Some(
        model
            .coords()
            .map(|p| coord! { x: origin.x + p.x * scale, y: origin.y - p.y * scale })
            .collect(),
    )
}

impl<F: ?Sized> FlowLineStyle<F> {
    /// Paint the line
    ///
    /// Only line strings are drawn, other geometry types are ignored. The context state is
    /// saved before drawing and restored afterwards, so no style setting leaks to the
    /// host's next draw.
    pub fn render<C: DrawContext + ?Sized>(
        &self,
        pixel_coords: &[Coord<f64>],
        state: &mut RenderState<'_, F, C>,
    ) {
        #[cfg(feature = "profiling")]
        profiling::scope!("flow_line::render");

        let geometry = state.geometry;
        let Geometry::LineString(line) = geometry else {
            tracing::trace!("Flow line style skips non line-string geometry");
            return;
        };

        let full;
        let coords = if self.visible() {
            pixel_coords
        } else {
            match full_pixel_coordinates(pixel_coords, line, state.resolution, state.pixel_ratio) {
                Some(coords) => {
                    full = coords;
                    &full[..]
                }
                None => return,
            }
        };

        let segments = split_into(coords, self.segment_count(), self.min_segment_length());
        if segments.is_empty() {
            return;
        }
        let count = segments.len();
        let extent = ArrowExtent::measure(&segments, self.arrow());

        let feature = state.feature;
        let pixel_ratio = state.pixel_ratio;
        let mut ctx = ContextGuard::new(&mut *state.context);
        ctx.set_line_join(LineJoin::Round);
        ctx.set_line_cap(self.line_cap());

        if !extent.is_empty() {
            ctx.set_line_cap(LineCap::Butt);

            if extent.start > 0
                && let (Some(&tip), Some(&toward)) =
                    (segments[0].0.first(), segments[extent.start].0.last())
            {
                let width = self.width_at(feature, 0.0) * pixel_ratio;
                draw_arrow(&mut *ctx, tip, toward, width, self.color_at(feature, 0.0));
            }

            if extent.end > 0
                && let (Some(&tip), Some(&toward)) = (
                    segments[count - 1].0.last(),
                    segments[count - 1 - extent.end].0.first(),
                )
            {
                let width = self.width_at(feature, 1.0) * pixel_ratio;
                draw_arrow(&mut *ctx, tip, toward, width, self.color_at(feature, 1.0));
            }
        }

        for (k, segment) in segments
            .iter()
            .enumerate()
            .take(count - extent.end)
            .skip(extent.start)
        {
            let step = k as f64 / count as f64;
            ctx.set_line_width(self.width_at(feature, step) * pixel_ratio);
            ctx.set_stroke_style(self.color_at(feature, step));

            let mut points = segment.coords();
            let Some(first) = points.next() else {
                continue;
            };
            ctx.begin_path();
            ctx.move_to(first.x, first.y);
            for p in points {
                ctx.line_to(p.x, p.y);
                ctx.stroke();
            }
        }
    }
}

/// Fill an arrowhead triangle pointing at `tip`
fn draw_arrow<C: DrawContext + ?Sized>(
    ctx: &mut C,
    tip: Coord<f64>,
    toward: Coord<f64>,
    stroke_width: f64,
    color: Rgba,
) {
    let Some([apex, left, right]) = arrow_head(tip, toward, stroke_width) else {
        return;
    };

    ctx.set_fill_style(color);
    ctx.begin_path();
    ctx.move_to(apex.x, apex.y);
    ctx.line_to(left.x, left.y);
    ctx.line_to(right.x, right.y);
    ctx.line_to(apex.x, apex.y);
    ctx.fill();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DrawCommand, FlowLineOptions, PathOp, RecordingContext};
    use geo::{Point, line_string};

    fn horizontal(length: f64) -> (Geometry<f64>, Vec<Coord<f64>>) {
        let line: LineString<f64> = line_string![(x: 0.0, y: 0.0), (x: length, y: 0.0)];
        let pixels = line.0.clone();
        (Geometry::LineString(line), pixels)
    }

    fn render(style: &FlowLineStyle, geometry: &Geometry<f64>, pixels: &[Coord<f64>]) -> RecordingContext {
        let mut ctx = RecordingContext::new();
        let mut state = RenderState::new(geometry, &mut ctx, 1.0, 1.0, &());
        style.render(pixels, &mut state);
        ctx
    }

    fn strokes(ctx: &RecordingContext) -> Vec<(Vec<PathOp>, Rgba, f64)> {
        ctx.commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::StrokePath {
                    ops,
                    color,
                    line_width,
                    ..
                } => Some((ops.clone(), *color, *line_width)),
                _ => None,
            })
            .collect()
    }

    fn fills(ctx: &RecordingContext) -> Vec<(Vec<PathOp>, Rgba)> {
        ctx.commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::FillPath { ops, color } => Some((ops.clone(), *color)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_other_geometries_are_ignored() {
        let style: FlowLineStyle = FlowLineStyle::default();
        let geometry = Geometry::Point(Point::new(1.0, 1.0));
        let ctx = render(&style, &geometry, &[coord! { x: 1.0, y: 1.0 }]);
        assert!(ctx.commands().is_empty());
    }

    #[test]
    fn test_body_is_stroked_per_segment() {
        let style: FlowLineStyle = FlowLineStyle::new(FlowLineOptions {
            width: Some(2.0),
            width2: Some(10.0),
            color: Some([255.0, 0.0, 0.0, 1.0].into()),
            color2: Some([0.0, 0.0, 255.0, 1.0].into()),
            ..Default::default()
        });
        let (geometry, pixels) = horizontal(100.0);
        let ctx = render(&style, &geometry, &pixels);

        let segments = split_into(&pixels, 255, 2.0);
        let strokes = strokes(&ctx);
        // Two point segments: one stroke each, every segment drawn
        assert_eq!(strokes.len(), segments.len());

        let (ops, color, width) = &strokes[0];
        assert_eq!(ops[0], PathOp::MoveTo(0.0, 0.0));
        assert_eq!(*color, Rgba::opaque(255, 0, 0));
        assert_eq!(*width, 2.0);

        let count = segments.len() as f64;
        let (_, last_color, last_width) = strokes.last().unwrap();
        let last_step = (count - 1.0) / count;
        assert!((last_width - (2.0 + 8.0 * last_step)).abs() < 1e-9);
        assert_eq!(*last_color, style.color_at(&(), last_step));
        assert!(fills(&ctx).is_empty());
    }

    #[test]
    fn test_incremental_stroke_on_multi_point_segment() {
        let style: FlowLineStyle = FlowLineStyle::default().with_segmentation(1, 2.0);
        let line: LineString<f64> =
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0)];
        let pixels = line.0.clone();
        let ctx = render(&style, &Geometry::LineString(line), &pixels);

        let strokes = strokes(&ctx);
        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes[0].0.len(), 2);
        assert_eq!(strokes[1].0.len(), 3);
    }

    #[test]
    fn test_pixel_ratio_scales_width() {
        let style: FlowLineStyle = FlowLineStyle::new(FlowLineOptions {
            width: Some(3.0),
            ..Default::default()
        });
        let (geometry, pixels) = horizontal(10.0);
        let mut ctx = RecordingContext::new();
        let mut state = RenderState::new(&geometry, &mut ctx, 1.0, 2.0, &());
        style.render(&pixels, &mut state);

        assert!(strokes(&ctx).iter().all(|(_, _, width)| *width == 6.0));
    }

    #[test]
    fn test_both_arrows() {
        let style: FlowLineStyle = FlowLineStyle::new(FlowLineOptions {
            width: Some(4.0),
            width2: Some(40.0),
            color: Some("red".into()),
            color2: Some("blue".into()),
            arrow: 2,
            line_cap: Some("round".to_string()),
            ..Default::default()
        });
        let (geometry, pixels) = horizontal(100.0);
        let ctx = render(&style, &geometry, &pixels);

        let fills = fills(&ctx);
        assert_eq!(fills.len(), 2);

        // Start arrow: tip at the line start, pointing backwards, 8px half width
        let (start_ops, start_color) = &fills[0];
        assert_eq!(start_ops[0], PathOp::MoveTo(0.0, 0.0));
        assert_eq!(start_ops[1], PathOp::LineTo(16.0, 8.0));
        assert_eq!(start_ops[2], PathOp::LineTo(16.0, -8.0));
        assert_eq!(*start_color, Rgba::opaque(255, 0, 0));

        // End arrow: wider stroke gives a 20px half width
        let (end_ops, end_color) = &fills[1];
        assert_eq!(end_ops[0], PathOp::MoveTo(100.0, 0.0));
        assert_eq!(end_ops[1], PathOp::LineTo(84.0, -20.0));
        assert_eq!(end_ops[2], PathOp::LineTo(84.0, 20.0));
        assert_eq!(end_ops[3], PathOp::LineTo(100.0, 0.0));
        assert_eq!(*end_color, Rgba::opaque(0, 0, 255));

        // 8 segments consumed at each end, butt caps under arrowheads
        let segments = split_into(&pixels, 255, 2.0);
        let strokes = strokes(&ctx);
        assert_eq!(strokes.len(), segments.len() - 16);
        assert!(ctx.commands().iter().all(|command| match command {
            DrawCommand::StrokePath { line_cap, .. } => *line_cap == LineCap::Butt,
            _ => true,
        }));
    }

    #[test]
    fn test_state_is_restored() {
        let style: FlowLineStyle = FlowLineStyle::new(FlowLineOptions {
            width: Some(5.0),
            color: Some("lime".into()),
            arrow: 1,
            line_cap: Some("round".to_string()),
            ..Default::default()
        });
        let (geometry, pixels) = horizontal(100.0);
        let ctx = render(&style, &geometry, &pixels);

        assert_eq!(ctx.commands().first(), Some(&DrawCommand::Save));
        assert_eq!(ctx.commands().last(), Some(&DrawCommand::Restore));
        assert_eq!(ctx.depth(), 0);
        assert_eq!(ctx.state(), &crate::CanvasState::default());
    }

    #[test]
    fn test_round_cap_and_join() {
        let style: FlowLineStyle = FlowLineStyle::new(FlowLineOptions {
            width: Some(1.0),
            line_cap: Some("round".to_string()),
            ..Default::default()
        });
        let (geometry, pixels) = horizontal(10.0);
        let ctx = render(&style, &geometry, &pixels);

        assert!(ctx.commands().iter().any(|command| matches!(
            command,
            DrawCommand::StrokePath {
                line_cap: LineCap::Round,
                line_join: LineJoin::Round,
                ..
            }
        )));
    }

    #[test]
    fn test_degenerate_input_draws_nothing() {
        let style: FlowLineStyle = FlowLineStyle::default();
        let (geometry, _) = horizontal(10.0);
        assert!(render(&style, &geometry, &[]).commands().is_empty());

        let point = coord! { x: 4.0, y: 4.0 };
        let ctx = render(&style, &geometry, &[point, point]);
        // A zero length segment is stroked in place, no arrow, no failure
        assert!(fills(&ctx).is_empty());
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_full_pixel_coordinates() {
        let model: LineString<f64> = line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0), (x: 100.0, y: 20.0)];
        // Resolution 2 model units per pixel: a = 0.5
        let clipped = [coord! { x: 10.0, y: 20.0 }, coord! { x: 30.0, y: 20.0 }];
        let full = full_pixel_coordinates(&clipped, &model, 2.0, 1.0).unwrap();
        assert_eq!(
            full,
            vec![
                coord! { x: 10.0, y: 20.0 },
                coord! { x: 60.0, y: 20.0 },
                coord! { x: 60.0, y: 10.0 },
            ]
        );

        assert!(full_pixel_coordinates(&[], &model, 2.0, 1.0).is_none());
        assert!(full_pixel_coordinates(&clipped, &LineString::new(vec![]), 2.0, 1.0).is_none());
    }

    #[test]
    fn test_hidden_part_is_rebuilt() {
        let style: FlowLineStyle = FlowLineStyle::new(FlowLineOptions {
            visible: false,
            width: Some(1.0),
            ..Default::default()
        });
        let model: LineString<f64> = line_string![(x: 0.0, y: 0.0), (x: 200.0, y: 0.0)];
        let geometry = Geometry::LineString(model);
        // Host only passes the first 20 pixels, the line is 100 pixels long at a = 0.5
        let clipped = [coord! { x: 0.0, y: 0.0 }, coord! { x: 20.0, y: 0.0 }];

        let mut ctx = RecordingContext::new();
        let mut state = RenderState::new(&geometry, &mut ctx, 2.0, 1.0, &());
        style.render(&clipped, &mut state);

        let full = [coord! { x: 0.0, y: 0.0 }, coord! { x: 100.0, y: 0.0 }];
        assert_eq!(strokes(&ctx).len(), split_into(&full, 255, 2.0).len());
    }
}
