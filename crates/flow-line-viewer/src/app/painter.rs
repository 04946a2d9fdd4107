//! `DrawContext` over an egui painter
//!
//! egui has no retained path or stroke state, so this keeps both and turns every
//! `stroke` and `fill` into shapes. A stroke only emits the part of the path added since
//! the previous stroke, which is what the incremental flow line loop expects.

use egui::{Color32, Painter, Pos2, Shape, Stroke};
use flow_line_lib::{DrawContext, LineCap, LineJoin, Rgba};

pub(crate) fn to_color32(color: Rgba) -> Color32 {
    let [r, g, b, a] = color.to_rgba8();
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

#[derive(Clone, Copy, Debug)]
struct PaintState {
    fill: Color32,
    stroke: Color32,
    line_width: f32,
    line_cap: LineCap,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            fill: Color32::BLACK,
            stroke: Color32::BLACK,
            line_width: 1.0,
            line_cap: LineCap::Butt,
        }
    }
}

pub struct PainterContext<'a> {
    painter: &'a Painter,
    state: PaintState,
    stack: Vec<PaintState>,
    path: Vec<Pos2>,
    /// Number of path points already covered by a stroke
    stroked: usize,
    shapes: usize,
}

impl<'a> PainterContext<'a> {
    pub fn new(painter: &'a Painter) -> Self {
        Self {
            painter,
            state: PaintState::default(),
            stack: Vec::new(),
            path: Vec::new(),
            stroked: 0,
            shapes: 0,
        }
    }

    /// Shapes handed to egui so far
    pub fn shape_count(&self) -> usize {
        self.shapes
    }

    fn add(&mut self, shape: Shape) {
        self.painter.add(shape);
        self.shapes += 1;
    }
}

impl DrawContext for PainterContext<'_> {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn begin_path(&mut self) {
        self.path.clear();
        self.stroked = 0;
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.clear();
        self.stroked = 0;
        self.path.push(Pos2::new(x as f32, y as f32));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.path.push(Pos2::new(x as f32, y as f32));
    }

    fn stroke(&mut self) {
        let from = self.stroked.saturating_sub(1);
        if self.path.len() < from + 2 || self.state.line_width <= 0.0 {
            self.stroked = self.path.len();
            return;
        }

        let points = self.path[from..].to_vec();
        let PaintState { stroke, line_width, line_cap, .. } = self.state;
        if line_cap == LineCap::Round {
            let radius = line_width / 2.0;
            let (first, last) = (points[0], points[points.len() - 1]);
            self.add(Shape::circle_filled(first, radius, stroke));
            self.add(Shape::circle_filled(last, radius, stroke));
        }
        self.add(Shape::line(points, Stroke::new(line_width, stroke)));
        self.stroked = self.path.len();
    }

    fn fill(&mut self) {
        if self.path.len() >= 3 {
            let shape = Shape::convex_polygon(self.path.clone(), self.state.fill, Stroke::NONE);
            self.add(shape);
        }
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width as f32;
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = cap;
    }

    fn set_line_join(&mut self, _join: LineJoin) {
        // egui joins line segments itself
    }

    fn set_stroke_style(&mut self, color: Rgba) {
        self.state.stroke = to_color32(color);
    }

    fn set_fill_style(&mut self, color: Rgba) {
        self.state.fill = to_color32(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn painter(ctx: &egui::Context) -> Painter {
        Painter::new(
            ctx.clone(),
            egui::LayerId::background(),
            egui::Rect::from_min_size(Pos2::ZERO, egui::vec2(100.0, 100.0)),
        )
    }

    #[test]
    fn test_to_color32() {
        let c = to_color32(Rgba::new(255.0, 128.0, 0.0, 0.5));
        assert_eq!(c, Color32::from_rgba_unmultiplied(255, 128, 0, 128));
        assert_eq!(to_color32(Rgba::BLACK), Color32::BLACK);
    }

    #[test]
    fn test_incremental_strokes_emit_one_shape_each() {
        let ctx = egui::Context::default();
        let painter = painter(&ctx);
        let mut draw = PainterContext::new(&painter);

        draw.set_line_width(2.0);
        draw.begin_path();
        draw.move_to(0.0, 0.0);
        draw.line_to(10.0, 0.0);
        draw.stroke();
        draw.line_to(20.0, 0.0);
        draw.stroke();
        // Nothing new to stroke
        draw.stroke();

        assert_eq!(draw.shape_count(), 2);
    }

    #[test]
    fn test_round_cap_and_fill() {
        let ctx = egui::Context::default();
        let painter = painter(&ctx);
        let mut draw = PainterContext::new(&painter);

        draw.set_line_cap(LineCap::Round);
        draw.set_line_width(4.0);
        draw.move_to(0.0, 0.0);
        draw.line_to(10.0, 0.0);
        draw.stroke();
        assert_eq!(draw.shape_count(), 3);

        draw.begin_path();
        draw.move_to(0.0, 0.0);
        draw.line_to(10.0, 0.0);
        draw.fill();
        assert_eq!(draw.shape_count(), 3);
        draw.line_to(5.0, 5.0);
        draw.fill();
        assert_eq!(draw.shape_count(), 4);
    }

    #[test]
    fn test_save_restore() {
        let ctx = egui::Context::default();
        let painter = painter(&ctx);
        let mut draw = PainterContext::new(&painter);

        draw.save();
        draw.set_line_width(0.0);
        draw.move_to(0.0, 0.0);
        draw.line_to(10.0, 0.0);
        draw.stroke();
        assert_eq!(draw.shape_count(), 0);

        draw.restore();
        draw.begin_path();
        draw.move_to(0.0, 0.0);
        draw.line_to(10.0, 0.0);
        draw.stroke();
        assert_eq!(draw.shape_count(), 1);
        // Unbalanced restore is ignored
        draw.restore();
    }
}
