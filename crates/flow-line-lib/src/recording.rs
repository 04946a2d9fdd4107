//! A drawing context that records what is drawn
//!
//! Useful to replay a frame on another backend, to serialize it, and to test styles without
//! a real canvas.

use crate::{DrawContext, LineCap, LineJoin, Rgba};

/// The drawing state saved and restored by `save`/`restore`
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasState {
    pub fill_style: Rgba,
    pub stroke_style: Rgba,
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            fill_style: Rgba::BLACK,
            stroke_style: Rgba::BLACK,
            line_width: 1.0,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
        }
    }
}

/// A single path operation
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathOp {
    MoveTo(f64, f64),
    LineTo(f64, f64),
}

/// A recorded drawing command
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    FillPath {
        ops: Vec<PathOp>,
        color: Rgba,
    },
    StrokePath {
        ops: Vec<PathOp>,
        color: Rgba,
        line_width: f64,
        line_cap: LineCap,
        line_join: LineJoin,
    },
}

/// [`DrawContext`] keeping a list of [`DrawCommand`]s
#[derive(Clone, Debug, Default)]
pub struct RecordingContext {
    state: CanvasState,
    state_stack: Vec<CanvasState>,
    current_path: Vec<PathOp>,
    commands: Vec<DrawCommand>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded so far
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the state untouched
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Current drawing state
    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    /// Number of saved states not yet restored
    pub fn depth(&self) -> usize {
        self.state_stack.len()
    }
}

impl DrawContext for RecordingContext {
    fn save(&mut self) {
        self.state_stack.push(self.state.clone());
        self.commands.push(DrawCommand::Save);
    }

    /// Pop the most recently saved state (no-op if the stack is empty)
    fn restore(&mut self) {
        if let Some(state) = self.state_stack.pop() {
            self.state = state;
            self.commands.push(DrawCommand::Restore);
        }
    }

    fn begin_path(&mut self) {
        self.current_path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.current_path.push(PathOp::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.current_path.push(PathOp::LineTo(x, y));
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::StrokePath {
            ops: self.current_path.clone(),
            color: self.state.stroke_style,
            line_width: self.state.line_width,
            line_cap: self.state.line_cap,
            line_join: self.state.line_join,
        });
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::FillPath {
            ops: self.current_path.clone(),
            color: self.state.fill_style,
        });
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = cap;
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.state.line_join = join;
    }

    fn set_stroke_style(&mut self, color: Rgba) {
        self.state.stroke_style = color;
    }

    fn set_fill_style(&mut self, color: Rgba) {
        self.state.fill_style = color;
    }
}
