//! Flow Line Library - Variable Width and Color Line Style
//!
//! This library paints a line geometry on a 2D drawing context with a stroke width and
//! color that vary continuously along the line, plus optional arrowheads at either end.
//! It is a style plugin: the host renderer projects the geometry to pixels and hands over
//! a drawing context; this crate only decides what to paint.
//!
//! # Architecture
//!
//! - **[`FlowLineStyle`]**: Style parameters (widths, colors, arrow, line cap, visibility)
//! - **[`Interpolation`]**: Linear ramp or caller-supplied function evaluated at a step
//! - **[`split_into`]**: Splits a polyline into near-equal length segments
//! - **[`DrawContext`]**: Canvas-like drawing surface implemented by the host
//! - **[`RecordingContext`]**: A [`DrawContext`] that records commands for replay or tests
//!
//! # Rendering
//!
//! The polyline is cut into up to [`DEFAULT_SEGMENT_COUNT`] segments. Each segment is
//! stroked with the width and color interpolated at `index / segment_count`, so a long
//! line with a few vertices still gets a smooth gradient.

mod arrow;
mod color;
mod interpolate;
mod recording;
mod render;
mod segment;
mod style;

// Public API exports
pub use arrow::{ARROW_LENGTH, ArrowExtent, MIN_ARROW_HALF_WIDTH, arrow_head};
pub use color::{ColorLike, Rgba};
pub use interpolate::{Interpolation, Lerp, StepFn};
pub use recording::{CanvasState, DrawCommand, PathOp, RecordingContext};
pub use render::{ContextGuard, DrawContext, LineJoin, RenderState, full_pixel_coordinates};
pub use segment::{
    DEFAULT_MIN_SEGMENT_LENGTH, DEFAULT_SEGMENT_COUNT, SPLIT_OVERLAP, dist2d, path_length,
    split_into,
};
pub use style::{Arrow, FlowLineOptions, FlowLineStyle, LineCap};

/// Error types for style configuration
///
/// These are only surfaced by the strict parsing APIs. The style setters catch them
/// and substitute a default, so painting never fails on bad configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StyleError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid arrow code: {0} (expected -1, 0, 1 or 2)")]
    InvalidArrow(i64),
}

pub type Result<T> = std::result::Result<T, StyleError>;
