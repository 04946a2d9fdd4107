//! Flow line style parameters
//!
//! Setters are permissive: a color that fails to parse or an unknown arrow code falls back
//! to a default, so a misconfigured style still draws a visible line.

use crate::{
    ColorLike, DEFAULT_MIN_SEGMENT_LENGTH, DEFAULT_SEGMENT_COUNT, Interpolation, Result, Rgba,
    StyleError,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Line cap used for the stroked body of the line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "lowercase"))]
pub enum LineCap {
    #[default]
    Butt,
    Round,
}

impl LineCap {
    /// `"round"` gives [`LineCap::Round`], anything else [`LineCap::Butt`]
    pub fn from_name(name: &str) -> Self {
        if name == "round" { Self::Round } else { Self::Butt }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
        }
    }
}

/// Which ends of the line get an arrowhead
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Arrow {
    Start = -1,
    #[default]
    None = 0,
    End = 1,
    Both = 2,
}

impl Arrow {
    /// Lenient conversion: codes outside `-1..=2` become [`Arrow::None`]
    pub fn from_code(code: i64) -> Self {
        Self::try_from(code).unwrap_or_else(|e| {
            tracing::debug!("{}, drawing no arrow", e);
            Self::None
        })
    }

    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn at_start(self) -> bool {
        matches!(self, Self::Start | Self::Both)
    }

    pub fn at_end(self) -> bool {
        matches!(self, Self::End | Self::Both)
    }
}

impl TryFrom<i64> for Arrow {
    type Error = StyleError;

    fn try_from(code: i64) -> Result<Self> {
        match code {
            -1 => Ok(Self::Start),
            0 => Ok(Self::None),
            1 => Ok(Self::End),
            2 => Ok(Self::Both),
            _ => Err(StyleError::InvalidArrow(code)),
        }
    }
}

/// Construction options of a [`FlowLineStyle`]
///
/// Width and color functions are not data; attach them with
/// [`FlowLineStyle::with_width_fn`] and [`FlowLineStyle::with_color_fn`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct FlowLineOptions {
    /// Use the pixel coordinates as given (true) or rebuild the whole line from the
    /// source geometry (false). Default: true
    pub visible: bool,
    /// Start width in pixels. Default: 0
    pub width: Option<f64>,
    /// End width in pixels. Default: same as `width`
    pub width2: Option<f64>,
    /// Arrow code: -1 start, 0 none, 1 end, 2 both. Default: 0
    pub arrow: i64,
    /// Start color. Default: opaque black
    pub color: Option<ColorLike>,
    /// End color. Default: same as `color`
    pub color2: Option<ColorLike>,
    /// `"round"` or `"butt"`. Default: butt
    pub line_cap: Option<String>,
    /// Geometry selector, kept for the host and never interpreted here
    pub geometry: Option<String>,
}

impl Default for FlowLineOptions {
    fn default() -> Self {
        Self {
            visible: true,
            width: None,
            width2: None,
            arrow: 0,
            color: None,
            color2: None,
            line_cap: None,
            geometry: None,
        }
    }
}

/// Style drawing a line string with a width and color varying along its length
///
/// `F` is the host's feature type, handed to custom width and color functions.
pub struct FlowLineStyle<F: ?Sized = ()> {
    width: Interpolation<f64, F>,
    color: Interpolation<Rgba, F>,
    line_cap: LineCap,
    arrow: Arrow,
    visible: bool,
    geometry: Option<String>,
    segment_count: usize,
    min_segment_length: f64,
}

impl<F: ?Sized> FlowLineStyle<F> {
    /// Create a style from its options, replacing invalid values by defaults
    pub fn new(options: FlowLineOptions) -> Self {
        let mut style = Self {
            width: Interpolation::constant(0.0),
            color: Interpolation::constant(Rgba::BLACK),
            line_cap: LineCap::default(),
            arrow: Arrow::default(),
            visible: options.visible,
            geometry: options.geometry,
            segment_count: DEFAULT_SEGMENT_COUNT,
            min_segment_length: DEFAULT_MIN_SEGMENT_LENGTH,
        };

        style.set_width(options.width.unwrap_or(0.0));
        style.set_width2(options.width2);
        if let Some(color) = options.color {
            style.set_color(color);
        }
        match options.color2 {
            Some(color) => style.set_color2(color),
            None => style.clear_color2(),
        }
        style.set_line_cap(options.line_cap.as_deref().unwrap_or_default());
        style.set_arrow(options.arrow);

        style
    }

    /// Replace the width ramp by a function of the feature and the step
    pub fn with_width_fn(mut self, f: impl Fn(&F, f64) -> f64 + Send + Sync + 'static) -> Self {
        self.set_width_fn(f);
        self
    }

    /// Replace the color ramp by a function of the feature and the step
    pub fn with_color_fn(mut self, f: impl Fn(&F, f64) -> Rgba + Send + Sync + 'static) -> Self {
        self.set_color_fn(f);
        self
    }

    /// Override the segmentation used by [`FlowLineStyle::render`]
    pub fn with_segmentation(mut self, segment_count: usize, min_segment_length: f64) -> Self {
        self.segment_count = segment_count;
        self.min_segment_length = min_segment_length;
        self
    }

    /// Set the start width, NaN counts as 0
    ///
    /// Replaces a width function if one was set.
    pub fn set_width(&mut self, width: f64) {
        let width = if width.is_nan() { 0.0 } else { width };
        match &mut self.width {
            Interpolation::Linear { start, .. } => *start = width,
            Interpolation::Custom(_) => self.width = Interpolation::constant(width),
        }
    }

    /// Set the end width, `None` keeps the width constant
    pub fn set_width2(&mut self, width: Option<f64>) {
        let width = width.filter(|w| !w.is_nan());
        match &mut self.width {
            Interpolation::Linear { end, .. } => *end = width,
            Interpolation::Custom(_) => {
                tracing::debug!("End width ignored while a width function is set");
            }
        }
    }

    pub fn set_width_fn(&mut self, f: impl Fn(&F, f64) -> f64 + Send + Sync + 'static) {
        self.width = Interpolation::Custom(Arc::new(f));
    }

    /// Set the start color, opaque black if it can't be parsed
    ///
    /// Replaces a color function if one was set.
    pub fn set_color(&mut self, color: impl Into<ColorLike>) {
        let color = Rgba::try_from(color.into()).unwrap_or_else(|e| {
            tracing::warn!("{}, using opaque black", e);
            Rgba::BLACK
        });
        match &mut self.color {
            Interpolation::Linear { start, .. } => *start = color,
            Interpolation::Custom(_) => self.color = Interpolation::constant(color),
        }
    }

    /// Set the end color, cleared (same as start) if it can't be parsed
    pub fn set_color2(&mut self, color: impl Into<ColorLike>) {
        match Rgba::try_from(color.into()) {
            Ok(color) => self.set_end_color(Some(color)),
            Err(e) => {
                tracing::warn!("{}, using the start color", e);
                self.set_end_color(None);
            }
        }
    }

    /// Make the color constant along the line
    pub fn clear_color2(&mut self) {
        self.set_end_color(None);
    }

    fn set_end_color(&mut self, color: Option<Rgba>) {
        match &mut self.color {
            Interpolation::Linear { end, .. } => *end = color,
            Interpolation::Custom(_) => {
                tracing::debug!("End color ignored while a color function is set");
            }
        }
    }

    pub fn set_color_fn(&mut self, f: impl Fn(&F, f64) -> Rgba + Send + Sync + 'static) {
        self.color = Interpolation::Custom(Arc::new(f));
    }

    /// Set the line cap by name, see [`LineCap::from_name`]
    pub fn set_line_cap(&mut self, cap: &str) {
        self.line_cap = LineCap::from_name(cap);
    }

    /// Set the arrow code, see [`Arrow::from_code`]
    pub fn set_arrow(&mut self, code: i64) {
        self.arrow = Arrow::from_code(code);
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Width at `step` (0 = start, 1 = end), before pixel ratio scaling
    #[inline]
    pub fn width_at(&self, feature: &F, step: f64) -> f64 {
        self.width.at(feature, step)
    }

    /// Color at `step`; its `Display` form is the canvas color string
    #[inline]
    pub fn color_at(&self, feature: &F, step: f64) -> Rgba {
        match &self.color {
            Interpolation::Custom(f) => f(feature, step).quantized(),
            linear => linear.at(feature, step),
        }
    }

    /// Start width, `None` when a width function is set
    pub fn width(&self) -> Option<f64> {
        match &self.width {
            Interpolation::Linear { start, .. } => Some(*start),
            Interpolation::Custom(_) => None,
        }
    }

    /// End width if one is set
    pub fn width2(&self) -> Option<f64> {
        match &self.width {
            Interpolation::Linear { end, .. } => *end,
            Interpolation::Custom(_) => None,
        }
    }

    /// Start color, `None` when a color function is set
    pub fn color(&self) -> Option<Rgba> {
        match &self.color {
            Interpolation::Linear { start, .. } => Some(*start),
            Interpolation::Custom(_) => None,
        }
    }

    /// End color if one is set
    pub fn color2(&self) -> Option<Rgba> {
        match &self.color {
            Interpolation::Linear { end, .. } => *end,
            Interpolation::Custom(_) => None,
        }
    }

    pub fn line_cap(&self) -> LineCap {
        self.line_cap
    }

    pub fn arrow(&self) -> Arrow {
        self.arrow
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn geometry(&self) -> Option<&str> {
        self.geometry.as_deref()
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn min_segment_length(&self) -> f64 {
        self.min_segment_length
    }
}

impl<F: ?Sized> Default for FlowLineStyle<F> {
    fn default() -> Self {
        Self::new(FlowLineOptions::default())
    }
}

impl<F: ?Sized> Clone for FlowLineStyle<F> {
    fn clone(&self) -> Self {
        Self {
            width: self.width.clone(),
            color: self.color.clone(),
            line_cap: self.line_cap,
            arrow: self.arrow,
            visible: self.visible,
            geometry: self.geometry.clone(),
            segment_count: self.segment_count,
            min_segment_length: self.min_segment_length,
        }
    }
}

impl<F: ?Sized> fmt::Debug for FlowLineStyle<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowLineStyle")
            .field("width", &self.width)
            .field("color", &self.color)
            .field("line_cap", &self.line_cap)
            .field("arrow", &self.arrow)
            .field("visible", &self.visible)
            .field("geometry", &self.geometry)
            .field("segment_count", &self.segment_count)
            .field("min_segment_length", &self.min_segment_length)
            .finish()
    }
}
