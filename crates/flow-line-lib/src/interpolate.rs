//! Width and color interpolation along the line
//!
//! A style value is either a linear ramp between a start and an (optional) end value, or
//! a caller-supplied function of the feature and the step. The step is the position on
//! the line, `0` at the start and `1` at the end. Values outside `[0, 1]` extrapolate.

use crate::Rgba;
use std::fmt;
use std::sync::Arc;

/// Caller-supplied function computing a style value from a feature and a step
pub type StepFn<T, F> = Arc<dyn Fn(&F, f64) -> T + Send + Sync>;

/// Linear interpolation between two values
pub trait Lerp: Copy {
    fn lerp(self, end: Self, step: f64) -> Self;
}

impl Lerp for f64 {
    #[inline]
    fn lerp(self, end: Self, step: f64) -> Self {
        self + (end - self) * step
    }
}

/// Per channel interpolation, red/green/blue rounded to integers and alpha left as is
impl Lerp for Rgba {
    #[inline]
    fn lerp(self, end: Self, step: f64) -> Self {
        Rgba::new(
            self.r.lerp(end.r, step).round(),
            self.g.lerp(end.g, step).round(),
            self.b.lerp(end.b, step).round(),
            self.a.lerp(end.a, step),
        )
    }
}

/// How a style value varies along the line
pub enum Interpolation<T, F: ?Sized> {
    /// Ramp from `start` to `end`, constant at `start` when `end` is unset
    Linear { start: T, end: Option<T> },
    /// Fully delegated to a function
    Custom(StepFn<T, F>),
}

impl<T: Lerp, F: ?Sized> Interpolation<T, F> {
    /// Constant value
    pub fn constant(value: T) -> Self {
        Self::Linear {
            start: value,
            end: None,
        }
    }

    /// Evaluate at `step`
    #[inline]
    pub fn at(&self, feature: &F, step: f64) -> T {
        match self {
            Self::Linear { start, end } => start.lerp(end.unwrap_or(*start), step),
            Self::Custom(f) => f(feature, step),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl<T: Clone, F: ?Sized> Clone for Interpolation<T, F> {
    fn clone(&self) -> Self {
        match self {
            Self::Linear { start, end } => Self::Linear {
                start: start.clone(),
                end: end.clone(),
            },
            Self::Custom(f) => Self::Custom(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug, F: ?Sized> fmt::Debug for Interpolation<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear { start, end } => f
                .debug_struct("Linear")
                .field("start", start)
                .field("end", end)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_ramp() {
        let width: Interpolation<f64, ()> = Interpolation::Linear {
            start: 2.0,
            end: Some(10.0),
        };
        assert_eq!(width.at(&(), 0.0), 2.0);
        assert_eq!(width.at(&(), 0.5), 6.0);
        assert_eq!(width.at(&(), 1.0), 10.0);
    }

    #[test]
    fn test_width_extrapolates() {
        let width: Interpolation<f64, ()> = Interpolation::Linear {
            start: 2.0,
            end: Some(10.0),
        };
        assert_eq!(width.at(&(), 1.5), 14.0);
        assert_eq!(width.at(&(), -0.25), 0.0);
    }

    #[test]
    fn test_constant_without_end() {
        let width: Interpolation<f64, ()> = Interpolation::constant(4.0);
        assert_eq!(width.at(&(), 0.0), 4.0);
        assert_eq!(width.at(&(), 0.7), 4.0);
        assert!(!width.is_custom());
    }

    #[test]
    fn test_color_ramp_rounds_rgb_only() {
        let color: Interpolation<Rgba, ()> = Interpolation::Linear {
            start: Rgba::new(255.0, 0.0, 0.0, 1.0),
            end: Some(Rgba::new(0.0, 0.0, 255.0, 0.5)),
        };
        let mid = color.at(&(), 0.5);
        assert_eq!(mid, Rgba::new(128.0, 0.0, 128.0, 0.75));

        let quarter = color.at(&(), 0.25);
        assert_eq!(quarter.r, 191.0);
        assert_eq!(quarter.b, 64.0);
        assert!((quarter.a - 0.875).abs() < 1e-12);
    }

    #[test]
    fn test_custom_delegates() {
        let width: Interpolation<f64, u32> = Interpolation::Custom(Arc::new(|feature, step| {
            *feature as f64 * step
        }));
        assert!(width.is_custom());
        assert_eq!(width.at(&4, 0.5), 2.0);
        assert_eq!(width.at(&4, 2.0), 8.0);
    }

    #[test]
    fn test_clone_shares_function() {
        let width: Interpolation<f64, ()> = Interpolation::Custom(Arc::new(|_, step| step * 3.0));
        let copy = width.clone();
        assert_eq!(copy.at(&(), 1.0), 3.0);
        assert_eq!(format!("{copy:?}"), "Custom(..)");
    }
}
