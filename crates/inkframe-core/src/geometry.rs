//! Geometric primitives for sizing rendered diagrams.
//!
//! # Overview
//!
//! - [`Size`] - Width and height dimensions in CSS pixels
//! - [`ViewBox`] - The coordinate frame of a vector document (`viewBox` attribute)
//!
//! # Coordinate System
//!
//! Inkframe uses the SVG coordinate system:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns a new Size with the maximum width and height between this size and another
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Multiplies both dimensions by the given factor.
    ///
    /// # Examples
    ///
    /// ```
    /// # use inkframe_core::geometry::Size;
    /// let size = Size::new(400.0, 300.0).scale(2.0);
    /// assert_eq!(size.width(), 800.0);
    /// assert_eq!(size.height(), 600.0);
    /// ```
    pub fn scale(self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    /// Returns true if either dimension is zero, negative or not finite.
    pub fn is_degenerate(self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

/// Error returned when a `viewBox` attribute value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid viewBox `{value}`: {reason}")]
pub struct ViewBoxParseError {
    value: String,
    reason: &'static str,
}

/// The coordinate frame of a vector document.
///
/// A `ViewBox` maps user-space coordinates onto the viewport. Its textual
/// form is four numbers separated by whitespace and/or commas, exactly as
/// written in an SVG `viewBox` attribute.
///
/// # Examples
///
/// ```
/// # use inkframe_core::geometry::ViewBox;
/// let view_box: ViewBox = "-8 -8, 416 316".parse().unwrap();
/// assert_eq!(view_box.min_x(), -8.0);
/// assert_eq!(view_box.width(), 416.0);
/// assert_eq!(view_box.to_string(), "-8 -8 416 316");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    min_x: f32,
    min_y: f32,
    width: f32,
    height: f32,
}

impl ViewBox {
    pub fn new(min_x: f32, min_y: f32, width: f32, height: f32) -> Self {
        Self {
            min_x,
            min_y,
            width,
            height,
        }
    }

    /// Creates a view box anchored at the origin covering `size`.
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width(), size.height())
    }

    pub fn min_x(self) -> f32 {
        self.min_x
    }

    pub fn min_y(self) -> f32 {
        self.min_y
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns the extent of this view box as a [`Size`].
    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.min_x, self.min_y, self.width, self.height
        )
    }
}

impl FromStr for ViewBox {
    type Err = ViewBoxParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let error = |reason| ViewBoxParseError {
            value: value.to_string(),
            reason,
        };

        let numbers = value
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<f32>().map_err(|_| error("not a number")))
            .collect::<Result<Vec<_>, _>>()?;

        let [min_x, min_y, width, height] = numbers[..] else {
            return Err(error("expected exactly four numbers"));
        };

        let view_box = Self::new(min_x, min_y, width, height);
        if view_box.size().is_degenerate() {
            return Err(error("width and height must be positive"));
        }

        Ok(view_box)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_size_max_takes_each_dimension() {
        let size = Size::new(120.0, 450.0).max(Size::new(300.0, 200.0));
        assert_approx_eq!(f32, size.width(), 300.0);
        assert_approx_eq!(f32, size.height(), 450.0);
    }

    #[test]
    fn test_size_is_degenerate() {
        assert!(Size::new(0.0, 10.0).is_degenerate());
        assert!(Size::new(10.0, -1.0).is_degenerate());
        assert!(Size::new(f32::NAN, 10.0).is_degenerate());
        assert!(!Size::new(1.0, 1.0).is_degenerate());
    }

    #[test]
    fn test_view_box_parse_whitespace_and_commas() {
        let view_box: ViewBox = "0,0 , 400\t300".parse().unwrap();
        assert_approx_eq!(f32, view_box.min_x(), 0.0);
        assert_approx_eq!(f32, view_box.min_y(), 0.0);
        assert_approx_eq!(f32, view_box.width(), 400.0);
        assert_approx_eq!(f32, view_box.height(), 300.0);
    }

    #[test]
    fn test_view_box_parse_rejects_bad_values() {
        assert!("0 0 400".parse::<ViewBox>().is_err());
        assert!("0 0 400 300 1".parse::<ViewBox>().is_err());
        assert!("0 0 abc 300".parse::<ViewBox>().is_err());
        assert!("0 0 0 300".parse::<ViewBox>().is_err());
        assert!("".parse::<ViewBox>().is_err());
    }

    #[test]
    fn test_view_box_from_size() {
        let view_box = ViewBox::from_size(Size::new(640.0, 480.0));
        assert_eq!(view_box.to_string(), "0 0 640 480");
    }

    proptest! {
        #[test]
        fn prop_view_box_display_parses_back(
            min_x in -1000i32..1000,
            min_y in -1000i32..1000,
            width in 1i32..5000,
            height in 1i32..5000,
        ) {
            let view_box = ViewBox::new(min_x as f32, min_y as f32, width as f32, height as f32);
            let parsed: ViewBox = view_box.to_string().parse().unwrap();
            prop_assert_eq!(parsed, view_box);
        }
    }
}
