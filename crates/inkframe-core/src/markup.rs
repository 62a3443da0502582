//! Normalized vector markup.
//!
//! [`VectorMarkup`] is the only form in which compiler output reaches the
//! display or the exporters. Values are produced by the vector postprocessor,
//! which guarantees the properties listed on the type.

use std::fmt;

use crate::geometry::{Size, ViewBox};

/// Vector document text that is safe to embed and scales without distortion.
///
/// Every value carries:
/// - an explicit `viewBox` coordinate frame,
/// - an explicit SVG namespace declaration,
/// - no executable content and no external resource references,
/// - a fixed `preserveAspectRatio` policy (`xMidYMid meet`).
///
/// Alongside the text it records the resolved view box and the intrinsic
/// display size, which the raster exporter uses to size its output.
#[derive(Clone, PartialEq)]
pub struct VectorMarkup {
    text: String,
    view_box: ViewBox,
    size: Size,
}

impl VectorMarkup {
    /// Wraps already-normalized text.
    ///
    /// Callers are responsible for the guarantees documented on the type;
    /// this is intended for the postprocessor and for test fixtures.
    pub fn from_normalized(text: String, view_box: ViewBox, size: Size) -> Self {
        Self {
            text,
            view_box,
            size,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn view_box(&self) -> ViewBox {
        self.view_box
    }

    /// Intrinsic display size in CSS pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Debug for VectorMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorMarkup")
            .field("view_box", &self.view_box)
            .field("size", &self.size)
            .field("len", &self.text.len())
            .finish()
    }
}

impl fmt::Display for VectorMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
