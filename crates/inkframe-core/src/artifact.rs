//! Export payloads.
//!
//! An [`ExportArtifact`] is created when the user copies or exports a
//! diagram; it is handed to a sink and then dropped.

use std::fmt;

use crate::markup::VectorMarkup;

/// MIME types the export sinks can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MimeType {
    Png,
    Svg,
}

impl MimeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
        }
    }

    /// File extension (without dot) conventionally used for this type.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel dimensions of a raster artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for PixelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An ephemeral export payload.
#[derive(Clone, PartialEq)]
pub struct ExportArtifact {
    mime_type: MimeType,
    bytes: Vec<u8>,
    pixels: Option<PixelSize>,
}

impl ExportArtifact {
    /// Creates a PNG artifact from encoded bytes and the bitmap dimensions.
    pub fn png(bytes: Vec<u8>, pixels: PixelSize) -> Self {
        Self {
            mime_type: MimeType::Png,
            bytes,
            pixels: Some(pixels),
        }
    }

    /// Creates an SVG artifact carrying the markup as UTF-8 bytes.
    pub fn svg(markup: &VectorMarkup) -> Self {
        Self {
            mime_type: MimeType::Svg,
            bytes: markup.as_str().as_bytes().to_vec(),
            pixels: None,
        }
    }

    pub fn mime_type(&self) -> MimeType {
        self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bitmap dimensions, present for raster artifacts only.
    pub fn pixels(&self) -> Option<PixelSize> {
        self.pixels
    }
}

impl fmt::Debug for ExportArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportArtifact")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .field("pixels", &self.pixels)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Size, ViewBox};

    #[test]
    fn test_mime_type_strings() {
        assert_eq!(MimeType::Png.as_str(), "image/png");
        assert_eq!(MimeType::Svg.as_str(), "image/svg+xml");
        assert_eq!(MimeType::Svg.extension(), "svg");
    }

    #[test]
    fn test_svg_artifact_carries_markup_bytes() {
        let size = Size::new(10.0, 10.0);
        let markup = VectorMarkup::from_normalized(
            "<svg xmlns=\"http://www.w3.org/2000/svg\"/>".to_string(),
            ViewBox::from_size(size),
            size,
        );
        let artifact = ExportArtifact::svg(&markup);
        assert_eq!(artifact.mime_type(), MimeType::Svg);
        assert_eq!(artifact.bytes(), markup.as_str().as_bytes());
        assert!(artifact.pixels().is_none());
    }
}
