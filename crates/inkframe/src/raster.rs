//! Raster export.
//!
//! [`RasterExporter`] turns [`VectorMarkup`] into a PNG for targets that
//! cannot take vector data, such as the image clipboard:
//!
//! 1. The pixel size is the display size, raised to the configured minimum
//!    (300 x 200 by default) and multiplied by the supersampling factor.
//! 2. The markup is embedded in a `data:` URI by the first
//!    [encoding strategy](encoding) that succeeds, and decoded under a
//!    timeout. A strategy whose URI fails to decode hands over to the next.
//! 3. The image is painted, fit and centered, over an opaque white surface
//!    and encoded as PNG.

pub mod decoder;
pub mod encoding;

pub use decoder::{DecodeError, DecodedImage, ImageDecoder, ResvgDecoder};
pub use encoding::{Base64Encoder, PercentEncoder, StrategyError, UriEncoder};

use std::fmt;

use image::{ExtendedColorType, ImageEncoder, codecs::png::PngEncoder};
use log::{debug, info, warn};
use resvg::tiny_skia::{Color, Pixmap, Transform};
use thiserror::Error;
use tokio::time;

use inkframe_core::{
    artifact::{ExportArtifact, PixelSize},
    geometry::Size,
    markup::VectorMarkup,
};

use crate::config::RasterConfig;

/// One failed encoding strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingAttempt {
    pub strategy: &'static str,
    pub reason: StrategyError,
}

impl fmt::Display for EncodingAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.reason)
    }
}

/// Every encoding strategy failed; no decode was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No encoding strategy could embed the diagram ({})", format_attempts(.attempts))]
pub struct EncodingError {
    attempts: Vec<EncodingAttempt>,
}

impl EncodingError {
    pub fn new(attempts: Vec<EncodingAttempt>) -> Self {
        Self { attempts }
    }

    pub fn attempts(&self) -> &[EncodingAttempt] {
        &self.attempts
    }
}

fn format_attempts(attempts: &[EncodingAttempt]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Raster export failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RasterError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("Cannot allocate a {0} raster surface")]
    Surface(PixelSize),

    #[error("PNG encoding failed: {0}")]
    Png(String),
}

/// Rasterizes vector markup to PNG.
pub struct RasterExporter<D = ResvgDecoder> {
    config: RasterConfig,
    encoders: Vec<Box<dyn UriEncoder>>,
    decoder: D,
}

impl RasterExporter {
    /// Creates an exporter with the default strategies and decoder.
    pub fn new(config: RasterConfig) -> Self {
        Self::with_decoder(config, ResvgDecoder)
    }
}

impl<D: ImageDecoder> RasterExporter<D> {
    pub fn with_decoder(config: RasterConfig, decoder: D) -> Self {
        Self {
            config,
            encoders: encoding::default_encoders(),
            decoder,
        }
    }

    /// Replaces the ordered list of encoding strategies.
    pub fn with_encoders(mut self, encoders: Vec<Box<dyn UriEncoder>>) -> Self {
        self.encoders = encoders;
        self
    }

    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    /// Pixel size of the bitmap produced for `markup`.
    ///
    /// ```
    /// # use inkframe::{config::RasterConfig, raster::RasterExporter};
    /// # use inkframe_core::{geometry::{Size, ViewBox}, markup::VectorMarkup};
    /// let exporter = RasterExporter::new(RasterConfig::default());
    /// let markup = VectorMarkup::from_normalized(
    ///     String::new(),
    ///     ViewBox::new(0.0, 0.0, 120.0, 80.0),
    ///     Size::new(120.0, 80.0),
    /// );
    /// let pixels = exporter.target_size(&markup);
    /// assert_eq!((pixels.width, pixels.height), (600, 400));
    /// ```
    pub fn target_size(&self, markup: &VectorMarkup) -> PixelSize {
        let minimum = Size::new(self.config.min_width(), self.config.min_height());
        let size = markup.size().max(minimum).scale(self.config.scale());
        PixelSize {
            width: to_pixels(size.width()),
            height: to_pixels(size.height()),
        }
    }

    /// Renders `markup` to a PNG artifact.
    ///
    /// # Errors
    ///
    /// - [`RasterError::Encoding`] if no strategy could produce a URI.
    /// - [`RasterError::Decode`] if decoding timed out, or failed for every
    ///   URI that was produced.
    pub async fn export(&self, markup: &VectorMarkup) -> Result<ExportArtifact, RasterError> {
        let pixels = self.target_size(markup);
        let timeout = self.config.decode_timeout();

        let mut attempts = Vec::new();
        let mut decode_error = None;

        for encoder in &self.encoders {
            let strategy = encoder.name();
            let uri = match encoder.encode(markup.as_str(), self.config.max_data_uri_bytes()) {
                Ok(uri) => uri,
                Err(reason) => {
                    warn!(strategy, reason:%; "Encoding strategy failed");
                    attempts.push(EncodingAttempt { strategy, reason });
                    continue;
                }
            };

            debug!(strategy, uri_len = uri.len(); "Decoding image");
            let image = match time::timeout(timeout, self.decoder.decode(uri)).await {
                Ok(Ok(image)) => image,
                Ok(Err(err)) => {
                    warn!(strategy, err:%; "Image decode failed");
                    decode_error = Some(err);
                    continue;
                }
                Err(_) => {
                    warn!(strategy, timeout_ms = timeout.as_millis() as u64; "Image decode timed out");
                    return Err(DecodeError::Timeout(timeout).into());
                }
            };

            let bytes = paint(&image, pixels)?;
            info!(strategy, pixels:% = pixels, bytes = bytes.len(); "Raster export complete");
            return Ok(ExportArtifact::png(bytes, pixels));
        }

        Err(match decode_error {
            Some(err) => RasterError::Decode(err),
            None => RasterError::Encoding(EncodingError::new(attempts)),
        })
    }
}

impl<D> fmt::Debug for RasterExporter<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterExporter")
            .field("config", &self.config)
            .field("encoders", &self.encoders)
            .finish_non_exhaustive()
    }
}

fn to_pixels(length: f32) -> u32 {
    if length.is_finite() && length >= 1.0 {
        length.round() as u32
    } else {
        1
    }
}

/// Paints `image` onto a white surface of `pixels`, scaled to fit and
/// centered.
fn paint(image: &DecodedImage, pixels: PixelSize) -> Result<Vec<u8>, RasterError> {
    let mut pixmap = Pixmap::new(pixels.width, pixels.height).ok_or(RasterError::Surface(pixels))?;
    pixmap.fill(Color::WHITE);

    let intrinsic = image.size();
    let (width, height) = (pixels.width as f32, pixels.height as f32);
    let scale = (width / intrinsic.width()).min(height / intrinsic.height());
    let transform = Transform::from_row(
        scale,
        0.0,
        0.0,
        scale,
        (width - intrinsic.width() * scale) / 2.0,
        (height - intrinsic.height() * scale) / 2.0,
    );
    resvg::render(image.tree(), transform, &mut pixmap.as_mut());

    // The surface is opaque, so premultiplied and straight RGBA agree.
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(
            pixmap.data(),
            pixels.width,
            pixels.height,
            ExtendedColorType::Rgba8,
        )
        .map_err(|err| RasterError::Png(err.to_string()))?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use inkframe_core::geometry::ViewBox;

    use super::*;

    fn markup(width: f32, height: f32) -> VectorMarkup {
        VectorMarkup::from_normalized(
            String::new(),
            ViewBox::new(0.0, 0.0, width, height),
            Size::new(width, height),
        )
    }

    #[test]
    fn test_target_size_supersamples() {
        let exporter = RasterExporter::new(RasterConfig::default());
        assert_eq!(
            exporter.target_size(&markup(400.0, 300.0)),
            PixelSize {
                width: 800,
                height: 600
            }
        );
    }

    #[test]
    fn test_target_size_enforces_minimum_per_axis() {
        let exporter = RasterExporter::new(RasterConfig::default());
        assert_eq!(
            exporter.target_size(&markup(1000.5, 10.0)),
            PixelSize {
                width: 2001,
                height: 400
            }
        );
    }

    #[test]
    fn test_to_pixels_degenerate() {
        assert_eq!(to_pixels(f32::NAN), 1);
        assert_eq!(to_pixels(0.2), 1);
        assert_eq!(to_pixels(2.5), 3);
    }

    #[test]
    fn test_encoding_error_lists_attempts() {
        let err = EncodingError::new(vec![
            EncodingAttempt {
                strategy: "percent-encoding",
                reason: StrategyError::TooLong { length: 10, max: 5 },
            },
            EncodingAttempt {
                strategy: "base64",
                reason: StrategyError::TooLong { length: 8, max: 5 },
            },
        ]);
        assert_eq!(
            err.to_string(),
            "No encoding strategy could embed the diagram (percent-encoding: data URI would be 10 bytes, the limit is 5; base64: data URI would be 8 bytes, the limit is 5)"
        );
    }
}
