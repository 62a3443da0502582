//! Export sinks.
//!
//! [`ExportSink`] delivers a diagram to the clipboard or to a file, falling
//! back from raster to vector when rasterizing fails:
//!
//! | Operation | First choice | Fallback |
//! |-----------|--------------|----------|
//! | [`copy_to_clipboard`](ExportSink::copy_to_clipboard) | PNG image | markup as text |
//! | [`export_file`](ExportSink::export_file) with PNG | `.png` file | `.svg` file |
//! | [`export_file`](ExportSink::export_file) with SVG | `.svg` file | none |
//!
//! Each call performs at most one successful write and never retries on its
//! own.

pub mod clipboard;
pub mod download;

pub use clipboard::{ArboardClipboard, Clipboard, ClipboardCapabilities, ClipboardError};
pub use download::{Download, FsDownloads, export_filename};

use std::{fmt, io, path::PathBuf};

use chrono::Utc;
use log::{info, warn};
use thiserror::Error;

use inkframe_core::{
    artifact::{ExportArtifact, MimeType, PixelSize},
    markup::VectorMarkup,
};

use crate::{
    config::ExportConfig,
    raster::{ImageDecoder, RasterError, RasterExporter, ResvgDecoder},
};

/// Delivering an artifact failed.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("No clipboard is available")]
    ClipboardUnavailable,

    #[error("Cannot open the clipboard: {0}")]
    Clipboard(#[from] ClipboardError),

    #[error("Copy failed: image copy failed ({image}) and text copy failed ({text})")]
    CopyFailed {
        image: String,
        #[source]
        text: ClipboardError,
    },

    #[error("Cannot save {filename}: {source}")]
    Download {
        filename: String,
        #[source]
        source: io::Error,
    },

    #[error("Export failed: {raster}; the SVG fallback could not be saved either: {download}")]
    ExportFailed {
        raster: RasterError,
        #[source]
        download: io::Error,
    },
}

/// How a clipboard copy was delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum CopyOutcome {
    /// A PNG image was copied.
    Image { pixels: PixelSize },

    /// The vector markup was copied as text.
    Text { reason: String },
}

impl CopyOutcome {
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }
}

impl fmt::Display for CopyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image { pixels } => write!(f, "image copied ({pixels})"),
            Self::Text { .. } => f.write_str("text copied"),
        }
    }
}

/// A file written by [`ExportSink::export_file`].
#[derive(Debug)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub mime_type: MimeType,
    pub pixels: Option<PixelSize>,

    /// Why a PNG request was delivered as SVG.
    pub fallback: Option<RasterError>,
}

impl ExportOutcome {
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Delivers diagrams to the clipboard and to files.
pub struct ExportSink<L = FsDownloads, D = ResvgDecoder> {
    config: ExportConfig,
    exporter: RasterExporter<D>,
    clipboard: Option<Box<dyn Clipboard>>,
    downloads: L,
}

impl<L: Download, D: ImageDecoder> ExportSink<L, D> {
    /// Creates a sink. A `None` clipboard makes every copy fail with
    /// [`SinkError::ClipboardUnavailable`].
    pub fn new(
        config: ExportConfig,
        exporter: RasterExporter<D>,
        clipboard: Option<Box<dyn Clipboard>>,
        downloads: L,
    ) -> Self {
        Self {
            config,
            exporter,
            clipboard,
            downloads,
        }
    }

    pub fn exporter(&self) -> &RasterExporter<D> {
        &self.exporter
    }

    /// Copies the diagram as an image, or as markup text if that fails.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::ClipboardUnavailable`] without a clipboard and
    /// [`SinkError::CopyFailed`] if neither form could be copied.
    pub async fn copy_to_clipboard(&self, markup: &VectorMarkup) -> Result<CopyOutcome, SinkError> {
        let clipboard = self
            .clipboard
            .as_deref()
            .ok_or(SinkError::ClipboardUnavailable)?;
        let capabilities = clipboard.capabilities();

        let image_failure = if !capabilities.image {
            String::from("the clipboard does not accept images")
        } else if !self.config.clipboard_images() {
            String::from("image copies are disabled")
        } else {
            match self.exporter.export(markup).await {
                Ok(artifact) => match clipboard.write_image(artifact.bytes()) {
                    Ok(()) => {
                        let pixels = artifact.pixels().unwrap_or(self.exporter.target_size(markup));
                        info!(pixels:% = pixels; "Image copied to clipboard");
                        return Ok(CopyOutcome::Image { pixels });
                    }
                    Err(err) => err.to_string(),
                },
                Err(err) => err.to_string(),
            }
        };

        warn!(reason = image_failure; "Copying markup as text");

        if !capabilities.text {
            return Err(SinkError::CopyFailed {
                image: image_failure,
                text: ClipboardError::new("the clipboard does not accept text"),
            });
        }

        match clipboard.write_text(markup.as_str()) {
            Ok(()) => {
                info!(bytes = markup.as_str().len(); "Text copied to clipboard");
                Ok(CopyOutcome::Text {
                    reason: image_failure,
                })
            }
            Err(text) => Err(SinkError::CopyFailed {
                image: image_failure,
                text,
            }),
        }
    }

    /// Saves the diagram as a timestamped file.
    ///
    /// PNG requests fall back to SVG when rasterizing fails; SVG requests
    /// skip the raster step.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Download`] if the file cannot be written, or
    /// [`SinkError::ExportFailed`] if both the raster step and the SVG
    /// fallback failed.
    pub async fn export_file(
        &self,
        markup: &VectorMarkup,
        format: MimeType,
    ) -> Result<ExportOutcome, SinkError> {
        if format == MimeType::Svg {
            return self.save(ExportArtifact::svg(markup)).await;
        }

        match self.exporter.export(markup).await {
            Ok(artifact) => self.save(artifact).await,
            Err(raster) => {
                warn!(err:% = raster; "Raster export failed; saving SVG instead");
                match self.save(ExportArtifact::svg(markup)).await {
                    Ok(outcome) => Ok(ExportOutcome {
                        fallback: Some(raster),
                        ..outcome
                    }),
                    Err(SinkError::Download { source, .. }) => Err(SinkError::ExportFailed {
                        raster,
                        download: source,
                    }),
                    Err(err) => Err(err),
                }
            }
        }
    }

    async fn save(&self, artifact: ExportArtifact) -> Result<ExportOutcome, SinkError> {
        let mime_type = artifact.mime_type();
        let filename = export_filename(self.config.file_prefix(), mime_type, Utc::now());

        let path = self
            .downloads
            .save(&filename, artifact.bytes(), mime_type)
            .await
            .map_err(|source| SinkError::Download { filename, source })?;

        Ok(ExportOutcome {
            path,
            mime_type,
            pixels: artifact.pixels(),
            fallback: None,
        })
    }
}

impl<L, D> fmt::Debug for ExportSink<L, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportSink")
            .field("config", &self.config)
            .field("has_clipboard", &self.clipboard.is_some())
            .finish_non_exhaustive()
    }
}
