//! Clipboard access.

use std::borrow::Cow;

use image::ImageFormat;
use log::debug;
use parking_lot::Mutex;
use thiserror::Error;

/// A clipboard write failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ClipboardError(String);

impl ClipboardError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// What a clipboard host accepts. Probe before writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipboardCapabilities {
    pub text: bool,
    pub image: bool,
}

/// A system clipboard.
pub trait Clipboard: Send + Sync {
    fn capabilities(&self) -> ClipboardCapabilities;

    /// Places a PNG image on the clipboard.
    ///
    /// # Errors
    ///
    /// Returns [`ClipboardError`] if the host rejects the write.
    fn write_image(&self, png: &[u8]) -> Result<(), ClipboardError>;

    /// Places text on the clipboard.
    ///
    /// # Errors
    ///
    /// Returns [`ClipboardError`] if the host rejects the write.
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The desktop clipboard through `arboard`.
pub struct ArboardClipboard {
    inner: Mutex<arboard::Clipboard>,
    capabilities: ClipboardCapabilities,
}

impl ArboardClipboard {
    /// Connects to the system clipboard and probes which formats it takes.
    ///
    /// # Errors
    ///
    /// Returns [`ClipboardError`] if no clipboard is reachable, for example
    /// in a headless session.
    pub fn new() -> Result<Self, ClipboardError> {
        let mut inner =
            arboard::Clipboard::new().map_err(|err| ClipboardError::new(err.to_string()))?;

        let capabilities = ClipboardCapabilities {
            text: supports_format(&inner.get_text()),
            image: supports_format(&inner.get_image()),
        };
        debug!(text = capabilities.text, image = capabilities.image; "Clipboard probed");

        Ok(Self {
            inner: Mutex::new(inner),
            capabilities,
        })
    }
}

/// Whether a read of one format shows the host handles that format.
///
/// Reading an empty or differently-typed clipboard still counts as support.
fn supports_format<T>(read: &Result<T, arboard::Error>) -> bool {
    !matches!(read, Err(arboard::Error::ClipboardNotSupported))
}

impl Clipboard for ArboardClipboard {
    fn capabilities(&self) -> ClipboardCapabilities {
        self.capabilities
    }

    fn write_image(&self, png: &[u8]) -> Result<(), ClipboardError> {
        // arboard takes raw RGBA pixels.
        let rgba = image::load_from_memory_with_format(png, ImageFormat::Png)
            .map_err(|err| ClipboardError::new(format!("Cannot decode PNG: {err}")))?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        debug!(width, height; "Writing image to clipboard");

        self.inner
            .lock()
            .set_image(arboard::ImageData {
                width: width as usize,
                height: height as usize,
                bytes: Cow::Owned(rgba.into_raw()),
            })
            .map_err(|err| ClipboardError::new(err.to_string()))
    }

    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.inner
            .lock()
            .set_text(text)
            .map_err(|err| ClipboardError::new(err.to_string()))
    }
}

impl std::fmt::Debug for ArboardClipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArboardClipboard").finish_non_exhaustive()
    }
}
