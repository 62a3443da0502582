//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    future, io,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use inkframe::{
    artifact::MimeType,
    compiler::{CompileError, Compiler, CompilerOptions, Diagnostic, header},
    markup::VectorMarkup,
    postprocess,
    raster::{DecodeError, DecodedImage, ImageDecoder, ResvgDecoder},
    sink::{Clipboard, ClipboardCapabilities, ClipboardError, Download},
    source::DiagramSource,
};

/// A compiler that renders the last source line into a fixed-size SVG.
///
/// Sources whose last line ends in `--` fail to compile; sources mentioning
/// `null` fail the pre-check with an internal fault.
#[derive(Debug, Default)]
pub struct FakeCompiler {
    calls: Mutex<Vec<String>>,
    delays: Mutex<HashMap<String, Duration>>,
    configured: AtomicUsize,
}

impl FakeCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes compiling `source` take `delay`.
    pub fn with_delay(self, source: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .unwrap()
            .insert(source.to_string(), delay);
        self
    }

    /// Sources passed to `compile`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn configure_count(&self) -> usize {
        self.configured.load(Ordering::SeqCst)
    }
}

impl Compiler for FakeCompiler {
    fn configure(&self, _options: &CompilerOptions) -> Result<(), CompileError> {
        self.configured.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn validate(&self, source: &DiagramSource) -> Option<Diagnostic> {
        if source.contains("null") {
            return Some(Diagnostic::error(
                "Cannot read properties of null (reading 'type')",
            ));
        }
        header::check_header(source)
    }

    async fn compile(&self, id: &str, source: &DiagramSource) -> Result<String, CompileError> {
        self.calls.lock().unwrap().push(source.to_string());
        let delay = self
            .delays
            .lock()
            .unwrap()
            .get(source.as_str())
            .copied()
            .unwrap_or(Duration::from_millis(20));
        tokio::time::sleep(delay).await;

        let label = source.lines().last().unwrap_or_default().trim();
        if label.ends_with("--") {
            return Err(CompileError::from_diagnostic(
                Diagnostic::error("Parse error on line 2: expecting a target node").with_line(2),
            ));
        }

        Ok(format!(
            r##"<svg id="{id}" width="400" height="300"><g class="label" data-line="{label}"/><rect x="100" y="100" width="200" height="100" fill="#000000"/></svg>"##
        ))
    }
}

/// A decoder that never finishes.
#[derive(Debug, Default)]
pub struct PendingDecoder;

impl ImageDecoder for PendingDecoder {
    async fn decode(&self, _uri: String) -> Result<DecodedImage, DecodeError> {
        future::pending().await
    }
}

/// A decoder that rejects every URI.
#[derive(Debug, Default)]
pub struct FailingDecoder {
    pub calls: AtomicUsize,
}

impl ImageDecoder for FailingDecoder {
    async fn decode(&self, _uri: String) -> Result<DecodedImage, DecodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DecodeError::Image("unsupported feature".to_string()))
    }
}

/// Wraps the real decoder and records the URIs it was given.
#[derive(Debug, Default)]
pub struct RecordingDecoder {
    pub uris: Mutex<Vec<String>>,
}

impl ImageDecoder for RecordingDecoder {
    async fn decode(&self, uri: String) -> Result<DecodedImage, DecodeError> {
        self.uris.lock().unwrap().push(uri.clone());
        ResvgDecoder.decode(uri).await
    }
}

impl RecordingDecoder {
    pub fn uris(&self) -> Vec<String> {
        self.uris.lock().unwrap().clone()
    }
}

/// An in-memory clipboard with configurable capabilities.
///
/// Clones share their contents, so a test can keep one after boxing another.
#[derive(Debug, Clone)]
pub struct MemoryClipboard {
    capabilities: ClipboardCapabilities,
    fail_text: bool,
    images: Arc<Mutex<Vec<Vec<u8>>>>,
    texts: Arc<Mutex<Vec<String>>>,
}

impl MemoryClipboard {
    pub fn new(image: bool) -> Self {
        Self {
            capabilities: ClipboardCapabilities { text: true, image },
            fail_text: false,
            images: Arc::default(),
            texts: Arc::default(),
        }
    }

    pub fn failing_text(mut self) -> Self {
        self.fail_text = true;
        self
    }

    pub fn images(&self) -> Vec<Vec<u8>> {
        self.images.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn capabilities(&self) -> ClipboardCapabilities {
        self.capabilities
    }

    fn write_image(&self, png: &[u8]) -> Result<(), ClipboardError> {
        self.images.lock().unwrap().push(png.to_vec());
        Ok(())
    }

    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.fail_text {
            return Err(ClipboardError::new("clipboard is locked"));
        }
        self.texts.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Downloads that always fail.
#[derive(Debug, Default)]
pub struct FailingDownloads;

impl Download for FailingDownloads {
    async fn save(&self, _filename: &str, _bytes: &[u8], _mime_type: MimeType) -> io::Result<PathBuf> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    }
}

/// A normalized 400 x 300 diagram with a black box in the middle.
pub fn sample_markup() -> VectorMarkup {
    postprocess::normalize(
        r##"<svg width="400" height="300"><rect x="100" y="100" width="200" height="100" fill="#000000"/></svg>"##,
    )
    .unwrap()
}
