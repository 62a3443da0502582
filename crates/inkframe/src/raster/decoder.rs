//! Image decoding.
//!
//! Decoding is the only raster step that may hang on hostile or enormous
//! input, so it sits behind the [`ImageDecoder`] seam and the exporter bounds
//! it with a timeout.

use std::{
    future::Future,
    sync::{Arc, LazyLock},
    time::Duration,
};

use data_url::DataUrl;
use log::debug;
use resvg::usvg::{self, fontdb};
use thiserror::Error;
use tokio::task;

use inkframe_core::geometry::Size;

/// System fonts, loaded once per process.
static FONTS: LazyLock<Arc<fontdb::Database>> = LazyLock::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    debug!(faces = db.len(); "Loaded system fonts");
    Arc::new(db)
});

/// The image decode step failed or did not finish in time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("Invalid image data URI: {0}")]
    Uri(String),

    #[error("Cannot decode image: {0}")]
    Image(String),

    #[error("Image decode did not finish within {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Image decode task failed: {0}")]
    Task(String),
}

/// A decoded vector image, ready to paint.
pub struct DecodedImage {
    tree: usvg::Tree,
}

impl DecodedImage {
    pub fn new(tree: usvg::Tree) -> Self {
        Self { tree }
    }

    /// Intrinsic size of the image in user units.
    pub fn size(&self) -> Size {
        let size = self.tree.size();
        Size::new(size.width(), size.height())
    }

    pub(crate) fn tree(&self) -> &usvg::Tree {
        &self.tree
    }
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("size", &self.size())
            .finish()
    }
}

/// Turns a `data:` URI into a paintable image.
pub trait ImageDecoder: Send + Sync + 'static {
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the URI or its payload cannot be decoded.
    fn decode(&self, uri: String) -> impl Future<Output = Result<DecodedImage, DecodeError>> + Send;
}

impl<D: ImageDecoder> ImageDecoder for Arc<D> {
    fn decode(&self, uri: String) -> impl Future<Output = Result<DecodedImage, DecodeError>> + Send {
        self.as_ref().decode(uri)
    }
}

/// Decodes SVG data URIs with `usvg` on the blocking thread pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResvgDecoder;

impl ImageDecoder for ResvgDecoder {
    async fn decode(&self, uri: String) -> Result<DecodedImage, DecodeError> {
        task::spawn_blocking(move || decode_data_uri(&uri))
            .await
            .map_err(|err| DecodeError::Task(err.to_string()))?
    }
}

/// Parses an SVG `data:` URI synchronously.
pub fn decode_data_uri(uri: &str) -> Result<DecodedImage, DecodeError> {
    let url = DataUrl::process(uri).map_err(|err| DecodeError::Uri(format!("{err:?}")))?;

    let mime = url.mime_type();
    if mime.type_ != "image" || mime.subtype != "svg+xml" {
        return Err(DecodeError::Uri(format!(
            "unsupported type {}/{}",
            mime.type_, mime.subtype
        )));
    }

    let (bytes, _fragment) = url
        .decode_to_vec()
        .map_err(|_| DecodeError::Uri("invalid base64 payload".to_string()))?;

    let mut options = usvg::Options::default();
    options.fontdb = Arc::clone(&FONTS);

    let tree =
        usvg::Tree::from_data(&bytes, &options).map_err(|err| DecodeError::Image(err.to_string()))?;
    Ok(DecodedImage::new(tree))
}
