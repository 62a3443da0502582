//! Vector postprocessing.
//!
//! [`normalize`] turns raw compiler output into [`VectorMarkup`] that is safe
//! to embed and scales predictably:
//!
//! - the root carries an explicit `viewBox`, derived from the intrinsic size
//!   or, failing that, from the drawn geometry (the compiler sizes its root
//!   to the laid-out diagram, so `width`/`height` already frame the
//!   geometry plus its margins, which measured bounds would clip);
//! - the SVG namespace is declared;
//! - script-like elements, event handlers and references to other documents
//!   are removed;
//! - `preserveAspectRatio` is fixed to `xMidYMid meet`.
//!
//! Normalization is a pure function of its input, and normalizing
//! normalized markup returns it unchanged.

mod sanitize;
mod writer;

use log::{debug, warn};
use resvg::usvg;
use roxmltree::{Document, Node, ParsingOptions};
use thiserror::Error;

use inkframe_core::{
    geometry::{Size, ViewBox},
    markup::VectorMarkup,
};

use writer::{RootAttributes, SVG_NS};

/// Aspect-ratio policy applied to every normalized diagram.
pub const ASPECT_RATIO_POLICY: &str = "xMidYMid meet";

/// Compiler output could not be turned into [`VectorMarkup`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizationError {
    #[error("Compiler output is not well-formed markup: {0}")]
    Malformed(String),

    #[error("Expected an <svg> root element, found <{0}>")]
    NotSvg(String),

    #[error("Cannot determine the diagram's coordinate frame: {0}")]
    NoGeometry(String),
}

/// Normalizes raw vector markup for embedding.
///
/// # Errors
///
/// Returns [`NormalizationError`] if the markup is not a well-formed SVG
/// document or if no coordinate frame can be established for it.
///
/// # Examples
///
/// ```
/// # use inkframe::postprocess::normalize;
/// let markup = normalize(r#"<svg width="400" height="300"><rect width="10" height="10"/></svg>"#)
///     .expect("valid markup");
/// assert!(markup.as_str().contains(r#"viewBox="0 0 400 300""#));
/// assert!(markup.as_str().contains(r#"xmlns="http://www.w3.org/2000/svg""#));
/// ```
pub fn normalize(raw: &str) -> Result<VectorMarkup, NormalizationError> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;

    let doc = Document::parse_with_options(raw, options)
        .map_err(|err| NormalizationError::Malformed(err.to_string()))?;
    let root = doc.root_element();

    let tag = root.tag_name();
    if tag.name() != "svg" || tag.namespace().is_some_and(|ns| ns != SVG_NS) {
        return Err(NormalizationError::NotSvg(tag.name().to_string()));
    }

    let intrinsic = intrinsic_size(root);
    let view_box = match declared_view_box(root) {
        Some(view_box) => view_box,
        None => match intrinsic {
            Some(size) => ViewBox::from_size(size),
            None => measure(root)?,
        },
    };
    let size = intrinsic.unwrap_or(view_box.size());

    let overrides = RootAttributes {
        replaced: &["viewBox", "preserveAspectRatio"],
        appended: vec![
            ("viewBox", view_box.to_string()),
            ("preserveAspectRatio", ASPECT_RATIO_POLICY.to_string()),
        ],
    };
    let text = writer::write_document(root, &overrides);

    debug!(view_box:% = view_box, size:? = size, bytes = text.len(); "Markup normalized");
    Ok(VectorMarkup::from_normalized(text, view_box, size))
}

fn declared_view_box(root: Node<'_, '_>) -> Option<ViewBox> {
    let value = root.attribute("viewBox")?;
    match value.parse::<ViewBox>() {
        Ok(view_box) if !view_box.size().is_degenerate() => Some(view_box),
        Ok(_) => {
            warn!(view_box = value; "Ignoring empty viewBox");
            None
        }
        Err(err) => {
            warn!(err:%; "Ignoring unparsable viewBox");
            None
        }
    }
}

/// Width and height of the root in user units, when both are absolute.
fn intrinsic_size(root: Node<'_, '_>) -> Option<Size> {
    let width = absolute_length(root.attribute("width")?)?;
    let height = absolute_length(root.attribute("height")?)?;
    Some(Size::new(width, height))
}

fn absolute_length(value: &str) -> Option<f32> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim_end();
    let length: f32 = number.parse().ok()?;
    (length.is_finite() && length > 0.0).then_some(length)
}

/// Derives a view box from the bounding box of the drawn geometry.
fn measure(root: Node<'_, '_>) -> Result<ViewBox, NormalizationError> {
    // Without a viewBox the canvas size does not affect user-space bounds.
    let probe = writer::write_document(
        root,
        &RootAttributes {
            replaced: &["width", "height", "viewBox", "preserveAspectRatio"],
            appended: vec![("width", "1".to_string()), ("height", "1".to_string())],
        },
    );

    let tree = usvg::Tree::from_str(&probe, &usvg::Options::default())
        .map_err(|err| NormalizationError::NoGeometry(err.to_string()))?;
    let bounds = tree.root().abs_stroke_bounding_box();

    if !tree.root().has_children() || !(bounds.width() > 0.0 && bounds.height() > 0.0) {
        return Err(NormalizationError::NoGeometry(
            "the markup has no size and draws nothing".to_string(),
        ));
    }

    debug!(x = bounds.x(), y = bounds.y(), width = bounds.width(), height = bounds.height(); "Measured diagram bounds");
    Ok(ViewBox::new(
        bounds.x(),
        bounds.y(),
        bounds.width(),
        bounds.height(),
    ))
}
