//! The display slot.
//!
//! A [`DisplayState`] is what a viewer shows for the current source: nothing,
//! the accepted diagram, or the reason the latest render failed. Only the
//! render scheduler writes it; viewers observe it through a
//! [`tokio::sync::watch::Receiver`].

use std::sync::Arc;

use svg::{self, node::Text as SvgText, node::element as svg_element};
use thiserror::Error;

use inkframe_compiler::CompileError;
use inkframe_core::{
    geometry::{Size, ViewBox},
    markup::VectorMarkup,
    source::Generation,
};

use crate::postprocess::{ASPECT_RATIO_POLICY, NormalizationError};

const PANEL_WIDTH: f32 = 640.0;
const PANEL_PADDING: f32 = 24.0;
const LINE_HEIGHT: f32 = 20.0;
const WRAP_COLUMNS: usize = 80;

/// Why the latest accepted render shows no diagram.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Normalize(#[from] NormalizationError),
}

/// Content of the display slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DisplayState {
    /// Nothing to show: the source is blank or no render has been accepted.
    #[default]
    Empty,

    /// The accepted render of the latest source.
    Diagram {
        generation: Generation,
        markup: Arc<VectorMarkup>,
    },

    /// The latest source failed to render. Prior content is gone.
    Failed {
        generation: Generation,
        error: RenderError,
    },
}

impl DisplayState {
    /// Generation of the render that produced this state.
    pub fn generation(&self) -> Option<Generation> {
        match self {
            Self::Empty => None,
            Self::Diagram { generation, .. } | Self::Failed { generation, .. } => Some(*generation),
        }
    }

    pub fn markup(&self) -> Option<&Arc<VectorMarkup>> {
        match self {
            Self::Diagram { markup, .. } => Some(markup),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&RenderError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Renders a failed state as a standalone diagnostic panel.
///
/// The panel replaces the diagram in file-backed displays so a stale image
/// is never left behind.
pub fn diagnostic_panel(error: &RenderError) -> VectorMarkup {
    let (title, message, line, help) = match error {
        RenderError::Compile(err) => (
            if err.is_fatal() {
                "Compiler fault"
            } else {
                "Syntax error"
            },
            err.message().to_string(),
            err.line(),
            err.diagnostic().and_then(|diag| diag.help()).map(str::to_string),
        ),
        RenderError::Normalize(err) => ("Render error", err.to_string(), None, None),
    };

    let mut rows: Vec<(String, &str)> = Vec::new();
    if let Some(line) = line {
        rows.push((format!("at line {line}"), "#6b7280"));
    }
    rows.extend(wrap(&message).into_iter().map(|row| (row, "#111827")));
    if let Some(help) = help {
        rows.extend(
            wrap(&format!("help: {help}"))
                .into_iter()
                .map(|row| (row, "#1d4ed8")),
        );
    }

    let height = PANEL_PADDING * 2.0 + LINE_HEIGHT * (rows.len() as f32 + 1.5);
    let size = Size::new(PANEL_WIDTH, height);
    let view_box = ViewBox::from_size(size);

    let mut doc = svg::Document::new()
        .set("width", size.width())
        .set("height", size.height())
        .set("viewBox", view_box.to_string())
        .set("preserveAspectRatio", ASPECT_RATIO_POLICY)
        .add(
            svg_element::Rectangle::new()
                .set("width", size.width())
                .set("height", size.height())
                .set("rx", 6)
                .set("fill", "#fef2f2")
                .set("stroke", "#dc2626"),
        )
        .add(
            svg_element::Text::new("")
                .set("x", PANEL_PADDING)
                .set("y", PANEL_PADDING + LINE_HEIGHT)
                .set("font-family", "sans-serif")
                .set("font-size", 16)
                .set("font-weight", "bold")
                .set("fill", "#b91c1c")
                .add(SvgText::new(title)),
        );

    for (index, (row, color)) in rows.into_iter().enumerate() {
        let y = PANEL_PADDING + LINE_HEIGHT * (index as f32 + 2.5);
        doc = doc.add(
            svg_element::Text::new("")
                .set("x", PANEL_PADDING)
                .set("y", y)
                .set("font-family", "monospace")
                .set("font-size", 13)
                .set("fill", color)
                .add(SvgText::new(row)),
        );
    }

    VectorMarkup::from_normalized(doc.to_string(), view_box, size)
}

/// Renders the empty state: a frame with nothing drawn in it.
///
/// File-backed displays write it when the source is cleared, replacing
/// whatever diagram was there.
pub fn blank_document() -> VectorMarkup {
    let size = Size::new(1.0, 1.0);
    let view_box = ViewBox::from_size(size);

    let doc = svg::Document::new()
        .set("width", size.width())
        .set("height", size.height())
        .set("viewBox", view_box.to_string())
        .set("preserveAspectRatio", ASPECT_RATIO_POLICY);

    VectorMarkup::from_normalized(doc.to_string(), view_box, size)
}

fn wrap(text: &str) -> Vec<String> {
    text.lines()
        .flat_map(|line| {
            let chars: Vec<char> = line.chars().collect();
            if chars.is_empty() {
                return vec![String::new()];
            }
            chars
                .chunks(WRAP_COLUMNS)
                .map(|chunk| chunk.iter().collect())
                .collect()
        })
        .collect()
}
