//! Editor snapshots and render freshness.
//!
//! A [`DiagramSource`] is an immutable snapshot of editor content. Every
//! render is tagged with a [`Generation`]; a higher generation always wins,
//! which is how stale compiler output is recognized and discarded.

use std::{fmt, ops::Deref, sync::Arc, time::Instant};

/// An immutable snapshot of diagram source text.
///
/// Cloning is cheap (the text is shared). Two sources are equal when their
/// text is equal; there is no other identity.
///
/// # Examples
///
/// ```
/// # use inkframe_core::source::DiagramSource;
/// let a = DiagramSource::new("flowchart TD\nA-->B");
/// let b = DiagramSource::from(String::from("flowchart TD\nA-->B"));
/// assert_eq!(a, b);
/// assert!(DiagramSource::new("  \n\t").is_blank());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DiagramSource(Arc<str>);

impl DiagramSource {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    /// Returns the source text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the source contains nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Deref for DiagramSource {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DiagramSource {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for DiagramSource {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl fmt::Debug for DiagramSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Sources can be large; the first line is enough to identify them in logs.
        let first_line = self.0.lines().next().unwrap_or_default();
        f.debug_struct("DiagramSource")
            .field("first_line", &first_line)
            .field("len", &self.0.len())
            .finish()
    }
}

/// Monotonically increasing freshness counter for render requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// The generation before any request has been issued.
    pub const ZERO: Generation = Generation(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the generation that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A request to compile one source snapshot.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    generation: Generation,
    source: DiagramSource,
    submitted_at: Instant,
}

impl RenderRequest {
    pub fn new(generation: Generation, source: DiagramSource, submitted_at: Instant) -> Self {
        Self {
            generation,
            source,
            submitted_at,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn source(&self) -> &DiagramSource {
        &self.source
    }

    /// The instant the debounce timer fired for this request.
    pub fn submitted_at(&self) -> Instant {
        self.submitted_at
    }

    /// Identifier handed to the compiler for this request.
    ///
    /// Unique per generation, so side-effect elements a compiler derives
    /// from it never collide across renders.
    pub fn render_id(&self) -> String {
        format!("inkframe-{}", self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_equality_ignores_allocation() {
        let a = DiagramSource::new("graph TD");
        let b = DiagramSource::new(String::from("graph TD"));
        assert_eq!(a, b);
        assert_ne!(a, DiagramSource::new("graph LR"));
    }

    #[test]
    fn test_source_blank() {
        assert!(DiagramSource::new("").is_blank());
        assert!(DiagramSource::new(" \n \t").is_blank());
        assert!(!DiagramSource::new(" pie ").is_blank());
    }

    #[test]
    fn test_generation_ordering() {
        let first = Generation::ZERO.next();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.value(), 2);
    }

    #[test]
    fn test_render_id_is_per_generation() {
        let source = DiagramSource::new("pie");
        let now = Instant::now();
        let a = RenderRequest::new(Generation::new(4), source.clone(), now);
        let b = RenderRequest::new(Generation::new(5), source, now);
        assert_eq!(a.render_id(), "inkframe-4");
        assert_ne!(a.render_id(), b.render_id());
    }
}
