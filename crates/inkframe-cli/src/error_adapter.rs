//! Error adapter for converting [`InkframeError`] to miette diagnostics.
//!
//! Compile errors keep the diagram source, so a diagnostic that names a line
//! is rendered with that line labeled in a source snippet. Every other error
//! is rendered as a plain report with a stable code.

use std::{error::Error as _, fmt};

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use inkframe::{InkframeError, compiler::CompileError};

/// A compile error together with the source it was reported against.
pub struct CompileAdapter<'a> {
    err: &'a CompileError,
    src: &'a str,
}

impl<'a> CompileAdapter<'a> {
    pub fn new(err: &'a CompileError, src: &'a str) -> Self {
        Self { err, src }
    }

    fn span(&self) -> Option<SourceSpan> {
        let line = self.err.line()?;
        line_span(self.src, line)
    }
}

impl fmt::Debug for CompileAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileAdapter")
            .field("err", &self.err)
            .finish()
    }
}

impl fmt::Display for CompileAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.err.message())
    }
}

impl std::error::Error for CompileAdapter<'_> {}

impl MietteDiagnostic for CompileAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = if self.err.is_fatal() {
            "inkframe::compile::fault"
        } else {
            "inkframe::compile"
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.err
            .diagnostic()
            .and_then(|diag| diag.help())
            .map(|help| Box::new(help) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.span()?;
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span()?;
        let label = LabeledSpan::new_primary_with_span(Some("here".to_string()), span);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Adapter for [`InkframeError`] variants without source information.
pub struct ErrorAdapter<'a>(pub &'a InkframeError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            InkframeError::Io(_) => "inkframe::io",
            InkframeError::Config(_) => "inkframe::config",
            InkframeError::Compile { .. } => "inkframe::compile",
            InkframeError::Normalize(_) => "inkframe::normalize",
            InkframeError::Raster(_) => "inkframe::raster",
            InkframeError::Sink(_) => "inkframe::sink",
        };
        Some(Box::new(code))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    Compile(CompileAdapter<'a>),
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Compile(c) => fmt::Display::fmt(c, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Compile(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Compile(c) => c.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Compile(c) => c.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Compile(c) => c.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Compile(c) => c.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Byte span of the 1-based `line` in `src`, without its line break.
fn line_span(src: &str, line: usize) -> Option<SourceSpan> {
    let mut offset = 0;
    for (index, text) in src.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let len = text.trim_end_matches(['\n', '\r']).len();
            return Some(SourceSpan::new(offset.into(), len));
        }
        offset += text.len();
    }
    None
}

/// Convert an [`InkframeError`] into reportable errors.
pub fn to_reportables(err: &InkframeError) -> Vec<Reportable<'_>> {
    match err {
        InkframeError::Compile { err, src } => vec![Reportable::Compile(CompileAdapter::new(err, src))],
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use inkframe::compiler::Diagnostic;

    use super::*;

    #[test]
    fn test_compile_error_labels_the_reported_line() {
        let diag = Diagnostic::error("Parse error on line 2")
            .with_line(2)
            .with_help("close the arrow with a target node");
        let err = InkframeError::new_compile_error(
            CompileError::from_diagnostic(diag),
            "flowchart TD\nA--\nB",
        );

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        let reportable = &reportables[0];
        assert_eq!(reportable.to_string(), "Parse error on line 2");
        assert_eq!(reportable.help().unwrap().to_string(), "close the arrow with a target node");

        let labels: Vec<_> = reportable.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 13);
        assert_eq!(labels[0].len(), 3);
    }

    #[test]
    fn test_compile_error_without_line_has_no_snippet() {
        let err = InkframeError::new_compile_error(CompileError::new("compiler exited"), "pie");

        let reportables = to_reportables(&err);
        assert!(reportables[0].labels().is_none());
        assert!(reportables[0].source_code().is_none());
    }

    #[test]
    fn test_other_errors_get_a_code() {
        let err = InkframeError::Config("bad value".to_string());

        let reportables = to_reportables(&err);
        assert!(matches!(reportables[0], Reportable::Error(_)));
        assert_eq!(reportables[0].code().unwrap().to_string(), "inkframe::config");
    }

    #[test]
    fn test_line_span_handles_crlf_and_out_of_range() {
        let span = line_span("a\r\nbc\r\n", 2).unwrap();
        assert_eq!((span.offset(), span.len()), (3, 2));
        assert!(line_span("a\nb", 3).is_none());
    }
}
