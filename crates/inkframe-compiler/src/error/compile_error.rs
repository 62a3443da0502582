//! The error type for failed compiles.

use thiserror::Error;

use crate::error::Diagnostic;

/// A render request failed to compile.
///
/// `fatal` marks failures caused by known compiler crash classes; those are
/// reported without attempting the full compile.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct CompileError {
    message: String,
    fatal: bool,
    diagnostic: Option<Diagnostic>,
}

impl CompileError {
    /// A regular compile failure, such as invalid diagram syntax.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fatal: false,
            diagnostic: None,
        }
    }

    /// A compiler fault that must not be retried with a full compile.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fatal: true,
            diagnostic: None,
        }
    }

    /// Builds the error for a failed pre-check.
    ///
    /// The error is fatal when the diagnostic reports an internal
    /// null/undefined fault.
    pub fn from_diagnostic(diagnostic: Diagnostic) -> Self {
        Self {
            message: diagnostic.message().to_string(),
            fatal: diagnostic.is_internal_fault(),
            diagnostic: Some(diagnostic),
        }
    }

    /// Attaches a diagnostic to a compile failure.
    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostic = Some(diagnostic);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.diagnostic.as_ref()
    }

    /// The 1-based source line the failure points at, if known.
    pub fn line(&self) -> Option<usize> {
        self.diagnostic.as_ref().and_then(Diagnostic::line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_diagnostic_classifies_fatal() {
        let err = CompileError::from_diagnostic(Diagnostic::error(
            "Cannot read properties of undefined (reading 'length')",
        ));
        assert!(err.is_fatal());

        let err = CompileError::from_diagnostic(Diagnostic::error("Parse error").with_line(2));
        assert!(!err.is_fatal());
        assert_eq!(err.line(), Some(2));
        assert_eq!(err.to_string(), "Parse error");
    }
}
