//! The diagnostic type reported by diagram compilers.

use std::fmt;

use crate::error::Severity;

/// A message from the compiler about a problem in the diagram source.
///
/// Diagnostics optionally point at a 1-based source line and may carry help
/// text with a suggestion.
///
/// # Example
///
/// ```
/// # use inkframe_compiler::error::Diagnostic;
/// let diag = Diagnostic::error("Parse error: expecting node, got 'EOF'")
///     .with_line(2)
///     .with_help("complete the edge with a target node");
/// assert_eq!(diag.line(), Some(2));
/// assert_eq!(diag.to_string(), "error: Parse error: expecting node, got 'EOF'");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    severity: Severity,
    message: String,
    line: Option<usize>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the 1-based source line, if known.
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the 1-based source line.
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Returns true if the message reports a null/undefined fault inside the
    /// compiler rather than a problem with the diagram.
    ///
    /// Running the full compile after such a pre-check failure is known to
    /// crash compilers, so these diagnostics are treated as fatal.
    ///
    /// ```
    /// # use inkframe_compiler::error::Diagnostic;
    /// assert!(Diagnostic::error("Cannot read properties of undefined (reading 'x')").is_internal_fault());
    /// assert!(Diagnostic::error("node is null").is_internal_fault());
    /// assert!(!Diagnostic::error("Parse error on line 2").is_internal_fault());
    /// assert!(!Diagnostic::error("nullable edge label").is_internal_fault());
    /// ```
    pub fn is_internal_fault(&self) -> bool {
        self.message
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| word.eq_ignore_ascii_case("null") || word.eq_ignore_ascii_case("undefined"))
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            line: None,
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let diag = Diagnostic::warning("unused")
            .with_line(7)
            .with_help("remove it");
        assert_eq!(diag.severity(), Severity::Warning);
        assert_eq!(diag.message(), "unused");
        assert_eq!(diag.line(), Some(7));
        assert_eq!(diag.help(), Some("remove it"));
    }

    #[test]
    fn test_internal_fault_matches_whole_words_only() {
        assert!(Diagnostic::error("TypeError: undefined is not a function").is_internal_fault());
        assert!(Diagnostic::error("value was NULL").is_internal_fault());
        assert!(!Diagnostic::error("undefinedNode is unknown").is_internal_fault());
        assert!(!Diagnostic::error("Lexical error on line 1").is_internal_fault());
    }
}
