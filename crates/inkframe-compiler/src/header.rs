//! Diagram-type detection.
//!
//! Mermaid-style sources start with a keyword naming the diagram type
//! (`flowchart`, `sequenceDiagram`, `pie`, ...). Blank lines, `%%` comments,
//! `%%{init: ...}%%` directives and a leading `---` front-matter block may
//! precede it.

use crate::error::Diagnostic;

/// Diagram keywords accepted as the first token of a source.
pub const DIAGRAM_KEYWORDS: &[&str] = &[
    "flowchart",
    "flowchart-elk",
    "graph",
    "sequenceDiagram",
    "classDiagram",
    "classDiagram-v2",
    "stateDiagram",
    "stateDiagram-v2",
    "erDiagram",
    "journey",
    "gantt",
    "pie",
    "mindmap",
    "gitGraph",
    "timeline",
    "quadrantChart",
    "requirementDiagram",
    "C4Context",
    "C4Container",
    "C4Component",
    "C4Dynamic",
    "C4Deployment",
    "sankey-beta",
    "xychart-beta",
    "block-beta",
    "packet-beta",
    "architecture-beta",
    "kanban",
    "zenuml",
    "info",
];

/// The diagram keyword together with its 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header<'a> {
    pub keyword: &'a str,
    pub line: usize,
}

/// Finds the first meaningful token of `source`.
///
/// Returns `None` if the source has no content outside comments and front
/// matter.
///
/// ```
/// # use inkframe_compiler::header::find_header;
/// let header = find_header("%% a comment\n\nflowchart TD\nA-->B").unwrap();
/// assert_eq!(header.keyword, "flowchart");
/// assert_eq!(header.line, 3);
/// ```
pub fn find_header(source: &str) -> Option<Header<'_>> {
    let mut lines = source.lines().enumerate().peekable();

    // Skip a YAML front-matter block if present.
    if lines
        .peek()
        .is_some_and(|(_, line)| line.trim() == "---")
    {
        lines.next();
        for (_, line) in lines.by_ref() {
            if line.trim() == "---" {
                break;
            }
        }
    }

    lines
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with("%%"))
        .find_map(|(line, content)| {
            let keyword = content
                .split(|c: char| c.is_whitespace() || c == ':' || c == ';')
                .next()?;
            Some(Header { keyword, line })
        })
}

/// Checks that `source` starts with a known diagram keyword.
///
/// Returns a diagnostic describing the problem otherwise.
pub fn check_header(source: &str) -> Option<Diagnostic> {
    let Some(header) = find_header(source) else {
        return Some(
            Diagnostic::error("No diagram type found")
                .with_help("start the source with a diagram keyword such as `flowchart TD`"),
        );
    };

    if DIAGRAM_KEYWORDS.contains(&header.keyword) {
        return None;
    }

    Some(
        Diagnostic::error(format!("Unknown diagram type `{}`", header.keyword))
            .with_line(header.line)
            .with_help(format!("expected one of: {}", DIAGRAM_KEYWORDS.join(", "))),
    )
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_find_header_simple() {
        let header = find_header("flowchart TD\nA-->B").unwrap();
        assert_eq!(header.keyword, "flowchart");
        assert_eq!(header.line, 1);
    }

    #[test]
    fn test_find_header_skips_front_matter_and_directives() {
        let source = "---\ntitle: Demo\n---\n%%{init: {'theme': 'dark'}}%%\nsequenceDiagram\nA->>B: hi";
        let header = find_header(source).unwrap();
        assert_eq!(header.keyword, "sequenceDiagram");
        assert_eq!(header.line, 5);
    }

    #[test]
    fn test_find_header_pie_with_title() {
        let header = find_header("pie title Pets\n\"Dogs\" : 386").unwrap();
        assert_eq!(header.keyword, "pie");
    }

    #[test]
    fn test_find_header_empty() {
        assert!(find_header("").is_none());
        assert!(find_header("  \n%% only a comment\n").is_none());
    }

    #[test]
    fn test_check_header_accepts_known_keywords() {
        assert!(check_header("graph LR\nA-->B").is_none());
        assert!(check_header("stateDiagram-v2\n[*] --> Idle").is_none());
    }

    #[test]
    fn test_check_header_rejects_unknown_keyword() {
        let diag = check_header("\nflowchrt TD\nA-->B").unwrap();
        assert_eq!(diag.message(), "Unknown diagram type `flowchrt`");
        assert_eq!(diag.line(), Some(2));
        assert!(!diag.is_internal_fault());
    }

    proptest! {
        #[test]
        fn prop_known_keywords_always_pass(index in 0..DIAGRAM_KEYWORDS.len(), body in "[a-zA-Z0-9 >-]{0,40}") {
            let source = format!("{}\n{}", DIAGRAM_KEYWORDS[index], body);
            prop_assert!(check_header(&source).is_none());
        }
    }
}
