//! Compiler configuration.
//!
//! [`CompilerOptions`] is an explicit value handed to a [`Compiler`](crate::Compiler)
//! at construction and re-applied through `configure`; there is no global
//! compiler state. All types implement [`serde::Deserialize`] so the options
//! can be loaded from the `[compiler]` section of a configuration file.

use serde::Deserialize;
use serde_json::{Value, json};

/// Color theme applied by the compiler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Forest,
    Neutral,
    Base,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dark => "dark",
            Self::Forest => "forest",
            Self::Neutral => "neutral",
            Self::Base => "base",
        }
    }
}

/// How much the compiler trusts the diagram text.
///
/// `Strict` encodes HTML in labels and disables click handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    #[default]
    Strict,
    Loose,
    Antiscript,
    Sandbox,
}

impl SecurityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Loose => "loose",
            Self::Antiscript => "antiscript",
            Self::Sandbox => "sandbox",
        }
    }
}

/// Edge interpolation used by flowchart layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlowchartCurve {
    #[default]
    Basis,
    Linear,
    Step,
    Cardinal,
    MonotoneX,
}

impl FlowchartCurve {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basis => "basis",
            Self::Linear => "linear",
            Self::Step => "step",
            Self::Cardinal => "cardinal",
            Self::MonotoneX => "monotoneX",
        }
    }
}

/// Options controlling how diagrams are compiled.
///
/// # Default Values
///
/// | Option | Default |
/// |--------|---------|
/// | `program` | `"mmdc"` |
/// | `args` | none |
/// | `theme` | [`Theme::Default`] |
/// | `font_family` | `"monospace"` |
/// | `security_level` | [`SecurityLevel::Strict`] |
/// | `timeout_ms` | `30000` |
/// | `flowchart_curve` | [`FlowchartCurve::Basis`] |
/// | `html_labels` | `true` |
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Compiler executable for process-backed compilers.
    pub program: String,

    /// Extra arguments appended to every compiler invocation.
    pub args: Vec<String>,

    pub theme: Theme,

    pub font_family: String,

    pub security_level: SecurityLevel,

    /// Upper bound for a single compile, in milliseconds.
    pub timeout_ms: u64,

    pub flowchart_curve: FlowchartCurve,

    /// Whether flowchart labels may use HTML (`foreignObject`) rendering.
    pub html_labels: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            program: String::from("mmdc"),
            args: Vec::new(),
            theme: Theme::default(),
            font_family: String::from("monospace"),
            security_level: SecurityLevel::default(),
            timeout_ms: 30_000,
            flowchart_curve: FlowchartCurve::default(),
            html_labels: true,
        }
    }
}

impl CompilerOptions {
    /// Renders these options as a mermaid configuration document.
    ///
    /// ```
    /// # use inkframe_compiler::{CompilerOptions, Theme};
    /// let options = CompilerOptions { theme: Theme::Dark, ..Default::default() };
    /// let config = options.to_mermaid_config();
    /// assert_eq!(config["theme"], "dark");
    /// assert_eq!(config["startOnLoad"], false);
    /// ```
    pub fn to_mermaid_config(&self) -> Value {
        json!({
            "startOnLoad": false,
            "theme": self.theme.as_str(),
            "fontFamily": self.font_family,
            "securityLevel": self.security_level.as_str(),
            "flowchart": {
                "curve": self.flowchart_curve.as_str(),
                "htmlLabels": self.html_labels,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = CompilerOptions::default();
        assert_eq!(options.program, "mmdc");
        assert_eq!(options.theme, Theme::Default);
        assert_eq!(options.security_level, SecurityLevel::Strict);
        assert_eq!(options.timeout_ms, 30_000);
    }

    #[test]
    fn test_deserialize_partial_options() {
        let options: CompilerOptions = serde_json::from_value(json!({
            "theme": "forest",
            "flowchart_curve": "monotoneX",
        }))
        .unwrap();

        assert_eq!(options.theme, Theme::Forest);
        assert_eq!(options.flowchart_curve, FlowchartCurve::MonotoneX);
        assert_eq!(options.font_family, "monospace");
    }

    #[test]
    fn test_mermaid_config_shape() {
        let options = CompilerOptions {
            font_family: "Inter".to_string(),
            html_labels: false,
            ..Default::default()
        };
        let config = options.to_mermaid_config();
        assert_eq!(config["fontFamily"], "Inter");
        assert_eq!(config["securityLevel"], "strict");
        assert_eq!(config["flowchart"]["curve"], "basis");
        assert_eq!(config["flowchart"]["htmlLabels"], false);
    }
}
