//! Command-line argument definitions for the Inkframe CLI.
//!
//! [`Args`] holds the options shared by every subcommand (configuration file,
//! log level); [`Command`] selects what to do with a diagram.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use inkframe::artifact::MimeType;

/// Render, export and watch text-defined diagrams
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a diagram once and write the normalized SVG
    Render {
        /// Path to the diagram source
        input: PathBuf,

        /// Path to the output SVG file
        #[arg(short, long, default_value = "out.svg")]
        output: PathBuf,
    },

    /// Export a diagram as a timestamped PNG or SVG file
    Export {
        input: PathBuf,

        #[arg(short, long, value_enum, default_value_t = ExportFormat::Png)]
        format: ExportFormat,

        /// Directory to export into, overriding the configuration
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Copy a diagram to the clipboard, as an image when possible
    Copy { input: PathBuf },

    /// Re-render a diagram whenever its source file changes
    Watch {
        input: PathBuf,

        #[arg(short, long, default_value = "out.svg")]
        output: PathBuf,
    },

    /// List the starter templates, or print one
    Templates {
        /// Template id, such as `flowchart`
        id: Option<String>,
    },
}

/// File format accepted by `export`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Svg,
}

impl From<ExportFormat> for MimeType {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Png => MimeType::Png,
            ExportFormat::Svg => MimeType::Svg,
        }
    }
}
