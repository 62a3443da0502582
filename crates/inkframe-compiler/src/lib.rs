//! Diagram compiler seam for Inkframe.
//!
//! The diagram grammar itself is owned by an external compiler. This crate
//! defines the narrow interface the render pipeline needs from it, the
//! diagnostic types it reports with, and [`CommandCompiler`], an adapter that
//! drives a mermaid-compatible command-line compiler.
//!
//! # Overview
//!
//! - [`Compiler`] - `validate` / `compile` / `configure`
//! - [`CompilerOptions`] - Explicit configuration passed at construction
//! - [`error::Diagnostic`] and [`error::CompileError`] - What a failed compile reports
//! - [`header`] - Diagram-type detection used for cheap pre-validation

pub mod error;
pub mod header;

mod command;
mod options;

pub use command::CommandCompiler;
pub use error::{CompileError, Diagnostic, Severity};
pub use options::{CompilerOptions, FlowchartCurve, SecurityLevel, Theme};

use std::future::Future;

use inkframe_core::source::DiagramSource;

/// A diagram compiler turning source text into raw vector markup.
///
/// Implementations must be safe to share across tasks: the render scheduler
/// holds one instance and issues overlapping `validate`/`compile` calls when
/// edits arrive faster than compiles complete.
pub trait Compiler: Send + Sync + 'static {
    /// Re-applies configuration (theme, font, per-diagram layout options).
    ///
    /// Called once at startup and again whenever settings change; calling it
    /// repeatedly with the same options must be harmless.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if the options cannot be applied.
    fn configure(&self, options: &CompilerOptions) -> Result<(), CompileError>;

    /// Cheap syntax pre-check. Returns a diagnostic when the source is known
    /// to be invalid without running a full compile.
    fn validate(&self, source: &DiagramSource) -> impl Future<Output = Option<Diagnostic>> + Send;

    /// Compiles `source` into raw vector markup.
    ///
    /// `id` is unique per render request and may be used by the compiler to
    /// name the elements it generates.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] for invalid diagram source or compiler faults.
    fn compile(
        &self,
        id: &str,
        source: &DiagramSource,
    ) -> impl Future<Output = Result<String, CompileError>> + Send;
}
