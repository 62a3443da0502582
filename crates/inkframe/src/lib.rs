//! Inkframe - live rendering and export for text-defined diagrams.
//!
//! Diagram source goes to an external [`Compiler`], its markup is normalized
//! for safe embedding, and the result can be rasterized and delivered to the
//! clipboard or to a file.
//!
//! - [`scheduler`] debounces edits and keeps only the freshest render.
//! - [`postprocess`] normalizes compiler output.
//! - [`raster`] turns markup into PNG under a decode timeout.
//! - [`sink`] delivers PNG or SVG with fallbacks.

pub mod config;
pub mod display;
pub mod postprocess;
pub mod raster;
pub mod scheduler;
pub mod sink;
pub mod templates;

mod error;

pub use inkframe_compiler as compiler;
pub use inkframe_core::{artifact, geometry, markup, source};

pub use error::InkframeError;

use std::{path::PathBuf, sync::Arc, time::Instant};

use log::{debug, info};

use inkframe_compiler::{CompileError, Compiler};
use inkframe_core::{
    markup::VectorMarkup,
    source::{DiagramSource, Generation, RenderRequest},
};

use config::AppConfig;
use raster::RasterExporter;
use scheduler::SchedulerHandle;
use sink::{Clipboard, ExportSink, FsDownloads};

/// Entry point wiring a compiler and configuration into the pipeline.
///
/// # Examples
///
/// ```rust,no_run
/// use inkframe::{Renderer, config::AppConfig};
/// use inkframe_compiler::CommandCompiler;
///
/// # async fn demo() -> Result<(), inkframe::InkframeError> {
/// let renderer = Renderer::new(CommandCompiler::default(), AppConfig::default())?;
///
/// // One-shot render
/// let markup = renderer.render("flowchart TD\nA-->B").await?;
/// println!("{markup}");
///
/// // Live rendering
/// let scheduler = renderer.spawn_scheduler();
/// scheduler.submit("flowchart TD\nA-->C");
/// # Ok(())
/// # }
/// ```
pub struct Renderer<C> {
    compiler: Arc<C>,
    config: AppConfig,
}

impl<C: Compiler> Renderer<C> {
    /// Applies the compiler section of `config` and wraps the compiler.
    ///
    /// # Errors
    ///
    /// Returns [`InkframeError::Config`] if the compiler rejects its options.
    pub fn new(compiler: C, config: AppConfig) -> Result<Self, InkframeError> {
        compiler
            .configure(config.compiler())
            .map_err(|err| InkframeError::Config(err.to_string()))?;

        Ok(Self {
            compiler: Arc::new(compiler),
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn compiler(&self) -> &Arc<C> {
        &self.compiler
    }

    /// Compiles and normalizes `source` once, without debouncing.
    ///
    /// # Errors
    ///
    /// Returns `InkframeError::Compile` for blank or invalid sources and
    /// `InkframeError::Normalize` for unusable compiler output.
    pub async fn render(&self, source: &str) -> Result<VectorMarkup, InkframeError> {
        let source = DiagramSource::new(source);
        if source.is_blank() {
            return Err(InkframeError::new_compile_error(
                CompileError::new("The diagram source is empty"),
                source.as_str(),
            ));
        }

        info!("Rendering diagram");
        let request = RenderRequest::new(Generation::ZERO.next(), source, Instant::now());
        let raw = scheduler::compile_request(self.compiler.as_ref(), &request)
            .await
            .map_err(|err| InkframeError::new_compile_error(err, request.source().as_str()))?;
        debug!(bytes = raw.len(); "Compiler output received");

        let markup = postprocess::normalize(&raw)?;
        info!(view_box:% = markup.view_box(); "Diagram rendered");
        Ok(markup)
    }

    /// Starts a render scheduler sharing this renderer's compiler.
    pub fn spawn_scheduler(&self) -> SchedulerHandle {
        scheduler::spawn(Arc::clone(&self.compiler), self.config.scheduler().clone())
    }

    /// Builds an export sink writing to the configured directory, or the
    /// current directory if none is set.
    pub fn export_sink(&self, clipboard: Option<Box<dyn Clipboard>>) -> ExportSink {
        let directory = self
            .config
            .export()
            .directory()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("."));

        ExportSink::new(
            self.config.export().clone(),
            RasterExporter::new(self.config.raster().clone()),
            clipboard,
            FsDownloads::new(directory),
        )
    }
}
