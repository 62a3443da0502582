//! Configuration types for the Inkframe pipeline.
//!
//! This module provides configuration structures that control compiling,
//! scheduling, rasterizing and exporting diagrams. All types implement
//! [`serde::Deserialize`] and every field has a default, so a configuration
//! file only needs to name what it changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`SchedulerConfig`] - Debounce intervals for the render scheduler.
//! - [`RasterConfig`] - Supersampling, minimum size and decode limits.
//! - [`ExportConfig`] - File naming and clipboard behavior.
//!
//! # Example
//!
//! ```
//! # use inkframe::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.raster().scale(), 2.0);
//! assert_eq!(config.raster().decode_timeout().as_secs(), 10);
//! ```

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

use inkframe_compiler::CompilerOptions;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Compiler section, handed to the compiler adapter.
    #[serde(default)]
    compiler: CompilerOptions,

    #[serde(default)]
    scheduler: SchedulerConfig,

    #[serde(default)]
    raster: RasterConfig,

    #[serde(default)]
    export: ExportConfig,
}

impl AppConfig {
    pub fn new(
        compiler: CompilerOptions,
        scheduler: SchedulerConfig,
        raster: RasterConfig,
        export: ExportConfig,
    ) -> Self {
        Self {
            compiler,
            scheduler,
            raster,
            export,
        }
    }

    /// Returns the compiler options.
    pub fn compiler(&self) -> &CompilerOptions {
        &self.compiler
    }

    /// Returns the scheduler configuration.
    pub fn scheduler(&self) -> &SchedulerConfig {
        &self.scheduler
    }

    /// Returns the raster configuration.
    pub fn raster(&self) -> &RasterConfig {
        &self.raster
    }

    /// Returns the export configuration.
    pub fn export(&self) -> &ExportConfig {
        &self.export
    }
}

/// Debounce intervals for the render scheduler.
///
/// Keystrokes wait longer than programmatic changes (template selection,
/// refreshes) so that typing bursts coalesce into a single render.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    keystroke_debounce_ms: u64,
    programmatic_debounce_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            keystroke_debounce_ms: 300,
            programmatic_debounce_ms: 50,
        }
    }
}

impl SchedulerConfig {
    pub fn new(keystroke: Duration, programmatic: Duration) -> Self {
        Self {
            keystroke_debounce_ms: keystroke.as_millis() as u64,
            programmatic_debounce_ms: programmatic.as_millis() as u64,
        }
    }

    pub fn keystroke_debounce(&self) -> Duration {
        Duration::from_millis(self.keystroke_debounce_ms)
    }

    pub fn programmatic_debounce(&self) -> Duration {
        Duration::from_millis(self.programmatic_debounce_ms)
    }
}

/// Raster export settings.
///
/// # Default Values
///
/// | Setting | Default |
/// |---------|---------|
/// | Supersampling scale | `2.0` |
/// | Minimum display size | `300 x 200` |
/// | Decode timeout | 10 seconds |
/// | Maximum data URI length | 2 MiB |
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    scale: f32,
    min_width: f32,
    min_height: f32,
    decode_timeout_ms: u64,
    max_data_uri_bytes: usize,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            min_width: 300.0,
            min_height: 200.0,
            decode_timeout_ms: 10_000,
            max_data_uri_bytes: 2 * 1024 * 1024,
        }
    }
}

impl RasterConfig {
    /// Supersampling factor applied to the display size.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn min_width(&self) -> f32 {
        self.min_width
    }

    pub fn min_height(&self) -> f32 {
        self.min_height
    }

    /// Upper bound for decoding the vector image.
    pub fn decode_timeout(&self) -> Duration {
        Duration::from_millis(self.decode_timeout_ms)
    }

    /// Longest data URI an encoding strategy may produce.
    pub fn max_data_uri_bytes(&self) -> usize {
        self.max_data_uri_bytes
    }

    pub fn with_decode_timeout(mut self, timeout: Duration) -> Self {
        self.decode_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_max_data_uri_bytes(mut self, max: usize) -> Self {
        self.max_data_uri_bytes = max;
        self
    }
}

/// File export and clipboard settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    file_prefix: String,

    /// Target directory for exported files; the current directory if unset.
    directory: Option<PathBuf>,

    /// Set to false to always copy diagrams to the clipboard as text.
    clipboard_images: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: String::from("inkframe-diagram"),
            directory: None,
            clipboard_images: true,
        }
    }
}

impl ExportConfig {
    pub fn file_prefix(&self) -> &str {
        &self.file_prefix
    }

    pub fn directory(&self) -> Option<&PathBuf> {
        self.directory.as_ref()
    }

    pub fn clipboard_images(&self) -> bool {
        self.clipboard_images
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_debounce_intervals() {
        let config = SchedulerConfig::default();
        assert_eq!(config.keystroke_debounce(), Duration::from_millis(300));
        assert_eq!(config.programmatic_debounce(), Duration::from_millis(50));
    }

    #[test]
    fn test_raster_builders() {
        let config = RasterConfig::default()
            .with_decode_timeout(Duration::from_secs(3))
            .with_max_data_uri_bytes(1024);
        assert_eq!(config.decode_timeout(), Duration::from_secs(3));
        assert_eq!(config.max_data_uri_bytes(), 1024);
        assert_eq!(config.min_width(), 300.0);
    }

    #[test]
    fn test_export_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.file_prefix(), "inkframe-diagram");
        assert!(config.directory().is_none());
        assert!(config.clipboard_images());
    }
}
