//! CLI logic for the Inkframe diagram tool.
//!
//! Each subcommand drives one part of the pipeline: `render` compiles once,
//! `export` and `copy` go through the export sink, and `watch` feeds a file
//! into the render scheduler.

pub mod error_adapter;

mod args;
mod config;
mod watch;

pub use args::{Args, Command, ExportFormat};

use std::{fmt::Write as _, fs, io, path::Path};

use log::{info, warn};
use tokio::sync::mpsc;

use inkframe::{
    InkframeError, Renderer,
    artifact::MimeType,
    config::AppConfig,
    sink::{ArboardClipboard, Clipboard},
    templates::{self, Category},
};
use inkframe_compiler::CommandCompiler;

use watch::SourceWatcher;

/// Run the Inkframe CLI application
///
/// # Errors
///
/// Returns `InkframeError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Compile and normalization errors
/// - Export and clipboard errors that no fallback could absorb
pub async fn run(args: &Args) -> Result<(), InkframeError> {
    if let Command::Templates { id } = &args.command {
        print!("{}", templates_output(id.as_deref())?);
        return Ok(());
    }

    let app_config = config::load_config(args.config.as_ref())?;

    match &args.command {
        Command::Render { input, output } => {
            info!(input:?, output:?; "Rendering diagram");
            let renderer = Renderer::new(CommandCompiler::default(), app_config)?;
            let markup = renderer.render(&fs::read_to_string(input)?).await?;
            fs::write(output, markup.as_str())?;
            info!(output:?; "SVG written");
        }
        Command::Export { input, format, dir } => {
            let app_config = match dir {
                Some(dir) => with_export_dir(app_config, dir),
                None => app_config,
            };
            let renderer = Renderer::new(CommandCompiler::default(), app_config)?;
            let markup = renderer.render(&fs::read_to_string(input)?).await?;

            let outcome = renderer
                .export_sink(None)
                .export_file(&markup, MimeType::from(*format))
                .await?;
            match &outcome.fallback {
                Some(reason) => println!(
                    "Exported {} as SVG instead of PNG: {reason}",
                    outcome.path.display()
                ),
                None => println!("Exported {}", outcome.path.display()),
            }
        }
        Command::Copy { input } => {
            let renderer = Renderer::new(CommandCompiler::default(), app_config)?;
            let markup = renderer.render(&fs::read_to_string(input)?).await?;

            let clipboard = match ArboardClipboard::new() {
                Ok(clipboard) => Some(Box::new(clipboard) as Box<dyn Clipboard>),
                Err(err) => {
                    warn!(err:%; "System clipboard unavailable");
                    None
                }
            };
            let outcome = renderer.export_sink(clipboard).copy_to_clipboard(&markup).await?;
            println!("{outcome}");
        }
        Command::Watch { input, output } => {
            let renderer = Renderer::new(CommandCompiler::default(), app_config)?;
            watch_file(&renderer, input, output).await?;
        }
        Command::Templates { .. } => {}
    }

    Ok(())
}

/// Re-renders `input` into `output` until interrupted.
async fn watch_file(
    renderer: &Renderer<CommandCompiler>,
    input: &Path,
    output: &Path,
) -> Result<(), InkframeError> {
    let scheduler = renderer.spawn_scheduler();
    let mut display = scheduler.subscribe();

    let (changes_tx, mut changes) = mpsc::unbounded_channel();
    let _watcher = SourceWatcher::new(input, changes_tx)?;

    scheduler.submit_programmatic(fs::read_to_string(input)?);
    info!(input:?, output:?; "Watching diagram; press Ctrl-C to stop");

    loop {
        tokio::select! {
            Some(()) = changes.recv() => match tokio::fs::read_to_string(input).await {
                Ok(source) => scheduler.submit(source),
                Err(err) => warn!(input:?, err:%; "Cannot read diagram source"),
            },
            changed = display.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = display.borrow_and_update().clone();
                if let Some(err) = state.error() {
                    warn!(err:%; "Render failed");
                }
                watch::write_display(output, &state).await?;
                info!(output:?, generation:? = state.generation(); "Display written");
            }
            interrupted = tokio::signal::ctrl_c() => {
                interrupted?;
                info!("Stopping watch");
                break;
            }
        }
    }

    scheduler.cancel();
    Ok(())
}

/// Replaces the export directory of `config`.
fn with_export_dir(config: AppConfig, dir: &Path) -> AppConfig {
    AppConfig::new(
        config.compiler().clone(),
        config.scheduler().clone(),
        config.raster().clone(),
        config.export().clone().with_directory(dir),
    )
}

/// Lists every template by category, or returns the source of one.
fn templates_output(id: Option<&str>) -> Result<String, InkframeError> {
    if let Some(id) = id {
        let template = templates::find(id).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("Unknown template `{id}`"))
        })?;
        return Ok(format!("{}\n", template.source));
    }

    let mut out = String::new();
    for category in Category::ALL {
        let _ = writeln!(out, "{category}:");
        for template in templates::by_category(category) {
            let _ = writeln!(
                out,
                "  {:<10} {:<18} {}",
                template.id, template.name, template.description
            );
        }
    }
    Ok(out)
}
