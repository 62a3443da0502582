//! Process-backed compiler adapter.
//!
//! [`CommandCompiler`] runs a mermaid-compatible command-line compiler
//! (`mmdc` by default) once per render request inside a private temporary
//! directory:
//!
//! ```text
//! <program> -i <id>.mmd -o <id>.svg -c config.json -t <theme> -b transparent [args...]
//! ```

use std::{path::Path, process::Stdio, time::Duration};

use log::{debug, info, warn};
use parking_lot::RwLock;
use tokio::{fs, process::Command, time};

use inkframe_core::source::DiagramSource;

use crate::{
    Compiler,
    error::{CompileError, Diagnostic},
    header,
    options::CompilerOptions,
};

/// A [`Compiler`] that shells out to an external diagram compiler.
///
/// Options are held behind a lock so [`Compiler::configure`] can be called
/// while compiles are in flight; each compile snapshots the options it
/// started with.
#[derive(Debug, Default)]
pub struct CommandCompiler {
    options: RwLock<CompilerOptions>,
}

impl CommandCompiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            options: RwLock::new(options),
        }
    }

    /// Returns a snapshot of the current options.
    pub fn options(&self) -> CompilerOptions {
        self.options.read().clone()
    }

    async fn run(
        &self,
        options: &CompilerOptions,
        work_dir: &Path,
        id: &str,
        source: &DiagramSource,
    ) -> Result<String, CompileError> {
        let input_path = work_dir.join(format!("{id}.mmd"));
        let output_path = work_dir.join(format!("{id}.svg"));
        let config_path = work_dir.join("config.json");

        fs::write(&input_path, source.as_str())
            .await
            .map_err(|err| CompileError::new(format!("Failed to write compiler input: {err}")))?;
        fs::write(&config_path, options.to_mermaid_config().to_string())
            .await
            .map_err(|err| CompileError::new(format!("Failed to write compiler config: {err}")))?;

        let mut command = Command::new(&options.program);
        command
            .arg("-i")
            .arg(&input_path)
            .arg("-o")
            .arg(&output_path)
            .arg("-c")
            .arg(&config_path)
            .arg("-t")
            .arg(options.theme.as_str())
            .arg("-b")
            .arg("transparent")
            .args(&options.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(program = options.program, id; "Spawning compiler");

        let timeout = Duration::from_millis(options.timeout_ms);
        let output = match time::timeout(timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                return Err(CompileError::new(format!(
                    "Failed to run `{}`: {err}",
                    options.program
                )));
            }
            Err(_) => {
                warn!(program = options.program, timeout_ms = options.timeout_ms; "Compiler timed out");
                return Err(CompileError::new(format!(
                    "`{}` did not finish within {} ms",
                    options.program, options.timeout_ms
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let diagnostic = diagnostic_from_stderr(&stderr);
            return Err(CompileError::new(diagnostic.message().to_string()).with_diagnostic(diagnostic));
        }

        fs::read_to_string(&output_path)
            .await
            .map_err(|err| CompileError::new(format!("Compiler produced no output: {err}")))
    }
}

impl Compiler for CommandCompiler {
    fn configure(&self, options: &CompilerOptions) -> Result<(), CompileError> {
        if options.program.trim().is_empty() {
            return Err(CompileError::new("Compiler program must not be empty"));
        }
        if options.timeout_ms == 0 {
            return Err(CompileError::new("Compiler timeout must be positive"));
        }

        *self.options.write() = options.clone();
        info!(program = options.program, theme = options.theme.as_str(); "Compiler configured");
        Ok(())
    }

    async fn validate(&self, source: &DiagramSource) -> Option<Diagnostic> {
        header::check_header(source)
    }

    async fn compile(&self, id: &str, source: &DiagramSource) -> Result<String, CompileError> {
        let options = self.options();
        let work_dir = tempfile::Builder::new()
            .prefix("inkframe-")
            .tempdir()
            .map_err(|err| CompileError::new(format!("Failed to create work directory: {err}")))?;

        self.run(&options, work_dir.path(), id, source).await
    }
}

/// Extracts a diagnostic from a compiler's error output.
///
/// Stack-trace lines are dropped; a "line N" reference becomes the
/// diagnostic's line.
pub(crate) fn diagnostic_from_stderr(stderr: &str) -> Diagnostic {
    let message = stderr
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with("at "))
        .collect::<Vec<_>>()
        .join("\n");

    let message = if message.is_empty() {
        String::from("Compiler exited with an error")
    } else {
        message
    };

    match find_line_number(&message) {
        Some(line) => Diagnostic::error(message).with_line(line),
        None => Diagnostic::error(message),
    }
}

fn find_line_number(message: &str) -> Option<usize> {
    let (_, rest) = message.split_once("on line ")?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}
