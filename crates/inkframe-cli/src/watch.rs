//! Source file watching for `inkframe watch`.

use std::{
    ffi::OsString,
    io,
    path::{Path, PathBuf},
};

use log::{debug, trace};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use inkframe::{display::{self, DisplayState}, markup::VectorMarkup};

/// Reports changes to one file.
///
/// The parent directory is watched rather than the file itself, so editors
/// that save by replacing the file keep being observed.
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
}

impl SourceWatcher {
    /// Starts watching `path`; a unit is sent on `changes` for every write.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the path has no file name or the platform
    /// watcher cannot be started.
    pub fn new(path: &Path, changes: mpsc::UnboundedSender<()>) -> io::Result<Self> {
        let path = path.canonicalize()?;
        let file_name = path
            .file_name()
            .map(OsString::from)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
        let directory = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));

        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            let event = match result {
                Ok(event) => event,
                Err(err) => {
                    debug!(err:%; "Watch error");
                    return;
                }
            };
            if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                return;
            }
            if event
                .paths
                .iter()
                .any(|changed| changed.file_name() == Some(file_name.as_os_str()))
            {
                trace!(kind:? = event.kind; "Source file changed");
                // The receiver is gone once the watch loop stops.
                let _ = changes.send(());
            }
        })
        .map_err(io::Error::other)?;

        watcher
            .watch(&directory, RecursiveMode::NonRecursive)
            .map_err(io::Error::other)?;
        debug!(directory:?; "Watching for changes");

        Ok(Self { _watcher: watcher })
    }
}

impl std::fmt::Debug for SourceWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceWatcher").finish_non_exhaustive()
    }
}

/// The document written for a display state: the diagram, a diagnostic
/// panel in its place, or a blank frame once the source is cleared.
pub fn display_document(state: &DisplayState) -> VectorMarkup {
    match state {
        DisplayState::Empty => display::blank_document(),
        DisplayState::Diagram { markup, .. } => VectorMarkup::clone(markup),
        DisplayState::Failed { error, .. } => display::diagnostic_panel(error),
    }
}

/// Writes the document for `state` to `output`, replacing what was there.
///
/// # Errors
///
/// Returns an I/O error if `output` cannot be written.
pub async fn write_display(output: &Path, state: &DisplayState) -> io::Result<()> {
    tokio::fs::write(output, display_document(state).as_str()).await
}
