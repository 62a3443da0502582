//! The render scheduler.
//!
//! Source edits arrive faster than diagrams compile. The scheduler debounces
//! them, hands each surviving source to the [`Compiler`] tagged with a fresh
//! [`Generation`], and applies only the result of the newest generation to
//! the display slot. Older results are dropped whatever order they complete
//! in.
//!
//! The scheduler runs as a single task that owns all of its state and the
//! only writer of the display slot. Callers talk to it through a cloneable
//! [`SchedulerHandle`].
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use inkframe::{config::SchedulerConfig, scheduler};
//! # use inkframe_compiler::CommandCompiler;
//! # async fn demo() {
//! let handle = scheduler::spawn(Arc::new(CommandCompiler::default()), SchedulerConfig::default());
//! let mut display = handle.subscribe();
//!
//! handle.submit("flowchart TD\nA-->B");
//! display.changed().await.ok();
//! println!("{:?}", *display.borrow());
//! # }
//! ```

mod state;

pub use state::Trigger;

use std::{future, pin::Pin, sync::Arc, time::Instant};

use log::{debug, info, warn};
use tokio::{
    sync::{mpsc, oneshot, watch},
    time::{self, Sleep},
};

use inkframe_compiler::{CompileError, Compiler, CompilerOptions, Severity};
use inkframe_core::source::{DiagramSource, Generation, RenderRequest};

use crate::{
    config::SchedulerConfig,
    display::{DisplayState, RenderError},
    postprocess,
};

use state::{RenderState, SubmitOutcome};

/// Outcome of one compile, reported back to the scheduler task.
#[derive(Debug)]
pub struct RenderResult {
    pub generation: Generation,
    pub source: DiagramSource,
    pub outcome: Result<String, CompileError>,
}

enum Command {
    Submit(DiagramSource, Trigger),
    ForceRefresh,
    Cancel,
    Configure(CompilerOptions, oneshot::Sender<Result<(), CompileError>>),
}

/// Runs the pre-check and, if it passes, the full compile.
///
/// An error-severity diagnostic from the pre-check fails the request without
/// calling `compile`. Pre-check faults inside the compiler come back as
/// fatal errors.
pub async fn compile_request<C: Compiler>(
    compiler: &C,
    request: &RenderRequest,
) -> Result<String, CompileError> {
    if let Some(diagnostic) = compiler.validate(request.source()).await {
        if diagnostic.severity() == Severity::Error {
            let err = CompileError::from_diagnostic(diagnostic);
            if err.is_fatal() {
                warn!(generation = request.generation().value(), err:%; "Compiler pre-check fault");
            }
            return Err(err);
        }
        debug!(generation = request.generation().value(), diagnostic:%; "Pre-check warning");
    }

    compiler.compile(&request.render_id(), request.source()).await
}

/// Handle to a running scheduler.
///
/// Dropping every handle stops the scheduler task. Compiles already started
/// run to completion but their results are discarded.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    commands: mpsc::UnboundedSender<Command>,
    display: watch::Receiver<DisplayState>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submit(source, trigger) => f.debug_tuple("Submit").field(source).field(trigger).finish(),
            Self::ForceRefresh => f.write_str("ForceRefresh"),
            Self::Cancel => f.write_str("Cancel"),
            Self::Configure(options, _) => f.debug_tuple("Configure").field(options).finish(),
        }
    }
}

impl SchedulerHandle {
    /// Submits an edited source, debounced as a keystroke.
    pub fn submit(&self, source: impl Into<DiagramSource>) {
        self.send(Command::Submit(source.into(), Trigger::Keystroke));
    }

    /// Submits a source set by the application rather than typed, such as
    /// a loaded template.
    pub fn submit_programmatic(&self, source: impl Into<DiagramSource>) {
        self.send(Command::Submit(source.into(), Trigger::Programmatic));
    }

    /// Re-renders the latest source even if it is already displayed.
    pub fn force_refresh(&self) {
        self.send(Command::ForceRefresh);
    }

    /// Drops pending work. Results of requests already issued are discarded;
    /// the display is left as it is.
    pub fn cancel(&self) {
        self.send(Command::Cancel);
    }

    /// Re-applies compiler options and re-renders the latest source.
    ///
    /// # Errors
    ///
    /// Returns the compiler's error if the options are rejected; the
    /// display is not refreshed in that case.
    pub async fn configure(&self, options: CompilerOptions) -> Result<(), CompileError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Configure(options, reply));
        response
            .await
            .unwrap_or_else(|_| Err(CompileError::new("Render scheduler has stopped")))
    }

    /// Returns a receiver that observes every display change.
    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.display.clone()
    }

    /// Returns a snapshot of the display slot.
    pub fn current(&self) -> DisplayState {
        self.display.borrow().clone()
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            warn!("Render scheduler has stopped; dropping command");
        }
    }
}

/// Starts a scheduler task on the current tokio runtime.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn spawn<C: Compiler>(compiler: Arc<C>, config: SchedulerConfig) -> SchedulerHandle {
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (results_tx, results_rx) = mpsc::unbounded_channel();
    let (display_tx, display_rx) = watch::channel(DisplayState::Empty);

    let scheduler = Scheduler {
        compiler,
        config,
        state: RenderState::default(),
        display: display_tx,
        commands: commands_rx,
        results_tx,
        results_rx,
        timer: None,
    };
    tokio::spawn(scheduler.run());

    SchedulerHandle {
        commands: commands_tx,
        display: display_rx,
    }
}

struct Scheduler<C> {
    compiler: Arc<C>,
    config: SchedulerConfig,
    state: RenderState,
    display: watch::Sender<DisplayState>,
    commands: mpsc::UnboundedReceiver<Command>,
    results_tx: mpsc::UnboundedSender<RenderResult>,
    results_rx: mpsc::UnboundedReceiver<RenderResult>,

    /// The single debounce timer; restarting it replaces the sleep.
    timer: Option<Pin<Box<Sleep>>>,
}

impl<C: Compiler> Scheduler<C> {
    async fn run(mut self) {
        debug!("Render scheduler started");
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(result) = self.results_rx.recv() => self.handle_result(result),
                () = debounce(&mut self.timer) => self.fire(),
            }
        }
        debug!("Render scheduler stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Submit(source, trigger) => {
                let outcome = self.state.submit(source, trigger);
                self.apply(outcome);
            }
            Command::ForceRefresh => {
                info!(generation = self.state.generation().value(); "Forcing refresh");
                if let Some(outcome) = self.state.force_refresh() {
                    self.apply(outcome);
                }
            }
            Command::Cancel => {
                if self.state.cancel() {
                    debug!(generation = self.state.generation().value(); "Render cancelled");
                }
                self.timer = None;
            }
            Command::Configure(options, reply) => {
                let result = self.compiler.configure(&options);
                let refresh = result.is_ok();
                // The caller may have stopped waiting.
                let _ = reply.send(result);
                if refresh && let Some(outcome) = self.state.force_refresh() {
                    self.apply(outcome);
                }
            }
        }
    }

    fn apply(&mut self, outcome: SubmitOutcome) {
        match outcome {
            SubmitOutcome::Unchanged => {
                self.timer = None;
            }
            SubmitOutcome::Cleared => {
                self.timer = None;
                info!(generation = self.state.generation().value(); "Source is blank; display cleared");
                self.display.send_replace(DisplayState::Empty);
            }
            SubmitOutcome::Scheduled(trigger) => {
                let delay = match trigger {
                    Trigger::Keystroke => self.config.keystroke_debounce(),
                    Trigger::Programmatic => self.config.programmatic_debounce(),
                };
                debug!(trigger:?, delay_ms = delay.as_millis() as u64; "Debounce restarted");
                self.timer = Some(Box::pin(time::sleep(delay)));
            }
        }
    }

    fn fire(&mut self) {
        self.timer = None;
        let Some(request) = self.state.fire(Instant::now()) else {
            return;
        };

        debug!(generation = request.generation().value(), source:? = request.source(); "Render requested");

        let compiler = Arc::clone(&self.compiler);
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let outcome = compile_request(compiler.as_ref(), &request).await;
            // The scheduler may have stopped; the result is unobservable then.
            let _ = results.send(RenderResult {
                generation: request.generation(),
                source: request.source().clone(),
                outcome,
            });
        });
    }

    fn handle_result(&mut self, result: RenderResult) {
        if !self.state.accept(result.generation, &result.source) {
            return;
        }

        let generation = result.generation;
        let state = match result.outcome {
            Ok(raw) => match postprocess::normalize(&raw) {
                Ok(markup) => {
                    info!(generation = generation.value(), view_box:% = markup.view_box(); "Render accepted");
                    DisplayState::Diagram {
                        generation,
                        markup: Arc::new(markup),
                    }
                }
                Err(err) => {
                    warn!(generation = generation.value(), err:%; "Compiler output rejected");
                    DisplayState::Failed {
                        generation,
                        error: RenderError::Normalize(err),
                    }
                }
            },
            Err(err) => {
                info!(generation = generation.value(), fatal = err.is_fatal(), err:%; "Render failed");
                DisplayState::Failed {
                    generation,
                    error: RenderError::Compile(err),
                }
            }
        };

        self.display.send_replace(state);
    }
}

async fn debounce(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => future::pending().await,
    }
}
