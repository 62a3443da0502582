//! Integration tests for the render scheduler.
//!
//! All tests run on a paused clock, so debounce intervals and compile delays
//! elapse instantly but in order.

mod common;

use std::{sync::Arc, time::Duration};

use tokio::time;

use inkframe::{
    compiler::CompilerOptions,
    config::SchedulerConfig,
    display::{DisplayState, RenderError},
    scheduler::{self, SchedulerHandle},
    source::Generation,
};

use common::FakeCompiler;

/// Waits until the display satisfies `predicate` and returns that state.
async fn wait_until(
    handle: &SchedulerHandle,
    predicate: impl FnMut(&DisplayState) -> bool,
) -> DisplayState {
    let mut display = handle.subscribe();
    let state = time::timeout(Duration::from_secs(60), display.wait_for(predicate))
        .await
        .expect("display never reached the expected state")
        .expect("scheduler stopped");
    (*state).clone()
}

/// Lets every pending timer and compile finish.
async fn settle() {
    time::sleep(Duration::from_secs(5)).await;
}

fn shows_line(state: &DisplayState, line: &str) -> bool {
    state
        .markup()
        .is_some_and(|markup| markup.as_str().contains(&format!(r#"data-line="{line}""#)))
}

fn spawn(compiler: &Arc<FakeCompiler>) -> SchedulerHandle {
    scheduler::spawn(Arc::clone(compiler), SchedulerConfig::default())
}

#[tokio::test(start_paused = true)]
async fn test_repeated_submit_renders_once() {
    let compiler = Arc::new(FakeCompiler::new());
    let handle = spawn(&compiler);

    handle.submit("flowchart TD\nS1");
    handle.submit("flowchart TD\nS1");
    wait_until(&handle, |state| shows_line(state, "S1")).await;

    // Resubmitting the displayed source is a no-op.
    handle.submit("flowchart TD\nS1");
    settle().await;

    assert_eq!(compiler.calls(), vec!["flowchart TD\nS1".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_keystrokes_restart_the_debounce() {
    let compiler = Arc::new(FakeCompiler::new());
    let handle = spawn(&compiler);

    handle.submit("flowchart TD\nA");
    time::sleep(Duration::from_millis(200)).await;
    handle.submit("flowchart TD\nAB");
    time::sleep(Duration::from_millis(200)).await;
    assert!(compiler.calls().is_empty());

    time::sleep(Duration::from_millis(150)).await;
    assert_eq!(compiler.calls(), vec!["flowchart TD\nAB".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_programmatic_changes_debounce_shorter() {
    let compiler = Arc::new(FakeCompiler::new());
    let handle = spawn(&compiler);

    handle.submit_programmatic("flowchart TD\nTemplate");
    time::sleep(Duration::from_millis(60)).await;
    assert_eq!(compiler.calls().len(), 1);

    handle.submit("flowchart TD\nTyped");
    time::sleep(Duration::from_millis(60)).await;
    assert_eq!(compiler.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_stale_result_never_replaces_newer_render() {
    let compiler = Arc::new(
        FakeCompiler::new()
            .with_delay("flowchart TD\nS1", Duration::from_millis(1000))
            .with_delay("flowchart TD\nS2", Duration::from_millis(10)),
    );
    let handle = spawn(&compiler);
    let mut display = handle.subscribe();

    handle.submit("flowchart TD\nS1");
    time::sleep(Duration::from_millis(400)).await;
    assert_eq!(compiler.calls().len(), 1, "S1 should be compiling");

    handle.submit("flowchart TD\nS2");
    settle().await;

    // S2 resolved first; S1 resolved afterwards and was dropped.
    assert_eq!(compiler.calls().len(), 2);
    let state = handle.current();
    assert!(shows_line(&state, "S2"), "unexpected display: {state:?}");
    assert_eq!(state.generation(), Some(Generation::new(2)));

    // The display changed exactly once: to S2.
    assert!(display.has_changed().unwrap());
    display.mark_unchanged();
    settle().await;
    assert!(!display.has_changed().unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_missing_view_box_is_added() {
    let compiler = Arc::new(FakeCompiler::new());
    let handle = spawn(&compiler);

    handle.submit("flowchart TD\nA-->B");
    let state = wait_until(&handle, |state| state.markup().is_some()).await;

    let markup = state.markup().unwrap();
    assert!(markup.as_str().contains(r#"viewBox="0 0 400 300""#));
    assert!(markup.as_str().contains(r#"preserveAspectRatio="xMidYMid meet""#));
}

#[tokio::test(start_paused = true)]
async fn test_compile_error_clears_previous_diagram() {
    let compiler = Arc::new(FakeCompiler::new());
    let handle = spawn(&compiler);

    handle.submit("flowchart TD\nA-->B");
    wait_until(&handle, |state| state.markup().is_some()).await;

    handle.submit("flowchart TD\nA--");
    let state = wait_until(&handle, |state| state.error().is_some()).await;

    assert!(state.markup().is_none());
    match state.error() {
        Some(RenderError::Compile(err)) => {
            assert_eq!(err.line(), Some(2));
            assert!(!err.is_fatal());
        }
        other => panic!("expected a compile error, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_precheck_fault_fails_fast() {
    let compiler = Arc::new(FakeCompiler::new());
    let handle = spawn(&compiler);

    handle.submit("flowchart TD\nnull");
    let state = wait_until(&handle, |state| state.error().is_some()).await;

    match state.error() {
        Some(RenderError::Compile(err)) => assert!(err.is_fatal()),
        other => panic!("expected a fatal compile error, got {other:?}"),
    }
    assert!(compiler.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unknown_header_is_reported_without_compiling() {
    let compiler = Arc::new(FakeCompiler::new());
    let handle = spawn(&compiler);

    handle.submit("flowchrt TD\nA-->B");
    let state = wait_until(&handle, |state| state.error().is_some()).await;

    match state.error() {
        Some(RenderError::Compile(err)) => {
            assert!(!err.is_fatal());
            assert_eq!(err.line(), Some(1));
        }
        other => panic!("expected a compile error, got {other:?}"),
    }
    assert!(compiler.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_blank_source_clears_without_compiling() {
    let compiler = Arc::new(FakeCompiler::new());
    let handle = spawn(&compiler);

    handle.submit("flowchart TD\nA");
    wait_until(&handle, |state| state.markup().is_some()).await;

    handle.submit("  \n\t");
    wait_until(&handle, DisplayState::is_empty).await;
    settle().await;

    assert_eq!(compiler.calls().len(), 1);
    assert!(handle.current().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_force_refresh_rerenders_same_source() {
    let compiler = Arc::new(FakeCompiler::new());
    let handle = spawn(&compiler);

    handle.submit("flowchart TD\nA");
    let first = wait_until(&handle, |state| state.markup().is_some()).await;

    handle.force_refresh();
    let second = wait_until(&handle, |state| {
        state.markup().is_some() && state.generation() > first.generation()
    })
    .await;

    assert!(shows_line(&second, "A"));
    assert_eq!(
        compiler.calls(),
        vec!["flowchart TD\nA".to_string(), "flowchart TD\nA".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_result_after_cancel_is_discarded() {
    let compiler =
        Arc::new(FakeCompiler::new().with_delay("flowchart TD\nSlow", Duration::from_millis(1000)));
    let handle = spawn(&compiler);

    handle.submit("flowchart TD\nSlow");
    time::sleep(Duration::from_millis(400)).await;
    handle.cancel();
    settle().await;

    assert_eq!(compiler.calls().len(), 1);
    assert!(handle.current().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_drops_pending_source() {
    let compiler = Arc::new(FakeCompiler::new());
    let handle = spawn(&compiler);

    handle.submit("flowchart TD\nA");
    time::sleep(Duration::from_millis(100)).await;
    handle.cancel();
    settle().await;

    assert!(compiler.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_configure_reapplies_options_and_refreshes() {
    let compiler = Arc::new(FakeCompiler::new());
    let handle = spawn(&compiler);

    handle.submit("flowchart TD\nA");
    wait_until(&handle, |state| state.markup().is_some()).await;

    handle
        .configure(CompilerOptions::default())
        .await
        .expect("configure should succeed");
    settle().await;

    assert_eq!(compiler.configure_count(), 1);
    assert_eq!(compiler.calls().len(), 2);
    assert_eq!(handle.current().generation(), Some(Generation::new(3)));
}
