//! Bookkeeping for the render scheduler.
//!
//! [`RenderState`] decides what a source change means without doing any I/O:
//! whether a render must be scheduled, which generation a request gets, and
//! whether a finished render is still the freshest one. The scheduler task
//! owns the only instance.

use std::time::Instant;

use log::debug;

use inkframe_core::source::{DiagramSource, Generation, RenderRequest};

/// What caused a source change. Keystrokes are debounced longer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Keystroke,
    Programmatic,
}

/// How the scheduler must react to a submitted source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SubmitOutcome {
    /// The source is already displayed or already being rendered.
    Unchanged,

    /// The source is blank; the display must be emptied.
    Cleared,

    /// A render is pending; (re)start the debounce timer.
    Scheduled(Trigger),
}

#[derive(Debug, Default)]
pub(crate) struct RenderState {
    /// Highest generation issued or invalidated so far.
    generation: Generation,

    /// Source of the last accepted result.
    accepted: Option<DiagramSource>,

    /// The newest issued request that has not reported back.
    in_flight: Option<(Generation, DiagramSource)>,

    /// Source waiting for the debounce timer.
    pending: Option<DiagramSource>,

    /// Most recently submitted source.
    latest: Option<DiagramSource>,
}

impl RenderState {
    pub(crate) fn generation(&self) -> Generation {
        self.generation
    }

    pub(crate) fn submit(&mut self, source: DiagramSource, trigger: Trigger) -> SubmitOutcome {
        self.latest = Some(source.clone());

        if self.accepted.as_ref() == Some(&source) {
            self.pending = None;
            // A different source may still be compiling; it no longer matters.
            self.supersede_in_flight();
            return SubmitOutcome::Unchanged;
        }

        if self
            .in_flight
            .as_ref()
            .is_some_and(|(_, in_flight)| *in_flight == source)
        {
            self.pending = None;
            return SubmitOutcome::Unchanged;
        }

        if source.is_blank() {
            self.pending = None;
            self.supersede_in_flight();
            self.generation = self.generation.next();
            self.accepted = Some(source);
            return SubmitOutcome::Cleared;
        }

        self.pending = Some(source);
        SubmitOutcome::Scheduled(trigger)
    }

    /// Issues a request for the pending source when the debounce timer fires.
    pub(crate) fn fire(&mut self, now: Instant) -> Option<RenderRequest> {
        let source = self.pending.take()?;
        self.generation = self.generation.next();
        self.in_flight = Some((self.generation, source.clone()));
        Some(RenderRequest::new(self.generation, source, now))
    }

    /// Records a finished render. Returns false if the result is stale.
    pub(crate) fn accept(&mut self, generation: Generation, source: &DiagramSource) -> bool {
        if generation < self.generation {
            debug!(generation = generation.value(), latest = self.generation.value(); "Discarding stale result");
            return false;
        }

        self.in_flight = None;
        self.accepted = Some(source.clone());
        true
    }

    /// Forgets the accepted source and resubmits the latest one.
    ///
    /// Returns `None` if nothing was ever submitted.
    pub(crate) fn force_refresh(&mut self) -> Option<SubmitOutcome> {
        self.accepted = None;
        self.in_flight = None;
        self.generation = self.generation.next();

        let source = self.latest.clone()?;
        Some(self.submit(source, Trigger::Programmatic))
    }

    /// Drops the pending source and invalidates any in-flight request.
    ///
    /// The display keeps whatever it shows. Returns true if anything was
    /// cancelled.
    pub(crate) fn cancel(&mut self) -> bool {
        let had_pending = self.pending.take().is_some();
        let had_in_flight = self.supersede_in_flight();
        had_pending || had_in_flight
    }

    fn supersede_in_flight(&mut self) -> bool {
        if self.in_flight.take().is_some() {
            self.generation = self.generation.next();
            return true;
        }
        false
    }
}
