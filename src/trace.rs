//! Recording of match traces for external visualizers.
//!
//! The matcher reports every node it visits, every fork it creates and every
//! backtrack it takes to an [`Observer`]. Observing never changes the outcome
//! of a match. [`NoTrace`] ignores everything and compiles away; the
//! [`TraceRecorder`] keeps an ordered [`Trace`] of runs.

use crate::types::NodeID;

#[cfg(feature = "serde")]
use serde::Serialize;

/// What happened at a trace entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum TraceKind {
    /// The node was visited.
    Step,

    /// A fork point: the matcher saved a continuation here to try later.
    Fork,

    /// The matcher resumed a saved continuation at this node after a failure.
    Backtrack,
}

/// One step of a trace.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TraceEntry {
    /// The compiled node.
    pub node: NodeID,

    /// Cursor position (byte offset) at this step.
    pub pos: usize,

    pub kind: TraceKind,
}

/// How a run ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum RunOutcome {
    Success,
    Failed,
}

/// All entries recorded for one match attempt from one start position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TraceRun {
    /// The position the attempt started at.
    pub start: usize,

    pub entries: Vec<TraceEntry>,

    pub outcome: RunOutcome,
}

/// A trace of one match call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Trace {
    pub runs: Vec<TraceRun>,
}

impl Trace {
    /// \return the number of node visits across all runs.
    pub fn node_visits(&self) -> usize {
        self.count(TraceKind::Step)
    }

    /// \return the number of backtracks across all runs.
    pub fn backtracks(&self) -> usize {
        self.count(TraceKind::Backtrack)
    }

    /// \return whether the last run succeeded.
    pub fn succeeded(&self) -> bool {
        self.runs
            .last()
            .is_some_and(|run| run.outcome == RunOutcome::Success)
    }

    fn count(&self, kind: TraceKind) -> usize {
        self.runs
            .iter()
            .flat_map(|run| run.entries.iter())
            .filter(|e| e.kind == kind)
            .count()
    }
}

/// Receives events from the matcher.
pub trait Observer {
    /// A match attempt begins at \p start.
    fn begin_run(&mut self, start: usize);

    /// The matcher visits \p node with the cursor at \p pos.
    fn step(&mut self, node: NodeID, pos: usize);

    /// The matcher saves a continuation at \p node.
    fn fork(&mut self, node: NodeID, pos: usize);

    /// The matcher resumes a continuation at \p node.
    fn backtrack(&mut self, node: NodeID, pos: usize);

    /// The current attempt finished.
    fn end_run(&mut self, success: bool);
}

/// An observer which records nothing.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoTrace;

impl Observer for NoTrace {
    #[inline(always)]
    fn begin_run(&mut self, _start: usize) {}

    #[inline(always)]
    fn step(&mut self, _node: NodeID, _pos: usize) {}

    #[inline(always)]
    fn fork(&mut self, _node: NodeID, _pos: usize) {}

    #[inline(always)]
    fn backtrack(&mut self, _node: NodeID, _pos: usize) {}

    #[inline(always)]
    fn end_run(&mut self, _success: bool) {}
}

/// An observer which records a Trace.
#[derive(Debug, Default)]
pub struct TraceRecorder {
    trace: Trace,
    current: Option<TraceRun>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, node: NodeID, pos: usize, kind: TraceKind) {
        if let Some(run) = &mut self.current {
            run.entries.push(TraceEntry { node, pos, kind })
        }
    }

    /// Finish recording and return the trace.
    /// A run still open is recorded as failed.
    pub fn into_trace(mut self) -> Trace {
        if self.current.is_some() {
            self.end_run(false);
        }
        self.trace
    }
}

impl Observer for TraceRecorder {
    fn begin_run(&mut self, start: usize) {
        debug_assert!(self.current.is_none(), "Run already in progress");
        self.current = Some(TraceRun {
            start,
            entries: Vec::new(),
            outcome: RunOutcome::Failed,
        });
    }

    fn step(&mut self, node: NodeID, pos: usize) {
        self.record(node, pos, TraceKind::Step)
    }

    fn fork(&mut self, node: NodeID, pos: usize) {
        self.record(node, pos, TraceKind::Fork)
    }

    fn backtrack(&mut self, node: NodeID, pos: usize) {
        self.record(node, pos, TraceKind::Backtrack)
    }

    fn end_run(&mut self, success: bool) {
        if let Some(mut run) = self.current.take() {
            run.outcome = if success {
                RunOutcome::Success
            } else {
                RunOutcome::Failed
            };
            self.trace.runs.push(run);
        }
    }
}
