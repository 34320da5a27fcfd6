//! Execution engine bits: the search driver and match iteration.

use crate::api::{Limits, Match, MatchFlags};
use crate::backtrack::{MatchAttempter, State};
use crate::cursor;
use crate::error::Error;
use crate::graph::Graph;
use crate::trace::{NoTrace, Trace, TraceRecorder};
use log::trace;

/// A trait for finding the next match in a regex.
pub trait MatchProducer: std::fmt::Debug {
    /// Attempt to match at the given location or after it.
    /// \return either the Match and the position to start looking for the next
    /// match, or None if there is no further match.
    fn next_match(
        &mut self,
        pos: usize,
        next_start: &mut Option<usize>,
    ) -> Result<Option<Match>, Error>;
}

/// Searches by attempting an anchored match at each start position in turn,
/// skipping positions the start predicate rules out.
#[derive(Debug)]
pub struct BacktrackExecutor<'r, 't> {
    graph: &'r Graph,
    text: &'t str,
    flags: MatchFlags,
    matcher: MatchAttempter<'r, 't, NoTrace>,
}

impl<'r, 't> BacktrackExecutor<'r, 't> {
    pub fn new(graph: &'r Graph, text: &'t str, flags: MatchFlags, limits: Limits) -> Self {
        Self {
            graph,
            text,
            flags,
            matcher: MatchAttempter::new(graph, text, limits, NoTrace),
        }
    }

    fn successful_match(&self, start: usize, state: State) -> Match {
        let mut captures = state.captures;
        let range = captures
            .first_mut()
            .and_then(Option::take)
            .unwrap_or(start..state.pos);
        captures.remove(0);
        Match { range, captures }
    }
}

impl MatchProducer for BacktrackExecutor<'_, '_> {
    fn next_match(
        &mut self,
        mut pos: usize,
        next_start: &mut Option<usize>,
    ) -> Result<Option<Match>, Error> {
        let text = self.text;
        let flags = self.flags;
        // Each match found by an iterator is its own search.
        self.matcher.reset_budget();
        loop {
            // Find the next start location, or None if none.
            pos = match self
                .graph
                .start_pred
                .find(text, pos, flags.icase, flags.multiline)
            {
                Some(pos) => pos,
                None => return Ok(None),
            };
            trace!("Attempting match at {}", pos);
            if let Some(state) = self.matcher.attempt(self.graph.anchored_start, pos, flags)? {
                let end = state.pos;
                // If we matched the empty string, we have to increment.
                *next_start = if end != pos {
                    Some(end)
                } else {
                    next_position(text, end)
                };
                return Ok(Some(self.successful_match(pos, state)));
            }
            // Didn't find it at this position, try the next one.
            pos = match next_position(text, pos) {
                Some(pos) => pos,
                None => return Ok(None),
            };
        }
    }
}

/// \return the position one character after \p pos, or None at the end.
fn next_position(text: &str, mut pos: usize) -> Option<usize> {
    cursor::next(text, &mut pos).map(|_| pos)
}

/// Walk the graph once from its unanchored entry at \p start, recording a
/// trace. The lazy prefix loop makes this find the same leftmost match as the
/// driver does.
pub fn run_traced(
    graph: &Graph,
    text: &str,
    start: usize,
    flags: MatchFlags,
    limits: Limits,
) -> Result<(Option<State>, Trace), Error> {
    let mut matcher = MatchAttempter::new(graph, text, limits, TraceRecorder::new());
    let result = matcher.attempt(graph.start, start, flags)?;
    Ok((result, matcher.into_observer().into_trace()))
}

/// Run a single match attempt anchored at \p start.
pub fn run_anchored(
    graph: &Graph,
    text: &str,
    start: usize,
    flags: MatchFlags,
    limits: Limits,
) -> Result<Option<State>, Error> {
    let mut matcher = MatchAttempter::new(graph, text, limits, NoTrace);
    matcher.attempt(graph.anchored_start, start, flags)
}

/// A struct which enables iteration over matches.
#[derive(Debug)]
pub struct Matches<Producer: MatchProducer> {
    mp: Producer,
    offset: Option<usize>,
}

impl<Producer: MatchProducer> Matches<Producer> {
    pub fn new(mp: Producer, start: Option<usize>) -> Self {
        Matches { mp, offset: start }
    }
}

impl<Producer: MatchProducer> Iterator for Matches<Producer> {
    type Item = Result<Match, Error>;
    fn next(&mut self) -> Option<Self::Item> {
        let start = self.offset.take()?;
        self.mp.next_match(start, &mut self.offset).transpose()
    }
}
