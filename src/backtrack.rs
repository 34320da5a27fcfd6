//! Backtracking execution engine over the compiled graph.
//!
//! The matcher walks the graph from an entry node with a mutable [`State`].
//! Wherever more than one continuation is possible it pushes a copy of the
//! state onto an explicit backtrack stack and proceeds with the first
//! continuation. When a path fails, the most recent saved continuation is
//! popped and resumed with its own copy, so a failed path can never leak
//! changes into the state it was forked from.

use crate::api::{Limits, MatchFlags};
use crate::ast::ClassItem;
use crate::canonicalize;
use crate::charclasses;
use crate::cursor;
use crate::error::Error;
use crate::graph::{Graph, Node, Predicate};
use crate::trace::Observer;
use crate::types::{CaptureGroupID, LoopData, LoopID, NodeID};
use core::ops::Range;
use log::warn;

/// The mutable state of one path through the graph.
/// This is cloned at every fork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    /// The cursor, as a byte offset.
    pub pos: usize,

    /// Closed captures, indexed by slot.
    pub captures: Vec<Option<Range<usize>>>,

    /// Start positions of captures whose GroupBegin has been passed.
    open: Vec<Option<usize>>,

    /// Loop bookkeeping, indexed by loop ID. None when the loop is not active.
    loops: Vec<Option<LoopData>>,

    pub flags: MatchFlags,
}

impl State {
    pub fn new(graph: &Graph, pos: usize, flags: MatchFlags) -> Self {
        Self {
            pos,
            captures: vec![None; graph.slots],
            open: vec![None; graph.slots],
            loops: vec![None; graph.loops],
            flags,
        }
    }

    /// Clear the captures in \p groups, before a loop iteration.
    fn reset_captures(&mut self, groups: &Range<CaptureGroupID>) {
        let range = (groups.start as usize)..(groups.end as usize);
        for slot in range.clone() {
            self.captures[slot] = None;
        }
        for slot in range {
            self.open[slot] = None;
        }
    }

    fn set_loop(&mut self, id: LoopID, data: Option<LoopData>) {
        self.loops[id as usize] = data;
    }
}

#[derive(Debug, Clone)]
enum BacktrackInsn {
    /// Nothing more to backtrack.
    /// This "backstops" our stack.
    Exhausted,

    /// Continue at a node with a saved state.
    Resume { node: NodeID, state: State },

    /// Try the alternative at `index` of an Alt node with a saved state.
    /// Later alternatives are pushed lazily when this one is taken.
    NextAlternative {
        alt: NodeID,
        index: usize,
        state: State,
    },
}

/// \return whether \p c is contained in the class item.
fn item_contains(item: &ClassItem, c: char) -> bool {
    match *item {
        ClassItem::Atom(a) => a == c,
        ClassItem::Range { lo, hi } => lo <= c && c <= hi,
        ClassItem::Class {
            class_type,
            positive,
        } => charclasses::class_contains(class_type, c) == positive,
    }
}

/// \return whether the input char \p c satisfies a CharSet.
/// Under icase the set matches if any member canonicalizes to the same
/// character as \p c. Single characters are compared by canonical form
/// directly; ranges and class escapes are probed with the case variants of
/// \p c (see for_each_equivalent).
pub fn class_matches(items: &[ClassItem], negated: bool, c: char, icase: bool) -> bool {
    let found = if icase {
        let canon = canonicalize::canonicalize(c);
        items.iter().any(|item| match *item {
            ClassItem::Atom(a) => canonicalize::canonicalize(a) == canon,
            _ => canonicalize::for_each_equivalent(c, |e| item_contains(item, e)),
        })
    } else {
        items.iter().any(|item| item_contains(item, c))
    };
    found != negated
}

#[derive(Debug)]
pub(crate) struct MatchAttempter<'r, 't, O: Observer> {
    graph: &'r Graph,
    text: &'t str,
    bts: Vec<BacktrackInsn>,

    /// Entries held by suspended outer stacks while running a lookahead.
    outer_depth: usize,

    /// Nodes visited so far in the current search, across all attempts.
    steps: usize,
    limits: Limits,
    observer: O,
}

impl<'r, 't, O: Observer> MatchAttempter<'r, 't, O> {
    pub(crate) fn new(graph: &'r Graph, text: &'t str, limits: Limits, observer: O) -> Self {
        Self {
            graph,
            text,
            bts: vec![BacktrackInsn::Exhausted],
            outer_depth: 0,
            steps: 0,
            limits,
            observer,
        }
    }

    pub(crate) fn into_observer(self) -> O {
        self.observer
    }

    /// Begin a new search with the full step budget.
    pub(crate) fn reset_budget(&mut self) {
        self.steps = 0;
    }

    /// Attempt a match from \p entry at \p pos.
    /// \return the final state on success, None if no path reaches the Goal.
    pub(crate) fn attempt(
        &mut self,
        entry: NodeID,
        pos: usize,
        flags: MatchFlags,
    ) -> Result<Option<State>, Error> {
        self.observer.begin_run(pos);
        self.bts.truncate(1);
        let state = State::new(self.graph, pos, flags);
        let result = self.try_at_pos(entry, state);
        self.observer.end_run(matches!(result, Ok(Some(..))));
        result
    }

    fn push_backtrack(&mut self, node: NodeID, pos: usize, bt: BacktrackInsn) -> Result<(), Error> {
        let limit = self.limits.max_backtrack_depth;
        if self.bts.len() + self.outer_depth > limit {
            warn!("Backtrack stack limit of {} exceeded", limit);
            return Err(Error::BacktrackLimitExceeded { limit });
        }
        self.observer.fork(node, pos);
        self.bts.push(bt);
        Ok(())
    }

    /// Count a step, failing if the budget is exhausted.
    #[inline(always)]
    fn count_step(&mut self) -> Result<(), Error> {
        self.steps += 1;
        if self.steps > self.limits.max_steps {
            let limit = self.limits.max_steps;
            warn!("Match step limit of {} exceeded", limit);
            return Err(Error::StepLimitExceeded { limit });
        }
        Ok(())
    }

    /// Evaluate a Func predicate against the state.
    /// A successful backreference advances the cursor.
    fn run_predicate(&self, predicate: Predicate, s: &mut State) -> bool {
        let text = self.text;
        match predicate {
            Predicate::Start => {
                s.pos == 0
                    || (s.flags.multiline
                        && cursor::peek_left(text, s.pos).is_some_and(charclasses::is_line_terminator))
            }
            Predicate::End => {
                s.pos == text.len()
                    || (s.flags.multiline
                        && cursor::peek_right(text, s.pos)
                            .is_some_and(charclasses::is_line_terminator))
            }
            Predicate::WordBoundary { invert } => {
                let left = cursor::peek_left(text, s.pos).is_some_and(charclasses::is_word_char);
                let right = cursor::peek_right(text, s.pos).is_some_and(charclasses::is_word_char);
                (left != right) != invert
            }
            Predicate::BackRef(group) => {
                // A group which has not matched (or does not exist) matches empty.
                let captured = s.captures.get(group as usize).cloned().flatten();
                match captured {
                    None => true,
                    Some(range) => {
                        let icase = s.flags.icase;
                        cursor::try_match_str(text, &mut s.pos, &text[range], icase)
                    }
                }
            }
        }
    }

    /// Run a lookahead whose body begins at \p child.
    /// The body runs on a copy of the state with its own backtrack stack, so
    /// it cannot be backtracked into once it completes.
    /// \return whether we matched and negate was false, or did not match but
    /// negate is true. On a positive match the captures made inside are kept.
    fn run_lookahead(
        &mut self,
        child: NodeID,
        s: &mut State,
        negated: bool,
        groups: &Range<CaptureGroupID>,
    ) -> Result<bool, Error> {
        // Start with an "empty" backtrack stack.
        let mut saved_bts = vec![BacktrackInsn::Exhausted];
        core::mem::swap(&mut self.bts, &mut saved_bts);
        self.outer_depth += saved_bts.len();

        let result = self.try_at_pos(child, s.clone());

        // Put back our bts.
        self.outer_depth -= saved_bts.len();
        core::mem::swap(&mut self.bts, &mut saved_bts);

        match result? {
            Some(inner) if !negated => {
                let range = (groups.start as usize)..(groups.end as usize);
                s.captures[range.clone()].clone_from_slice(&inner.captures[range]);
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(negated),
        }
    }

    /// Attempt to backtrack.
    /// \return true if we backtracked, false if we exhaust the backtrack stack.
    fn try_backtrack(&mut self, node: &mut NodeID, s: &mut State) -> Result<bool, Error> {
        // We always have a single Exhausted instruction backstopping our stack,
        // so we do not need to check for empty bts.
        debug_assert!(!self.bts.is_empty(), "Backtrack stack should not be empty");
        match self.bts.pop() {
            None | Some(BacktrackInsn::Exhausted) => {
                self.bts.push(BacktrackInsn::Exhausted);
                Ok(false)
            }
            Some(BacktrackInsn::Resume { node: n, state }) => {
                *node = n;
                *s = state;
                self.observer.backtrack(*node, s.pos);
                Ok(true)
            }
            Some(BacktrackInsn::NextAlternative { alt, index, state }) => {
                let graph = self.graph;
                let children = match graph.node(alt) {
                    Node::Alt { children } => children,
                    _ => panic!("NextAlternative must point at an Alt node"),
                };
                if index + 1 < children.len() {
                    let bt = BacktrackInsn::NextAlternative {
                        alt,
                        index: index + 1,
                        state: state.clone(),
                    };
                    self.push_backtrack(alt, state.pos, bt)?;
                }
                *node = children[index];
                *s = state;
                self.observer.backtrack(*node, s.pos);
                Ok(true)
            }
        }
    }

    /// Attempt to match from a given node and state.
    fn try_at_pos(&mut self, entry: NodeID, state: State) -> Result<Option<State>, Error> {
        debug_assert!(
            self.bts.len() == 1,
            "Should be only initial exhausted backtrack insn"
        );
        let graph = self.graph;
        let text = self.text;
        let mut node = entry;
        let mut s = state;
        // These are not really loops, they are just labels that we effectively 'goto'
        // to.
        #[allow(clippy::never_loop)]
        'nextnode: loop {
            'backtrack: loop {
                self.count_step()?;
                self.observer.step(node, s.pos);

                match graph.node(node) {
                    Node::Goal => {
                        // Keep all but the initial give-up bts.
                        self.bts.truncate(1);
                        return Ok(Some(s));
                    }

                    &Node::Empty { next } | &Node::Join { next } => {
                        node = next;
                        continue 'nextnode;
                    }

                    &Node::Char { c, next } => match cursor::next(text, &mut s.pos) {
                        Some(ic) if canonicalize::chars_match(ic, c, s.flags.icase) => {
                            node = next;
                            continue 'nextnode;
                        }
                        _ => break 'backtrack,
                    },

                    Node::CharSet {
                        items,
                        negated,
                        next,
                    } => match cursor::next(text, &mut s.pos) {
                        Some(ic) if class_matches(items, *negated, ic, s.flags.icase) => {
                            node = *next;
                            continue 'nextnode;
                        }
                        _ => break 'backtrack,
                    },

                    Node::Alt { children } => {
                        if children.is_empty() {
                            break 'backtrack;
                        }
                        if children.len() > 1 {
                            let bt = BacktrackInsn::NextAlternative {
                                alt: node,
                                index: 1,
                                state: s.clone(),
                            };
                            self.push_backtrack(node, s.pos, bt)?;
                        }
                        node = children[0];
                        continue 'nextnode;
                    }

                    &Node::GroupBegin { slot, next } => {
                        s.open[slot as usize] = Some(s.pos);
                        node = next;
                        continue 'nextnode;
                    }

                    &Node::GroupEnd { slot, next } => {
                        if let Some(start) = s.open[slot as usize].take() {
                            s.captures[slot as usize] = Some(start..s.pos);
                        }
                        node = next;
                        continue 'nextnode;
                    }

                    Node::Repeat {
                        id,
                        min,
                        max,
                        greedy,
                        child,
                        next,
                        groups,
                    } => {
                        let (id, min, child, next) = (*id, *min, *child, *next);
                        let completed = match s.loops[id as usize] {
                            Some(data) => {
                                // An optional iteration which consumed nothing
                                // fails, so the loop can never spin in place.
                                if data.iters >= min && s.pos == data.entry {
                                    break 'backtrack;
                                }
                                data.iters + 1
                            }
                            None => 0,
                        };

                        if completed < min {
                            // Mandatory iteration.
                            s.reset_captures(groups);
                            s.set_loop(id, Some(LoopData::new(completed, s.pos)));
                            node = child;
                            continue 'nextnode;
                        }

                        if *max == Some(completed) {
                            s.set_loop(id, None);
                            node = next;
                            continue 'nextnode;
                        }

                        if *greedy {
                            // Iterate again; on failure leave the loop.
                            let mut exit = s.clone();
                            exit.set_loop(id, None);
                            let bt = BacktrackInsn::Resume {
                                node: next,
                                state: exit,
                            };
                            self.push_backtrack(node, s.pos, bt)?;
                            s.reset_captures(groups);
                            s.set_loop(id, Some(LoopData::new(completed, s.pos)));
                            node = child;
                        } else {
                            // Leave the loop; on failure iterate again.
                            let mut again = s.clone();
                            again.reset_captures(groups);
                            again.set_loop(id, Some(LoopData::new(completed, s.pos)));
                            let bt = BacktrackInsn::Resume {
                                node: child,
                                state: again,
                            };
                            self.push_backtrack(node, s.pos, bt)?;
                            s.set_loop(id, None);
                            node = next;
                        }
                        continue 'nextnode;
                    }

                    Node::Lookahead {
                        child,
                        negated,
                        groups,
                        next,
                    } => {
                        if self.run_lookahead(*child, &mut s, *negated, groups)? {
                            node = *next;
                            continue 'nextnode;
                        } else {
                            break 'backtrack;
                        }
                    }

                    &Node::Func { predicate, next } => {
                        if self.run_predicate(predicate, &mut s) {
                            node = next;
                            continue 'nextnode;
                        } else {
                            break 'backtrack;
                        }
                    }
                }
            }

            // This after the backtrack loop.
            // A break 'backtrack will jump here.
            if self.try_backtrack(&mut node, &mut s)? {
                continue 'nextnode;
            } else {
                // We have exhausted the backtracking stack.
                debug_assert!(self.bts.len() == 1, "Should have exhausted backtrack stack");
                return Ok(None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::emit;
    use crate::parse::try_parse;
    use crate::trace::NoTrace;
    use crate::types::CharacterClassType;

    fn run(pattern: &str, text: &str, pos: usize) -> Option<State> {
        let graph = emit(&try_parse(pattern).unwrap());
        let mut m = MatchAttempter::new(&graph, text, Limits::default(), NoTrace);
        m.attempt(graph.anchored_start, pos, MatchFlags::default())
            .unwrap()
    }

    #[test]
    fn anchored_attempts() {
        assert_eq!(run("ab", "xab", 0), None);
        let s = run("ab", "xab", 1).unwrap();
        assert_eq!(s.pos, 3);
        assert_eq!(s.captures, vec![Some(1..3)]);
    }

    #[test]
    fn failed_fork_leaves_state() {
        // The first alternative captures group 1 before failing; the second
        // must not see it.
        let s = run("(?:(a)x|a)", "a", 0).unwrap();
        assert_eq!(s.captures, vec![Some(0..1), None]);
    }

    #[test]
    fn class_membership() {
        let digits = [ClassItem::Class {
            class_type: CharacterClassType::Digits,
            positive: true,
        }];
        assert!(class_matches(&digits, false, '7', false));
        assert!(!class_matches(&digits, true, '7', false));
        let lower = [ClassItem::Range { lo: 'a', hi: 'z' }];
        assert!(!class_matches(&lower, false, 'Q', false));
        assert!(class_matches(&lower, false, 'Q', true));
        assert!(!class_matches(&lower, true, 'Q', true));
        // Members are compared by canonical form, not only by case variants
        // of the input.
        let final_sigma = [ClassItem::Atom('\u{3c2}')];
        assert!(class_matches(&final_sigma, false, '\u{3c3}', true));
        assert!(class_matches(&final_sigma, false, '\u{3a3}', true));
        assert!(!class_matches(&final_sigma, false, '\u{3c3}', false));
        assert!(class_matches(&[], true, '\n', false));
        assert!(!class_matches(&[], false, 'a', false));
    }

    #[test]
    fn step_budget() {
        let graph = emit(&try_parse("(a*)*b").unwrap());
        let limits = Limits {
            max_steps: 1000,
            ..Limits::default()
        };
        let text = "aaaaaaaaaaaaaaaaaaaaaaaa";
        let mut m = MatchAttempter::new(&graph, text, limits, NoTrace);
        let err = m
            .attempt(graph.anchored_start, 0, MatchFlags::default())
            .unwrap_err();
        assert_eq!(err, Error::StepLimitExceeded { limit: 1000 });
    }

    #[test]
    fn backtrack_budget() {
        let graph = emit(&try_parse("a*").unwrap());
        let limits = Limits {
            max_backtrack_depth: 8,
            ..Limits::default()
        };
        let text = "aaaaaaaaaaaaaaaa";
        let mut m = MatchAttempter::new(&graph, text, limits, NoTrace);
        let err = m
            .attempt(graph.anchored_start, 0, MatchFlags::default())
            .unwrap_err();
        assert!(err.is_resource_exhausted());
    }
}
