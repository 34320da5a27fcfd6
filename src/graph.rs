//! The compiled node graph of a regex

use crate::ast::ClassItem;
use crate::startpredicate::StartPredicate;
use crate::types::{CaptureGroupID, LoopID, NodeID};
use core::fmt;
use core::ops::Range;

/// A test evaluated against the live match state by a Func node.
/// Predicates name what they test (an assertion kind or a group index); they
/// never hold capture values.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// ^: the start of input, or (if multiline) just after a line terminator.
    Start,

    /// $: the end of input, or (if multiline) just before a line terminator.
    End,

    /// \b or \B
    WordBoundary { invert: bool },

    /// \N: the text captured by group N. An unset group matches empty.
    BackRef(u32),
}

/// The node types of the compiled graph.
/// Every node except Goal and Alt has exactly one successor `next`.
#[derive(Debug, Clone)]
pub enum Node {
    /// Reaching this node ends the current (sub)match successfully.
    /// Used at the end of the body and at the end of lookahead bodies.
    Goal,

    /// Pass-through.
    Empty { next: NodeID },

    /// Pass-through; the shared exit of an Alt.
    Join { next: NodeID },

    /// Match a single char.
    Char { c: char, next: NodeID },

    /// Match one char against a set of class items, optionally negated.
    CharSet {
        items: Vec<ClassItem>,
        negated: bool,
        next: NodeID,
    },

    /// Try each child in order.
    Alt { children: Vec<NodeID> },

    /// Record the current position as the start of a capture.
    GroupBegin { slot: CaptureGroupID, next: NodeID },

    /// Close the capture begun by the matching GroupBegin.
    GroupEnd { slot: CaptureGroupID, next: NodeID },

    /// A quantifier. The subgraph at `child` loops back to this node; this is
    /// the only cycle in the graph.
    /// `groups` are the capture slots reset before each iteration.
    Repeat {
        id: LoopID,
        min: usize,
        max: Option<usize>,
        greedy: bool,
        child: NodeID,
        next: NodeID,
        groups: Range<CaptureGroupID>,
    },

    /// A zero-width lookahead. The subgraph at `child` ends in a Goal.
    Lookahead {
        child: NodeID,
        negated: bool,
        groups: Range<CaptureGroupID>,
        next: NodeID,
    },

    /// Evaluate a predicate against the match state.
    Func { predicate: Predicate, next: NodeID },
}

impl Node {
    /// \return the successor nodes of this node, in the order they are tried.
    pub fn successors(&self) -> Vec<NodeID> {
        match self {
            Node::Goal => Vec::new(),
            Node::Alt { children } => children.clone(),
            &Node::Repeat { child, next, .. } | &Node::Lookahead { child, next, .. } => {
                vec![child, next]
            }
            &Node::Empty { next }
            | &Node::Join { next }
            | &Node::Char { next, .. }
            | &Node::CharSet { next, .. }
            | &Node::GroupBegin { next, .. }
            | &Node::GroupEnd { next, .. }
            | &Node::Func { next, .. } => vec![next],
        }
    }

    /// \return a short name for this node's kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Goal => "Goal",
            Node::Empty { .. } => "Empty",
            Node::Join { .. } => "Join",
            Node::Char { .. } => "Char",
            Node::CharSet { .. } => "CharSet",
            Node::Alt { .. } => "Alt",
            Node::GroupBegin { .. } => "GroupBegin",
            Node::GroupEnd { .. } => "GroupEnd",
            Node::Repeat { .. } => "Repeat",
            Node::Lookahead { .. } => "Lookahead",
            Node::Func { .. } => "Func",
        }
    }
}

/// A compiled regex: an arena of nodes addressed by NodeID.
#[derive(Debug, Clone)]
pub struct Graph {
    /// The nodes.
    pub nodes: Vec<Node>,

    /// Entry for an unanchored search: a lazy any-char Repeat leading into
    /// `anchored_start`. A single walk from here finds the leftmost match.
    pub start: NodeID,

    /// Entry for a match attempt at one fixed position: GroupBegin(0).
    pub anchored_start: NodeID,

    /// Number of capture slots, including slot 0 for the whole match.
    pub slots: usize,

    /// Number of Repeat nodes.
    pub loops: usize,

    /// Predicate to rapidly find the first potential match.
    pub start_pred: StartPredicate,
}

impl Graph {
    /// \return the node with the given ID.
    #[inline(always)]
    pub fn node(&self, id: NodeID) -> &Node {
        &self.nodes[id as usize]
    }

    /// \return the number of capturing groups, not counting group 0.
    pub fn group_count(&self) -> usize {
        self.slots - 1
    }
}

fn display_items(items: &[ClassItem], f: &mut fmt::Formatter) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        match item {
            ClassItem::Atom(c) => write!(f, "{:?}", c)?,
            ClassItem::Range { lo, hi } => write!(f, "{:?}-{:?}", lo, hi)?,
            ClassItem::Class {
                class_type,
                positive,
            } => write!(f, "{}{:?}", if *positive { "" } else { "!" }, class_type)?,
        }
    }
    Ok(())
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "start {} anchored {} slots {} loops {}",
            self.start, self.anchored_start, self.slots, self.loops
        )?;
        for (idx, node) in self.nodes.iter().enumerate() {
            write!(f, "{:4}: {}", idx, node.kind_name())?;
            match node {
                Node::Goal => {}
                Node::Empty { .. } | Node::Join { .. } => {}
                Node::Char { c, .. } => write!(f, " {:?}", c)?,
                Node::CharSet { items, negated, .. } => {
                    write!(f, " {}[", if *negated { "^" } else { "" })?;
                    display_items(items, f)?;
                    write!(f, "]")?;
                }
                Node::Alt { .. } => {}
                Node::GroupBegin { slot, .. } | Node::GroupEnd { slot, .. } => {
                    write!(f, " {}", slot)?
                }
                Node::Repeat {
                    id,
                    min,
                    max,
                    greedy,
                    groups,
                    ..
                } => {
                    let max = max.map_or_else(|| "inf".to_string(), |m| m.to_string());
                    let kind = if *greedy { "greedy" } else { "lazy" };
                    write!(f, " #{} {{{},{}}} {} groups {:?}", id, min, max, kind, groups)?
                }
                Node::Lookahead {
                    negated, groups, ..
                } => {
                    let sense = if *negated { "negative" } else { "positive" };
                    write!(f, " {} groups {:?}", sense, groups)?
                }
                Node::Func { predicate, .. } => write!(f, " {:?}", predicate)?,
            }
            let succs = node.successors();
            if !succs.is_empty() {
                write!(f, " ->")?;
                for s in succs {
                    write!(f, " {}", s)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
