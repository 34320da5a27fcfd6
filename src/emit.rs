//! Regex compiler back-end: transforms an AST into a node Graph

use crate::ast::{self, AssertionKind, ClassItem, Escape, GroupBehavior};
use crate::graph::{Graph, Node, Predicate};
use crate::startpredicate;
use crate::types::{LoopID, NodeID};
use log::debug;

/// The line terminators, which `.` does not match.
const LINE_TERMINATOR_ITEMS: [ClassItem; 3] = [
    ClassItem::Atom('\n'),
    ClassItem::Atom('\r'),
    ClassItem::Range {
        lo: '\u{2028}',
        hi: '\u{2029}',
    },
];

/// A placeholder node ID, used for edges that are fixed up later.
const UNRESOLVED: NodeID = NodeID::MAX;

/// Type which wraps up the context needed to emit a Graph.
struct Emitter {
    nodes: Vec<Node>,

    // Number of loops seen so far.
    next_loop_id: u32,
}

impl Emitter {
    /// Emit a node.
    /// Return the node as an index.
    fn emit(&mut self, node: Node) -> NodeID {
        let id = self.nodes.len() as NodeID;
        self.nodes.push(node);
        id
    }

    /// Get a node at a given index.
    fn get_node(&mut self, id: NodeID) -> &mut Node {
        &mut self.nodes[id as usize]
    }

    fn take_loop_id(&mut self) -> LoopID {
        let id = self.next_loop_id;
        self.next_loop_id += 1;
        id as LoopID
    }

    /// Emit a Repeat node, then its child subgraph which loops back into it.
    /// \return the Repeat node.
    fn emit_repeat<F>(&mut self, fields: Node, emit_child: F) -> NodeID
    where
        F: FnOnce(&mut Self, NodeID) -> NodeID,
    {
        let repeat = self.emit(fields);
        let entry = emit_child(self, repeat);
        // Fix up our loop body.
        match self.get_node(repeat) {
            Node::Repeat { child, .. } => *child = entry,
            _ => panic!("Should be a Repeat node"),
        }
        repeat
    }

    /// Emit nodes corresponding to a given AST node, continuing to \p next.
    /// \return the entry point of the emitted subgraph.
    /// TODO: make this non-recursive to avoid stack overflow on deeply nested patterns.
    fn emit_node(&mut self, node: &ast::Node, next: NodeID) -> NodeID {
        match node {
            ast::Node::Empty => self.emit(Node::Empty { next }),
            &ast::Node::Character(c) | &ast::Node::EscapeSpecial(Escape::Literal(c)) => {
                self.emit(Node::Char { c, next })
            }
            &ast::Node::EscapeSpecial(Escape::Class {
                class_type,
                positive,
            }) => self.emit(Node::CharSet {
                items: vec![ClassItem::Class {
                    class_type,
                    positive,
                }],
                negated: false,
                next,
            }),
            &ast::Node::EscapeSpecial(Escape::WordBoundary { invert }) => self.emit(Node::Func {
                predicate: Predicate::WordBoundary { invert },
                next,
            }),
            ast::Node::CharacterClass { ranges, negative } => self.emit(Node::CharSet {
                items: ranges.clone(),
                negated: *negative,
                next,
            }),
            ast::Node::Dot => self.emit(Node::CharSet {
                items: LINE_TERMINATOR_ITEMS.to_vec(),
                negated: true,
                next,
            }),
            ast::Node::Assertion(kind) => {
                let predicate = match kind {
                    AssertionKind::Start => Predicate::Start,
                    AssertionKind::End => Predicate::End,
                };
                self.emit(Node::Func { predicate, next })
            }
            &ast::Node::Backreference(group) => self.emit(Node::Func {
                predicate: Predicate::BackRef(group),
                next,
            }),
            ast::Node::Alternative(terms) => {
                // Terms are wired back to front so each knows its successor.
                terms
                    .iter()
                    .rev()
                    .fold(next, |succ, term| self.emit_node(term, succ))
            }
            ast::Node::Disjunction(alternatives) => {
                // Every alternative flows into one shared Join.
                let join = self.emit(Node::Join { next });
                let children = alternatives
                    .iter()
                    .map(|alt| self.emit_node(alt, join))
                    .collect();
                self.emit(Node::Alt { children })
            }
            ast::Node::Group {
                behavior,
                match_idx,
                groups,
                body,
                ..
            } => match behavior {
                GroupBehavior::Capturing => {
                    let end = self.emit(Node::GroupEnd {
                        slot: *match_idx,
                        next,
                    });
                    let body = self.emit_node(body, end);
                    self.emit(Node::GroupBegin {
                        slot: *match_idx,
                        next: body,
                    })
                }
                GroupBehavior::NonCapturing => self.emit_node(body, next),
                GroupBehavior::Lookahead | GroupBehavior::NegativeLookahead => {
                    let goal = self.emit(Node::Goal);
                    let child = self.emit_node(body, goal);
                    self.emit(Node::Lookahead {
                        child,
                        negated: *behavior == GroupBehavior::NegativeLookahead,
                        groups: groups.clone(),
                        next,
                    })
                }
            },
            ast::Node::Quantifier {
                min,
                max,
                greedy,
                child,
                groups,
            } => {
                let id = self.take_loop_id();
                let fields = Node::Repeat {
                    id,
                    min: *min,
                    max: *max,
                    greedy: *greedy,
                    child: UNRESOLVED,
                    next,
                    groups: groups.clone(),
                };
                self.emit_repeat(fields, |em, repeat| em.emit_node(child, repeat))
            }
        }
    }
}

/// Compile the given AST to a Graph.
pub fn emit(re: &ast::Regex) -> Graph {
    let mut em = Emitter {
        nodes: Vec::new(),
        next_loop_id: 0,
    };

    // The body is wrapped in capture group 0 and ends in the Goal.
    let goal = em.emit(Node::Goal);
    let end = em.emit(Node::GroupEnd { slot: 0, next: goal });
    let body = em.emit_node(&re.node, end);
    let anchored_start = em.emit(Node::GroupBegin { slot: 0, next: body });

    // Unanchored search is a lazy [^]* in front of the body.
    let id = em.take_loop_id();
    let fields = Node::Repeat {
        id,
        min: 0,
        max: None,
        greedy: false,
        child: UNRESOLVED,
        next: anchored_start,
        groups: 0..0,
    };
    let start = em.emit_repeat(fields, |em, repeat| {
        em.emit(Node::CharSet {
            items: Vec::new(),
            negated: true,
            next: repeat,
        })
    });

    let graph = Graph {
        nodes: em.nodes,
        start,
        anchored_start,
        slots: re.group_count as usize + 1,
        loops: em.next_loop_id as usize,
        start_pred: startpredicate::predicate_for_node(&re.node),
    };
    debug!(
        "Compiled {} nodes, {} groups, {} loops, start predicate {:?}",
        graph.nodes.len(),
        graph.group_count(),
        graph.loops,
        graph.start_pred
    );
    graph
}
