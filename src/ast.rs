//! Abstract syntax tree for a parsed pattern

use crate::types::{CaptureGroupID, CharacterClassType};
use core::fmt;
use core::ops::Range;

/// A zero-width position assertion.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AssertionKind {
    Start, // ^
    End,   // $
}

/// The kinds of group a parenthesized subpattern can form.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GroupBehavior {
    /// ( ... )
    Capturing,
    /// (?: ... )
    NonCapturing,
    /// (?= ... )
    Lookahead,
    /// (?! ... )
    NegativeLookahead,
}

/// A backslash escape with meaning beyond a single literal character.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Escape {
    /// \d \D \s \S \w \W
    Class {
        class_type: CharacterClassType,
        positive: bool,
    },

    /// \b or \B
    WordBoundary { invert: bool },

    /// A control, hex or unicode escape, already decoded: \t \cJ \x41 A.
    Literal(char),
}

/// One member of a character class.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClassItem {
    /// A single character.
    Atom(char),

    /// An inclusive range a-z.
    Range { lo: char, hi: char },

    /// A class escape like \d inside brackets.
    Class {
        class_type: CharacterClassType,
        positive: bool,
    },
}

/// The node types of our AST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Alternatives separated by |, tried in order.
    Disjunction(Vec<Node>),

    /// A sequence of terms.
    Alternative(Vec<Node>),

    /// A literal character.
    Character(char),

    /// A special escape.
    EscapeSpecial(Escape),

    /// A bracket expression like [a-z] or [^\d].
    CharacterClass { ranges: Vec<ClassItem>, negative: bool },

    /// A quantified term like a* or (x){2,3}?
    /// `groups` is the range of capture groups enclosed by the child; these
    /// are reset before each iteration.
    Quantifier {
        min: usize,
        max: Option<usize>,
        greedy: bool,
        child: Box<Node>,
        groups: Range<CaptureGroupID>,
    },

    /// A parenthesized group.
    /// `match_idx` is the capture index for capturing groups and 0 otherwise.
    /// `last_match_idx` is the highest capture index nested inside (inclusive
    /// of this group), or `match_idx` if there is none.
    Group {
        behavior: GroupBehavior,
        match_idx: CaptureGroupID,
        last_match_idx: CaptureGroupID,
        groups: Range<CaptureGroupID>,
        body: Box<Node>,
    },

    /// ^ or $
    Assertion(AssertionKind),

    /// A backreference like \1.
    Backreference(u32),

    /// Matches any char except line terminators.
    Dot,

    /// Matches the empty string.
    Empty,
}

impl Node {

    /// \return whether a quantifier may follow this node.
    pub fn is_quantifiable(&self) -> bool {
        !matches!(
            self,
            Node::Assertion(..) | Node::EscapeSpecial(Escape::WordBoundary { .. })
        )
    }
}

/// A helper type for walking.
#[derive(Debug, Clone, Default)]
pub struct Walk {
    // The current depth of the walk.
    pub depth: usize,
}

#[derive(Debug)]
struct Walker<'a, F>
where
    F: FnMut(&Node, &Walk),
{
    func: &'a mut F,
    walk: Walk,
}

impl<F> Walker<'_, F>
where
    F: FnMut(&Node, &Walk),
{
    fn process_children(&mut self, n: &Node) {
        match n {
            Node::Character(..)
            | Node::EscapeSpecial(..)
            | Node::CharacterClass { .. }
            | Node::Assertion(..)
            | Node::Backreference(..)
            | Node::Dot
            | Node::Empty => {}
            Node::Disjunction(nodes) | Node::Alternative(nodes) => {
                for node in nodes {
                    self.process(node);
                }
            }
            Node::Quantifier { child, .. } => self.process(child),
            Node::Group { body, .. } => self.process(body),
        }
    }

    fn process(&mut self, n: &Node) {
        (self.func)(n, &self.walk);
        self.walk.depth += 1;
        self.process_children(n);
        self.walk.depth -= 1;
    }
}

/// Call a function on every Node, parents before their children.
pub fn walk<F>(n: &Node, func: &mut F)
where
    F: FnMut(&Node, &Walk),
{
    let mut walker = Walker {
        func,
        walk: Walk::default(),
    };
    walker.process(n);
}

/// Assign capture indexes to the capturing groups under \p node in
/// left-to-right pre-order of their opening parens, starting at \p next.
/// Quantifiers and groups record the range of indexes they enclose.
/// \return the next unassigned index.
pub fn number_groups(node: &mut Node, mut next: CaptureGroupID) -> CaptureGroupID {
    match node {
        Node::Disjunction(nodes) | Node::Alternative(nodes) => {
            for n in nodes.iter_mut() {
                next = number_groups(n, next);
            }
        }
        Node::Quantifier { child, groups, .. } => {
            let start = next;
            next = number_groups(child, next);
            *groups = start..next;
        }
        Node::Group {
            behavior,
            match_idx,
            last_match_idx,
            groups,
            body,
        } => {
            let start = next;
            if *behavior == GroupBehavior::Capturing {
                *match_idx = next;
                next += 1;
            }
            next = number_groups(body, next);
            *groups = start..next;
            *last_match_idx = if next > start { next - 1 } else { *match_idx };
        }
        Node::Character(..)
        | Node::EscapeSpecial(..)
        | Node::CharacterClass { .. }
        | Node::Assertion(..)
        | Node::Backreference(..)
        | Node::Dot
        | Node::Empty => {}
    }
    next
}

/// A pattern in AST form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regex {
    pub node: Node,

    /// Number of capturing groups, not counting the implicit group 0.
    pub group_count: CaptureGroupID,

    /// Number of quantifiers.
    pub loop_count: u32,
}

fn display_class_item(item: &ClassItem, f: &mut fmt::Formatter) -> fmt::Result {
    match item {
        ClassItem::Atom(c) => write!(f, "{:?}", c),
        ClassItem::Range { lo, hi } => write!(f, "{:?}-{:?}", lo, hi),
        ClassItem::Class {
            class_type,
            positive,
        } => write!(f, "{}{:?}", if *positive { "" } else { "!" }, class_type),
    }
}

fn display_node(node: &Node, depth: usize, f: &mut fmt::Formatter) -> fmt::Result {
    for _ in 0..depth {
        write!(f, "..")?;
    }
    match node {
        Node::Disjunction(nodes) => writeln!(f, "Disjunction ({})", nodes.len()),
        Node::Alternative(nodes) => writeln!(f, "Alternative ({})", nodes.len()),
        Node::Character(c) => writeln!(f, "Character {:?}", c),
        Node::EscapeSpecial(Escape::Class {
            class_type,
            positive,
        }) => writeln!(f, "Escape {:?} positive={}", class_type, positive),
        &Node::EscapeSpecial(Escape::WordBoundary { invert }) => {
            let kind = if invert { "\\B" } else { "\\b" };
            writeln!(f, "Escape {}", kind)
        }
        Node::EscapeSpecial(Escape::Literal(c)) => writeln!(f, "Escape {:?}", c),
        Node::CharacterClass { ranges, negative } => {
            write!(f, "CharacterClass{} [", if *negative { " negated" } else { "" })?;
            for (i, item) in ranges.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                display_class_item(item, f)?;
            }
            writeln!(f, "]")
        }
        Node::Quantifier {
            min,
            max,
            greedy,
            groups,
            ..
        } => {
            let max = match max {
                Some(max) => max.to_string(),
                None => "inf".to_string(),
            };
            let kind = if *greedy { "greedy" } else { "lazy" };
            writeln!(f, "Quantifier {{{},{}}} {} (groups {:?})", min, max, kind, groups)
        }
        Node::Group {
            behavior,
            match_idx,
            last_match_idx,
            ..
        } => writeln!(f, "Group {:?} {} last={}", behavior, match_idx, last_match_idx),
        Node::Assertion(kind) => writeln!(f, "Assertion {:?}", kind),
        Node::Backreference(group) => writeln!(f, "Backreference {}", group),
        Node::Dot => writeln!(f, "Dot"),
        Node::Empty => writeln!(f, "Empty"),
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = Ok(());
        walk(&self.node, &mut |node: &Node, walk: &Walk| {
            if result.is_ok() {
                result = display_node(node, walk.depth, f)
            }
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(behavior: GroupBehavior, body: Node) -> Node {
        Node::Group {
            behavior,
            match_idx: 0,
            last_match_idx: 0,
            groups: 0..0,
            body: Box::new(body),
        }
    }

    #[test]
    fn numbering_is_preorder() {
        // ((a)|(b))*(?:(c))
        let mut node = Node::Alternative(vec![
            Node::Quantifier {
                min: 0,
                max: None,
                greedy: true,
                child: Box::new(group(
                    GroupBehavior::Capturing,
                    Node::Disjunction(vec![
                        group(GroupBehavior::Capturing, Node::Character('a')),
                        group(GroupBehavior::Capturing, Node::Character('b')),
                    ]),
                )),
                groups: 0..0,
            },
            group(
                GroupBehavior::NonCapturing,
                group(GroupBehavior::Capturing, Node::Character('c')),
            ),
        ]);
        assert_eq!(number_groups(&mut node, 1), 5);
        let nodes = match &node {
            Node::Alternative(nodes) => nodes,
            _ => panic!("Expected alternative"),
        };
        match &nodes[0] {
            Node::Quantifier { groups, child, .. } => {
                assert_eq!(*groups, 1..4);
                match child.as_ref() {
                    Node::Group {
                        match_idx,
                        last_match_idx,
                        ..
                    } => {
                        assert_eq!(*match_idx, 1);
                        assert_eq!(*last_match_idx, 3);
                    }
                    _ => panic!("Expected group"),
                }
            }
            _ => panic!("Expected quantifier"),
        }
        match &nodes[1] {
            Node::Group {
                match_idx, groups, ..
            } => {
                assert_eq!(*match_idx, 0);
                assert_eq!(*groups, 4..5);
            }
            _ => panic!("Expected group"),
        }
    }

    #[test]
    fn walk_depths() {
        let node = Node::Alternative(vec![
            Node::Character('a'),
            group(GroupBehavior::Lookahead, Node::Dot),
        ]);
        let mut seen = Vec::new();
        walk(&node, &mut |n: &Node, w: &Walk| {
            seen.push((w.depth, matches!(n, Node::Dot)))
        });
        assert_eq!(seen, vec![(0, false), (1, false), (1, false), (2, true)]);
    }
}
