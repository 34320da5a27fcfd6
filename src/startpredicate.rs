//! Support for quickly finding potential match locations.
use crate::ast::{AssertionKind, Escape, GroupBehavior, Node};
use memchr::memmem;

/// The peeled prefix start predicate.
/// This is a fast way of locating the first potential match.
#[derive(Debug, Clone)]
pub enum StartPredicate {
    /// May match an arbitrary sequence.
    Arbitrary,

    /// Look for the first instance of a byte.
    ByteSeq1(u8),

    /// Look for a byte sequence.
    ByteSeq(Box<memmem::Finder<'static>>),

    /// The regex is anchored to the start of the string.
    /// This avoids string searching entirely and only tries matching at the
    /// beginning.
    StartAnchored,
}

impl StartPredicate {
    /// \return the first position at or after \p pos where a match may begin,
    /// or None if no match is possible.
    /// Predicates based on literal text are only valid when \p icase is off,
    /// and StartAnchored only when \p multiline is off; otherwise every
    /// position is a candidate.
    pub fn find(&self, text: &str, pos: usize, icase: bool, multiline: bool) -> Option<usize> {
        debug_assert!(pos <= text.len());
        match self {
            StartPredicate::Arbitrary => Some(pos),
            StartPredicate::ByteSeq1(_) | StartPredicate::ByteSeq(_) if icase => Some(pos),
            StartPredicate::ByteSeq1(b) => {
                memchr::memchr(*b, &text.as_bytes()[pos..]).map(|idx| pos + idx)
            }
            StartPredicate::ByteSeq(finder) => {
                finder.find(&text.as_bytes()[pos..]).map(|idx| pos + idx)
            }
            StartPredicate::StartAnchored if multiline => Some(pos),
            StartPredicate::StartAnchored => {
                if pos == 0 {
                    Some(0)
                } else {
                    None
                }
            }
        }
    }
}

/// Check if a node is anchored to the start of the string.
/// Returns true if the node begins with a Start assertion.
fn is_start_anchored(n: &Node) -> bool {
    match n {
        Node::Assertion(AssertionKind::Start) => true,
        Node::Alternative(nodes) => nodes.first().is_some_and(is_start_anchored),
        Node::Group {
            behavior: GroupBehavior::Capturing | GroupBehavior::NonCapturing,
            body,
            ..
        } => is_start_anchored(body),
        // Other nodes are not anchored
        _ => false,
    }
}

/// Append the literal characters that every match of \p n must begin with to
/// \p out.
/// \return true if all of \p n was literal (or zero-width), so that the
/// following node may extend the prefix.
fn literal_prefix(n: &Node, out: &mut String) -> bool {
    match n {
        Node::Character(c) | Node::EscapeSpecial(Escape::Literal(c)) => {
            out.push(*c);
            true
        }

        // Zero-width nodes contribute nothing and do not end the prefix.
        Node::Empty
        | Node::Assertion(..)
        | Node::EscapeSpecial(Escape::WordBoundary { .. })
        | Node::Group {
            behavior: GroupBehavior::Lookahead | GroupBehavior::NegativeLookahead,
            ..
        } => true,

        Node::Alternative(nodes) => nodes.iter().all(|n| literal_prefix(n, out)),

        Node::Group { body, .. } => literal_prefix(body, out),

        // A mandatory iteration begins with the child's prefix, but what follows
        // may be another iteration.
        Node::Quantifier { min, child, .. } => {
            if *min > 0 {
                literal_prefix(child, out);
            }
            false
        }

        // TODO: a shared prefix of all alternatives would also work.
        Node::Disjunction(..) => false,

        Node::EscapeSpecial(Escape::Class { .. })
        | Node::CharacterClass { .. }
        | Node::Backreference(..)
        | Node::Dot => false,
    }
}

/// \return the start predicate for a parsed pattern.
pub fn predicate_for_node(node: &Node) -> StartPredicate {
    // Anchored patterns only try the beginning, unless multiline is enabled at
    // match time, which StartPredicate::find accounts for.
    if is_start_anchored(node) {
        return StartPredicate::StartAnchored;
    }

    let mut prefix = String::new();
    literal_prefix(node, &mut prefix);
    match prefix.len() {
        0 => StartPredicate::Arbitrary,
        1 => StartPredicate::ByteSeq1(prefix.as_bytes()[0]),
        _ => StartPredicate::ByteSeq(Box::new(memmem::Finder::new(prefix.as_bytes()).into_owned())),
    }
}
