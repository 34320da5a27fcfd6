/// A group index is u16.
/// CaptureGroupID 0 is the whole match; explicit groups start at 1.
pub type CaptureGroupID = u16;

/// The maximum number of explicit capture groups supported.
/// Group numbering runs one past the last group, and that end index must
/// still be a CaptureGroupID.
pub const MAX_CAPTURE_GROUPS: usize = CaptureGroupID::MAX as usize - 1;

/// The maximum number of loops supported.
pub const MAX_LOOPS: usize = 65535;
pub type LoopID = u16;

/// Index of a node in a compiled graph.
pub type NodeID = u32;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CharacterClassType {
    Digits,
    Spaces,
    Words,
}

/// Per-loop bookkeeping carried in the match state while a loop is active.
/// An inactive loop has no LoopData at all.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LoopData {
    /// Number of iterations completed before the one in progress.
    pub iters: usize,

    /// Cursor position at which the iteration in progress began.
    pub entry: usize,
}

impl LoopData {
    pub fn new(iters: usize, entry: usize) -> LoopData {
        LoopData { iters, entry }
    }
}
