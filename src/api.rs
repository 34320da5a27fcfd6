use crate::ast;
use crate::cursor;
use crate::emit;
use crate::exec;
use crate::graph::Graph;
use crate::parse;
use crate::trace::Trace;
use core::{fmt, str::FromStr};

pub use crate::error::Error;

/// Flags used to control regex matching.
/// The default flags are case-sensitive, not-multiline and not global.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    /// If set, make the regex case-insensitive.
    /// Equivalent to the 'i' flag in JavaScript.
    pub icase: bool,

    /// If set, ^ and $ match at line separators, not just the input boundaries.
    /// Equivalent to the 'm' flag in JavaScript.
    pub multiline: bool,

    /// If set, [`Regex::exec`] resumes from and updates a last index.
    /// Equivalent to the 'g' flag in JavaScript.
    pub global: bool,
}

impl Flags {
    /// \return the flags which affect the matcher itself.
    #[inline]
    pub fn match_flags(&self) -> MatchFlags {
        MatchFlags {
            multiline: self.multiline,
            icase: self.icase,
        }
    }
}

impl TryFrom<&str> for Flags {
    type Error = Error;

    /// Construct a Flags from a string, using JavaScript flag letters.
    /// 'g' means global, 'i' means to ignore case, 'm' means multiline.
    /// Any other letter, or a repeated letter, is an error.
    fn try_from(s: &str) -> Result<Self, Error> {
        let mut result = Self::default();
        let error = |text: String| {
            Err(Error::Flags {
                flags: s.to_string(),
                text,
            })
        };
        for c in s.chars() {
            let flag = match c {
                'g' => &mut result.global,
                'i' => &mut result.icase,
                'm' => &mut result.multiline,
                _ => return error(format!("Unknown flag '{}'", c)),
            };
            if *flag {
                return error(format!("Duplicate flag '{}'", c));
            }
            *flag = true;
        }
        Ok(result)
    }
}

impl FromStr for Flags {
    type Err = Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Error> {
        Self::try_from(s)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.global {
            f.write_str("g")?;
        }
        if self.icase {
            f.write_str("i")?;
        }
        if self.multiline {
            f.write_str("m")?;
        }
        Ok(())
    }
}

/// The flags consulted while matching.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct MatchFlags {
    /// ^ and $ also match at line terminators.
    pub multiline: bool,

    /// Characters are compared after canonicalization.
    pub icase: bool,
}

/// Bounds on the work a single search may do.
/// A search is one call to `find`, `test`, `exec` or `exec_debug`, or one step
/// of a `find_iter` iterator.
/// Exceeding either produces an error rather than a result.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of graph nodes visited.
    pub max_steps: usize,

    /// Maximum number of pending backtrack entries.
    pub max_backtrack_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_steps: 100_000_000,
            max_backtrack_depth: 1 << 20,
        }
    }
}

/// Range is used to express the extent of a match, as byte offsets into the
/// input string.
pub type Range = core::ops::Range<usize>;

/// An iterator type which yields `Match`es found in a string.
pub type Matches<'r, 't> = exec::Matches<backends::BacktrackExecutor<'r, 't>>;

/// A Match represents a portion of a string which was found to match a Regex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The total range of the match. Note this may be empty, if the regex
    /// matched an empty string.
    pub range: Range,

    /// The list of captures. This has length equal to the number of capturing
    /// groups in the regex. For each capture, if the value is None, that group
    /// did not match (for example, it was in a not-taken branch of an
    /// alternation). If the value is Some, the group did match with the
    /// enclosed range.
    pub captures: Vec<Option<Range>>,
}

impl Match {
    /// Access a group by index, using the convention of Python's group()
    /// function. Index 0 is the total match, index 1 is the first capture
    /// group.
    #[inline]
    pub fn group(&self, idx: usize) -> Option<Range> {
        if idx == 0 {
            Some(self.range.clone())
        } else {
            self.captures.get(idx - 1).cloned().flatten()
        }
    }

    /// Returns the range over the starting and ending byte offsets of the match in the haystack.
    ///
    /// This is a convenience function to work around
    /// the fact that Range does not support Copy.
    #[inline]
    pub fn range(&self) -> Range {
        self.range.clone()
    }

    /// Returns the starting byte offset of the match in the haystack.
    #[inline]
    pub fn start(&self) -> usize {
        self.range.start
    }

    /// Returns the ending byte offset of the match in the haystack.
    #[inline]
    pub fn end(&self) -> usize {
        self.range.end
    }

    /// Return an iterator over a Match. The first returned value is the total
    /// match, and subsequent values represent the capture groups.
    #[inline]
    pub fn groups(&self) -> Groups {
        Groups::new(self)
    }
}

/// An iterator over the capture groups of a [`Match`]
///
/// This struct is created by the [`groups`] method on [`Match`].
///
/// [`Match`]: ../struct.Match.html
/// [`groups`]: ../struct.Match.html#method.groups
#[derive(Clone)]
pub struct Groups<'m> {
    mat: &'m Match,
    i: usize,
    max: usize,
}

impl<'m> Groups<'m> {
    #[inline]
    fn new(mat: &'m Match) -> Self {
        Self {
            mat,
            i: 0,
            max: mat.captures.len() + 1,
        }
    }
}

impl Iterator for Groups<'_> {
    type Item = Option<Range>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let i = self.i;
        if i < self.max {
            self.i += 1;
            Some(self.mat.group(i))
        } else {
            None
        }
    }
}

/// The result of a single traced match call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome<'t> {
    /// Whether the pattern matched.
    pub matched: bool,

    /// The byte offset at which the match ended, or 0 if there was no match.
    pub end_index: usize,

    /// The captured text for every group, including group 0 for the whole
    /// match. This always has one entry per group, whether or not the match
    /// succeeded.
    pub captures: Vec<Option<&'t str>>,

    /// The trace of the match, if one was recorded.
    pub trace: Option<Trace>,
}

impl<'t> MatchOutcome<'t> {
    fn new(
        text: &'t str,
        slots: usize,
        state: Option<crate::backtrack::State>,
        trace: Option<Trace>,
    ) -> Self {
        match state {
            Some(state) => MatchOutcome {
                matched: true,
                end_index: state.pos,
                captures: state
                    .captures
                    .into_iter()
                    .map(|cap| cap.map(|r| &text[r]))
                    .collect(),
                trace,
            },
            None => MatchOutcome {
                matched: false,
                end_index: 0,
                captures: vec![None; slots],
                trace,
            },
        }
    }
}

/// A Regex is the compiled version of a pattern.
#[derive(Debug, Clone)]
pub struct Regex {
    graph: Graph,
    flags: Flags,
    limits: Limits,
}

impl Regex {
    /// Construct a regex by parsing `pattern` using the default flags.
    /// An Error may be returned if the syntax is invalid.
    /// Note that this is rather expensive; prefer to cache a Regex which is
    /// intended to be used more than once.
    #[inline]
    pub fn new(pattern: &str) -> Result<Regex, Error> {
        Self::with_flags(pattern, Flags::default())
    }

    /// Construct a regex by parsing `pattern` with `flags`, which may be a
    /// [`Flags`] or a JavaScript flag string like "gi".
    /// An Error may be returned if the syntax or the flags are invalid.
    ///
    /// ```rust
    /// use retrace::Regex;
    /// let re = Regex::with_flags(r"^b", "m").unwrap();
    /// assert_eq!(re.find("a\nb").unwrap().unwrap().range(), 2..3);
    /// assert!(Regex::with_flags("a", "x").is_err());
    /// ```
    pub fn with_flags<F>(pattern: &str, flags: F) -> Result<Regex, Error>
    where
        F: TryInto<Flags>,
        Error: From<F::Error>,
    {
        let flags = flags.try_into()?;
        let ast = parse::try_parse(pattern)?;
        let graph = emit::emit(&ast);
        Ok(Regex {
            graph,
            flags,
            limits: Limits::default(),
        })
    }

    /// Replace the limits applied to each search.
    #[inline]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// \return the flags this regex was constructed with.
    #[inline]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// \return the limits applied to each search.
    #[inline]
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// \return the number of capturing groups, not counting the whole match.
    #[inline]
    pub fn capture_count(&self) -> usize {
        self.graph.group_count()
    }

    /// \return the compiled graph.
    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Searches `text` to find the first match.
    #[inline]
    pub fn find(&self, text: &str) -> Result<Option<Match>, Error> {
        self.find_iter(text).next().transpose()
    }

    /// Searches `text`, returning an iterator over non-overlapping matches.
    /// Note that the resulting Iterator borrows both the regex `'r` and the
    /// input string as `'t`.
    #[inline]
    pub fn find_iter<'r, 't>(&'r self, text: &'t str) -> Matches<'r, 't> {
        self.find_from(text, 0)
    }

    /// Returns an iterator for matches found in 'text' starting at byte index
    /// `start`. A `start` inside a character is rounded up to the next
    /// character; a `start` beyond the end finds nothing. Note this may be
    /// different from passing a sliced `text`, since assertions like `^` and
    /// `\b` see the characters before `start`.
    ///
    ///  ```rust
    ///   use retrace::Regex;
    ///   let text = "xyxy";
    ///   let re = Regex::new(r"\by").unwrap();
    ///   assert_eq!(re.find(&text[1..]).unwrap().unwrap().range(), 0..1);
    ///   assert!(re.find_from(text, 1).next().is_none());
    ///   ```
    #[inline]
    pub fn find_from<'r, 't>(&'r self, text: &'t str, start: usize) -> Matches<'r, 't> {
        backends::find(self, text, start)
    }

    /// \return whether the regex matches anywhere in `text`.
    #[inline]
    pub fn test(&self, text: &str) -> Result<bool, Error> {
        Ok(self.find(text)?.is_some())
    }

    /// Search with JavaScript `RegExp.prototype.exec` index semantics.
    /// With the global flag, the search starts at `*last_index` and
    /// `*last_index` is set to the end of the match, or to 0 if there is none.
    /// Without it, the search starts at 0 and `*last_index` is untouched.
    pub fn exec(&self, text: &str, last_index: &mut usize) -> Result<Option<Match>, Error> {
        if !self.flags.global {
            return self.find(text);
        }
        let found = if *last_index > text.len() {
            None
        } else {
            self.find_from(text, *last_index).next().transpose()?
        };
        *last_index = found.as_ref().map_or(0, Match::end);
        Ok(found)
    }

    /// Search `text` from `from_index` with the given matching flags, always
    /// recording a trace of the search.
    /// The graph is walked once from its unanchored entry, so the trace holds
    /// a single run.
    pub fn exec_debug<'t>(
        &self,
        text: &'t str,
        from_index: usize,
        multiline: bool,
        icase: bool,
    ) -> Result<MatchOutcome<'t>, Error> {
        let slots = self.graph.slots;
        let start = match cursor::round_up_to_boundary(text, from_index) {
            Some(start) => start,
            None => return Ok(MatchOutcome::new(text, slots, None, Some(Trace::default()))),
        };
        let flags = MatchFlags { multiline, icase };
        let (state, trace) = exec::run_traced(&self.graph, text, start, flags, self.limits)?;
        Ok(MatchOutcome::new(text, slots, state, Some(trace)))
    }
}

impl FromStr for Regex {
    type Err = Error;

    /// Attempts to parse a string into a regular expression
    #[inline]
    fn from_str(s: &str) -> Result<Self, Error> {
        Self::new(s)
    }
}

// Access to the individual stages: parsing, compiling and matching.
#[doc(hidden)]
pub mod backends {
    use super::*;

    /// The executor used for searches.
    pub type BacktrackExecutor<'r, 't> = exec::BacktrackExecutor<'r, 't>;

    /// Parse a pattern to its AST.
    pub fn parse(pattern: &str) -> Result<ast::Regex, Error> {
        parse::try_parse(pattern)
    }

    /// Compile an AST to a graph.
    pub fn compile(re: &ast::Regex) -> Graph {
        emit::emit(re)
    }

    /// Attempt a single match of `graph` anchored at byte offset `start`.
    pub fn match_at<'t>(
        graph: &Graph,
        text: &'t str,
        start: usize,
        flags: MatchFlags,
    ) -> Result<MatchOutcome<'t>, Error> {
        let state = match cursor::round_up_to_boundary(text, start) {
            Some(start) => exec::run_anchored(graph, text, start, flags, Limits::default())?,
            None => None,
        };
        Ok(MatchOutcome::new(text, graph.slots, state, None))
    }

    /// Searches `text`, returning an iterator over non-overlapping matches.
    pub fn find<'r, 't>(re: &'r Regex, text: &'t str, start: usize) -> Matches<'r, 't> {
        let executor =
            BacktrackExecutor::new(&re.graph, text, re.flags.match_flags(), re.limits);
        exec::Matches::new(executor, cursor::round_up_to_boundary(text, start))
    }
}
