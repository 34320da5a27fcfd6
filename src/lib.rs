/*!

# retrace - REgex with TRACEs

This crate provides a backtracking regular expression engine which targets EcmaScript (aka JavaScript) regular expression semantics, and which can record a trace of every step it takes for display in a visual debugger.

# Example: test if a string contains a match

```rust
use retrace::Regex;
let re = Regex::new(r"\d{4}").unwrap();
let matched = re.test("2020-20-05").unwrap();
assert!(matched);
```

# Example: iterating over matches

Here we use a backreference to find doubled characters:

```rust
use retrace::Regex;
let re = Regex::new(r"(\w)\1").unwrap();
let text = "Frankly, Miss Piggy, I don't give a hoot!";
for m in re.find_iter(text) {
    println!("{}", &text[m.unwrap().range()])
}
// Output: ss
// Output: gg
// Output: oo

```

# Example: using capture groups

Capture groups are available in the `Match` object produced by a successful match.
A capture group is a range of byte indexes into the original string.

```rust
use retrace::Regex;
let re = Regex::new(r"(\d{4})").unwrap();
let text = "Today is 2020-20-05";
let m = re.find(text).unwrap().unwrap();
let group = m.group(1).unwrap();
assert_eq!(&text[group], "2020");
```

# Example: tracing a match

`exec_debug` runs one search and returns the captured text together with a
[`Trace`] of every node visited, every fork and every backtrack.

```rust
use retrace::Regex;
let re = Regex::new("a+b").unwrap();
let outcome = re.exec_debug("xaab", 0, false, false).unwrap();
assert!(outcome.matched);
assert_eq!(outcome.end_index, 4);
assert_eq!(outcome.captures, vec![Some("aab")]);
let trace = outcome.trace.unwrap();
assert_eq!(trace.runs.len(), 1);
assert!(trace.backtracks() > 0);
```

# Supported Syntax

retrace targets the ES5 pattern grammar: alternation, greedy and lazy quantifiers, capturing and non-capturing groups, positive and negative lookahead, backreferences, `^ $ \b \B`, character classes with `\d \D \s \S \w \W`, and control, hex and unicode escapes.
Lookbehind, named groups and the `s`, `u` and `y` flags are not supported.

Case-insensitive matching compares characters after ES5 canonicalization (simple upper-casing):

```rust
use retrace::Regex;
let re = Regex::with_flags("BC", "i").unwrap();
assert!(re.test("abcd").unwrap());
```

# Architecture

retrace has a parser producing an AST, a compiler which lowers the AST to a graph of nodes, and a backtracking matcher which walks the graph. The graph is an arena of nodes addressed by index; loops are the only back edges.

The matcher keeps an explicit backtrack stack. Each fork saves a full copy of the match state (cursor, captures and loop counters), so a failed path can never disturb the state it was forked from. Searches are bounded by [`Limits`]; exceeding them is reported as an [`Error`] rather than as a failed match.

# Crate features

- **serde**. Derives `Serialize` on the trace types, for handing traces to external visualizers.

*/

#![warn(clippy::all)]
#![allow(clippy::upper_case_acronyms, clippy::match_like_matches_macro)]
// Clippy's manual_range_contains suggestion produces worse codegen.
#![allow(clippy::manual_range_contains)]

pub use crate::api::*;
pub use crate::trace::{RunOutcome, Trace, TraceEntry, TraceKind, TraceRun};

mod api;
pub mod ast;
mod backtrack;
mod canonicalize;
mod charclasses;
mod cursor;
mod emit;
mod error;
mod exec;
pub mod graph;
mod parse;
mod startpredicate;
pub mod trace;
mod types;

pub use crate::types::{CaptureGroupID, CharacterClassType, NodeID};
