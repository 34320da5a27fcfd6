#![allow(clippy::uninlined_format_args)]

/// Test that \p pattern fails to parse with default flags.
#[track_caller]
pub fn test_parse_fails(pattern: &str) {
    let res = retrace::Regex::new(pattern);
    assert!(res.is_err(), "Pattern should not have parsed: {}", pattern);
}

/// Test that \p pattern fails to parse with flags.
#[track_caller]
pub fn test_parse_fails_flags(pattern: &str, flags: &str) {
    let res = retrace::Regex::with_flags(pattern, flags);
    assert!(res.is_err(), "Pattern should not have parsed: {}", pattern);
}

/// Format a Match by inserting commas between all capture groups.
fn format_match(r: &retrace::Match, input: &str) -> String {
    let mut result = input[r.range()].to_string();
    for cg in r.captures.iter() {
        result.push(',');
        if let Some(cg) = cg {
            result.push_str(&input[cg.clone()])
        }
    }
    result
}

/// Format a list of group texts the same way as format_match.
fn format_groups(groups: &[Option<&str>]) -> String {
    let mut parts = groups.iter().map(|g| g.unwrap_or(""));
    let mut result = parts.next().unwrap_or("").to_string();
    for part in parts {
        result.push(',');
        result.push_str(part);
    }
    result
}

pub trait StringTestHelpers {
    /// "Fluent" style helper for testing that a String is equal to a str.
    fn test_eq(&self, s: &str);
}

impl StringTestHelpers for String {
    #[track_caller]
    fn test_eq(&self, rhs: &str) {
        assert_eq!(self.as_str(), rhs)
    }
}

pub trait VecTestHelpers {
    /// "Fluent" style helper for testing that a Vec<&str> is equal to a
    /// Vec<&str>.
    fn test_eq(&self, rhs: Vec<&str>);
}

impl VecTestHelpers for Vec<&str> {
    #[track_caller]
    fn test_eq(&self, rhs: Vec<&str>) {
        assert_eq!(*self, rhs)
    }
}

/// A compiled regex which remembers a TestConfig.
#[derive(Debug, Clone)]
pub struct TestCompiledRegex {
    re: retrace::Regex,
    tc: TestConfig,
}

impl TestCompiledRegex {
    /// \return the underlying regex.
    pub fn regex(&self) -> &retrace::Regex {
        &self.re
    }

    /// Search for self in \p input with the driver, returning a list of all
    /// matches.
    #[track_caller]
    pub fn matches(&self, input: &str, start: usize) -> Vec<retrace::Match> {
        retrace::backends::find(&self.re, input, start)
            .collect::<Result<Vec<_>, _>>()
            .expect("Search should not have failed")
    }

    /// Search for self in \p input, returning the text of the total match and
    /// every capture group of the first match, or None if none.
    /// Which engine entry point is used depends on the TestConfig.
    #[track_caller]
    pub fn find<'b>(&self, input: &'b str) -> Option<Vec<Option<&'b str>>> {
        match self.tc.backend {
            Backend::Driver => self
                .matches(input, 0)
                .into_iter()
                .next()
                .map(|m| m.groups().map(|g| g.map(|r| &input[r])).collect()),
            Backend::Traced => {
                let flags = self.re.flags();
                let outcome = self
                    .re
                    .exec_debug(input, 0, flags.multiline, flags.icase)
                    .expect("Traced search should not have failed");
                assert_eq!(outcome.captures.len(), self.re.capture_count() + 1);
                let trace = outcome.trace.as_ref().expect("Trace should be recorded");
                assert_eq!(trace.runs.len(), 1);
                assert_eq!(trace.succeeded(), outcome.matched);
                if outcome.matched {
                    Some(outcome.captures)
                } else {
                    assert!(outcome.captures.iter().all(Option::is_none));
                    None
                }
            }
        }
    }

    /// Match against a string, returning the first formatted match.
    #[track_caller]
    pub fn match1f(&self, input: &str) -> String {
        match self.find(input) {
            Some(groups) => format_groups(&groups),
            None => panic!("Failed to match {}", input),
        }
    }

    /// Match against a string, returning the match as a Vec containing None
    /// for unmatched groups, or the matched strings.
    #[track_caller]
    pub fn match1_vec<'b>(&self, input: &'b str) -> Vec<Option<&'b str>> {
        match self.find(input) {
            Some(groups) => groups,
            None => panic!("Failed to match {}", input),
        }
    }

    /// Test that matching against \p input fails.
    #[track_caller]
    pub fn test_fails(&self, input: &str) {
        assert!(self.find(input).is_none(), "Should not have matched")
    }

    /// Test that matching against \p input succeeds.
    #[track_caller]
    pub fn test_succeeds(&self, input: &str) {
        assert!(self.find(input).is_some(), "Should have matched")
    }

    /// Return a list of all non-overlapping total match ranges from a given
    /// start.
    pub fn match_all_from(&self, input: &str, start: usize) -> Vec<retrace::Range> {
        self.matches(input, start)
            .into_iter()
            .map(move |m| m.range())
            .collect()
    }

    /// Return a list of all non-overlapping matches.
    pub fn match_all<'b>(&self, input: &'b str) -> Vec<&'b str> {
        self.matches(input, 0)
            .into_iter()
            .map(move |m| &input[m.range()])
            .collect()
    }

    /// Collect all matches into a String, separated by commas.
    pub fn run_global_match(&self, input: &str) -> String {
        self.matches(input, 0)
            .into_iter()
            .map(move |m| format_match(&m, input))
            .collect::<Vec<String>>()
            .join(",")
    }
}

/// How a first match is found.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Backend {
    /// Anchored attempts at successive start positions.
    Driver,

    /// A single recorded walk from the unanchored entry.
    Traced,
}

/// Description of how to test a regex.
#[derive(Debug, Copy, Clone)]
pub struct TestConfig {
    backend: Backend,
}

impl TestConfig {
    /// Compile a pattern to a regex, with default flags.
    #[track_caller]
    pub fn compile(&self, pattern: &str) -> TestCompiledRegex {
        self.compilef(pattern, "")
    }

    /// Compile a pattern to a regex, with given flags.
    #[track_caller]
    pub fn compilef(&self, pattern: &str, flags_str: &str) -> TestCompiledRegex {
        match retrace::Regex::with_flags(pattern, flags_str) {
            Ok(re) => TestCompiledRegex { re, tc: *self },
            Err(err) => panic!(
                "Failed to parse! flags: {} pattern: {}, error: {}",
                flags_str, pattern, err
            ),
        }
    }

    /// Test that \p pattern and \p flags successfully parses, and matches
    /// \p input.
    #[track_caller]
    pub fn test_match_succeeds(&self, pattern: &str, flags_str: &str, input: &str) {
        let cr = self.compilef(pattern, flags_str);
        cr.test_succeeds(input)
    }

    /// Test that \p pattern and \p flags successfully parses, and does not
    /// match \p input.
    #[track_caller]
    pub fn test_match_fails(&self, pattern: &str, flags_str: &str, input: &str) {
        let cr = self.compilef(pattern, flags_str);
        cr.test_fails(input)
    }
}

/// Invoke \p F with each test config, in turn.
pub fn test_with_configs<F>(func: F)
where
    F: Fn(TestConfig),
{
    func(TestConfig {
        backend: Backend::Driver,
    });
    func(TestConfig {
        backend: Backend::Traced,
    });
}
