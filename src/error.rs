//! Errors produced while compiling or running a regex

use core::convert::Infallible;
use thiserror::Error;

/// Represents an error encountered during regex compilation or matching.
///
/// A failed match is not an error; it is reported as `None` (or an outcome
/// with `matched == false`). Errors are either problems with the pattern or
/// flags, reported once at construction, or an exhausted match budget.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The pattern could not be parsed.
    /// `text` is a human-readable message and `offset` the character offset
    /// in the pattern at which the problem was found.
    #[error("{text} (at offset {offset})")]
    Syntax { text: String, offset: usize },

    /// A flag string contained an unknown or repeated letter.
    #[error("Invalid flags '{flags}': {text}")]
    Flags { flags: String, text: String },

    /// Matching took more steps than the configured limit.
    #[error("Match step limit of {limit} exceeded")]
    StepLimitExceeded { limit: usize },

    /// Matching accumulated more pending backtrack points than the configured
    /// limit.
    #[error("Backtrack stack limit of {limit} exceeded")]
    BacktrackLimitExceeded { limit: usize },
}

impl Error {
    /// \return the human-readable message, without position information.
    pub fn text(&self) -> &str {
        match self {
            Error::Syntax { text, .. } | Error::Flags { text, .. } => text,
            Error::StepLimitExceeded { .. } => "Match step limit exceeded",
            Error::BacktrackLimitExceeded { .. } => "Backtrack stack limit exceeded",
        }
    }

    /// \return whether this error was raised by a match running out of budget,
    /// as opposed to a malformed pattern or flag string.
    pub fn is_resource_exhausted(&self) -> bool {
        matches!(
            self,
            Error::StepLimitExceeded { .. } | Error::BacktrackLimitExceeded { .. }
        )
    }
}

// Allows `Regex::with_flags` to accept an already-built `Flags`.
impl From<Infallible> for Error {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn messages() {
        let e = Error::Syntax {
            text: "Unbalanced bracket".to_string(),
            offset: 3,
        };
        assert_eq!(e.text(), "Unbalanced bracket");
        assert_eq!(e.to_string(), "Unbalanced bracket (at offset 3)");
        assert!(!e.is_resource_exhausted());

        let e = Error::StepLimitExceeded { limit: 10 };
        assert!(e.is_resource_exhausted());
        assert_eq!(e.to_string(), "Match step limit of 10 exceeded");
    }
}
