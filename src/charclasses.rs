use crate::types::CharacterClassType;

// Character classes like \d or \S.

/// An inclusive range of chars.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Interval {
    pub first: char,
    pub last: char,
}

impl Interval {
    #[inline(always)]
    pub fn contains(&self, c: char) -> bool {
        self.first <= c && c <= self.last
    }
}

/// Construct an interval from an inclusive range of char.
const fn r(first: char, last: char) -> Interval {
    Interval { first, last }
}

/// Construct an interval from a single char.
const fn r1(c: char) -> Interval {
    Interval { first: c, last: c }
}

// Note all of these are sorted.

/// ES5 15.10.2.6.
pub const WORD_CHARS: [Interval; 4] = [r('0', '9'), r('A', 'Z'), r1('_'), r('a', 'z')];

/// ES5 15.10.2.12
pub const DIGITS: [Interval; 1] = [r('0', '9')];

/// ES5 7.2 White Space, with the Space_Separator category spelled out.
pub const WHITESPACE: [Interval; 10] = [
    // <TAB>, <VT>, <FF>
    r('\u{0009}', '\u{000B}'),
    r1('\u{000C}'),
    // <SP>
    r1('\u{0020}'),
    // <NBSP>
    r1('\u{00A0}'),
    // Ogham Space Mark
    r1('\u{1680}'),
    // En Quad through Hair Space
    r('\u{2000}', '\u{200A}'),
    // Narrow No-Break Space
    r1('\u{202F}'),
    // Medium Mathematical Space
    r1('\u{205F}'),
    // Ideographic Space
    r1('\u{3000}'),
    // <ZWNBSP>
    r1('\u{FEFF}'),
];

/// ES5 7.3
pub const LINE_TERMINATOR: [Interval; 3] =
    [r1('\u{000A}'), r1('\u{000D}'), r('\u{2028}', '\u{2029}')];

fn in_intervals(ivs: &[Interval], c: char) -> bool {
    ivs.iter().any(|iv| iv.contains(c))
}

/// \return whether this is a word char.
#[inline]
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[inline]
pub fn is_line_terminator(c: char) -> bool {
    matches!(c, '\u{000A}' | '\u{000D}' | '\u{2028}' | '\u{2029}')
}

/// \return whether \p c is a member of the (positive) character class \p ct.
/// \s includes line terminators.
pub fn class_contains(ct: CharacterClassType, c: char) -> bool {
    match ct {
        CharacterClassType::Digits => in_intervals(&DIGITS, c),
        CharacterClassType::Words => in_intervals(&WORD_CHARS, c),
        CharacterClassType::Spaces => {
            in_intervals(&WHITESPACE, c) || in_intervals(&LINE_TERMINATOR, c)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes() {
        for c in ['0', '5', '9'] {
            assert!(class_contains(CharacterClassType::Digits, c));
        }
        assert!(!class_contains(CharacterClassType::Digits, 'a'));
        assert!(class_contains(CharacterClassType::Words, '_'));
        assert!(!class_contains(CharacterClassType::Words, '-'));
        for c in [' ', '\t', '\n', '\r', '\u{2028}', '\u{00A0}', '\u{FEFF}'] {
            assert!(class_contains(CharacterClassType::Spaces, c), "{:?}", c);
        }
        assert!(!class_contains(CharacterClassType::Spaces, 'x'));
    }

    #[test]
    fn word_chars_agree_with_table() {
        for cp in 0..0x300u32 {
            let c = char::from_u32(cp).unwrap();
            assert_eq!(is_word_char(c), in_intervals(&WORD_CHARS, c));
            assert_eq!(is_line_terminator(c), in_intervals(&LINE_TERMINATOR, c));
        }
    }
}
