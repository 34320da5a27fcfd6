//! Parser from regex patterns to an AST

use crate::ast::{self, AssertionKind, ClassItem, Escape, GroupBehavior, Node};
use crate::error::Error;
use crate::types::{CaptureGroupID, CharacterClassType, MAX_CAPTURE_GROUPS, MAX_LOOPS};
use std::iter::Peekable;

/// A parsed quantifier, before it is attached to its term.
#[derive(Debug, Copy, Clone)]
struct Quantifier {
    min: usize,
    max: Option<usize>,
    greedy: bool,
}

fn make_cat(nodes: Vec<Node>) -> Node {
    match nodes.len() {
        0 => Node::Empty,
        1 => nodes.into_iter().next().unwrap_or(Node::Empty),
        _ => Node::Alternative(nodes),
    }
}

fn make_alt(nodes: Vec<Node>) -> Node {
    match nodes.len() {
        0 => Node::Empty,
        1 => nodes.into_iter().next().unwrap_or(Node::Empty),
        _ => Node::Disjunction(nodes),
    }
}

fn class_type_for_escape(c: char) -> Option<CharacterClassType> {
    match c {
        'd' | 'D' => Some(CharacterClassType::Digits),
        's' | 'S' => Some(CharacterClassType::Spaces),
        'w' | 'W' => Some(CharacterClassType::Words),
        _ => None,
    }
}

/// Represents the state used to parse a regex.
struct Parser<'a> {
    /// The remaining input.
    input: Peekable<std::str::Chars<'a>>,

    /// Number of chars consumed so far, for error reporting.
    offset: usize,

    /// Number of loops.
    loop_count: u32,

    /// Number of capturing groups.
    group_count: CaptureGroupID,
}

impl<'a> Parser<'a> {
    fn error<T, S: ToString>(&self, text: S) -> Result<T, Error> {
        Err(Error::Syntax {
            text: text.to_string(),
            offset: self.offset,
        })
    }

    /// Consume a character, returning it.
    fn consume(&mut self, c: char) -> char {
        let nc = self.next();
        std::debug_assert!(nc == Some(c), "char was not next");
        c
    }

    /// If our contents begin with the char c, consume it from our contents
    /// and return true. Otherwise return false.
    fn try_consume(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.consume(c);
            true
        } else {
            false
        }
    }

    /// If our contents begin with the string \p s, consume it from our contents
    /// and return true. Otherwise return false.
    fn try_consume_str(&mut self, s: &str) -> bool {
        let mut cursor = self.input.clone();
        for c1 in s.chars() {
            if cursor.next() != Some(c1) {
                return false;
            }
        }
        self.input = cursor;
        self.offset += s.chars().count();
        true
    }

    /// Peek at the next character.
    fn peek(&mut self) -> Option<char> {
        self.input.peek().copied()
    }

    /// \return the next character.
    fn next(&mut self) -> Option<char> {
        let c = self.input.next();
        if c.is_some() {
            self.offset += 1;
        }
        c
    }

    fn save(&self) -> (Peekable<std::str::Chars<'a>>, usize) {
        (self.input.clone(), self.offset)
    }

    fn restore(&mut self, saved: (Peekable<std::str::Chars<'a>>, usize)) {
        self.input = saved.0;
        self.offset = saved.1;
    }

    fn try_parse(&mut self) -> Result<ast::Regex, Error> {
        // Parse a disjunction. If we consume everything, it's success. If there's
        // something left, it must be an excess closing paren.
        let body = self.consume_disjunction()?;
        match self.peek() {
            Some(')') => self.error("Unbalanced parenthesis"),
            Some(c) => self.error(format!("Unexpected char: {}", c)),
            None => Ok(self.finalize(body)),
        }
    }

    /// ES5 15.10.2.3 Disjunction.
    fn consume_disjunction(&mut self) -> Result<Node, Error> {
        let mut terms = vec![self.consume_alternative()?];
        while self.try_consume('|') {
            terms.push(self.consume_alternative()?)
        }
        Ok(make_alt(terms))
    }

    /// ES5 15.10.2.4 Alternative, a sequence of ES5 15.10.2.5 Terms.
    fn consume_alternative(&mut self) -> Result<Node, Error> {
        let mut result: Vec<Node> = Vec::new();
        while let Some(c) = self.peek() {
            let term = match c {
                // An alternative is terminated by closing parens or vertical bar.
                ')' | '|' => break,

                '^' => {
                    self.consume('^');
                    Node::Assertion(AssertionKind::Start)
                }

                '$' => {
                    self.consume('$');
                    Node::Assertion(AssertionKind::End)
                }

                '\\' => {
                    self.consume('\\');
                    self.consume_atom_escape()?
                }

                '.' => {
                    self.consume('.');
                    Node::Dot
                }

                '(' => self.consume_group()?,

                '[' => self.consume_bracket()?,

                c => {
                    // It's an error if this parses successfully as a quantifier.
                    // Note this covers *, +, ? as well as a well-formed {n,m}.
                    let saved = self.save();
                    if self.try_consume_quantifier()?.is_some() {
                        self.restore(saved);
                        return self.error("Nothing to repeat");
                    }
                    self.restore(saved);
                    Node::Character(self.consume(c))
                }
            };

            // We just parsed a term; try parsing a quantifier.
            match self.try_consume_quantifier()? {
                None => result.push(term),
                Some(_) if !term.is_quantifiable() => {
                    return self.error("Quantifier not allowed here");
                }
                Some(quant) => {
                    if self.loop_count as usize >= MAX_LOOPS {
                        return self.error("Loop count limit exceeded");
                    }
                    self.loop_count += 1;
                    result.push(Node::Quantifier {
                        min: quant.min,
                        max: quant.max,
                        greedy: quant.greedy,
                        child: Box::new(term),
                        groups: 0..0,
                    });
                }
            }
        }
        Ok(make_cat(result))
    }

    /// Parse a parenthesized group, including its closing paren.
    fn consume_group(&mut self) -> Result<Node, Error> {
        let behavior = if self.try_consume_str("(?=") {
            GroupBehavior::Lookahead
        } else if self.try_consume_str("(?!") {
            GroupBehavior::NegativeLookahead
        } else if self.try_consume_str("(?:") {
            GroupBehavior::NonCapturing
        } else {
            self.consume('(');
            if self.group_count as usize >= MAX_CAPTURE_GROUPS {
                return self.error("Capture group count limit exceeded");
            }
            self.group_count += 1;
            GroupBehavior::Capturing
        };
        let body = self.consume_disjunction()?;
        if !self.try_consume(')') {
            return self.error("Unbalanced parenthesis");
        }
        Ok(Node::Group {
            behavior,
            match_idx: 0,
            last_match_idx: 0,
            groups: 0..0,
            body: Box::new(body),
        })
    }

    /// ES5 15.10.2.13 CharacterClass.
    fn consume_bracket(&mut self) -> Result<Node, Error> {
        self.consume('[');
        let negative = self.try_consume('^');
        let mut ranges = Vec::new();

        loop {
            match self.peek() {
                None => {
                    return self.error("Unbalanced bracket");
                }
                Some(']') => {
                    self.consume(']');
                    return Ok(Node::CharacterClass { ranges, negative });
                }
                _ => {}
            }

            // Parse a code point or character class.
            let first = match self.try_consume_bracket_class_atom()? {
                Some(first) => first,
                None => continue,
            };

            // Check for a dash; we may have a range. A dash right before the
            // closing bracket is literal: [a-].
            if self.peek() != Some('-') {
                ranges.push(first);
                continue;
            }
            let saved = self.save();
            self.consume('-');
            if self.peek() == Some(']') {
                self.restore(saved);
                ranges.push(first);
                continue;
            }
            let second = match self.try_consume_bracket_class_atom()? {
                Some(second) => second,
                None => return self.error("Unbalanced bracket"),
            };

            match (first, second) {
                // ES5 15.10.2.15 "If i > j, throw a SyntaxError exception".
                (ClassItem::Atom(lo), ClassItem::Atom(hi)) => {
                    if lo > hi {
                        return self.error("Invalid character range");
                    }
                    ranges.push(ClassItem::Range { lo, hi });
                }
                // A class escape cannot bound a range; the dash is literal.
                (first, second) => {
                    ranges.push(first);
                    ranges.push(ClassItem::Atom('-'));
                    ranges.push(second);
                }
            }
        }
    }

    fn try_consume_bracket_class_atom(&mut self) -> Result<Option<ClassItem>, Error> {
        let c = match self.peek() {
            // End of bracket.
            None | Some(']') => return Ok(None),
            Some(c) => c,
        };
        if c != '\\' {
            return Ok(Some(ClassItem::Atom(self.consume(c))));
        }
        self.consume('\\');
        let ec = match self.peek() {
            None => return self.error("Incomplete escape"),
            Some(ec) => ec,
        };
        if let Some(class_type) = class_type_for_escape(ec) {
            // ES5 15.10.2.12 CharacterClassEscape.
            self.consume(ec);
            return Ok(Some(ClassItem::Class {
                class_type,
                positive: ec.is_ascii_lowercase(),
            }));
        }
        match ec {
            // "Return the CharSet containing the single character <BS> U+0008
            // (BACKSPACE)"
            'b' => {
                self.consume('b');
                Ok(Some(ClassItem::Atom('\x08')))
            }
            '-' => {
                self.consume('-');
                Ok(Some(ClassItem::Atom('-')))
            }
            // Inside a class, a decimal escape other than \0 names no group.
            '1'..='9' => self.error("Invalid character escape"),
            _ => Ok(Some(ClassItem::Atom(self.consume_character_escape()?))),
        }
    }

    fn try_consume_quantifier(&mut self) -> Result<Option<Quantifier>, Error> {
        if let Some(mut quant) = self.try_consume_quantifier_prefix() {
            quant.greedy = !self.try_consume('?');
            // Validate the quantifier.
            // This is not part of recognizing the prefix: `/{3/` is valid and
            // `{` is then a literal.
            if matches!(quant.max, Some(max) if max < quant.min) {
                return self.error("Invalid quantifier");
            }
            Ok(Some(quant))
        } else {
            Ok(None)
        }
    }

    /// ES5 15.10.2.7 QuantifierPrefix.
    /// A '{' which does not begin a well-formed bound is not a quantifier; the
    /// input is left untouched.
    fn try_consume_quantifier_prefix(&mut self) -> Option<Quantifier> {
        let quant = |min, max| Quantifier {
            min,
            max,
            greedy: true,
        };
        match self.peek()? {
            '+' => {
                self.consume('+');
                Some(quant(1, None))
            }
            '*' => {
                self.consume('*');
                Some(quant(0, None))
            }
            '?' => {
                self.consume('?');
                Some(quant(0, Some(1)))
            }
            '{' => {
                let saved = self.save();
                self.consume('{');
                let result = self.try_consume_decimal_integer_literal().and_then(|min| {
                    let max = if self.try_consume(',') {
                        // Like {3,} or {3,4}
                        self.try_consume_decimal_integer_literal()
                    } else {
                        // Like {3}.
                        Some(min)
                    };
                    if self.try_consume('}') {
                        Some(quant(min, max))
                    } else {
                        None
                    }
                });
                if result.is_none() {
                    self.restore(saved);
                }
                result
            }
            _ => None,
        }
    }

    /// ES5 7.8.3 DecimalIntegerLiteral.
    /// If the value would overflow, usize::MAX is returned.
    /// All decimal digits are consumed regardless.
    fn try_consume_decimal_integer_literal(&mut self) -> Option<usize> {
        let mut result: usize = 0;
        let mut char_count = 0;
        while let Some(c) = self.peek() {
            if let Some(digit) = char::to_digit(c, 10) {
                self.consume(c);
                char_count += 1;
                result = result.saturating_mul(10);
                result = result.saturating_add(digit as usize);
            } else {
                break;
            }
        }
        if char_count > 0 {
            Some(result)
        } else {
            None
        }
    }

    /// Consume exactly \p count hex digits, returning their value.
    fn try_consume_hex_digits(&mut self, count: usize) -> Option<u32> {
        let saved = self.save();
        let mut result = 0;
        for _ in 0..count {
            match self.next().and_then(|c| c.to_digit(16)) {
                Some(digit) => result = result * 16 + digit,
                None => {
                    self.restore(saved);
                    return None;
                }
            }
        }
        Some(result)
    }

    /// ES5 15.10.2.10 CharacterEscape, plus IdentityEscape.
    fn consume_character_escape(&mut self) -> Result<char, Error> {
        let c = match self.peek() {
            None => return self.error("Incomplete escape"),
            Some(c) => c,
        };
        match c {
            'f' => {
                self.consume('f');
                Ok('\x0C')
            }
            'n' => {
                self.consume('n');
                Ok('\n')
            }
            'r' => {
                self.consume('r');
                Ok('\r')
            }
            't' => {
                self.consume('t');
                Ok('\t')
            }
            'v' => {
                self.consume('v');
                Ok('\x0B')
            }
            'c' => {
                // Control escape.
                self.consume('c');
                match self.peek() {
                    Some(nc) if nc.is_ascii_alphabetic() => {
                        self.consume(nc);
                        Ok(char::from((nc as u8) % 32))
                    }
                    _ => self.error("Invalid character escape"),
                }
            }
            '0' => {
                // CharacterEscape :: "0 [lookahead != DecimalDigit]"
                self.consume('0');
                match self.peek() {
                    Some(c) if c.is_ascii_digit() => self.error("Invalid character escape"),
                    _ => Ok('\0'),
                }
            }
            'x' => {
                // HexEscapeSequence :: x HexDigit HexDigit
                self.consume('x');
                match self.try_consume_hex_digits(2).and_then(char::from_u32) {
                    Some(c) => Ok(c),
                    None => self.error("Invalid character escape"),
                }
            }
            'u' => {
                // UnicodeEscapeSequence :: u HexDigit HexDigit HexDigit HexDigit
                // Lone surrogates cannot be represented in a str.
                self.consume('u');
                match self.try_consume_hex_digits(4).and_then(char::from_u32) {
                    Some(c) => Ok(c),
                    None => self.error("Invalid character escape"),
                }
            }

            // IdentityEscape: anything that cannot continue an identifier.
            c if !(c.is_ascii_alphanumeric() || c == '_') => Ok(self.consume(c)),

            _ => self.error("Invalid character escape"),
        }
    }

    /// ES5 15.10.2.9 AtomEscape.
    fn consume_atom_escape(&mut self) -> Result<Node, Error> {
        let c = match self.peek() {
            None => return self.error("Incomplete escape"),
            Some(c) => c,
        };
        if let Some(class_type) = class_type_for_escape(c) {
            self.consume(c);
            return Ok(Node::EscapeSpecial(Escape::Class {
                class_type,
                positive: c.is_ascii_lowercase(),
            }));
        }
        match c {
            'b' | 'B' => {
                self.consume(c);
                Ok(Node::EscapeSpecial(Escape::WordBoundary { invert: c == 'B' }))
            }

            '1'..='9' => {
                // This is a backreference. All digits are consumed; values too
                // large for a u32 saturate and name a group that cannot exist.
                let val = self.try_consume_decimal_integer_literal().unwrap_or(0);
                Ok(Node::Backreference(u32::try_from(val).unwrap_or(u32::MAX)))
            }

            'f' | 'n' | 'r' | 't' | 'v' | 'c' | '0' | 'x' | 'u' => Ok(Node::EscapeSpecial(
                Escape::Literal(self.consume_character_escape()?),
            )),

            _ => Ok(Node::Character(self.consume_character_escape()?)),
        }
    }

    fn finalize(&self, mut node: Node) -> ast::Regex {
        debug_assert!(self.loop_count as usize <= MAX_LOOPS);
        debug_assert!(self.group_count as usize <= MAX_CAPTURE_GROUPS);
        let next = ast::number_groups(&mut node, 1);
        debug_assert!(next - 1 == self.group_count, "Group numbering mismatch");
        ast::Regex {
            node,
            group_count: self.group_count,
            loop_count: self.loop_count,
        }
    }
}

/// Try parsing a given pattern.
/// Return the resulting AST, or an error.
pub fn try_parse(pattern: &str) -> Result<ast::Regex, Error> {
    let mut p = Parser {
        input: pattern.chars().peekable(),
        offset: 0,
        loop_count: 0,
        group_count: 0,
    };
    p.try_parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(pattern: &str) -> Node {
        try_parse(pattern)
            .unwrap_or_else(|e| panic!("Failed to parse {}: {}", pattern, e))
            .node
    }

    fn error_text(pattern: &str) -> String {
        match try_parse(pattern) {
            Ok(re) => panic!("Parsed {} but expected an error: {:?}", pattern, re),
            Err(e) => e.text().to_string(),
        }
    }

    #[test]
    fn simple() {
        assert_eq!(parse(""), Node::Empty);
        assert_eq!(parse("a"), Node::Character('a'));
        assert_eq!(
            parse("ab"),
            Node::Alternative(vec![Node::Character('a'), Node::Character('b')])
        );
        assert_eq!(
            parse("a|"),
            Node::Disjunction(vec![Node::Character('a'), Node::Empty])
        );
    }

    #[test]
    fn quantifiers() {
        let quant = |min, max, greedy| Node::Quantifier {
            min,
            max,
            greedy,
            child: Box::new(Node::Character('a')),
            groups: 1..1,
        };
        assert_eq!(parse("a*"), quant(0, None, true));
        assert_eq!(parse("a+?"), quant(1, None, false));
        assert_eq!(parse("a??"), quant(0, Some(1), false));
        assert_eq!(parse("a{3}"), quant(3, Some(3), true));
        assert_eq!(parse("a{3,}"), quant(3, None, true));
        assert_eq!(parse("a{3,5}?"), quant(3, Some(5), false));
        // Not a quantifier: literal braces.
        assert_eq!(
            parse("a{"),
            Node::Alternative(vec![Node::Character('a'), Node::Character('{')])
        );
        assert_eq!(
            parse("a{,3}"),
            Node::Alternative(
                "a{,3}".chars().map(Node::Character).collect::<Vec<_>>()
            )
        );
    }

    #[test]
    fn classes() {
        assert_eq!(
            parse("[^a-c\\d-]"),
            Node::CharacterClass {
                ranges: vec![
                    ClassItem::Range { lo: 'a', hi: 'c' },
                    ClassItem::Class {
                        class_type: CharacterClassType::Digits,
                        positive: true
                    },
                    ClassItem::Atom('-'),
                ],
                negative: true,
            }
        );
        assert_eq!(
            parse("[\\w-z]"),
            Node::CharacterClass {
                ranges: vec![
                    ClassItem::Class {
                        class_type: CharacterClassType::Words,
                        positive: true
                    },
                    ClassItem::Atom('-'),
                    ClassItem::Atom('z'),
                ],
                negative: false,
            }
        );
        assert_eq!(
            parse("[\\b]"),
            Node::CharacterClass {
                ranges: vec![ClassItem::Atom('\x08')],
                negative: false,
            }
        );
        assert_eq!(
            parse("[]"),
            Node::CharacterClass {
                ranges: vec![],
                negative: false,
            }
        );
    }

    #[test]
    fn escapes() {
        assert_eq!(
            parse("\\x41"),
            Node::EscapeSpecial(Escape::Literal('A'))
        );
        assert_eq!(
            parse("\\u0020"),
            Node::EscapeSpecial(Escape::Literal(' '))
        );
        assert_eq!(
            parse("\\cJ"),
            Node::EscapeSpecial(Escape::Literal('\n'))
        );
        assert_eq!(parse("\\."), Node::Character('.'));
        assert_eq!(parse("\\12"), Node::Backreference(12));
        assert_eq!(
            parse("\\W"),
            Node::EscapeSpecial(Escape::Class {
                class_type: CharacterClassType::Words,
                positive: false
            })
        );
    }

    #[test]
    fn groups() {
        let re = try_parse("(a)(?:(b))(?=(c))").unwrap();
        assert_eq!(re.group_count, 3);
        assert_eq!(re.loop_count, 0);
        let re = try_parse("(?!x)*").unwrap();
        assert_eq!(re.loop_count, 1);
    }

    #[test]
    fn errors() {
        assert_eq!(error_text("a{2,1}"), "Invalid quantifier");
        assert_eq!(error_text("(a"), "Unbalanced parenthesis");
        assert_eq!(error_text("a)"), "Unbalanced parenthesis");
        assert_eq!(error_text("[a"), "Unbalanced bracket");
        assert_eq!(error_text("[z-a]"), "Invalid character range");
        assert_eq!(error_text("*a"), "Nothing to repeat");
        assert_eq!(error_text("a|+"), "Nothing to repeat");
        assert_eq!(error_text("a**"), "Nothing to repeat");
        assert_eq!(error_text("^*"), "Quantifier not allowed here");
        assert_eq!(error_text("\\b+"), "Quantifier not allowed here");
        assert_eq!(error_text("\\"), "Incomplete escape");
        assert_eq!(error_text("\\q"), "Invalid character escape");
        assert_eq!(error_text("\\xZZ"), "Invalid character escape");
        assert_eq!(error_text("\\uD800"), "Invalid character escape");
        assert_eq!(error_text("\\01"), "Invalid character escape");
    }

    #[test]
    fn error_offsets() {
        match try_parse("ab[") {
            Err(Error::Syntax { offset, .. }) => assert_eq!(offset, 3),
            r => panic!("Unexpected result {:?}", r),
        }
        match try_parse("abc{2,1}") {
            Err(Error::Syntax { offset, .. }) => assert_eq!(offset, 8),
            r => panic!("Unexpected result {:?}", r),
        }
    }
}
