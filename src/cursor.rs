//! Character stepping over UTF-8 input.
//! Positions are byte offsets and always lie on char boundaries.

/// \return the character to the right of \p pos, or None at the end.
#[inline(always)]
pub fn peek_right(input: &str, pos: usize) -> Option<char> {
    input[pos..].chars().next()
}

/// \return the character to the left of \p pos, or None at the start.
#[inline(always)]
pub fn peek_left(input: &str, pos: usize) -> Option<char> {
    input[..pos].chars().next_back()
}

/// \return the next character, updating the position.
#[inline(always)]
pub fn next(input: &str, pos: &mut usize) -> Option<char> {
    let c = peek_right(input, *pos)?;
    *pos += c.len_utf8();
    Some(c)
}

/// \return the first char boundary at or after \p pos, or None if \p pos is
/// beyond the end of the input.
pub fn round_up_to_boundary(input: &str, mut pos: usize) -> Option<usize> {
    if pos > input.len() {
        return None;
    }
    while !input.is_char_boundary(pos) {
        pos += 1;
    }
    Some(pos)
}

/// \return whether \p input matches \p lit at \p pos, comparing characters
/// with canonicalization if \p icase. On success the position is updated; on
/// failure it is unchanged.
pub fn try_match_str(input: &str, pos: &mut usize, lit: &str, icase: bool) -> bool {
    if !icase {
        if input[*pos..].starts_with(lit) {
            *pos += lit.len();
            return true;
        }
        return false;
    }
    let mut p = *pos;
    for lc in lit.chars() {
        match next(input, &mut p) {
            Some(c) if crate::canonicalize::chars_match(c, lc, true) => {}
            _ => return false,
        }
    }
    *pos = p;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepping() {
        let s = "aé😀";
        let mut pos = 0;
        assert_eq!(next(s, &mut pos), Some('a'));
        assert_eq!(next(s, &mut pos), Some('é'));
        assert_eq!(pos, 3);
        assert_eq!(peek_left(s, pos), Some('é'));
        assert_eq!(next(s, &mut pos), Some('😀'));
        assert_eq!(next(s, &mut pos), None);
        assert_eq!(pos, s.len());
        assert_eq!(peek_left(s, 0), None);
    }

    #[test]
    fn boundaries() {
        let s = "aé";
        assert_eq!(round_up_to_boundary(s, 2), Some(3));
        assert_eq!(round_up_to_boundary(s, 3), Some(3));
        assert_eq!(round_up_to_boundary(s, 4), None);
    }

    #[test]
    fn literal() {
        let mut pos = 1;
        assert!(try_match_str("xAbC", &mut pos, "abc", true));
        assert_eq!(pos, 4);
        let mut pos = 1;
        assert!(!try_match_str("xAbC", &mut pos, "abc", false));
        assert_eq!(pos, 1);
    }
}
