//! Case canonicalization for case-insensitive matching.
//! See ES5 15.10.2.8 Canonicalize.

/// \return the canonical form of \p c.
/// The character is upper-cased. If upper-casing does not produce exactly one
/// character, or would map a non-ASCII character into ASCII, \p c is returned
/// unchanged.
pub fn canonicalize(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_uppercase();
    }
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(cu), None) if cu.is_ascii() => c,
        (Some(cu), None) => cu,
        _ => c,
    }
}

/// \return whether \p a and \p b are equal, either exactly or (if \p icase)
/// after canonicalization.
#[inline]
pub fn chars_match(a: char, b: char, icase: bool) -> bool {
    a == b || (icase && canonicalize(a) == canonicalize(b))
}

/// Call \p f with the case variants of \p c which share its canonical form:
/// \p c itself, the canonical form, and the lower-case forms of both.
/// \return true as soon as \p f does.
/// This is not every character with that canonical form: for input 'σ' it
/// never offers 'ς'. Callers which hold a single character compare canonical
/// forms instead; only ranges and class escapes rely on this enumeration.
pub fn for_each_equivalent<F: FnMut(char) -> bool>(c: char, mut f: F) -> bool {
    let canon = canonicalize(c);
    if f(c) || (canon != c && f(canon)) {
        return true;
    }
    for lc in canon.to_lowercase().chain(c.to_lowercase()) {
        if lc != c && canonicalize(lc) == canon && f(lc) {
            return true;
        }
    }
    false
}
