#![allow(clippy::uninlined_format_args)]

// Work around dead code warnings: rust-lang issue #46379
pub mod common;

use common::*;

fn character_escapes_tc(tc: TestConfig) {
    tc.compile(r"\x41").match1f("xA").test_eq("A");
    tc.compile(r"\x4a").match1f("xJ").test_eq("J");
    tc.compile(r"Aé").match1f("xA\u{e9}").test_eq("A\u{e9}");
    tc.compile(r"Σ").match1f("\u{3a3}").test_eq("\u{3a3}");
    tc.compile(r"\cJ").match1f("a\nb").test_eq("\n");
    tc.compile(r"\cj").match1f("a\nb").test_eq("\n");
    tc.compile(r"\0").match1f("a\0b").test_eq("\0");
    tc.compile(r"\t\n\r\v\f")
        .match1f("x\t\n\r\x0B\x0Cy")
        .test_eq("\t\n\r\x0B\x0C");
}

#[test]
fn character_escapes() {
    test_with_configs(character_escapes_tc)
}

fn identity_escapes_tc(tc: TestConfig) {
    for c in [
        '\\', '^', '$', '.', '|', '?', '*', '+', '(', ')', '[', ']', '{', '}', '/', '-', ' ',
    ] {
        let pattern = format!("\\{}", c);
        let input = format!("a{}b", c);
        tc.compile(&pattern).match1f(&input).test_eq(&c.to_string());
    }
    tc.compile("\\\u{e9}").match1f("\u{e9}").test_eq("\u{e9}");
    tc.compile(r"a\.c").test_fails("abc");
    tc.compile(r"\(a\)").match1f("(a)").test_eq("(a)");
}

#[test]
fn identity_escapes() {
    test_with_configs(identity_escapes_tc)
}

fn class_escapes_tc(tc: TestConfig) {
    tc.compile(r"[\x41-\x43]+").match1f("xABCD").test_eq("ABC");
    tc.compile(r"[a-c]+").match1f("xabcd").test_eq("abc");
    tc.compile(r"[\-]").match1f("a-b").test_eq("-");
    tc.compile(r"[\]]").match1f("a]b").test_eq("]");
    tc.compile(r"[\\]").match1f("a\\b").test_eq("\\");
    tc.compile(r"[\b]").match1f("a\x08b").test_eq("\x08");
    tc.compile(r"[\cA]").match1f("a\x01b").test_eq("\x01");
    tc.compile(r"[\0]").match1f("a\0b").test_eq("\0");
    tc.compile(r"[\n\t]+").match1f("a\n\tb").test_eq("\n\t");
    tc.compile(r"[\D]+").match1f("12ab3").test_eq("ab");
    tc.compile(r"[\S]+").match1f("  ab ").test_eq("ab");
    tc.compile(r"[\W]+").match1f("ab!?c").test_eq("!?");
}

#[test]
fn class_escapes() {
    test_with_configs(class_escapes_tc)
}

fn escapes_under_icase_tc(tc: TestConfig) {
    tc.compilef(r"\x61", "i").match1f("A").test_eq("A");
    tc.compilef(r"é", "i").match1f("\u{c9}").test_eq("\u{c9}");
    tc.compilef(r"[\x61-\x63]+", "i").match1f("xCbA").test_eq("CbA");
}

#[test]
fn escapes_under_icase() {
    test_with_configs(escapes_under_icase_tc)
}
